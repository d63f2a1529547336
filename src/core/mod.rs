//! Core module - fundamental types and utilities

pub mod config;
pub mod values;

pub use config::Config;
pub use values::{FieldName, FieldNameError, FormValues, ValuesError};
