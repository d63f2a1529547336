//! Wizard session - navigation state machine and submission sinks

pub mod controller;
pub mod sink;

pub use controller::{
    AdvanceOutcome, BackOutcome, Phase, SubmitOutcome, ValidationMode, WizardController,
    WizardError, WizardSnapshot, WizardState,
};
pub use sink::{RecordSink, RecordTarget, SubmissionRecord, SubmissionSink};
