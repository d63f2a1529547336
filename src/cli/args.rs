//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};

use crate::cli::commands::{
    check::CheckArgs, completions::CompletionsArgs, fill::FillArgs, schema::SchemaCommands,
};

#[derive(Parser)]
#[command(name = "stepform")]
#[command(author, version, about = "Multi-step form wizards in the terminal")]
#[command(long_about = "Fill, check and inspect multi-step forms. Each step is validated before moving on, and a form is only submitted once every field is valid.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill a form interactively, step by step
    Fill(FillArgs),

    /// Check a file of values against a form without prompting
    Check(CheckArgs),

    /// Inspect and check form definitions
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
