//! Non-interactive form checking
//!
//! Loads a value file and walks the wizard the way a user would: advance
//! step by step until blocked, then attempt a submit. Useful for scripts and
//! CI, where the exit status says whether the values would be accepted.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::{load_values, print_errors, resolve_form};
use crate::cli::GlobalOpts;
use crate::core::values::FormValues;
use crate::core::Config;
use crate::schema::ValidationResult;
use crate::wizard::{AdvanceOutcome, SubmitOutcome, WizardController};

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// YAML or JSON file mapping field names to values
    pub values: PathBuf,

    /// Built-in form name or definition file (default: invoice)
    #[arg(long, short = 'F')]
    pub form: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Machine-readable check outcome
#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    form: &'a str,
    valid: bool,
    /// Last step reached by advancing (0-based)
    reached_step: usize,
    errors: &'a ValidationResult,
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let form = resolve_form(args.form.as_deref(), &config)?;
    let values = load_values(&args.values)?;

    let title = form.definition.title().to_string();
    let mut wizard =
        WizardController::with_initial_values(form.definition, values, |_: &FormValues| {})?;
    let verbose_output = !global.quiet && !args.json;

    let mut blocked = false;
    loop {
        let index = wizard.current_step_index();
        let step_title = wizard.step_title().to_string();
        match wizard.advance() {
            AdvanceOutcome::Moved { .. } => {
                if verbose_output {
                    println!("{} {}", style("✓").green(), step_title);
                }
            }
            AdvanceOutcome::Blocked(result) => {
                if verbose_output {
                    println!(
                        "{} {} (step {})",
                        style("✗").red(),
                        step_title,
                        index + 1
                    );
                    print_errors(wizard.definition(), &result);
                }
                blocked = true;
                break;
            }
            AdvanceOutcome::AtLastStep | AdvanceOutcome::NotEditing => break,
        }
    }

    let reached_step = wizard.current_step_index();
    let outcome = wizard.submit();
    let all_errors = match &outcome {
        SubmitOutcome::Invalid(result) => result.clone(),
        _ => ValidationResult::new(),
    };

    if args.json {
        let report = CheckReport {
            form: &title,
            valid: outcome.submitted(),
            reached_step,
            errors: &all_errors,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).into_diagnostic()?
        );
    } else if outcome.submitted() {
        if !global.quiet {
            println!(
                "{} {} fields valid; {} would be submitted",
                style("✓").green(),
                wizard.definition().fields().len(),
                title
            );
        }
    } else if verbose_output {
        if !blocked {
            println!(
                "{} {} (step {})",
                style("✗").red(),
                wizard.step_title(),
                reached_step + 1
            );
            let step = wizard.current_step().field_names().to_vec();
            print_errors(wizard.definition(), &all_errors.restricted_to(&step));
        }
        // Steps past the blocking one were never shown
        let later = errors_after(&wizard, reached_step, &all_errors);
        if later.error_count() > 0 {
            println!("{} Later steps", style("→").cyan());
            print_errors(wizard.definition(), &later);
        }
    }

    if outcome.submitted() {
        Ok(())
    } else {
        Err(miette::miette!(
            "{} invalid field(s) in {}",
            all_errors.error_count(),
            args.values.display()
        ))
    }
}

fn errors_after<S>(
    wizard: &WizardController<S>,
    reached_step: usize,
    errors: &ValidationResult,
) -> ValidationResult {
    let later: Vec<_> = wizard
        .definition()
        .steps()
        .iter()
        .skip(reached_step + 1)
        .flat_map(|step| step.field_names().iter().cloned())
        .collect();
    errors.restricted_to(&later)
}
