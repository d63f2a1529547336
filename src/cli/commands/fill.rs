//! Interactive form filling
//!
//! Prompts for each field of the current step, then offers navigation.
//! Errors are shown inline next to the fields of the step being edited;
//! later steps stay quiet until the user reaches them.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{load_values, output_target, print_errors, progress_bar, resolve_form};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::schema::{FieldKind, FieldSpec};
use crate::wizard::{
    AdvanceOutcome, RecordSink, RecordTarget, SubmitOutcome, ValidationMode, WizardController,
};

#[derive(clap::Args, Debug)]
pub struct FillArgs {
    /// Built-in form name or definition file (default: invoice)
    #[arg(long, short = 'F')]
    pub form: Option<String>,

    /// Start from the values in this YAML or JSON file
    #[arg(long)]
    pub draft: Option<PathBuf>,

    /// Directory for the submission record, or '-' for stdout
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Validate each field as soon as it is entered
    #[arg(long)]
    pub live: bool,
}

/// What the user picked after filling a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Back,
    Submit,
    Cancel,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Action::Next => "Next",
            Action::Back => "Back",
            Action::Submit => "Submit",
            Action::Cancel => "Cancel",
        }
    }
}

/// Navigation offered on a step: forward first, then back, then cancel
fn actions_for(first: bool, last: bool) -> Vec<Action> {
    let mut actions = vec![if last { Action::Submit } else { Action::Next }];
    if !first {
        actions.push(Action::Back);
    }
    actions.push(Action::Cancel);
    actions
}

pub fn run(args: FillArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let form = resolve_form(args.form.as_deref(), &config)?;
    let target = output_target(args.output.as_deref(), &config);
    let mode = if args.live {
        ValidationMode::Live
    } else {
        config.validation_mode()
    };

    let destination = describe_target(&target);
    let sink = RecordSink::new(form.definition.title(), &form.record_prefix, target);
    let mut wizard = match &args.draft {
        Some(path) => {
            let draft = load_values(path)?;
            WizardController::with_initial_values(form.definition, draft, sink)?
        }
        None => WizardController::new(form.definition, sink),
    }
    .with_mode(mode);

    tracing::debug!(form = %form.source, ?mode, "starting wizard");
    let theme = ColorfulTheme::default();

    println!();
    println!(
        "{} {}",
        style("◆").cyan(),
        style(wizard.definition().title()).bold()
    );
    if !global.quiet {
        println!("{}", style(format!("Submission goes to {}", destination)).dim());
    }

    loop {
        print_step_header(&wizard);
        prompt_step(&mut wizard, &theme)?;

        let actions = actions_for(wizard.is_first_step(), wizard.is_last_step());
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let choice = Select::with_theme(&theme)
            .with_prompt("Continue")
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;

        match actions[choice] {
            Action::Next => {
                if let AdvanceOutcome::Blocked(result) = wizard.advance() {
                    println!("{} Fix these fields to continue:", style("✗").red());
                    print_errors(wizard.definition(), &result);
                }
            }
            Action::Back => {
                wizard.back();
            }
            Action::Submit => match wizard.submit() {
                SubmitOutcome::Submitted | SubmitOutcome::AlreadySubmitted => {
                    if finish(&mut wizard, &theme, global)? {
                        return Ok(());
                    }
                }
                SubmitOutcome::Invalid(result) => {
                    println!("{} The form has invalid fields:", style("✗").red());
                    print_errors(wizard.definition(), &result);
                    if let Some(step) = wizard.first_invalid_step() {
                        while wizard.current_step_index() > step && wizard.back().moved() {}
                    }
                }
            },
            Action::Cancel => {
                if !global.quiet {
                    println!("{} Cancelled; nothing was saved", style("→").yellow());
                }
                return Ok(());
            }
        }
    }
}

/// Report the sink outcome; returns false when the user wants to retry
fn finish(
    wizard: &mut WizardController<RecordSink>,
    theme: &ColorfulTheme,
    global: &GlobalOpts,
) -> Result<bool> {
    let outcome = wizard.sink().last_outcome().cloned();
    match outcome {
        Some(Ok(path)) => {
            wizard.finish_submission();
            if !global.quiet {
                match path {
                    Some(path) => println!(
                        "{} Submitted {}",
                        style("✓").green(),
                        style(path.display()).cyan()
                    ),
                    None => println!("{} Submitted", style("✓").green()),
                }
            }
            Ok(true)
        }
        Some(Err(e)) => {
            println!("{} Could not save the submission: {}", style("✗").red(), e);
            let retry = Confirm::with_theme(theme)
                .with_prompt("Edit and try again?")
                .default(true)
                .interact()
                .into_diagnostic()?;
            if retry {
                wizard.reset_to_editing();
                Ok(false)
            } else {
                Err(miette::miette!("submission was not saved: {}", e))
            }
        }
        None => Err(miette::miette!("submission sink was not called")),
    }
}

fn print_step_header(wizard: &WizardController<RecordSink>) {
    println!();
    println!(
        "{} {}",
        style(format!("Step {}:", wizard.current_step_index() + 1)).bold(),
        wizard.step_title()
    );
    println!(
        "{}",
        style(progress_bar(
            wizard.progress(),
            wizard.current_step_index() + 1,
            wizard.step_count()
        ))
        .dim()
    );
}

/// Prompt every field of the current step, showing stored errors first
fn prompt_step(wizard: &mut WizardController<RecordSink>, theme: &ColorfulTheme) -> Result<()> {
    let names = wizard.active_fields().to_vec();
    for name in names {
        let Some(field) = wizard.definition().field(name.as_str()).cloned() else {
            continue;
        };
        if let Some(error) = wizard.visible_errors().error(name.as_str()) {
            println!("  {} {}", style("✗").red(), style(error).red());
        }

        let current = wizard.values().raw(name.as_str()).to_string();
        let value = prompt_field(&field, &current, theme)?;
        wizard.set_value(name.as_str(), value).into_diagnostic()?;

        if wizard.mode() == ValidationMode::Live {
            if let Some(error) = wizard.errors().error(name.as_str()) {
                println!("  {} {}", style("✗").red(), style(error).red());
            }
        }
    }
    Ok(())
}

fn prompt_field(field: &FieldSpec, current: &str, theme: &ColorfulTheme) -> Result<String> {
    let mut prompt = field.display_label().to_string();
    if field.is_required() {
        prompt.push_str(" *");
    }

    if field.kind() == FieldKind::EnumChoice {
        let mut items: Vec<String> = field
            .options()
            .iter()
            .map(|o| o.label.clone())
            .collect();
        if !field.is_required() {
            items.push("(none)".to_string());
        }
        let default = field
            .options()
            .iter()
            .position(|o| o.value == current)
            .unwrap_or(0);
        let selection = Select::with_theme(theme)
            .with_prompt(&prompt)
            .items(&items)
            .default(default)
            .interact()
            .into_diagnostic()?;
        return Ok(field
            .options()
            .get(selection)
            .map(|o| o.value.clone())
            .unwrap_or_default());
    }

    if let Some(hint) = field.placeholder_text() {
        prompt = format!("{} ({})", prompt, style(hint).dim());
    } else if field.kind() == FieldKind::Date {
        prompt = format!("{} ({})", prompt, style("YYYY-MM-DD").dim());
    }

    Input::<String>::with_theme(theme)
        .with_prompt(&prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()
}

/// Where a record will go, for the header line
fn describe_target(target: &RecordTarget) -> String {
    match target {
        RecordTarget::Stdout => "stdout".to_string(),
        RecordTarget::Dir(dir) => dir.display().to_string(),
    }
}
