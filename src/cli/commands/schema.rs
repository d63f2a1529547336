//! Form definition introspection
//!
//! `schema show` lists a form's steps and fields with their rules;
//! `schema check` validates a definition file without running it.

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::resolve_form;
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::schema::loader::FORM_SCHEMA;
use crate::schema::{load_definition, FieldKind, WizardDefinition};

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Show the steps and fields of a form
    Show(ShowArgs),

    /// Check a form definition file for mistakes
    Check(CheckDefinitionArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Built-in form name or definition file (default: invoice)
    #[arg(long, short = 'F')]
    pub form: Option<String>,

    /// Print the JSON Schema that definition files must follow
    #[arg(long)]
    pub raw: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckDefinitionArgs {
    /// Definition file to check
    pub file: PathBuf,
}

pub fn run(cmd: SchemaCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SchemaCommands::Show(args) => show(args),
        SchemaCommands::Check(args) => check(args, global),
    }
}

fn show(args: ShowArgs) -> Result<()> {
    if args.raw {
        println!("{}", FORM_SCHEMA);
        return Ok(());
    }

    let config = Config::load();
    let form = resolve_form(args.form.as_deref(), &config)?;
    print!("{}", render_definition(&form.definition));
    Ok(())
}

fn check(args: CheckDefinitionArgs, global: &GlobalOpts) -> Result<()> {
    let definition = load_definition(&args.file)?;
    if !global.quiet {
        println!(
            "{} {} ({} fields in {} steps)",
            style("✓").green(),
            args.file.display(),
            definition.fields().len(),
            definition.step_count()
        );
    }
    Ok(())
}

/// Title, a markdown table of steps and fields, then choice lists
pub fn render_definition(definition: &WizardDefinition) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", definition.title()));
    output.push_str(&format!("{}\n\n", "=".repeat(definition.title().chars().count())));

    let mut builder = Builder::default();
    builder.push_record(["STEP", "FIELD", "LABEL", "KIND", "RULES"]);
    for step in definition.steps() {
        for name in step.field_names() {
            let Some(field) = definition.field(name.as_str()) else {
                continue;
            };
            builder.push_record([
                format!("{}. {}", step.index() + 1, step.title()),
                name.to_string(),
                field.display_label().to_string(),
                field.kind().to_string(),
                field.rules_summary(),
            ]);
        }
    }
    output.push_str(&builder.build().with(Style::markdown()).to_string());
    output.push('\n');

    let choices: Vec<_> = definition
        .fields()
        .iter()
        .filter(|f| f.kind() == FieldKind::EnumChoice)
        .collect();
    if !choices.is_empty() {
        output.push_str("\nChoices:\n");
        for field in choices {
            let options: Vec<String> = field
                .options()
                .iter()
                .map(|o| format!("{} ({})", o.value, o.label))
                .collect();
            output.push_str(&format!("  {}: {}\n", field.name(), options.join(", ")));
        }
    }
    output
}
