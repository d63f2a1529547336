//! Shared helper functions for CLI commands
//!
//! Form resolution, value files and error rendering used by more than one
//! command.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use crate::core::values::FormValues;
use crate::core::Config;
use crate::forms;
use crate::schema::{load_definition, ValidationResult, WizardDefinition};
use crate::wizard::RecordTarget;

/// A form ready to drive, with where it came from
#[derive(Debug)]
pub struct ResolvedForm {
    pub definition: WizardDefinition,
    /// Prefix for submission record ids
    pub record_prefix: String,
    /// Built-in name or file path, for messages
    pub source: String,
}

/// Resolve `--form`, falling back to configuration and then the built-in form
///
/// The argument is a built-in form name (`invoice`) or a path to a
/// definition file.
pub fn resolve_form(arg: Option<&str>, config: &Config) -> Result<ResolvedForm> {
    let chosen = arg
        .map(str::to_string)
        .or_else(|| config.default_form.as_ref().map(|p| p.display().to_string()));

    let Some(chosen) = chosen else {
        let form = forms::default_form();
        return Ok(ResolvedForm {
            definition: (form.build)()?,
            record_prefix: form.record_prefix.to_string(),
            source: form.name.to_string(),
        });
    };

    if let Some(form) = forms::builtin(&chosen) {
        return Ok(ResolvedForm {
            definition: (form.build)()?,
            record_prefix: form.record_prefix.to_string(),
            source: form.name.to_string(),
        });
    }

    let definition = load_definition(Path::new(&chosen))?;
    let record_prefix = record_prefix_for(definition.title());
    Ok(ResolvedForm {
        definition,
        record_prefix,
        source: chosen,
    })
}

/// Record id prefix derived from a form title: `Invoice` -> `INV`
pub fn record_prefix_for(title: &str) -> String {
    let prefix: String = title
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase();
    if prefix.is_empty() {
        "REC".to_string()
    } else {
        prefix
    }
}

/// Read a value map from a YAML or JSON file
pub fn load_values(path: &Path) -> Result<FormValues> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Cannot read {}: {}", path.display(), e))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let doc: JsonValue = if is_json {
        serde_json::from_str(&content).into_diagnostic()?
    } else {
        let yaml: serde_yml::Value = serde_yml::from_str(&content).into_diagnostic()?;
        serde_json::to_value(yaml).into_diagnostic()?
    };

    FormValues::from_document(&doc)
        .map_err(|e| miette::miette!("{}: {}", path.display(), e))
}

/// Output location: `-` means stdout, otherwise a directory
pub fn output_target(arg: Option<&str>, config: &Config) -> RecordTarget {
    match arg {
        Some("-") => RecordTarget::Stdout,
        Some(dir) => RecordTarget::Dir(PathBuf::from(dir)),
        None => RecordTarget::Dir(config.output_dir()),
    }
}

/// Print invalid fields of a result, labelled from the definition
pub fn print_errors(definition: &WizardDefinition, result: &ValidationResult) {
    for (name, message) in result.errors() {
        let label = definition
            .field(name.as_str())
            .map(|f| f.display_label())
            .unwrap_or(name.as_str());
        println!(
            "    {} {}: {}",
            style("✗").red(),
            style(label).bold(),
            message
        );
    }
}

/// Text progress bar, e.g. `[####------] 2/5`
pub fn progress_bar(progress: f64, step: usize, total: usize) -> String {
    const WIDTH: usize = 20;
    let filled = ((progress.clamp(0.0, 1.0)) * WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {}/{}",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        step,
        total
    )
}
