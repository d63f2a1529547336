//! Form definition files with detailed error reporting
//!
//! A definition file is YAML. It is checked against the embedded
//! `form.schema.json` first so that structural mistakes point at the
//! offending key, then deserialized and built into a [`WizardDefinition`],
//! which enforces the step-partition rules.

use chrono::NaiveDate;
use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::Path;
use thiserror::Error;

use crate::core::values::FieldName;
use crate::schema::definition::WizardDefinition;
use crate::schema::error::SchemaError;
use crate::schema::field::{ChoiceOption, FieldKind, FieldSpec};

/// JSON Schema for definition files, embedded at compile time
pub const FORM_SCHEMA: &str = include_str!("../../schemas/form.schema.json");

/// Structural problems in a definition file, with source locations
#[derive(Debug, Error, Diagnostic)]
#[error("Form definition is invalid: {summary}")]
#[diagnostic(code(stepform::definition::invalid))]
pub struct DefinitionDiagnostic {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<DefinitionViolation>,
}

/// A single located problem
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct DefinitionViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl DefinitionViolation {
    pub fn new(message: String, hint: String, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            span,
            message,
            hint,
            help,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl DefinitionDiagnostic {
    pub fn new(filename: &str, source: &str, violations: Vec<DefinitionViolation>) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[DefinitionViolation] {
        &self.violations
    }
}

/// Anything that stops a definition file from becoming a wizard
#[derive(Debug, Error, Diagnostic)]
pub enum DefinitionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] DefinitionDiagnostic),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to read form definition {path}: {source}")]
    #[diagnostic(code(stepform::definition::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Embedded form schema failed to compile: {0}")]
    #[diagnostic(code(stepform::definition::embedded_schema))]
    EmbeddedSchema(String),
}

#[derive(Debug, Deserialize)]
struct FormFile {
    #[serde(default)]
    title: Option<String>,
    fields: Vec<FieldFile>,
    steps: Vec<StepFile>,
}

#[derive(Debug, Deserialize)]
struct FieldFile {
    name: String,
    kind: FieldKind,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    options: Vec<ChoiceOption>,
    #[serde(default)]
    constraints: Vec<ConstraintFile>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
enum ConstraintFile {
    Required { message: String },
    MinLength { value: usize, message: String },
    MaxLength { value: usize, message: String },
    Pattern { value: String, message: String },
    OneOf { value: Vec<String>, message: String },
    Min { value: Decimal, message: String },
    Max { value: Decimal, message: String },
    NotBefore { value: NaiveDate, message: String },
    NotBeforeField { value: String, message: String },
}

#[derive(Debug, Deserialize)]
struct StepFile {
    title: String,
    fields: Vec<String>,
}

impl FieldFile {
    fn into_spec(self) -> Result<FieldSpec, SchemaError> {
        let mut spec = match self.kind {
            FieldKind::EnumChoice => FieldSpec::choice(self.name, self.options),
            kind => {
                if !self.options.is_empty() {
                    tracing::warn!(field = %self.name, %kind, "options ignored on non-choice field");
                }
                FieldSpec::new(self.name, kind)
            }
        };
        if let Some(label) = self.label {
            spec = spec.label(label);
        }
        if let Some(placeholder) = self.placeholder {
            spec = spec.placeholder(placeholder);
        }
        if let Some(default) = self.default {
            spec = spec.default_value(default);
        }
        for constraint in self.constraints {
            spec = match constraint {
                ConstraintFile::Required { message } => spec.required(message),
                ConstraintFile::MinLength { value, message } => spec.min_length(value, message),
                ConstraintFile::MaxLength { value, message } => spec.max_length(value, message),
                ConstraintFile::Pattern { value, message } => spec.matches(&value, message),
                ConstraintFile::OneOf { value, message } => {
                    spec.constraint(crate::schema::Constraint::one_of(value, message))
                }
                ConstraintFile::Min { value, message } => spec.min(value, message),
                ConstraintFile::Max { value, message } => spec.max(value, message),
                ConstraintFile::NotBefore { value, message } => spec.not_before(value, message),
                ConstraintFile::NotBeforeField { value, message } => {
                    spec.not_before_field(FieldName::new(value)?, message)
                }
            };
        }
        Ok(spec)
    }
}

/// Parses and validates form definition files
pub struct DefinitionLoader {
    schema: JsonValidator,
}

impl DefinitionLoader {
    /// Compile the embedded definition schema
    pub fn new() -> Result<Self, DefinitionError> {
        let schema_json: JsonValue = serde_json::from_str(FORM_SCHEMA)
            .map_err(|e| DefinitionError::EmbeddedSchema(e.to_string()))?;
        let schema = validator_for(&schema_json)
            .map_err(|e| DefinitionError::EmbeddedSchema(e.to_string()))?;
        Ok(Self { schema })
    }

    /// Read and build a definition from disk
    pub fn load(&self, path: &Path) -> Result<WizardDefinition, DefinitionError> {
        let content = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let filename = path.file_name().unwrap_or_default().to_string_lossy();
        self.parse(&content, &filename)
    }

    /// Build a definition from YAML text
    pub fn parse(&self, content: &str, filename: &str) -> Result<WizardDefinition, DefinitionError> {
        let yaml_value: serde_yml::Value = match serde_yml::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                let span = find_error_span(content, e.location());
                let violation = DefinitionViolation::new(
                    format!("YAML parse error: {}", e),
                    "invalid YAML".to_string(),
                    span,
                    Some("Check YAML syntax - proper indentation, colons, quotes".to_string()),
                );
                return Err(DefinitionDiagnostic::new(filename, content, vec![violation]).into());
            }
        };

        let json_value: JsonValue = match serde_json::to_value(&yaml_value) {
            Ok(v) => v,
            Err(e) => {
                let violation = DefinitionViolation::new(
                    format!("Failed to convert YAML to JSON: {}", e),
                    "conversion error".to_string(),
                    (0, content.len()).into(),
                    None,
                );
                return Err(DefinitionDiagnostic::new(filename, content, vec![violation]).into());
            }
        };

        let violations: Vec<DefinitionViolation> = self
            .schema
            .iter_errors(&json_value)
            .map(|e| error_to_violation(content, &e))
            .collect();
        if !violations.is_empty() {
            return Err(DefinitionDiagnostic::new(filename, content, violations).into());
        }

        let form: FormFile = match serde_json::from_value(json_value) {
            Ok(form) => form,
            Err(e) => {
                let violation = DefinitionViolation::new(
                    format!("Invalid value: {}", e),
                    "invalid value".to_string(),
                    first_line_span(content),
                    Some("Check constraint values: dates are YYYY-MM-DD, limits are numbers".to_string()),
                );
                return Err(DefinitionDiagnostic::new(filename, content, vec![violation]).into());
            }
        };

        let fields = form
            .fields
            .into_iter()
            .map(FieldFile::into_spec)
            .collect::<Result<Vec<_>, _>>()?;
        let steps = form
            .steps
            .into_iter()
            .map(|s| (s.title, s.fields))
            .collect();
        let title = form
            .title
            .unwrap_or_else(|| filename.trim_end_matches(".yaml").to_string());

        let definition = WizardDefinition::new(title, fields, steps)?;
        tracing::debug!(
            file = filename,
            fields = definition.fields().len(),
            steps = definition.step_count(),
            "loaded form definition"
        );
        Ok(definition)
    }
}

/// Load a definition file with a freshly compiled loader
pub fn load_definition(path: &Path) -> Result<WizardDefinition, DefinitionError> {
    DefinitionLoader::new()?.load(path)
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(content: &str, error: &JsonSchemaError) -> DefinitionViolation {
    let path = error.instance_path.to_string();
    let message = format_schema_error(error);
    let hint = format_error_hint(error);
    let help = generate_help_message(error);
    let span = find_path_span(content, &path);

    DefinitionViolation::new(message, hint, span, help)
}

/// Format a JSON Schema error into a user-friendly message
fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", error.instance_path)
    };

    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("Missing required key: {} at {}", prop_str, path)
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        jsonschema::error::ValidationErrorKind::Enum { options } => {
            format!(
                "Invalid value at {}: must be one of: {}",
                path,
                format_enum_options(options)
            )
        }
        jsonschema::error::ValidationErrorKind::Pattern { pattern } => {
            format!("Value at {} doesn't match pattern: {}", path, pattern)
        }
        jsonschema::error::ValidationErrorKind::MinLength { limit } => {
            format!("Value at {} is too short: minimum {} characters", path, limit)
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown key(s) at {}: {}", path, unexpected.join(", "))
        }
        _ => format!("Validation error at {}: {}", path, error),
    }
}

fn format_enum_options(options: &JsonValue) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

/// Short hint for the error label
fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { .. } => "required key missing",
        jsonschema::error::ValidationErrorKind::Type { .. } => "wrong type",
        jsonschema::error::ValidationErrorKind::Enum { .. } => "invalid value",
        jsonschema::error::ValidationErrorKind::Pattern { .. } => "pattern mismatch",
        jsonschema::error::ValidationErrorKind::MinLength { .. } => "too short",
        jsonschema::error::ValidationErrorKind::AdditionalProperties { .. } => "unknown key",
        _ => "validation error",
    }
    .to_string()
}

fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Some(format!("Add the '{}' key", prop_str))
        }
        jsonschema::error::ValidationErrorKind::Enum { options } => {
            Some(format!("Valid values: {}", format_enum_options(options)))
        }
        jsonschema::error::ValidationErrorKind::Pattern { pattern } => {
            if pattern.contains("A-Za-z") {
                Some("Field names start with a letter and use letters, digits, '_' or '-'".to_string())
            } else {
                None
            }
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
            if unexpected.len() == 1 {
                Some(format!("Remove the '{}' key or check spelling", unexpected[0]))
            } else {
                Some("Remove unknown keys or check spelling".to_string())
            }
        }
        _ => None,
    }
}

fn first_line_span(content: &str) -> SourceSpan {
    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len).into()
}

/// Find the span (byte offset, length) for a YAML parser location
fn find_error_span(content: &str, location: Option<serde_yml::Location>) -> SourceSpan {
    let Some(loc) = location else {
        return first_line_span(content);
    };
    let offset = span_offset_for(content, loc.line(), loc.column());
    let rest = &content[offset..];
    let len = rest.find('\n').unwrap_or(rest.len()).max(1);
    (offset, len).into()
}

/// Byte offset of a 1-based line and character column, on a char boundary
fn span_offset_for(content: &str, line: usize, column: usize) -> usize {
    let line = line.saturating_sub(1);
    let column = column.saturating_sub(1);

    // Columns count characters; offsets are bytes
    let mut offset = 0;
    for (i, line_content) in content.split_inclusive('\n').enumerate() {
        if i == line {
            offset += line_content
                .char_indices()
                .nth(column)
                .map_or(line_content.len(), |(byte, _)| byte);
            break;
        }
        offset += line_content.len();
    }

    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Find the span for a JSON pointer (e.g. `/fields/2/kind`) in YAML content
fn find_path_span(content: &str, json_path: &str) -> SourceSpan {
    let parts: Vec<&str> = json_path.split('/').filter(|s| !s.is_empty()).collect();

    let Some(search_key) = parts.last() else {
        return first_line_span(content);
    };

    // Array index: point at the parent key instead
    if search_key.parse::<usize>().is_ok() && parts.len() >= 2 {
        if let Some(span) = find_key_span(content, parts[parts.len() - 2]) {
            return span;
        }
    }

    find_key_span(content, search_key).unwrap_or_else(|| first_line_span(content))
}

/// Find the first line whose key (ignoring indentation and list dashes) is `key`
fn find_key_span(content: &str, key: &str) -> Option<SourceSpan> {
    let search_pattern = format!("{}:", key);

    let mut offset = 0;
    for raw in content.split_inclusive('\n') {
        let line = raw.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start().trim_start_matches("- ");
        if trimmed.starts_with(&search_pattern) {
            let key_start = offset + (line.len() - trimmed.len());
            return Some((key_start, trimmed.len()).into());
        }
        offset += raw.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVOICE_YAML: &str = include_str!("../../forms/invoice.form.yaml");

    fn loader() -> DefinitionLoader {
        DefinitionLoader::new().unwrap()
    }

    #[test]
    fn test_embedded_schema_compiles() {
        assert!(DefinitionLoader::new().is_ok());
    }

    #[test]
    fn test_sample_invoice_definition_loads() {
        let def = loader().parse(INVOICE_YAML, "invoice.form.yaml").unwrap();
        assert_eq!(def.title(), "Invoice");
        assert_eq!(def.step_count(), 3);
        assert_eq!(def.fields().len(), 8);
        assert_eq!(def.field("invoiceType").unwrap().options().len(), 3);
        assert_eq!(def.field("cnpj").unwrap().kind(), FieldKind::Pattern);
    }

    #[test]
    fn test_minimal_definition() {
        let yaml = r#"
fields:
  - name: clientName
    kind: text
steps:
  - title: Only
    fields: [clientName]
"#;
        let def = loader().parse(yaml, "minimal.yaml").unwrap();
        assert_eq!(def.title(), "minimal");
        assert_eq!(def.step_count(), 1);
    }

    #[test]
    fn test_yaml_syntax_error_is_located() {
        let yaml = "fields: [\n  - broken";
        let err = loader().parse(yaml, "bad.yaml").unwrap_err();
        match err {
            DefinitionError::Invalid(diag) => {
                assert_eq!(diag.violation_count(), 1);
                assert!(diag.violations()[0].message().contains("YAML parse error"));
            }
            other => panic!("expected diagnostic, got {:?}", other),
        }
    }

    #[test]
    fn test_yaml_error_after_multibyte_text() {
        let yaml = "title: ããã: x\nfields: []\n";
        let err = loader().parse(yaml, "bad.yaml").unwrap_err();
        let DefinitionError::Invalid(diag) = err else {
            panic!("expected diagnostic");
        };
        assert_eq!(diag.violation_count(), 1);
    }

    #[test]
    fn test_yaml_error_span_with_crlf_lines() {
        let yaml = "title: Descrição\r\nfields: []\r\nsteps: ããã: x\r\n";
        let err = loader().parse(yaml, "bad.yaml").unwrap_err();
        assert!(matches!(err, DefinitionError::Invalid(_)));
    }

    #[test]
    fn test_error_span_counts_characters_and_line_endings() {
        let content = "title: ãã\r\nsteps: ã: x\r\n";
        let span = find_error_span(content, None);
        assert_eq!(span.offset(), 0);

        // Line 2, column 9 is the ':' after a two-byte char
        let offset = span_offset_for(content, 2, 9);
        assert_eq!(&content[offset..offset + 1], ":");
        assert!(content.is_char_boundary(offset));
    }

    #[test]
    fn test_key_span_with_crlf_lines() {
        let content = "title: Descrição\r\nfields:\r\n  - kind: password\r\n";
        let span = find_key_span(content, "kind").unwrap();
        assert_eq!(
            &content[span.offset()..span.offset() + span.len()],
            "kind: password"
        );
    }

    #[test]
    fn test_unknown_kind_rejected_by_schema() {
        let yaml = r#"
fields:
  - name: clientName
    kind: password
steps:
  - title: Only
    fields: [clientName]
"#;
        let err = loader().parse(yaml, "bad.yaml").unwrap_err();
        let DefinitionError::Invalid(diag) = err else {
            panic!("expected schema diagnostic");
        };
        assert!(diag
            .violations()
            .iter()
            .any(|v| v.message().contains("must be one of")));
    }

    #[test]
    fn test_unknown_key_rejected_by_schema() {
        let yaml = r#"
fields:
  - name: clientName
    kind: text
    colour: red
steps:
  - title: Only
    fields: [clientName]
"#;
        let err = loader().parse(yaml, "bad.yaml").unwrap_err();
        assert!(matches!(err, DefinitionError::Invalid(_)));
    }

    #[test]
    fn test_partition_violation_surfaces_schema_error() {
        let yaml = r#"
fields:
  - name: clientName
    kind: text
  - name: amount
    kind: numeric
steps:
  - title: Only
    fields: [clientName]
"#;
        let err = loader().parse(yaml, "bad.yaml").unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::Schema(SchemaError::UnassignedField(ref f)) if f == "amount"
        ));
    }

    #[test]
    fn test_bad_constraint_value_is_reported() {
        let yaml = r#"
fields:
  - name: issueDate
    kind: date
    constraints:
      - rule: not_before
        value: yesterday
        message: too early
steps:
  - title: Only
    fields: [issueDate]
"#;
        let err = loader().parse(yaml, "bad.yaml").unwrap_err();
        assert!(matches!(err, DefinitionError::Invalid(_)));
    }

    #[test]
    fn test_find_key_span() {
        let content = "title: Invoice\nfields:\n  - name: cnpj\n";
        let span = find_key_span(content, "name").unwrap();
        assert_eq!(span.offset(), 27);
        assert!(find_key_span(content, "missing").is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let err = loader()
            .load(Path::new("/nonexistent/form.yaml"))
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Io { .. }));
    }
}
