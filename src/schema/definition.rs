//! Form definitions - the field schema and its partition into steps

use std::collections::HashMap;

use crate::core::values::FieldName;
use crate::schema::constraint::Rule;
use crate::schema::error::SchemaError;
use crate::schema::field::{FieldKind, FieldSpec};

/// One page of the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    index: usize,
    title: String,
    field_names: Vec<FieldName>,
}

impl StepDefinition {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Fields shown on this step, in display order
    pub fn field_names(&self) -> &[FieldName] {
        &self.field_names
    }
}

/// A validated schema plus step partition
///
/// Construction guarantees that field names are unique and well formed and
/// that every field belongs to exactly one step. Immutable once built.
#[derive(Debug, Clone)]
pub struct WizardDefinition {
    title: String,
    fields: Vec<FieldSpec>,
    names: Vec<FieldName>,
    lookup: HashMap<FieldName, usize>,
    steps: Vec<StepDefinition>,
}

/// Collects fields and steps before validation
#[derive(Debug, Default)]
pub struct DefinitionBuilder {
    title: Option<String>,
    fields: Vec<FieldSpec>,
    steps: Vec<(String, Vec<String>)>,
}

impl DefinitionBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Add the next step; steps are numbered in the order they are added
    pub fn step<I, S>(mut self, title: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps
            .push((title.into(), fields.into_iter().map(Into::into).collect()));
        self
    }

    pub fn build(self) -> Result<WizardDefinition, SchemaError> {
        WizardDefinition::new(
            self.title.unwrap_or_else(|| "Form".to_string()),
            self.fields,
            self.steps,
        )
    }
}

impl WizardDefinition {
    pub fn builder() -> DefinitionBuilder {
        DefinitionBuilder::default()
    }

    /// Validate fields and the step partition
    pub fn new(
        title: impl Into<String>,
        fields: Vec<FieldSpec>,
        steps: Vec<(String, Vec<String>)>,
    ) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::NoFields);
        }
        if steps.is_empty() {
            return Err(SchemaError::NoSteps);
        }

        let mut names = Vec::with_capacity(fields.len());
        let mut lookup = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            let name = FieldName::new(field.name())?;
            if lookup.insert(name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateField(name.to_string()));
            }
            check_field(field)?;
            names.push(name);
        }

        // Cross-field references need the complete name table
        for field in &fields {
            for constraint in field.constraints() {
                if let Rule::NotBeforeField(other) = constraint.rule() {
                    let target = lookup.get(other).map(|&i| &fields[i]);
                    let is_date = target.is_some_and(|t| t.kind() == FieldKind::Date);
                    if !is_date || other.as_str() == field.name() {
                        return Err(SchemaError::BadFieldReference {
                            field: field.name().to_string(),
                            other: other.to_string(),
                        });
                    }
                }
            }
        }

        let mut owner: HashMap<FieldName, usize> = HashMap::with_capacity(fields.len());
        let mut step_defs = Vec::with_capacity(steps.len());
        for (index, (title, step_fields)) in steps.into_iter().enumerate() {
            if step_fields.is_empty() {
                return Err(SchemaError::EmptyStep { step: index, title });
            }
            let mut field_names = Vec::with_capacity(step_fields.len());
            for raw in step_fields {
                let name = match FieldName::new(raw.as_str()) {
                    Ok(name) if lookup.contains_key(&name) => name,
                    _ => {
                        return Err(SchemaError::UnknownStepField {
                            step: index,
                            field: raw,
                        })
                    }
                };
                if let Some(first) = owner.insert(name.clone(), index) {
                    return Err(SchemaError::FieldInTwoSteps {
                        field: name.to_string(),
                        first,
                        second: index,
                    });
                }
                field_names.push(name);
            }
            step_defs.push(StepDefinition {
                index,
                title,
                field_names,
            });
        }

        if let Some(missing) = names.iter().find(|n| !owner.contains_key(*n)) {
            return Err(SchemaError::UnassignedField(missing.to_string()));
        }

        Ok(Self {
            title: title.into(),
            fields,
            names,
            lookup,
            steps: step_defs,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Every field name, in declaration order
    pub fn field_names(&self) -> &[FieldName] {
        &self.names
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.lookup.get(name).map(|&i| &self.fields[i])
    }

    /// The canonical [`FieldName`] for a string, if the form declares it
    pub fn field_name(&self, name: &str) -> Option<&FieldName> {
        self.lookup.get(name).map(|&i| &self.names[i])
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Index of the step that owns a field
    pub fn step_of(&self, name: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| s.field_names.iter().any(|n| n.as_str() == name))
    }
}

/// Per-field checks that need no other field
fn check_field(field: &FieldSpec) -> Result<(), SchemaError> {
    if let Some((pattern, reason)) = &field.bad_pattern {
        return Err(SchemaError::InvalidPattern {
            field: field.name().to_string(),
            pattern: pattern.clone(),
            reason: reason.clone(),
        });
    }

    match field.kind() {
        FieldKind::Pattern => {
            let has_pattern = field
                .constraints()
                .iter()
                .any(|c| matches!(c.rule(), Rule::Pattern(_)));
            if !has_pattern {
                return Err(SchemaError::MissingPattern(field.name().to_string()));
            }
        }
        FieldKind::EnumChoice if field.options().is_empty() => {
            return Err(SchemaError::MissingOptions(field.name().to_string()));
        }
        _ => {}
    }

    for constraint in field.constraints() {
        let rule = constraint.rule();
        let misplaced = (rule.is_numeric() && field.kind() != FieldKind::Numeric)
            || (rule.is_temporal() && field.kind() != FieldKind::Date);
        if misplaced {
            return Err(SchemaError::RuleKindMismatch {
                field: field.name().to_string(),
                rule: rule.name(),
                kind: field.kind().to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::values::FieldNameError;
    use crate::schema::field::ChoiceOption;
    use rust_decimal::Decimal;

    fn two_step() -> DefinitionBuilder {
        WizardDefinition::builder()
            .title("Invoice")
            .field(FieldSpec::text("clientName").min_length(3, "min length 3"))
            .field(FieldSpec::pattern(
                "cnpj",
                r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$",
                "invalid format",
            ))
            .field(FieldSpec::numeric("amount").required("required"))
    }

    #[test]
    fn test_valid_partition_builds() {
        let def = two_step()
            .step("Client", ["clientName", "cnpj"])
            .step("Amount", ["amount"])
            .build()
            .unwrap();

        assert_eq!(def.title(), "Invoice");
        assert_eq!(def.step_count(), 2);
        assert_eq!(def.step(0).unwrap().field_names().len(), 2);
        assert_eq!(def.step(1).unwrap().index(), 1);
        assert_eq!(def.step_of("amount"), Some(1));
        assert_eq!(def.field("cnpj").unwrap().kind(), FieldKind::Pattern);
        assert_eq!(def.field_name("amount").unwrap().as_str(), "amount");
        assert!(def.field("missing").is_none());
    }

    #[test]
    fn test_partition_union_equals_schema() {
        let def = two_step()
            .step("Client", ["clientName", "cnpj"])
            .step("Amount", ["amount"])
            .build()
            .unwrap();

        let mut assigned: Vec<&str> = def
            .steps()
            .iter()
            .flat_map(|s| s.field_names().iter().map(|n| n.as_str()))
            .collect();
        assigned.sort_unstable();
        let mut declared: Vec<&str> = def.field_names().iter().map(|n| n.as_str()).collect();
        declared.sort_unstable();
        assert_eq!(assigned, declared);
    }

    #[test]
    fn test_unassigned_field_fails() {
        let err = two_step()
            .step("Client", ["clientName", "cnpj"])
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::UnassignedField("amount".to_string()));
    }

    #[test]
    fn test_field_in_two_steps_fails() {
        let err = two_step()
            .step("Client", ["clientName", "cnpj"])
            .step("Amount", ["amount", "cnpj"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::FieldInTwoSteps {
                field: "cnpj".to_string(),
                first: 0,
                second: 1
            }
        );
    }

    #[test]
    fn test_unknown_step_field_fails() {
        let err = two_step()
            .step("Client", ["clientName", "cnpj"])
            .step("Amount", ["amount", "total"])
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownStepField { step: 1, .. }));
    }

    #[test]
    fn test_duplicate_field_fails() {
        let err = WizardDefinition::builder()
            .field(FieldSpec::text("a"))
            .field(FieldSpec::text("a"))
            .step("One", ["a"])
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField("a".to_string()));
    }

    #[test]
    fn test_invalid_name_fails() {
        let err = WizardDefinition::builder()
            .field(FieldSpec::text("client name"))
            .step("One", ["client name"])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidFieldName(FieldNameError::InvalidChar { .. })
        ));
    }

    #[test]
    fn test_empty_definitions_fail() {
        assert_eq!(
            WizardDefinition::builder().build().unwrap_err(),
            SchemaError::NoFields
        );
        assert_eq!(
            WizardDefinition::builder()
                .field(FieldSpec::text("a"))
                .build()
                .unwrap_err(),
            SchemaError::NoSteps
        );
        assert!(matches!(
            WizardDefinition::builder()
                .field(FieldSpec::text("a"))
                .step("One", ["a"])
                .step("Two", Vec::<String>::new())
                .build()
                .unwrap_err(),
            SchemaError::EmptyStep { step: 1, .. }
        ));
    }

    #[test]
    fn test_bad_pattern_reported_at_build() {
        let err = WizardDefinition::builder()
            .field(FieldSpec::pattern("code", "([", "bad"))
            .step("One", ["code"])
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn test_kind_specific_requirements() {
        let err = WizardDefinition::builder()
            .field(FieldSpec::new("code", FieldKind::Pattern))
            .step("One", ["code"])
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingPattern("code".to_string()));

        let err = WizardDefinition::builder()
            .field(FieldSpec::choice("kind", Vec::<ChoiceOption>::new()))
            .step("One", ["kind"])
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingOptions("kind".to_string()));
    }

    #[test]
    fn test_rule_kind_mismatch() {
        let err = WizardDefinition::builder()
            .field(FieldSpec::text("name").min(Decimal::ONE, "too small"))
            .step("One", ["name"])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::RuleKindMismatch { rule: "min", .. }
        ));
    }

    #[test]
    fn test_field_reference_must_be_date() {
        let issue = FieldName::new("issueDate").unwrap();
        let err = WizardDefinition::builder()
            .field(FieldSpec::text("issueDate"))
            .field(FieldSpec::date("dueDate").not_before_field(issue.clone(), "early"))
            .step("One", ["issueDate", "dueDate"])
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::BadFieldReference { .. }));

        let ok = WizardDefinition::builder()
            .field(FieldSpec::date("issueDate"))
            .field(FieldSpec::date("dueDate").not_before_field(issue, "early"))
            .step("One", ["issueDate", "dueDate"])
            .build();
        assert!(ok.is_ok());
    }
}
