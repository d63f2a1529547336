//! Invoice capture form: client, invoice data, then details

use rust_decimal::Decimal;

use crate::core::values::FieldName;
use crate::schema::{ChoiceOption, FieldSpec, SchemaError, WizardDefinition};

/// Prefix of invoice submission record ids (`INV-<ulid>`)
pub const RECORD_PREFIX: &str = "INV";

/// Brazilian company registry number, `NN.NNN.NNN/NNNN-NN`
pub const CNPJ_PATTERN: &str = r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$";

pub fn definition() -> Result<WizardDefinition, SchemaError> {
    let issue_date = FieldName::new("issueDate")?;

    WizardDefinition::builder()
        .title("Invoice")
        .field(
            FieldSpec::text("clientName")
                .label("Client name")
                .placeholder("Client legal name")
                .min_length(3, "Client name must be at least 3 characters"),
        )
        .field(
            FieldSpec::pattern("cnpj", CNPJ_PATTERN, "Invalid CNPJ")
                .label("CNPJ")
                .placeholder("00.000.000/0000-00"),
        )
        .field(
            FieldSpec::text("invoiceNumber")
                .label("Invoice number")
                .placeholder("000000")
                .min_length(1, "Invoice number is required"),
        )
        .field(
            FieldSpec::choice(
                "invoiceType",
                [
                    ChoiceOption::new("nfe", "NF-e"),
                    ChoiceOption::new("nfse", "NFS-e"),
                    ChoiceOption::new("nfce", "NFC-e"),
                ],
            )
            .label("Invoice type")
            .required("Invoice type is required"),
        )
        .field(
            FieldSpec::numeric("amount")
                .label("Total amount")
                .placeholder("0.00")
                .required("Amount is required")
                .min(Decimal::new(1, 2), "Amount must be greater than zero"),
        )
        .field(
            FieldSpec::text("description")
                .label("Description")
                .placeholder("Describe the items or services")
                .min_length(10, "Description must be at least 10 characters"),
        )
        .field(
            FieldSpec::date("issueDate")
                .label("Issue date")
                .required("Issue date is required"),
        )
        .field(
            FieldSpec::date("dueDate")
                .label("Due date")
                .required("Due date is required")
                .not_before_field(issue_date, "Due date cannot be before the issue date"),
        )
        .step("Client details", ["clientName", "cnpj"])
        .step("Invoice details", ["invoiceNumber", "invoiceType", "amount"])
        .step("Details", ["description", "issueDate", "dueDate"])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::values::FormValues;
    use crate::schema::{validate_all, DefinitionLoader};
    use crate::wizard::{SubmitOutcome, WizardController};

    const SAMPLE: &str = include_str!("../../forms/invoice.form.yaml");

    fn valid_values() -> FormValues {
        FormValues::from_pairs([
            ("clientName", "Acme Ltda"),
            ("cnpj", "12.345.678/0001-90"),
            ("invoiceNumber", "000123"),
            ("invoiceType", "nfse"),
            ("amount", "1500,50"),
            ("description", "Consulting services for March"),
            ("issueDate", "2024-03-01"),
            ("dueDate", "2024-03-31"),
        ])
        .unwrap()
    }

    #[test]
    fn test_structure() {
        let def = definition().unwrap();
        assert_eq!(def.title(), "Invoice");
        assert_eq!(def.step_count(), 3);
        assert_eq!(def.fields().len(), 8);
        assert_eq!(def.step_of("amount"), Some(1));
        assert_eq!(def.step_of("dueDate"), Some(2));
    }

    #[test]
    fn test_sample_file_matches_builtin() {
        let builtin = definition().unwrap();
        let loaded = DefinitionLoader::new()
            .unwrap()
            .parse(SAMPLE, "invoice.form.yaml")
            .unwrap();

        assert_eq!(loaded.title(), builtin.title());
        assert_eq!(loaded.field_names(), builtin.field_names());
        for (a, b) in loaded.steps().iter().zip(builtin.steps()) {
            assert_eq!(a.title(), b.title());
            assert_eq!(a.field_names(), b.field_names());
        }
        for (a, b) in loaded.fields().iter().zip(builtin.fields()) {
            assert_eq!(a.kind(), b.kind(), "{}", a.name());
            assert_eq!(a.display_label(), b.display_label());
            assert_eq!(a.placeholder_text(), b.placeholder_text());
            assert_eq!(a.options(), b.options());
            assert_eq!(a.rules_summary(), b.rules_summary());
            let messages = |f: &FieldSpec| {
                f.constraints()
                    .iter()
                    .map(|c| c.message().to_string())
                    .collect::<Vec<_>>()
            };
            assert_eq!(messages(a), messages(b));
        }
    }

    #[test]
    fn test_complete_invoice_is_valid() {
        let def = definition().unwrap();
        let result = validate_all(&def, &valid_values());
        assert!(result.is_valid(), "{:?}", result);
    }

    #[test]
    fn test_empty_invoice_errors() {
        let def = definition().unwrap();
        let result = validate_all(&def, &FormValues::new());
        assert_eq!(
            result.error("clientName"),
            Some("Client name must be at least 3 characters")
        );
        assert_eq!(result.error("cnpj"), Some("Invalid CNPJ"));
        assert_eq!(result.error("invoiceType"), Some("Invoice type is required"));
        assert_eq!(result.error("amount"), Some("Amount is required"));
        assert_eq!(result.error("issueDate"), Some("Issue date is required"));
    }

    #[test]
    fn test_amount_must_be_positive() {
        let def = definition().unwrap();
        let mut values = valid_values();
        values.set(FieldName::new("amount").unwrap(), "0");
        let result = validate_all(&def, &values);
        assert_eq!(
            result.error("amount"),
            Some("Amount must be greater than zero")
        );
    }

    #[test]
    fn test_due_date_before_issue_date() {
        let def = definition().unwrap();
        let mut values = valid_values();
        values.set(FieldName::new("dueDate").unwrap(), "2024-02-01");
        let result = validate_all(&def, &values);
        assert_eq!(
            result.error("dueDate"),
            Some("Due date cannot be before the issue date")
        );
    }

    #[test]
    fn test_full_walkthrough() {
        let mut submitted = None;
        let mut wizard = WizardController::new(definition().unwrap(), |v: &FormValues| {
            submitted = Some(v.clone())
        });
        for (name, raw) in valid_values().iter() {
            wizard.set_value(name.as_str(), raw).unwrap();
        }
        assert!(wizard.advance().moved());
        assert!(wizard.advance().moved());
        assert!(wizard.is_last_step());
        assert_eq!(wizard.submit(), SubmitOutcome::Submitted);
        drop(wizard);

        let values = submitted.unwrap();
        assert_eq!(values.raw("invoiceType"), "nfse");
    }
}
