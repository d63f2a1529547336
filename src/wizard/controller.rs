//! Wizard controller - step navigation gated by step-scoped validation
//!
//! The controller is the single owner of a wizard session. Hosts feed it
//! value updates and navigation requests and render its read-only
//! projections; nothing else mutates the stored errors or the step index.
//!
//! ```text
//!   Editing(0) --advance--> Editing(1) --advance--> ... Editing(last)
//!        ^                      |                           |
//!        +--------back----------+                        submit
//!                                                           v
//!                                      reset_to_editing <- Submitted
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::values::{FieldName, FormValues};
use crate::schema::constraint::Rule;
use crate::schema::definition::{StepDefinition, WizardDefinition};
use crate::schema::error::SchemaError;
use crate::schema::validator::{self, ValidationResult};
use crate::wizard::sink::SubmissionSink;

/// Where the wizard is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "step", rename_all = "snake_case")]
pub enum Phase {
    /// Collecting input on the given step
    Editing(usize),
    /// Values were accepted and handed to the sink
    Submitted,
}

/// When field values are validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Only on advance and submit
    #[default]
    OnNavigation,
    /// Also re-validate a field whenever its value is set
    Live,
}

impl std::str::FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "on_navigation" | "navigation" => Ok(ValidationMode::OnNavigation),
            "live" => Ok(ValidationMode::Live),
            _ => Err(format!("Unknown validation mode: {}", s)),
        }
    }
}

/// Errors from value updates
///
/// Navigation never fails; these cover host mistakes only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("form has no field named '{0}'")]
    UnknownField(String),

    #[error("wizard was already submitted; reset it to edit values")]
    AlreadySubmitted,
}

/// Result of [`WizardController::advance`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Step fields were valid and the wizard moved forward
    Moved { from: usize, to: usize },
    /// Some step field is invalid; the result covers the whole step
    Blocked(ValidationResult),
    /// Already on the last step; only submit can leave it
    AtLastStep,
    /// The wizard is not editing
    NotEditing,
}

impl AdvanceOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, AdvanceOutcome::Moved { .. })
    }
}

/// Result of [`WizardController::back`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    Moved { from: usize, to: usize },
    AtFirstStep,
    NotEditing,
}

impl BackOutcome {
    pub fn moved(&self) -> bool {
        matches!(self, BackOutcome::Moved { .. })
    }
}

/// Result of [`WizardController::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every field was valid; the sink received the values
    Submitted,
    /// Some field somewhere is invalid; the result covers every field
    Invalid(ValidationResult),
    /// Submission already happened; the sink was not called again
    AlreadySubmitted,
}

impl SubmitOutcome {
    pub fn submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted)
    }
}

/// Mutable session state, owned by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardState {
    pub phase: Phase,
    pub values: FormValues,
    pub errors: ValidationResult,
    pub submitting: bool,
}

/// A serializable view of the controller for host rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardSnapshot {
    pub step_index: usize,
    pub step_count: usize,
    pub title: String,
    pub fields: Vec<FieldName>,
    pub errors: ValidationResult,
    pub progress: f64,
    pub submitted: bool,
    pub submitting: bool,
}

/// Drives one wizard session from the first step to submission
pub struct WizardController<S> {
    definition: WizardDefinition,
    state: WizardState,
    mode: ValidationMode,
    sink: S,
}

impl<S: SubmissionSink> WizardController<S> {
    /// Start a session with every field at its declared default
    pub fn new(definition: WizardDefinition, sink: S) -> Self {
        let values = default_values(&definition);
        Self {
            definition,
            state: WizardState {
                phase: Phase::Editing(0),
                values,
                errors: ValidationResult::new(),
                submitting: false,
            },
            mode: ValidationMode::default(),
            sink,
        }
    }

    /// Start a session pre-populated from a draft
    ///
    /// Fields absent from `initial` keep their defaults. A name the form does
    /// not declare is a construction error.
    pub fn with_initial_values(
        definition: WizardDefinition,
        initial: FormValues,
        sink: S,
    ) -> Result<Self, SchemaError> {
        if let Some((unknown, _)) = initial
            .iter()
            .find(|(name, _)| definition.field(name.as_str()).is_none())
        {
            return Err(SchemaError::UnknownInitialValue(unknown.to_string()));
        }
        let mut controller = Self::new(definition, sink);
        for (name, raw) in initial.iter() {
            controller.state.values.set(name.clone(), raw);
        }
        Ok(controller)
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Store a raw value for a field
    ///
    /// In [`ValidationMode::Live`] the field is re-validated immediately.
    pub fn set_value(&mut self, name: &str, raw: impl Into<String>) -> Result<(), WizardError> {
        if self.state.phase == Phase::Submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        let field = self
            .definition
            .field_name(name)
            .cloned()
            .ok_or_else(|| WizardError::UnknownField(name.to_string()))?;
        self.state.values.set(field.clone(), raw);

        if self.mode == ValidationMode::Live {
            let mut subset = vec![field.clone()];
            subset.extend(self.dependents_of(&field));
            let result = validator::validate(&self.definition, &self.state.values, &subset);
            self.state.errors.merge(&result);
        }
        Ok(())
    }

    /// Already-evaluated fields whose date rule compares against `field`
    fn dependents_of(&self, field: &FieldName) -> Vec<FieldName> {
        self.definition
            .fields()
            .iter()
            .zip(self.definition.field_names())
            .filter(|(spec, name)| {
                self.state.errors.contains(name.as_str())
                    && spec
                        .constraints()
                        .iter()
                        .any(|c| matches!(c.rule(), Rule::NotBeforeField(other) if other == field))
            })
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Validate the current step and move forward when it is valid
    pub fn advance(&mut self) -> AdvanceOutcome {
        let Phase::Editing(current) = self.state.phase else {
            tracing::debug!("advance ignored: wizard already submitted");
            return AdvanceOutcome::NotEditing;
        };
        if current + 1 >= self.definition.step_count() {
            tracing::debug!(step = current, "advance ignored: already on last step");
            return AdvanceOutcome::AtLastStep;
        }

        let result = self.validate_step(current);
        self.state.errors.merge(&result);
        if !result.is_valid() {
            tracing::debug!(
                step = current,
                errors = result.error_count(),
                "advance blocked by invalid fields"
            );
            return AdvanceOutcome::Blocked(result);
        }

        let next = current + 1;
        self.state.phase = Phase::Editing(next);
        tracing::info!(from = current, to = next, "advanced to next step");
        AdvanceOutcome::Moved {
            from: current,
            to: next,
        }
    }

    /// Move to the previous step without validating
    pub fn back(&mut self) -> BackOutcome {
        match self.state.phase {
            Phase::Submitted => {
                tracing::debug!("back ignored: wizard already submitted");
                BackOutcome::NotEditing
            }
            Phase::Editing(0) => {
                tracing::debug!("back ignored: already on first step");
                BackOutcome::AtFirstStep
            }
            Phase::Editing(current) => {
                let prev = current - 1;
                self.state.phase = Phase::Editing(prev);
                tracing::info!(from = current, to = prev, "returned to previous step");
                BackOutcome::Moved {
                    from: current,
                    to: prev,
                }
            }
        }
    }

    /// Validate every field and hand the values to the sink when all pass
    ///
    /// The wizard is `Submitted` before the sink runs; a failing sink does
    /// not bring it back to editing (see [`reset_to_editing`](Self::reset_to_editing)).
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.state.phase == Phase::Submitted {
            tracing::debug!("submit ignored: already submitted");
            return SubmitOutcome::AlreadySubmitted;
        }

        let result = validator::validate_all(&self.definition, &self.state.values);
        self.state.errors.merge(&result);
        if !result.is_valid() {
            tracing::debug!(errors = result.error_count(), "submit blocked by invalid fields");
            return SubmitOutcome::Invalid(result);
        }

        self.state.phase = Phase::Submitted;
        self.state.submitting = true;
        tracing::info!(form = self.definition.title(), "wizard submitted");
        let snapshot = self.state.values.clone();
        self.sink.submit(&snapshot);
        SubmitOutcome::Submitted
    }

    /// Host acknowledgement that the sink finished its work
    pub fn finish_submission(&mut self) {
        self.state.submitting = false;
    }

    /// Reopen a submitted wizard on its last step, e.g. after the sink failed
    ///
    /// Values and stored errors are kept; the next successful submit calls
    /// the sink again. Returns false when the wizard was not submitted.
    pub fn reset_to_editing(&mut self) -> bool {
        if self.state.phase != Phase::Submitted {
            return false;
        }
        let last = self.last_step_index();
        self.state.phase = Phase::Editing(last);
        self.state.submitting = false;
        tracing::info!(step = last, "wizard reopened for editing");
        true
    }

    fn validate_step(&self, index: usize) -> ValidationResult {
        let fields = self
            .definition
            .step(index)
            .map(StepDefinition::field_names)
            .unwrap_or_default();
        validator::validate(&self.definition, &self.state.values, fields)
    }

    fn last_step_index(&self) -> usize {
        self.definition.step_count() - 1
    }
}

impl<S> WizardController<S> {
    pub fn definition(&self) -> &WizardDefinition {
        &self.definition
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn values(&self) -> &FormValues {
        &self.state.values
    }

    /// Every stored validation outcome, across all steps validated so far
    pub fn errors(&self) -> &ValidationResult {
        &self.state.errors
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Step index shown to the user; the last step once submitted
    pub fn current_step_index(&self) -> usize {
        match self.state.phase {
            Phase::Editing(i) => i,
            Phase::Submitted => self.definition.step_count() - 1,
        }
    }

    pub fn current_step(&self) -> &StepDefinition {
        &self.definition.steps()[self.current_step_index()]
    }

    pub fn step_title(&self) -> &str {
        self.current_step().title()
    }

    pub fn step_count(&self) -> usize {
        self.definition.step_count()
    }

    /// Field names of the active step, in display order
    pub fn active_fields(&self) -> &[FieldName] {
        self.current_step().field_names()
    }

    /// Stored outcomes for the active step's fields only
    pub fn visible_errors(&self) -> ValidationResult {
        self.state.errors.restricted_to(self.active_fields())
    }

    /// Fraction of steps reached: `(current + 1) / step_count`
    pub fn progress(&self) -> f64 {
        (self.current_step_index() + 1) as f64 / self.definition.step_count() as f64
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step_index() == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step_index() + 1 == self.definition.step_count()
    }

    pub fn is_submitted(&self) -> bool {
        self.state.phase == Phase::Submitted
    }

    pub fn is_submitting(&self) -> bool {
        self.state.submitting
    }

    /// Earliest step holding a stored error
    pub fn first_invalid_step(&self) -> Option<usize> {
        self.definition.steps().iter().position(|step| {
            step.field_names()
                .iter()
                .any(|name| self.state.errors.error(name.as_str()).is_some())
        })
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            step_index: self.current_step_index(),
            step_count: self.step_count(),
            title: self.step_title().to_string(),
            fields: self.active_fields().to_vec(),
            errors: self.visible_errors(),
            progress: self.progress(),
            submitted: self.is_submitted(),
            submitting: self.is_submitting(),
        }
    }

    /// Give up the controller, keeping the values and the sink
    pub fn into_parts(self) -> (FormValues, S) {
        (self.state.values, self.sink)
    }
}

fn default_values(definition: &WizardDefinition) -> FormValues {
    let mut values = FormValues::new();
    for (name, spec) in definition.field_names().iter().zip(definition.fields()) {
        values.set(name.clone(), spec.default_raw());
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::FieldSpec;
    use std::cell::Cell;

    fn spec_example() -> WizardDefinition {
        WizardDefinition::builder()
            .title("Invoice")
            .field(FieldSpec::text("clientName").min_length(3, "min length 3"))
            .field(FieldSpec::pattern(
                "cnpj",
                r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$",
                "invalid format",
            ))
            .field(FieldSpec::numeric("amount").required("amount is required"))
            .step("Client", ["clientName", "cnpj"])
            .step("Amount", ["amount"])
            .build()
            .unwrap()
    }

    fn three_steps() -> WizardDefinition {
        WizardDefinition::builder()
            .field(FieldSpec::text("a").required("a required"))
            .field(FieldSpec::text("b").required("b required"))
            .field(FieldSpec::text("c").required("c required"))
            .step("A", ["a"])
            .step("B", ["b"])
            .step("C", ["c"])
            .build()
            .unwrap()
    }

    fn noop(_: &FormValues) {}

    fn fill_client(w: &mut WizardController<impl SubmissionSink>) {
        w.set_value("clientName", "Joe Corp").unwrap();
        w.set_value("cnpj", "12.345.678/0001-90").unwrap();
    }

    #[test]
    fn test_initial_state() {
        let w = WizardController::new(spec_example(), noop);
        assert_eq!(w.phase(), Phase::Editing(0));
        assert_eq!(w.current_step_index(), 0);
        assert_eq!(w.step_title(), "Client");
        assert_eq!(w.active_fields().len(), 2);
        assert!(w.errors().is_empty());
        assert!(!w.is_submitted());
        assert!(!w.is_submitting());
        assert!((w.progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_advance_blocked_by_example_input() {
        let mut w = WizardController::new(spec_example(), noop);
        w.set_value("clientName", "Jo").unwrap();

        let AdvanceOutcome::Blocked(result) = w.advance() else {
            panic!("advance should be blocked");
        };
        assert_eq!(result.error("clientName"), Some("min length 3"));
        assert_eq!(result.error("cnpj"), Some("invalid format"));
        assert_eq!(w.current_step_index(), 0);
    }

    #[test]
    fn test_advance_moves_with_example_input() {
        let mut w = WizardController::new(spec_example(), noop);
        fill_client(&mut w);
        assert_eq!(w.advance(), AdvanceOutcome::Moved { from: 0, to: 1 });
        assert_eq!(w.current_step_index(), 1);
        assert!((w.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_second_advance_reports_only_current_step() {
        let mut w = WizardController::new(spec_example(), noop);
        fill_client(&mut w);
        assert!(w.advance().moved());

        // Last step: advance is rejected without validating
        assert_eq!(w.advance(), AdvanceOutcome::AtLastStep);
        assert_eq!(w.current_step_index(), 1);

        let mut w = WizardController::new(three_steps(), noop);
        w.set_value("a", "x").unwrap();
        assert!(w.advance().moved());
        let AdvanceOutcome::Blocked(result) = w.advance() else {
            panic!("step 1 is invalid");
        };
        assert_eq!(w.current_step_index(), 1);
        assert_eq!(result.len(), 1);
        assert_eq!(result.error("b"), Some("b required"));
        assert!(!result.contains("a"));
        assert!(!result.contains("c"));
    }

    #[test]
    fn test_back_on_first_step_is_noop() {
        let mut w = WizardController::new(spec_example(), noop);
        let before = w.state().clone();
        assert_eq!(w.back(), BackOutcome::AtFirstStep);
        assert_eq!(w.state(), &before);
    }

    #[test]
    fn test_back_preserves_errors() {
        let mut w = WizardController::new(three_steps(), noop);
        w.set_value("a", "x").unwrap();
        w.advance();
        w.advance(); // blocked on b
        assert_eq!(w.back(), BackOutcome::Moved { from: 1, to: 0 });
        assert_eq!(w.errors().error("b"), Some("b required"));
        assert!(w.visible_errors().is_valid());
    }

    #[test]
    fn test_unvisited_steps_show_no_errors() {
        let mut w = WizardController::new(three_steps(), noop);
        w.advance(); // blocked on a
        assert_eq!(w.errors().len(), 1);
        assert!(!w.errors().contains("b"));
        assert!(!w.errors().contains("c"));
    }

    #[test]
    fn test_submit_validates_every_step() {
        let calls = Cell::new(0);
        let sink = |_: &FormValues| calls.set(calls.get() + 1);
        let mut w = WizardController::new(three_steps(), sink);

        for name in ["a", "b", "c"] {
            w.set_value(name, "x").unwrap();
        }
        assert!(w.advance().moved());
        assert!(w.advance().moved());
        // Invalidate an earlier step while sitting on the last one
        w.set_value("a", "").unwrap();
        assert!(w.visible_errors().is_valid());

        let SubmitOutcome::Invalid(result) = w.submit() else {
            panic!("submit must fail on an earlier invalid field");
        };
        assert_eq!(result.error("a"), Some("a required"));
        assert_eq!(result.len(), 3);
        assert_eq!(w.phase(), Phase::Editing(2));
        assert_eq!(w.first_invalid_step(), Some(0));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_submit_is_idempotent() {
        let calls = Cell::new(0);
        let sink = |_: &FormValues| calls.set(calls.get() + 1);
        let mut w = WizardController::new(spec_example(), sink);
        fill_client(&mut w);
        w.advance();
        w.set_value("amount", "150.00").unwrap();

        assert_eq!(w.submit(), SubmitOutcome::Submitted);
        assert!(w.is_submitted());
        assert!(w.is_submitting());
        assert_eq!(w.submit(), SubmitOutcome::AlreadySubmitted);
        assert_eq!(calls.get(), 1);

        assert_eq!(w.advance(), AdvanceOutcome::NotEditing);
        assert_eq!(w.back(), BackOutcome::NotEditing);
        assert_eq!(
            w.set_value("amount", "1"),
            Err(WizardError::AlreadySubmitted)
        );
    }

    #[test]
    fn test_sink_receives_value_snapshot() {
        let mut received = Vec::new();
        let mut w = WizardController::new(spec_example(), |v: &FormValues| received.push(v.clone()));
        fill_client(&mut w);
        w.advance();
        w.set_value("amount", "99").unwrap();
        w.submit();
        drop(w);

        assert_eq!(received.len(), 1);
        assert_eq!(received[0].raw("clientName"), "Joe Corp");
        assert_eq!(received[0].raw("amount"), "99");
    }

    #[test]
    fn test_reset_to_editing_reopens_last_step() {
        let calls = Cell::new(0);
        let sink = |_: &FormValues| calls.set(calls.get() + 1);
        let mut w = WizardController::new(spec_example(), sink);
        assert!(!w.reset_to_editing());

        fill_client(&mut w);
        w.advance();
        w.set_value("amount", "10").unwrap();
        w.submit();

        assert!(w.reset_to_editing());
        assert_eq!(w.phase(), Phase::Editing(1));
        assert!(!w.is_submitting());
        assert_eq!(w.values().raw("amount"), "10");

        assert!(w.submit().submitted());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_finish_submission_keeps_submitted() {
        let mut w = WizardController::new(spec_example(), noop);
        fill_client(&mut w);
        w.advance();
        w.set_value("amount", "10").unwrap();
        w.submit();
        w.finish_submission();
        assert!(w.is_submitted());
        assert!(!w.is_submitting());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut w = WizardController::new(spec_example(), noop);
        assert_eq!(
            w.set_value("total", "1"),
            Err(WizardError::UnknownField("total".to_string()))
        );
    }

    #[test]
    fn test_initial_values() {
        let draft = FormValues::from_pairs([("clientName", "Joe Corp")]).unwrap();
        let w = WizardController::with_initial_values(spec_example(), draft, noop).unwrap();
        assert_eq!(w.values().raw("clientName"), "Joe Corp");
        assert_eq!(w.values().get("cnpj"), Some(""));

        let bad = FormValues::from_pairs([("total", "1")]).unwrap();
        let err = WizardController::with_initial_values(spec_example(), bad, noop)
            .err()
            .unwrap();
        assert_eq!(err, SchemaError::UnknownInitialValue("total".to_string()));
    }

    #[test]
    fn test_defaults_seed_values() {
        let def = WizardDefinition::builder()
            .field(FieldSpec::text("currency").default_value("BRL"))
            .step("One", ["currency"])
            .build()
            .unwrap();
        let w = WizardController::new(def, noop);
        assert_eq!(w.values().raw("currency"), "BRL");
    }

    #[test]
    fn test_live_mode_validates_on_set() {
        let mut w = WizardController::new(spec_example(), noop).with_mode(ValidationMode::Live);
        w.set_value("clientName", "Jo").unwrap();
        assert_eq!(w.errors().error("clientName"), Some("min length 3"));
        assert!(!w.errors().contains("cnpj"));

        w.set_value("clientName", "Joe").unwrap();
        assert_eq!(w.errors().error("clientName"), None);
    }

    #[test]
    fn test_live_mode_revalidates_dependent_dates() {
        let def = WizardDefinition::builder()
            .field(FieldSpec::date("issueDate"))
            .field(
                FieldSpec::date("dueDate")
                    .not_before_field(FieldName::new("issueDate").unwrap(), "due before issue"),
            )
            .step("Dates", ["issueDate", "dueDate"])
            .build()
            .unwrap();
        let mut w = WizardController::new(def, noop).with_mode(ValidationMode::Live);
        w.set_value("issueDate", "2024-03-10").unwrap();
        w.set_value("dueDate", "2024-03-01").unwrap();
        assert_eq!(w.errors().error("dueDate"), Some("due before issue"));

        w.set_value("issueDate", "2024-02-01").unwrap();
        assert_eq!(w.errors().error("dueDate"), None);

        w.set_value("issueDate", "2024-04-01").unwrap();
        assert_eq!(w.errors().error("dueDate"), Some("due before issue"));
    }

    #[test]
    fn test_live_mode_skips_unvisited_dependents() {
        let def = WizardDefinition::builder()
            .field(FieldSpec::date("issueDate"))
            .field(
                FieldSpec::date("dueDate")
                    .required("due date is required")
                    .not_before_field(FieldName::new("issueDate").unwrap(), "due before issue"),
            )
            .step("Dates", ["issueDate", "dueDate"])
            .build()
            .unwrap();
        let mut w = WizardController::new(def, noop).with_mode(ValidationMode::Live);
        w.set_value("issueDate", "2024-03-10").unwrap();
        assert!(!w.errors().contains("dueDate"));
    }

    #[test]
    fn test_back_after_submit_is_ignored() {
        let mut w = WizardController::new(three_steps(), noop);
        for name in ["a", "b", "c"] {
            w.set_value(name, "x").unwrap();
        }
        assert!(w.submit().submitted());
        assert_eq!(w.back(), BackOutcome::NotEditing);
        assert!(w.is_submitted());
    }

    #[test]
    fn test_navigation_mode_defers_validation() {
        let mut w = WizardController::new(spec_example(), noop);
        w.set_value("clientName", "Jo").unwrap();
        assert!(w.errors().is_empty());
    }

    #[test]
    fn test_progress_tracks_step_index() {
        let mut w = WizardController::new(three_steps(), noop);
        let expected = |i: usize| (i + 1) as f64 / 3.0;
        assert!((w.progress() - expected(0)).abs() < 1e-9);
        w.set_value("a", "x").unwrap();
        w.advance();
        assert!((w.progress() - expected(1)).abs() < 1e-9);
        w.back();
        assert!((w.progress() - expected(0)).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut w = WizardController::new(spec_example(), noop);
        w.set_value("clientName", "Jo").unwrap();
        w.advance();
        let snap = w.snapshot();
        assert_eq!(snap.step_index, 0);
        assert_eq!(snap.errors.error_count(), 2);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["title"], "Client");
        assert_eq!(json["errors"]["clientName"], "min length 3");
        assert_eq!(json["fields"][1], "cnpj");
    }

    #[test]
    fn test_validation_mode_from_str() {
        assert_eq!("live".parse::<ValidationMode>(), Ok(ValidationMode::Live));
        assert_eq!(
            "on-navigation".parse::<ValidationMode>(),
            Ok(ValidationMode::OnNavigation)
        );
        assert!("eager".parse::<ValidationMode>().is_err());
    }
}
