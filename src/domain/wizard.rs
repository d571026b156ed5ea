//! Multi-step form wizard engine.
//!
//! This module provides the state machine that drives every guided creation
//! flow in freightdesk: an ordered sequence of validated steps, a field store
//! accumulating user input across steps, forward progress gated on the
//! current step's validator, and submission through a pluggable adapter on
//! the terminal step. Nested flows (creating a partner from inside the
//! shipment wizard) run as independent sessions whose result is merged back
//! into the parent's field store.
//!
//! The engine knows nothing about any particular form: steps are declared by
//! the host as `{label, description?, validate}` and the field store is an
//! untyped name-to-JSON-value map that the engine only ever reads through
//! each step's predicate.

use std::fmt;

use serde_json::{Map, Value};

use super::errors::SubmissionError;

/// Mutable bag of current input values for one wizard session.
///
/// Values are untyped JSON from the engine's perspective; step validators
/// and payload mappers give them meaning.
///
/// # Examples
///
/// ```
/// use freightdesk::domain::FieldStore;
///
/// let mut fields = FieldStore::new();
/// fields.set_text("origin", "Rotterdam");
/// assert_eq!(fields.text("origin"), "Rotterdam");
/// assert!(fields.has_text("origin"));
/// assert!(!fields.has_text("destination"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStore {
    values: Map<String, Value>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// String value of a field, or "" when absent or not a string.
    pub fn text(&self, name: &str) -> &str {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn set_text(&mut self, name: &str, value: &str) {
        self.values
            .insert(name.to_string(), Value::String(value.to_string()));
    }

    /// True when the field holds a non-blank string.
    pub fn has_text(&self, name: &str) -> bool {
        !self.text(name).trim().is_empty()
    }

    /// Items of a list field, or an empty slice when absent.
    pub fn items(&self, name: &str) -> &[Value] {
        self.values
            .get(name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Appends a value to a list field, creating the list if needed.
    pub fn push_item(&mut self, name: &str, value: Value) {
        match self.values.get_mut(name).and_then(Value::as_array_mut) {
            Some(list) => list.push(value),
            None => {
                self.values.insert(name.to_string(), Value::Array(vec![value]));
            }
        }
    }

    /// Adds the value to a list field, or removes it if already present.
    pub fn toggle_item(&mut self, name: &str, value: Value) {
        if !self.values.contains_key(name) {
            self.values
                .insert(name.to_string(), Value::Array(Vec::new()));
        }
        if let Some(list) = self.values.get_mut(name).and_then(Value::as_array_mut) {
            match list.iter().position(|v| *v == value) {
                Some(pos) => {
                    list.remove(pos);
                }
                None => list.push(value),
            }
        }
    }

    /// True when a list field contains the given value.
    pub fn contains_item(&self, name: &str, value: &Value) -> bool {
        self.items(name).iter().any(|v| v == value)
    }
}

/// Predicate deciding whether a step's required fields are satisfied.
///
/// Must be pure: same field snapshot, same answer.
pub type StepPredicate = Box<dyn Fn(&FieldStore) -> bool>;

/// One page of a wizard: a display label, optional helper text, and an
/// optional validation predicate.
///
/// A step without a predicate always validates, which is how optional
/// steps (document upload, review) are declared.
pub struct StepDefinition {
    label: String,
    description: Option<String>,
    validate: Option<StepPredicate>,
}

impl StepDefinition {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            description: None,
            validate: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn requires(mut self, predicate: impl Fn(&FieldStore) -> bool + 'static) -> Self {
        self.validate = Some(Box::new(predicate));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Runs the step's validator against a field snapshot.
    pub fn is_satisfied_by(&self, fields: &FieldStore) -> bool {
        match &self.validate {
            Some(predicate) => predicate(fields),
            None => true,
        }
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("label", &self.label)
            .field("validated", &self.validate.is_some())
            .finish()
    }
}

/// Maps the assembled field store to the submission request body.
pub type PayloadMapper = Box<dyn Fn(&FieldStore) -> Value>;

/// Host-declared configuration for one wizard: title, ordered steps, and
/// the payload mapper used on submission.
///
/// The step sequence is fixed for the lifetime of every session built
/// from this config.
pub struct WizardConfig {
    title: String,
    steps: Vec<StepDefinition>,
    mapper: PayloadMapper,
}

impl WizardConfig {
    pub fn new(
        title: &str,
        steps: Vec<StepDefinition>,
        mapper: impl Fn(&FieldStore) -> Value + 'static,
    ) -> Self {
        assert!(!steps.is_empty(), "a wizard needs at least one step");
        Self {
            title: title.to_string(),
            steps,
            mapper: Box::new(mapper),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Where a wizard session is in its submission lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardPhase {
    /// Collecting input; the active step renders normally.
    Editing,
    /// A submission is in flight; next/back are no-ops.
    Submitting,
    /// Submission succeeded; the session is finished.
    Succeeded,
    /// Submission failed with a displayable message; still at the review
    /// step, fields intact, retry permitted.
    Failed(String),
}

/// Result of a completed nested wizard, handed to the parent for merging.
///
/// The nested flow holds no reference to the parent; this value is the
/// only channel between the two.
#[derive(Debug, Clone, PartialEq)]
pub struct SubFlowResult {
    /// Parent list field the value is appended to.
    pub field: String,
    pub value: Value,
}

/// The network boundary the engine submits through.
///
/// On success the adapter returns the created record (receipt) as JSON;
/// on failure a [`SubmissionError`] whose message is shown verbatim.
pub trait SubmissionAdapter {
    fn submit(&mut self, payload: Value) -> Result<Value, SubmissionError>;
}

/// What a call to [`WizardSession::next`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// The current step's validator said no; nothing changed.
    Blocked,
    /// Moved to the following step.
    Advanced,
    /// Terminal step: submission ran and succeeded.
    Submitted,
    /// Terminal step: submission ran and failed; see the session's phase
    /// for the message.
    Rejected,
    /// Ignored because a submission is in flight or already succeeded.
    Ignored,
}

/// What a call to [`WizardSession::back`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackOutcome {
    /// Moved to the previous step.
    Retreated,
    /// Already on the first step; the host should close the wizard.
    CancelRequested,
    /// Ignored because a submission is in flight or already succeeded.
    Ignored,
}

/// A live wizard: the step cursor, the field store, and the submission
/// phase for one invocation of a configured flow.
///
/// Sessions are created fresh per invocation and discarded on cancel or
/// after success; they are never persisted.
///
/// # Examples
///
/// ```
/// use freightdesk::domain::{
///     FieldStore, NextOutcome, StepDefinition, SubmissionAdapter, SubmissionError,
///     WizardConfig, WizardSession,
/// };
/// use serde_json::{json, Value};
///
/// struct AlwaysOk;
///
/// impl SubmissionAdapter for AlwaysOk {
///     fn submit(&mut self, payload: Value) -> Result<Value, SubmissionError> {
///         Ok(payload)
///     }
/// }
///
/// let config = WizardConfig::new(
///     "Demo",
///     vec![
///         StepDefinition::new("Name").requires(|f: &FieldStore| f.has_text("name")),
///         StepDefinition::new("Review"),
///     ],
///     |f| json!({ "name": f.text("name") }),
/// );
///
/// let mut session = WizardSession::new(config);
/// assert_eq!(session.next(&mut AlwaysOk), NextOutcome::Blocked);
///
/// session.fields_mut().set_text("name", "Acme");
/// assert_eq!(session.next(&mut AlwaysOk), NextOutcome::Advanced);
/// assert_eq!(session.next(&mut AlwaysOk), NextOutcome::Submitted);
/// ```
pub struct WizardSession {
    config: WizardConfig,
    active: usize,
    fields: FieldStore,
    phase: WizardPhase,
    receipt: Option<Value>,
}

impl WizardSession {
    pub fn new(config: WizardConfig) -> Self {
        Self {
            config,
            active: 0,
            fields: FieldStore::new(),
            phase: WizardPhase::Editing,
            receipt: None,
        }
    }

    pub fn title(&self) -> &str {
        self.config.title()
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.config.steps
    }

    pub fn step_count(&self) -> usize {
        self.config.steps.len()
    }

    /// Zero-based index of the step currently shown.
    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_step(&self) -> &StepDefinition {
        &self.config.steps[self.active]
    }

    /// True when the active step is the last one before submission.
    pub fn is_terminal_step(&self) -> bool {
        self.active == self.config.steps.len() - 1
    }

    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldStore {
        &mut self.fields
    }

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    /// Message of the most recent submission failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        match &self.phase {
            WizardPhase::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// The created record returned by a successful submission.
    pub fn receipt(&self) -> Option<&Value> {
        self.receipt.as_ref()
    }

    /// Whether the step at `index` passes its validator for the current
    /// field snapshot. Out-of-range indices are never ready.
    pub fn step_ready_at(&self, index: usize) -> bool {
        match self.config.steps.get(index) {
            Some(step) => step.is_satisfied_by(&self.fields),
            None => false,
        }
    }

    /// Whether the active step passes its validator. Drives the enabled
    /// state of the Next/Submit affordance.
    pub fn step_ready(&self) -> bool {
        self.step_ready_at(self.active)
    }

    /// Advances to the next step, or submits when on the terminal step.
    ///
    /// Forward progress is gated on the active step's validator; a failed
    /// gate leaves the session untouched. On the terminal step the payload
    /// is assembled via the config's mapper and handed to `adapter`.
    /// Submission never touches the field store, so a failure loses no
    /// input. Calls made while a submission is in flight (or after
    /// success) are ignored.
    pub fn next(&mut self, adapter: &mut dyn SubmissionAdapter) -> NextOutcome {
        match self.phase {
            WizardPhase::Submitting | WizardPhase::Succeeded => return NextOutcome::Ignored,
            WizardPhase::Editing | WizardPhase::Failed(_) => {}
        }
        if !self.step_ready() {
            return NextOutcome::Blocked;
        }
        if !self.is_terminal_step() {
            self.active += 1;
            self.phase = WizardPhase::Editing;
            return NextOutcome::Advanced;
        }

        self.phase = WizardPhase::Submitting;
        let payload = (self.config.mapper)(&self.fields);
        match adapter.submit(payload) {
            Ok(receipt) => {
                self.receipt = Some(receipt);
                self.phase = WizardPhase::Succeeded;
                NextOutcome::Submitted
            }
            Err(error) => {
                self.phase = WizardPhase::Failed(error.message);
                NextOutcome::Rejected
            }
        }
    }

    /// Retreats one step, unconditionally: revisiting earlier answers is
    /// never blocked by validation. On the first step this instead asks
    /// the host to cancel the wizard. Clears any submission failure.
    pub fn back(&mut self) -> BackOutcome {
        match self.phase {
            WizardPhase::Submitting | WizardPhase::Succeeded => return BackOutcome::Ignored,
            WizardPhase::Editing | WizardPhase::Failed(_) => {}
        }
        self.phase = WizardPhase::Editing;
        if self.active == 0 {
            return BackOutcome::CancelRequested;
        }
        self.active -= 1;
        BackOutcome::Retreated
    }

    /// Repositions the step cursor. Only the host's sub-flow plumbing may
    /// call this (to resume at the step a branch was launched from);
    /// arbitrary user-driven jumps are not part of the contract.
    pub(crate) fn go_to(&mut self, index: usize) {
        debug_assert!(index < self.config.steps.len());
        self.active = index.min(self.config.steps.len() - 1);
        self.phase = WizardPhase::Editing;
    }

    /// Merges a completed sub-flow's result into this session's fields by
    /// appending to the named list field. The step cursor is untouched.
    pub fn merge_subflow(&mut self, result: SubFlowResult) {
        self.fields.push_item(&result.field, result.value);
    }

    #[cfg(test)]
    fn force_phase(&mut self, phase: WizardPhase) {
        self.phase = phase;
    }
}

impl fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardSession")
            .field("title", &self.config.title)
            .field("active", &self.active)
            .field("phase", &self.phase)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StubGateway {
        responses: Vec<Result<Value, SubmissionError>>,
        calls: usize,
        last_payload: Option<Value>,
    }

    impl StubGateway {
        fn ok(receipt: Value) -> Self {
            Self {
                responses: vec![Ok(receipt)],
                calls: 0,
                last_payload: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                responses: vec![Err(SubmissionError::new(message))],
                calls: 0,
                last_payload: None,
            }
        }
    }

    impl SubmissionAdapter for StubGateway {
        fn submit(&mut self, payload: Value) -> Result<Value, SubmissionError> {
            self.calls += 1;
            self.last_payload = Some(payload);
            if self.responses.is_empty() {
                Ok(json!({}))
            } else {
                self.responses.remove(0)
            }
        }
    }

    fn three_step_session() -> WizardSession {
        let config = WizardConfig::new(
            "Test",
            vec![
                StepDefinition::new("Type").requires(|f: &FieldStore| f.has_text("type")),
                StepDefinition::new("Details").requires(|f: &FieldStore| f.has_text("detail")),
                StepDefinition::new("Review"),
            ],
            |f| json!({ "type": f.text("type"), "detail": f.text("detail") }),
        );
        WizardSession::new(config)
    }

    #[test]
    fn test_validator_is_deterministic() {
        let mut session = three_step_session();
        session.fields_mut().set_text("type", "import");
        assert_eq!(session.step_ready_at(0), session.step_ready_at(0));
        assert_eq!(session.step_ready_at(1), session.step_ready_at(1));
    }

    #[test]
    fn test_next_blocked_on_empty_required_field() {
        let mut session = three_step_session();
        session.fields_mut().set_text("type", "");
        let mut gateway = StubGateway::ok(json!({}));

        assert_eq!(session.next(&mut gateway), NextOutcome::Blocked);
        assert_eq!(session.active_index(), 0);
        assert_eq!(gateway.calls, 0);
    }

    #[test]
    fn test_next_advances_when_step_valid() {
        let mut session = three_step_session();
        session.fields_mut().set_text("type", "import");
        let mut gateway = StubGateway::ok(json!({}));

        assert_eq!(session.next(&mut gateway), NextOutcome::Advanced);
        assert_eq!(session.active_index(), 1);
    }

    #[test]
    fn test_step_without_validator_always_ready() {
        let session = three_step_session();
        assert!(session.step_ready_at(2));
    }

    #[test]
    fn test_next_never_advances_past_terminal() {
        let mut session = three_step_session();
        session.fields_mut().set_text("type", "import");
        session.fields_mut().set_text("detail", "x");
        let mut gateway = StubGateway::ok(json!({"id": 1}));

        session.next(&mut gateway);
        session.next(&mut gateway);
        assert_eq!(session.active_index(), 2);
        assert!(session.is_terminal_step());

        // Terminal next submits instead of incrementing.
        assert_eq!(session.next(&mut gateway), NextOutcome::Submitted);
        assert_eq!(session.active_index(), 2);
        assert_eq!(gateway.calls, 1);
    }

    #[test]
    fn test_back_from_first_step_requests_cancel() {
        let mut session = three_step_session();
        assert_eq!(session.back(), BackOutcome::CancelRequested);
        assert_eq!(session.active_index(), 0);
    }

    #[test]
    fn test_back_skips_validation() {
        let mut session = three_step_session();
        session.fields_mut().set_text("type", "import");
        let mut gateway = StubGateway::ok(json!({}));
        session.next(&mut gateway);

        // Invalidate the earlier step; going back must still work.
        session.fields_mut().set_text("type", "");
        assert_eq!(session.back(), BackOutcome::Retreated);
        assert_eq!(session.active_index(), 0);
    }

    #[test]
    fn test_submission_failure_keeps_fields_and_position() {
        let mut session = three_step_session();
        session.fields_mut().set_text("type", "import");
        session.fields_mut().set_text("detail", "x");
        let mut advance = StubGateway::ok(json!({}));
        session.next(&mut advance);
        session.next(&mut advance);

        let before = session.fields().clone();
        let mut gateway = StubGateway::failing("Network error");

        assert_eq!(session.next(&mut gateway), NextOutcome::Rejected);
        assert_eq!(session.last_error(), Some("Network error"));
        assert_eq!(session.active_index(), 2);
        assert_eq!(session.fields(), &before);
        assert!(session.receipt().is_none());
    }

    #[test]
    fn test_retry_after_failure_can_succeed() {
        let mut session = three_step_session();
        session.fields_mut().set_text("type", "import");
        session.fields_mut().set_text("detail", "x");
        let mut gateway = StubGateway {
            responses: vec![
                Err(SubmissionError::new("flaky")),
                Ok(json!({"id": 9})),
            ],
            calls: 0,
            last_payload: None,
        };

        session.next(&mut gateway);
        session.next(&mut gateway);
        assert_eq!(session.next(&mut gateway), NextOutcome::Rejected);
        assert_eq!(session.next(&mut gateway), NextOutcome::Submitted);
        assert_eq!(session.receipt(), Some(&json!({"id": 9})));
        assert_eq!(gateway.calls, 2);
    }

    #[test]
    fn test_next_is_noop_while_submitting() {
        let mut session = three_step_session();
        session.force_phase(WizardPhase::Submitting);
        let mut gateway = StubGateway::ok(json!({}));

        assert_eq!(session.next(&mut gateway), NextOutcome::Ignored);
        assert_eq!(session.back(), BackOutcome::Ignored);
        assert_eq!(gateway.calls, 0);
    }

    #[test]
    fn test_next_is_noop_after_success() {
        let mut session = three_step_session();
        session.fields_mut().set_text("type", "import");
        session.fields_mut().set_text("detail", "x");
        let mut gateway = StubGateway::ok(json!({"id": 1}));

        session.next(&mut gateway);
        session.next(&mut gateway);
        session.next(&mut gateway);
        assert_eq!(session.phase(), &WizardPhase::Succeeded);
        assert_eq!(session.next(&mut gateway), NextOutcome::Ignored);
        assert_eq!(gateway.calls, 1);
    }

    #[test]
    fn test_mapper_assembles_payload_from_fields() {
        let mut session = three_step_session();
        session.fields_mut().set_text("type", "export");
        session.fields_mut().set_text("detail", "bulk");
        let mut gateway = StubGateway::ok(json!({}));

        session.next(&mut gateway);
        session.next(&mut gateway);
        session.next(&mut gateway);
        assert_eq!(
            gateway.last_payload,
            Some(json!({"type": "export", "detail": "bulk"}))
        );
    }

    #[test]
    fn test_merge_subflow_appends_without_moving_cursor() {
        let mut session = three_step_session();
        session.fields_mut().set_text("type", "import");
        let mut gateway = StubGateway::ok(json!({}));
        session.next(&mut gateway);

        let launched_at = session.active_index();
        session.merge_subflow(SubFlowResult {
            field: "partners".to_string(),
            value: json!({"id": 42, "name": "Acme"}),
        });
        session.go_to(launched_at);

        assert_eq!(session.active_index(), launched_at);
        assert_eq!(
            session.fields().items("partners"),
            &[json!({"id": 42, "name": "Acme"})][..]
        );
    }

    #[test]
    fn test_merge_subflow_appends_to_existing_list() {
        let mut session = three_step_session();
        session
            .fields_mut()
            .push_item("partners", json!({"id": 1}));
        session.merge_subflow(SubFlowResult {
            field: "partners".to_string(),
            value: json!({"id": 2}),
        });
        assert_eq!(session.fields().items("partners").len(), 2);
    }

    #[test]
    fn test_toggle_item_adds_and_removes() {
        let mut fields = FieldStore::new();
        fields.toggle_item("docs", json!("packing_list"));
        assert!(fields.contains_item("docs", &json!("packing_list")));
        fields.toggle_item("docs", json!("packing_list"));
        assert!(!fields.contains_item("docs", &json!("packing_list")));
    }

    #[test]
    fn test_step_ready_at_out_of_range_is_false() {
        let session = three_step_session();
        assert!(session.step_ready_at(2));
        assert!(!session.step_ready_at(3));
        assert!(!session.step_ready_at(usize::MAX));
    }

    #[test]
    fn test_items_of_absent_field_is_empty() {
        let fields = FieldStore::new();
        assert!(fields.items("partners").is_empty());
    }
}
