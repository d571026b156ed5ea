//! Application state management for the freightdesk terminal UI.
//!
//! This module owns the dashboard tables, the modal mode the UI is in,
//! and the hosting of wizard sessions, including the sub-flow branch that
//! lets the shipment wizard open the partner wizard in place.

use serde_json::Value;

use crate::domain::{
    wizard_for, BackOutcome, NextOutcome, Partner, Shipment, SubFlowResult, WizardKind,
    WizardSession, shipment_fields, SHIPMENT_PARTNERS_STEP,
};
use crate::infrastructure::{EndpointAdapter, TradeApi};

/// Which dashboard table is in front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Shipments,
    Partners,
}

/// Represents the current mode of the application.
///
/// The mode determines how user input is interpreted and what UI
/// elements are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Table navigation with shortcuts available
    Dashboard,
    /// A wizard modal is open
    Wizard,
    /// Help screen is displayed
    Help,
    /// CSV export filename prompt is open
    ExportCsv,
}

/// What the open wizard currently renders in place of its active step:
/// the step itself, or a nested flow that suspended it.
///
/// Modeled as a tagged union so parent and sub-flow can never render at
/// once.
pub enum StepView {
    Normal,
    SubFlow {
        /// Parent step to resume at when the branch ends.
        resume_at: usize,
        session: WizardSession,
    },
}

/// One open wizard plus the per-step UI cursor.
pub struct WizardHost {
    pub kind: WizardKind,
    pub session: WizardSession,
    pub view: StepView,
    /// Which control/row on the active step has focus. Presentation-only
    /// state, reset on every step change.
    pub focus: usize,
}

impl WizardHost {
    fn new(kind: WizardKind) -> Self {
        Self {
            kind,
            session: WizardSession::new(wizard_for(kind)),
            view: StepView::Normal,
            focus: 0,
        }
    }

    /// The session user input should act on: the sub-flow when one is
    /// open, the parent otherwise.
    pub fn focused_session(&self) -> &WizardSession {
        match &self.view {
            StepView::SubFlow { session, .. } => session,
            StepView::Normal => &self.session,
        }
    }

    pub fn focused_session_mut(&mut self) -> &mut WizardSession {
        match &mut self.view {
            StepView::SubFlow { session, .. } => session,
            StepView::Normal => &mut self.session,
        }
    }

    /// Flow kind of the focused session.
    pub fn focused_kind(&self) -> WizardKind {
        match self.view {
            StepView::SubFlow { .. } => WizardKind::Partner,
            StepView::Normal => self.kind,
        }
    }
}

enum WizardOutcome {
    Nothing,
    StepChanged,
    SubflowFinished(Value),
    SubflowCancelled,
    WizardFinished(Option<Value>),
    WizardCancelled,
}

/// Main application state: backend handle, table data, and UI modes.
pub struct App {
    pub api: Box<dyn TradeApi>,
    pub shipments: Vec<Shipment>,
    pub partners: Vec<Partner>,
    pub tab: DashboardTab,
    /// Selected row in the front table (zero-based)
    pub selected_row: usize,
    pub mode: AppMode,
    pub wizard: Option<WizardHost>,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Input buffer for the CSV export filename prompt
    pub filename_input: String,
}

impl App {
    /// Creates the app over the given backend and pulls the initial
    /// tables. Fetch failures become a status message, not a crash.
    pub fn new(api: Box<dyn TradeApi>) -> Self {
        let mut app = Self {
            api,
            shipments: Vec::new(),
            partners: Vec::new(),
            tab: DashboardTab::Shipments,
            selected_row: 0,
            mode: AppMode::Dashboard,
            wizard: None,
            status_message: None,
            help_scroll: 0,
            filename_input: String::new(),
        };
        app.refresh();
        app
    }

    /// Refetches both tables from the backend.
    pub fn refresh(&mut self) {
        match self.api.list_shipments() {
            Ok(shipments) => self.shipments = shipments,
            Err(e) => self.status_message = Some(format!("Fetch failed: {}", e)),
        }
        match self.api.list_partners() {
            Ok(partners) => self.partners = partners,
            Err(e) => self.status_message = Some(format!("Fetch failed: {}", e)),
        }
        self.clamp_selection();
    }

    pub fn row_count(&self) -> usize {
        match self.tab {
            DashboardTab::Shipments => self.shipments.len(),
            DashboardTab::Partners => self.partners.len(),
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        if count == 0 {
            self.selected_row = 0;
        } else if self.selected_row >= count {
            self.selected_row = count - 1;
        }
    }

    pub fn switch_tab(&mut self) {
        self.tab = match self.tab {
            DashboardTab::Shipments => DashboardTab::Partners,
            DashboardTab::Partners => DashboardTab::Shipments,
        };
        self.selected_row = 0;
    }

    pub fn select_previous_row(&mut self) {
        if self.selected_row > 0 {
            self.selected_row -= 1;
        }
    }

    pub fn select_next_row(&mut self) {
        if self.selected_row + 1 < self.row_count() {
            self.selected_row += 1;
        }
    }

    pub fn selected_shipment(&self) -> Option<&Shipment> {
        self.shipments.get(self.selected_row)
    }

    /// Opens a fresh wizard session. Any previous session was already
    /// discarded when its mode ended.
    pub fn open_wizard(&mut self, kind: WizardKind) {
        self.wizard = Some(WizardHost::new(kind));
        self.mode = AppMode::Wizard;
        self.status_message = None;
    }

    /// Discards the wizard state entirely and returns to the dashboard.
    pub fn cancel_wizard(&mut self) {
        self.wizard = None;
        self.mode = AppMode::Dashboard;
        self.status_message = Some("Wizard cancelled".to_string());
    }

    /// Branches the shipment wizard's Partners step into the partner
    /// sub-flow. No-op on any other step or flow, or if a branch is
    /// already open.
    pub fn open_partner_subflow(&mut self) {
        let Some(host) = self.wizard.as_mut() else {
            return;
        };
        if host.kind != WizardKind::Shipment
            || !matches!(host.view, StepView::Normal)
            || host.session.active_index() != SHIPMENT_PARTNERS_STEP
        {
            return;
        }
        host.view = StepView::SubFlow {
            resume_at: host.session.active_index(),
            session: WizardSession::new(wizard_for(WizardKind::Partner)),
        };
        host.focus = 0;
    }

    /// Drives the focused session forward: advance, or submit on its
    /// terminal step. Handles sub-flow completion (merge into the parent
    /// and resume) and wizard completion (close, status, refetch).
    pub fn wizard_next(&mut self) {
        enum Drove {
            Parent(NextOutcome),
            Sub(NextOutcome, usize, Option<Value>),
        }

        let outcome = {
            let Some(host) = self.wizard.as_mut() else {
                return;
            };
            let drove = match &mut host.view {
                StepView::SubFlow { resume_at, session } => {
                    let mut endpoint =
                        EndpointAdapter::new(self.api.as_mut(), WizardKind::Partner);
                    let next = session.next(&mut endpoint);
                    Drove::Sub(next, *resume_at, session.receipt().cloned())
                }
                StepView::Normal => {
                    let kind = host.kind;
                    let mut endpoint = EndpointAdapter::new(self.api.as_mut(), kind);
                    Drove::Parent(host.session.next(&mut endpoint))
                }
            };
            match drove {
                Drove::Sub(NextOutcome::Advanced, _, _) => WizardOutcome::StepChanged,
                Drove::Sub(NextOutcome::Submitted, resume_at, receipt) => {
                    let receipt = receipt.unwrap_or(Value::Null);
                    host.session.merge_subflow(SubFlowResult {
                        field: shipment_fields::PARTNERS.to_string(),
                        value: receipt.clone(),
                    });
                    host.session.go_to(resume_at);
                    host.view = StepView::Normal;
                    WizardOutcome::SubflowFinished(receipt)
                }
                Drove::Sub(_, _, _) => WizardOutcome::Nothing,
                Drove::Parent(NextOutcome::Advanced) => WizardOutcome::StepChanged,
                Drove::Parent(NextOutcome::Submitted) => {
                    WizardOutcome::WizardFinished(host.session.receipt().cloned())
                }
                Drove::Parent(_) => WizardOutcome::Nothing,
            }
        };
        self.apply_wizard_outcome(outcome);
    }

    /// Drives the focused session backward. Cancelling the sub-flow
    /// resumes the parent unchanged; cancelling the parent closes the
    /// wizard.
    pub fn wizard_back(&mut self) {
        let outcome = {
            let Some(host) = self.wizard.as_mut() else {
                return;
            };
            let (in_subflow, resume_at, went) = match &mut host.view {
                StepView::SubFlow { resume_at, session } => (true, *resume_at, session.back()),
                StepView::Normal => (false, 0, host.session.back()),
            };
            match (in_subflow, went) {
                (_, BackOutcome::Retreated) => WizardOutcome::StepChanged,
                (true, BackOutcome::CancelRequested) => {
                    host.session.go_to(resume_at);
                    host.view = StepView::Normal;
                    WizardOutcome::SubflowCancelled
                }
                (false, BackOutcome::CancelRequested) => WizardOutcome::WizardCancelled,
                (_, BackOutcome::Ignored) => WizardOutcome::Nothing,
            }
        };
        self.apply_wizard_outcome(outcome);
    }

    fn apply_wizard_outcome(&mut self, outcome: WizardOutcome) {
        match outcome {
            WizardOutcome::Nothing => {}
            WizardOutcome::StepChanged => {
                if let Some(host) = self.wizard.as_mut() {
                    host.focus = 0;
                }
            }
            WizardOutcome::SubflowFinished(receipt) => {
                if let Some(host) = self.wizard.as_mut() {
                    host.focus = 0;
                }
                let name = receipt
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("partner");
                let mut status = format!("Partner {} created and selected", name);
                // Pull-based refetch so the picker shows the new partner.
                match self.api.list_partners() {
                    Ok(partners) => self.partners = partners,
                    Err(e) => status.push_str(&format!(" (fetch failed: {})", e)),
                }
                self.status_message = Some(status);
            }
            WizardOutcome::SubflowCancelled => {
                if let Some(host) = self.wizard.as_mut() {
                    host.focus = 0;
                }
                self.status_message = Some("Partner creation cancelled".to_string());
            }
            WizardOutcome::WizardFinished(receipt) => {
                let summary = receipt
                    .as_ref()
                    .and_then(|r| {
                        r.get("reference")
                            .or_else(|| r.get("name"))
                            .and_then(Value::as_str)
                    })
                    .unwrap_or("record")
                    .to_string();
                self.wizard = None;
                self.mode = AppMode::Dashboard;
                self.status_message = Some(format!("Created {}", summary));
                self.refresh();
            }
            WizardOutcome::WizardCancelled => self.cancel_wizard(),
        }
    }

    /// Switches to the CSV export filename prompt.
    pub fn start_csv_export(&mut self) {
        self.mode = AppMode::ExportCsv;
        self.filename_input = "shipments.csv".to_string();
        self.status_message = None;
    }

    /// Cancels the filename prompt and returns to the dashboard.
    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Dashboard;
        self.filename_input.clear();
    }

    /// Filename to export to: the prompt input, or the default when
    /// blank.
    pub fn get_export_filename(&self) -> String {
        if self.filename_input.is_empty() {
            "shipments.csv".to_string()
        } else {
            self.filename_input.clone()
        }
    }

    /// Processes the result of a CSV export and returns to the
    /// dashboard.
    pub fn set_export_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Exported to {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Export failed: {}", error));
            }
        }
        self.mode = AppMode::Dashboard;
        self.filename_input.clear();
    }

    pub fn open_help(&mut self) {
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    pub fn close_help(&mut self) {
        self.mode = AppMode::Dashboard;
    }
}
