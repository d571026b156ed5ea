use crossterm::event::{KeyCode, KeyModifiers};

use crate::application::{App, AppMode};
use crate::domain::{
    partner_fields, shipment_fields, Direction, DocumentKind, FieldStore, PartnerRole, WizardKind,
};
use crate::infrastructure::CsvExporter;

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Dashboard => Self::handle_dashboard_mode(app, key, modifiers),
            AppMode::Wizard => Self::handle_wizard_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::ExportCsv => Self::handle_export_mode(app, key),
        }
    }

    fn handle_dashboard_mode(app: &mut App, key: KeyCode, _modifiers: KeyModifiers) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_row(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next_row(),
            KeyCode::Tab => app.switch_tab(),
            KeyCode::Char('s') => app.open_wizard(WizardKind::Shipment),
            KeyCode::Char('p') => app.open_wizard(WizardKind::Partner),
            KeyCode::Char('e') => app.start_csv_export(),
            KeyCode::Char('r') => {
                app.refresh();
                app.status_message = Some("Refreshed".to_string());
            }
            KeyCode::Char('y') => Self::copy_selected_reference(app),
            KeyCode::F(1) | KeyCode::Char('?') => app.open_help(),
            _ => {}
        }
    }

    fn copy_selected_reference(app: &mut App) {
        let Some(shipment) = app.selected_shipment() else {
            return;
        };
        let reference = shipment.reference.clone();
        let copied = arboard::Clipboard::new().and_then(|mut cb| cb.set_text(reference.clone()));
        app.status_message = Some(match copied {
            Ok(()) => format!("Copied {} to clipboard", reference),
            Err(e) => format!("Clipboard error: {}", e),
        });
    }

    fn handle_wizard_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                app.wizard_back();
                return;
            }
            KeyCode::Enter => {
                app.wizard_next();
                return;
            }
            _ => {}
        }

        let Some(host) = app.wizard.as_ref() else {
            return;
        };
        let kind = host.focused_kind();
        let step = host.focused_session().active_index();
        match kind {
            WizardKind::Shipment => Self::handle_shipment_step(app, step, key),
            WizardKind::Partner => Self::handle_partner_step(app, step, key),
        }
    }

    fn handle_shipment_step(app: &mut App, step: usize, key: KeyCode) {
        use shipment_fields as f;

        match step {
            // Direction: pick import or export.
            0 => {
                let Some(host) = app.wizard.as_mut() else {
                    return;
                };
                let fields = host.focused_session_mut().fields_mut();
                match key {
                    KeyCode::Char('i') => fields.set_text(f::DIRECTION, "import"),
                    KeyCode::Char('e') => fields.set_text(f::DIRECTION, "export"),
                    KeyCode::Up | KeyCode::Down => {
                        let flipped = match Direction::parse(fields.text(f::DIRECTION)) {
                            Some(Direction::Import) => Direction::Export,
                            _ => Direction::Import,
                        };
                        fields.set_text(f::DIRECTION, flipped.as_str());
                    }
                    _ => {}
                }
            }
            // Route: origin and destination text inputs.
            1 => Self::handle_text_pair(app, key, f::ORIGIN, f::DESTINATION),
            // Schedule: departure and arrival date inputs.
            2 => Self::handle_text_pair(app, key, f::DEPARTURE, f::ARRIVAL),
            // Partners: multi-select over the partner table, or branch
            // into partner creation.
            3 => match key {
                KeyCode::Up => {
                    let Some(host) = app.wizard.as_mut() else {
                        return;
                    };
                    host.focus = host.focus.saturating_sub(1);
                }
                KeyCode::Down => {
                    let count = app.partners.len();
                    let Some(host) = app.wizard.as_mut() else {
                        return;
                    };
                    if host.focus + 1 < count {
                        host.focus += 1;
                    }
                }
                KeyCode::Char(' ') => {
                    let Some(idx) = app.wizard.as_ref().map(|h| h.focus) else {
                        return;
                    };
                    let Some(partner) = app.partners.get(idx) else {
                        return;
                    };
                    let value =
                        serde_json::to_value(partner).unwrap_or_default();
                    let Some(host) = app.wizard.as_mut() else {
                        return;
                    };
                    host.focused_session_mut()
                        .fields_mut()
                        .toggle_item(f::PARTNERS, value);
                }
                KeyCode::Char('n') => app.open_partner_subflow(),
                _ => {}
            },
            // Documents: optional multi-select over document kinds.
            4 => match key {
                KeyCode::Up => {
                    let Some(host) = app.wizard.as_mut() else {
                        return;
                    };
                    host.focus = host.focus.saturating_sub(1);
                }
                KeyCode::Down => {
                    let Some(host) = app.wizard.as_mut() else {
                        return;
                    };
                    if host.focus + 1 < DocumentKind::ALL.len() {
                        host.focus += 1;
                    }
                }
                KeyCode::Char(' ') => {
                    let Some(host) = app.wizard.as_mut() else {
                        return;
                    };
                    let doc = DocumentKind::ALL[host.focus];
                    host.focused_session_mut()
                        .fields_mut()
                        .toggle_item(f::DOCUMENTS, serde_json::json!(doc.as_str()));
                }
                _ => {}
            },
            // Review: Enter submits, Esc goes back; nothing else.
            _ => {}
        }
    }

    fn handle_partner_step(app: &mut App, step: usize, key: KeyCode) {
        use partner_fields as f;

        match step {
            // Company name.
            0 => {
                let Some(host) = app.wizard.as_mut() else {
                    return;
                };
                Self::edit_text(host.focused_session_mut().fields_mut(), f::NAME, key);
            }
            // Role: single choice.
            1 => {
                let Some(host) = app.wizard.as_mut() else {
                    return;
                };
                match key {
                    KeyCode::Up => host.focus = host.focus.saturating_sub(1),
                    KeyCode::Down => {
                        if host.focus + 1 < PartnerRole::ALL.len() {
                            host.focus += 1;
                        }
                    }
                    KeyCode::Char(' ') => {}
                    _ => return,
                }
                let role = PartnerRole::ALL[host.focus];
                host.focused_session_mut()
                    .fields_mut()
                    .set_text(f::ROLE, role.as_str());
            }
            // Contact: email and country text inputs.
            2 => Self::handle_text_pair(app, key, f::EMAIL, f::COUNTRY),
            // Review.
            _ => {}
        }
    }

    /// Two stacked text inputs sharing one step; Tab and Up/Down move
    /// focus between them.
    fn handle_text_pair(app: &mut App, key: KeyCode, first: &str, second: &str) {
        let Some(host) = app.wizard.as_mut() else {
            return;
        };
        match key {
            KeyCode::Tab | KeyCode::Down => {
                host.focus = (host.focus + 1) % 2;
            }
            KeyCode::Up => {
                host.focus = host.focus.saturating_sub(1);
            }
            KeyCode::Char(_) | KeyCode::Backspace => {
                let name = if host.focus == 0 { first } else { second };
                Self::edit_text(host.focused_session_mut().fields_mut(), name, key);
            }
            _ => {}
        }
    }

    fn edit_text(fields: &mut FieldStore, name: &str, key: KeyCode) {
        match key {
            KeyCode::Char(c) => {
                let mut value = fields.text(name).to_string();
                value.push(c);
                fields.set_text(name, &value);
            }
            KeyCode::Backspace => {
                let mut value = fields.text(name).to_string();
                value.pop();
                fields.set_text(name, &value);
            }
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::F(1) | KeyCode::Char('?') => {
                app.close_help();
            }
            _ => {}
        }
    }

    fn handle_export_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let filename = app.get_export_filename();
                let result = CsvExporter::export_shipments(&app.shipments, &filename);
                app.set_export_result(result);
            }
            KeyCode::Esc => app.cancel_filename_input(),
            KeyCode::Char(c) => app.filename_input.push(c),
            KeyCode::Backspace => {
                app.filename_input.pop();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::StepView;
    use crate::infrastructure::InMemoryGateway;

    fn app() -> App {
        App::new(Box::new(InMemoryGateway::with_sample_data()))
    }

    fn press(app: &mut App, key: KeyCode) {
        InputHandler::handle_key_event(app, key, KeyModifiers::NONE);
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_dashboard_navigation_and_tabs() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_row, 1);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected_row, 0);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, crate::application::DashboardTab::Partners);
    }

    #[test]
    fn test_s_opens_shipment_wizard() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        assert!(matches!(app.mode, AppMode::Wizard));
        let host = app.wizard.as_ref().unwrap();
        assert_eq!(host.kind, WizardKind::Shipment);
        assert_eq!(host.session.active_index(), 0);
    }

    #[test]
    fn test_direction_step_blocks_then_advances() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));

        // Enter with no direction chosen: blocked.
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.as_ref().unwrap().session.active_index(), 0);

        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.as_ref().unwrap().session.active_index(), 1);
    }

    #[test]
    fn test_route_step_text_entry_with_focus_switch() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Enter);

        type_text(&mut app, "Shanghai");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Rotterdam");

        let host = app.wizard.as_ref().unwrap();
        let fields = host.session.fields();
        assert_eq!(fields.text(shipment_fields::ORIGIN), "Shanghai");
        assert_eq!(fields.text(shipment_fields::DESTINATION), "Rotterdam");
        assert!(host.session.step_ready());
    }

    #[test]
    fn test_partner_toggle_with_space() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "A");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "B");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "2026-10-01");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2026-11-02");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.wizard.as_ref().unwrap().session.active_index(), 3);
        press(&mut app, KeyCode::Char(' '));
        let selected = app
            .wizard
            .as_ref()
            .unwrap()
            .session
            .fields()
            .items(shipment_fields::PARTNERS);
        assert_eq!(selected.len(), 1);

        // Toggling again deselects.
        press(&mut app, KeyCode::Char(' '));
        let selected = app
            .wizard
            .as_ref()
            .unwrap()
            .session
            .fields()
            .items(shipment_fields::PARTNERS);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_n_branches_into_partner_subflow() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "A");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "B");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "2026-10-01");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2026-11-02");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('n'));
        let host = app.wizard.as_ref().unwrap();
        assert!(matches!(host.view, StepView::SubFlow { .. }));
        assert_eq!(host.focused_kind(), WizardKind::Partner);

        // Keystrokes now land in the sub-flow.
        type_text(&mut app, "Delta Lines");
        let host = app.wizard.as_ref().unwrap();
        assert_eq!(
            host.focused_session().fields().text(partner_fields::NAME),
            "Delta Lines"
        );
        assert_eq!(host.session.fields().text(partner_fields::NAME), "");
    }

    #[test]
    fn test_role_step_selects_with_arrows() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        type_text(&mut app, "Acme");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Down);
        let host = app.wizard.as_ref().unwrap();
        assert_eq!(
            host.session.fields().text(partner_fields::ROLE),
            "supplier"
        );
    }

    #[test]
    fn test_esc_cancels_from_first_step() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Esc);
        assert!(app.wizard.is_none());
        assert!(matches!(app.mode, AppMode::Dashboard));
    }

    #[test]
    fn test_export_prompt_flow() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        assert!(matches!(app.mode, AppMode::ExportCsv));

        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, AppMode::Dashboard));
    }

    #[test]
    fn test_help_toggles() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(matches!(app.mode, AppMode::Help));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.help_scroll, 1);
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, AppMode::Dashboard));
    }
}
