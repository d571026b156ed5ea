use ratatui::{
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::application::{App, AppMode, DashboardTab, StepView, WizardHost};
use crate::domain::{
    partner_fields, shipment_fields, DocumentKind, PartnerRole, WizardKind, WizardSession,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    match app.tab {
        DashboardTab::Shipments => render_shipments_table(f, app, chunks[1]),
        DashboardTab::Partners => render_partners_table(f, app, chunks[1]),
    }
    render_status_bar(f, app, chunks[2]);

    if matches!(app.mode, AppMode::Wizard) {
        if let Some(host) = &app.wizard {
            render_wizard_modal(f, app, host);
        }
    }
    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let (shipments_style, partners_style) = match app.tab {
        DashboardTab::Shipments => (
            Style::default().fg(Color::Black).bg(Color::Cyan),
            Style::default().fg(Color::Cyan),
        ),
        DashboardTab::Partners => (
            Style::default().fg(Color::Cyan),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
    };
    let header = Line::from(vec![
        Span::styled("freightdesk ", Style::default().fg(Color::Cyan)),
        Span::styled(
            format!(" Shipments ({}) ", app.shipments.len()),
            shipments_style,
        ),
        Span::raw(" "),
        Span::styled(
            format!(" Partners ({}) ", app.partners.len()),
            partners_style,
        ),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn render_shipments_table(f: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Reference"),
        Cell::from("Dir"),
        Cell::from("Origin"),
        Cell::from("Destination"),
        Cell::from("Departure"),
        Cell::from("Arrival"),
        Cell::from("Partners"),
        Cell::from("Status"),
    ])
    .style(Style::default().fg(Color::Yellow));

    let mut rows = vec![header];
    for (idx, shipment) in app.shipments.iter().enumerate() {
        let style = if idx == app.selected_row {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default()
        };
        rows.push(
            Row::new(vec![
                Cell::from(shipment.reference.clone()),
                Cell::from(shipment.direction.as_str()),
                Cell::from(shipment.origin.clone()),
                Cell::from(shipment.destination.clone()),
                Cell::from(shipment.departure.clone()),
                Cell::from(shipment.arrival.clone()),
                Cell::from(shipment.partner_summary()),
                Cell::from(shipment.status.clone()),
            ])
            .style(style),
        );
    }

    let widths = [
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(12),
        Constraint::Length(8),
    ];
    let table = Table::new(rows, widths)
        .block(Block::default().borders(Borders::ALL).title("Shipments"))
        .column_spacing(1);
    f.render_widget(table, area);
}

fn render_partners_table(f: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Id"),
        Cell::from("Name"),
        Cell::from("Role"),
        Cell::from("Email"),
        Cell::from("Country"),
    ])
    .style(Style::default().fg(Color::Yellow));

    let mut rows = vec![header];
    for (idx, partner) in app.partners.iter().enumerate() {
        let style = if idx == app.selected_row {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default()
        };
        rows.push(
            Row::new(vec![
                Cell::from(partner.id.to_string()),
                Cell::from(partner.name.clone()),
                Cell::from(partner.role.as_str()),
                Cell::from(partner.email.clone()),
                Cell::from(partner.country.clone()),
            ])
            .style(style),
        );
    }

    let widths = [
        Constraint::Length(4),
        Constraint::Length(22),
        Constraint::Length(10),
        Constraint::Min(20),
        Constraint::Length(8),
    ];
    let table = Table::new(rows, widths)
        .block(Block::default().borders(Borders::ALL).title("Partners"))
        .column_spacing(1);
    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.mode {
        AppMode::Dashboard => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "s: new shipment | p: new partner | Tab: switch table | e: export CSV | y: copy ref | r: refresh | F1/?: help | q: quit"
                    .to_string()
            }
        }
        AppMode::Wizard => match &app.wizard {
            Some(host) => wizard_status_line(host),
            None => String::new(),
        },
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
        AppMode::ExportCsv => format!(
            "Export CSV as: {} (Enter to export, Esc to cancel)",
            app.filename_input
        ),
    };

    let style = match app.mode {
        AppMode::Dashboard => Style::default(),
        AppMode::Wizard => Style::default().fg(Color::Green),
        AppMode::Help => Style::default().fg(Color::Cyan),
        AppMode::ExportCsv => Style::default().fg(Color::Magenta),
    };
    let bar = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(bar, area);
}

fn wizard_status_line(host: &WizardHost) -> String {
    let session = host.focused_session();
    if let Some(error) = session.last_error() {
        return format!("✗ {} (Enter to retry, Esc to go back)", error);
    }
    let gate = if session.step_ready() {
        "Enter: next"
    } else {
        "complete this step to continue"
    };
    let mut hints = vec![gate.to_string(), "Esc: back/cancel".to_string()];
    if host.focused_kind() == WizardKind::Shipment
        && session.active_index() == crate::domain::SHIPMENT_PARTNERS_STEP
    {
        hints.push("n: create partner".to_string());
    }
    hints.join(" | ")
}

fn render_wizard_modal(f: &mut Frame, app: &App, host: &WizardHost) {
    let area = f.area();
    let width = (area.width * 7 / 10).clamp(46, 90);
    let height = 16u16.min(area.height.saturating_sub(2));
    let modal = Rect {
        x: area.width.saturating_sub(width) / 2,
        y: area.height.saturating_sub(height) / 2,
        width,
        height,
    };
    f.render_widget(Clear, modal);

    let session = host.focused_session();
    let title = format!(
        " {} - {} [Step {}/{}] ",
        session.title(),
        session.active_step().label(),
        session.active_index() + 1,
        session.step_count(),
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(modal);
    f.render_widget(block, modal);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(description) = session.active_step().description() {
        lines.push(Line::from(Span::styled(
            description.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::default());
    }
    match host.focused_kind() {
        WizardKind::Shipment => {
            shipment_step_lines(app, host, session, &mut lines);
        }
        WizardKind::Partner => {
            partner_step_lines(host, session, &mut lines);
        }
    }
    if let Some(error) = session.last_error() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("✗ {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn text_input_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let marker = if focused { "> " } else { "  " };
    let cursor = if focused { "█" } else { "" };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Green)),
        Span::styled(format!("{:<13}", label), Style::default().fg(Color::Yellow)),
        Span::raw(value),
        Span::styled(cursor, Style::default()),
    ])
}

fn choice_line(label: &str, selected: bool, focused: bool) -> Line<'static> {
    let mark = if selected { "● " } else { "○ " };
    let marker = if focused { "> " } else { "  " };
    let style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(marker.to_string(), Style::default().fg(Color::Green)),
        Span::styled(format!("{}{}", mark, label), style),
    ])
}

fn checkbox_line(label: &str, checked: bool, focused: bool) -> Line<'static> {
    let mark = if checked { "[x] " } else { "[ ] " };
    let marker = if focused { "> " } else { "  " };
    let style = if checked {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(marker.to_string(), Style::default().fg(Color::Green)),
        Span::styled(format!("{}{}", mark, label), style),
    ])
}

fn summary_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<13}", label), Style::default().fg(Color::Yellow)),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

fn shipment_step_lines<'a>(
    app: &'a App,
    host: &'a WizardHost,
    session: &'a WizardSession,
    lines: &mut Vec<Line<'a>>,
) {
    use shipment_fields as f;
    let fields = session.fields();

    match session.active_index() {
        0 => {
            let current = fields.text(f::DIRECTION);
            lines.push(choice_line("import (i)", current == "import", false));
            lines.push(choice_line("export (e)", current == "export", false));
        }
        1 => {
            lines.push(text_input_line("Origin", fields.text(f::ORIGIN), host.focus == 0));
            lines.push(text_input_line(
                "Destination",
                fields.text(f::DESTINATION),
                host.focus == 1,
            ));
        }
        2 => {
            lines.push(text_input_line(
                "Departure",
                fields.text(f::DEPARTURE),
                host.focus == 0,
            ));
            lines.push(text_input_line("Arrival", fields.text(f::ARRIVAL), host.focus == 1));
        }
        3 => {
            if app.partners.is_empty() {
                lines.push(Line::from(Span::styled(
                    "No partners yet - press n to create one",
                    Style::default().fg(Color::Red),
                )));
            }
            for (idx, partner) in app.partners.iter().enumerate() {
                let value = serde_json::to_value(partner).unwrap_or_default();
                let checked = fields.contains_item(f::PARTNERS, &value);
                let label = format!("{} ({})", partner.name, partner.role.as_str());
                lines.push(checkbox_line(&label, checked, idx == host.focus));
            }
        }
        4 => {
            for (idx, doc) in DocumentKind::ALL.iter().enumerate() {
                let checked =
                    fields.contains_item(f::DOCUMENTS, &serde_json::json!(doc.as_str()));
                lines.push(checkbox_line(doc.label(), checked, idx == host.focus));
            }
        }
        _ => {
            lines.push(summary_line("Direction", fields.text(f::DIRECTION).to_string()));
            lines.push(summary_line(
                "Route",
                format!("{} → {}", fields.text(f::ORIGIN), fields.text(f::DESTINATION)),
            ));
            lines.push(summary_line(
                "Schedule",
                format!("{} → {}", fields.text(f::DEPARTURE), fields.text(f::ARRIVAL)),
            ));
            let partners = fields
                .items(f::PARTNERS)
                .iter()
                .filter_map(|p| p.get("name").and_then(serde_json::Value::as_str))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(summary_line("Partners", partners));
            lines.push(summary_line(
                "Documents",
                fields.items(f::DOCUMENTS).len().to_string(),
            ));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "Enter: submit",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
        }
    }
}

fn partner_step_lines<'a>(
    host: &'a WizardHost,
    session: &'a WizardSession,
    lines: &mut Vec<Line<'a>>,
) {
    use partner_fields as f;
    let fields = session.fields();

    match session.active_index() {
        0 => {
            lines.push(text_input_line("Name", fields.text(f::NAME), true));
        }
        1 => {
            let current = fields.text(f::ROLE);
            for (idx, role) in PartnerRole::ALL.iter().enumerate() {
                lines.push(choice_line(
                    role.as_str(),
                    current == role.as_str(),
                    idx == host.focus,
                ));
            }
        }
        2 => {
            lines.push(text_input_line("Email", fields.text(f::EMAIL), host.focus == 0));
            lines.push(text_input_line("Country", fields.text(f::COUNTRY), host.focus == 1));
        }
        _ => {
            lines.push(summary_line("Name", fields.text(f::NAME).to_string()));
            lines.push(summary_line("Role", fields.text(f::ROLE).to_string()));
            lines.push(summary_line("Email", fields.text(f::EMAIL).to_string()));
            lines.push(summary_line("Country", fields.text(f::COUNTRY).to_string()));
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "Enter: submit",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
        }
    }

    if matches!(host.view, StepView::SubFlow { .. }) {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "(creating a partner for the current shipment)",
            Style::default().fg(Color::DarkGray),
        )));
    }
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());
    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("freightdesk Help (Line {}/{})", start_line + 1, help_lines.len()))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> String {
    r#"FREIGHTDESK REFERENCE

=== DASHBOARD ===
Tab             Switch between Shipments and Partners tables
↑↓ or j/k       Move row selection
s               Open the Create Shipment wizard
p               Open the Create Partner wizard
e               Export the shipments table to CSV
y               Copy the selected shipment reference to the clipboard
r               Refetch both tables from the backend
F1 or ?         Show this help
q               Quit application

=== WIZARDS ===
Wizards collect a record across ordered steps. Enter moves forward only
when the current step is complete; the status bar tells you what is
missing. Esc always goes back one step, and cancels the wizard from the
first step. Nothing is sent to the backend until you submit from the
final Review step.

Create Shipment steps:
  1. Direction    i/e or ↑↓ to choose import or export
  2. Route        origin and destination, Tab to switch fields
  3. Schedule     departure and arrival dates as YYYY-MM-DD
  4. Partners     ↑↓ to move, Space to select, n to create a partner
                  in place (the new partner is selected automatically)
  5. Documents    optional, Space to attach paperwork kinds
  6. Review       Enter submits

Create Partner steps:
  1. Company      legal name
  2. Role         carrier, supplier, broker, or consignee
  3. Contact      email (required) and country (optional)
  4. Review       Enter submits

If a submission fails, the error is shown, your input is kept, and
Enter retries. Esc steps back to correct earlier answers.

=== BACKEND ===
By default freightdesk runs against a built-in sample backend. Set the
FREIGHTDESK_API environment variable to a base URL (for example
https://api.example.test) to work against a remote server instead.

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window"#
        .to_string()
}
