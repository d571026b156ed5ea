//! Step configuration for the freightdesk creation flows.
//!
//! Each flow is an ordered list of [`StepDefinition`]s plus a payload
//! mapper, handed to the wizard engine as a [`WizardConfig`]. Field names
//! used by validators, mappers, and the presentation layer live here as
//! constants so the three stay in sync.

use serde_json::json;

use super::wizard::{FieldStore, StepDefinition, WizardConfig};

/// Which configured flow a wizard session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardKind {
    Shipment,
    Partner,
}

/// Index of the shipment wizard's Partners step, the only step that may
/// branch into the partner sub-flow.
pub const SHIPMENT_PARTNERS_STEP: usize = 3;

/// Field names for the shipment flow.
pub mod shipment_fields {
    pub const DIRECTION: &str = "direction";
    pub const ORIGIN: &str = "origin";
    pub const DESTINATION: &str = "destination";
    pub const DEPARTURE: &str = "departure";
    pub const ARRIVAL: &str = "arrival";
    /// List of partner records (JSON objects) attached to the shipment.
    pub const PARTNERS: &str = "partners";
    /// List of document kind strings, optional.
    pub const DOCUMENTS: &str = "documents";
}

/// Field names for the partner flow.
pub mod partner_fields {
    pub const NAME: &str = "name";
    pub const ROLE: &str = "role";
    pub const EMAIL: &str = "email";
    pub const COUNTRY: &str = "country";
}

/// Loose YYYY-MM-DD shape check; real range validation is the backend's
/// job.
fn is_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Builds the "Create Shipment" flow.
///
/// Six steps: direction, route, schedule, partners (where the partner
/// sub-flow can branch off), optional documents, and review.
pub fn shipment_wizard() -> WizardConfig {
    use shipment_fields as f;

    WizardConfig::new(
        "Create Shipment",
        vec![
            StepDefinition::new("Direction")
                .with_description("Is this an import or an export?")
                .requires(|fields: &FieldStore| fields.has_text(f::DIRECTION)),
            StepDefinition::new("Route")
                .with_description("Origin and destination ports")
                .requires(|fields: &FieldStore| {
                    fields.has_text(f::ORIGIN) && fields.has_text(f::DESTINATION)
                }),
            StepDefinition::new("Schedule")
                .with_description("Departure and arrival dates (YYYY-MM-DD)")
                .requires(|fields: &FieldStore| {
                    is_iso_date(fields.text(f::DEPARTURE)) && is_iso_date(fields.text(f::ARRIVAL))
                }),
            StepDefinition::new("Partners")
                .with_description("Select at least one partner, or create a new one")
                .requires(|fields: &FieldStore| !fields.items(f::PARTNERS).is_empty()),
            StepDefinition::new("Documents")
                .with_description("Optional paperwork to attach"),
            StepDefinition::new("Review")
                .with_description("Check the details, then submit"),
        ],
        |fields| {
            json!({
                "direction": fields.text(f::DIRECTION),
                "origin": fields.text(f::ORIGIN),
                "destination": fields.text(f::DESTINATION),
                "departure": fields.text(f::DEPARTURE),
                "arrival": fields.text(f::ARRIVAL),
                "partners": fields.items(f::PARTNERS),
                "documents": fields.items(f::DOCUMENTS),
            })
        },
    )
}

/// Builds the "Create Partner" flow.
///
/// Used both standalone from the dashboard and as the sub-flow branched
/// from the shipment wizard's Partners step.
pub fn partner_wizard() -> WizardConfig {
    use partner_fields as f;

    WizardConfig::new(
        "Create Partner",
        vec![
            StepDefinition::new("Company")
                .with_description("Legal name of the partner")
                .requires(|fields: &FieldStore| fields.has_text(f::NAME)),
            StepDefinition::new("Role")
                .with_description("What this partner does for you")
                .requires(|fields: &FieldStore| fields.has_text(f::ROLE)),
            StepDefinition::new("Contact")
                .with_description("Operational email address")
                .requires(|fields: &FieldStore| fields.text(f::EMAIL).contains('@')),
            StepDefinition::new("Review")
                .with_description("Check the details, then submit"),
        ],
        |fields| {
            json!({
                "name": fields.text(f::NAME),
                "role": fields.text(f::ROLE),
                "email": fields.text(f::EMAIL),
                "country": fields.text(f::COUNTRY),
            })
        },
    )
}

/// Builds the config for the given flow kind.
pub fn wizard_for(kind: WizardKind) -> WizardConfig {
    match kind {
        WizardKind::Shipment => shipment_wizard(),
        WizardKind::Partner => partner_wizard(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wizard::WizardSession;
    use serde_json::json;

    #[test]
    fn test_is_iso_date() {
        assert!(is_iso_date("2026-09-01"));
        assert!(!is_iso_date(""));
        assert!(!is_iso_date("2026-9-1"));
        assert!(!is_iso_date("2026/09/01"));
        assert!(!is_iso_date("tomorrow"));
    }

    #[test]
    fn test_direction_step_blocks_on_empty_type() {
        let mut session = WizardSession::new(shipment_wizard());
        session.fields_mut().set_text(shipment_fields::DIRECTION, "");
        assert!(!session.step_ready());

        session
            .fields_mut()
            .set_text(shipment_fields::DIRECTION, "import");
        assert!(session.step_ready());
    }

    #[test]
    fn test_route_step_requires_both_ends() {
        let mut session = WizardSession::new(shipment_wizard());
        session
            .fields_mut()
            .set_text(shipment_fields::ORIGIN, "Rotterdam");
        assert!(!session.step_ready_at(1));

        session
            .fields_mut()
            .set_text(shipment_fields::DESTINATION, "Singapore");
        assert!(session.step_ready_at(1));
    }

    #[test]
    fn test_schedule_step_requires_both_dates() {
        let mut session = WizardSession::new(shipment_wizard());
        session
            .fields_mut()
            .set_text(shipment_fields::DEPARTURE, "2026-09-01");
        assert!(!session.step_ready_at(2));

        session
            .fields_mut()
            .set_text(shipment_fields::ARRIVAL, "2026-09-28");
        assert!(session.step_ready_at(2));
    }

    #[test]
    fn test_partners_step_requires_a_selection() {
        let mut session = WizardSession::new(shipment_wizard());
        assert!(!session.step_ready_at(3));

        session
            .fields_mut()
            .push_item(shipment_fields::PARTNERS, json!({"id": 1, "name": "Acme"}));
        assert!(session.step_ready_at(3));
    }

    #[test]
    fn test_documents_and_review_steps_are_optional() {
        let session = WizardSession::new(shipment_wizard());
        assert!(session.step_ready_at(4));
        assert!(session.step_ready_at(5));
    }

    #[test]
    fn test_partner_contact_wants_an_email() {
        let mut session = WizardSession::new(partner_wizard());
        session
            .fields_mut()
            .set_text(partner_fields::EMAIL, "not-an-email");
        assert!(!session.step_ready_at(2));

        session
            .fields_mut()
            .set_text(partner_fields::EMAIL, "ops@acme.test");
        assert!(session.step_ready_at(2));
    }

    #[test]
    fn test_shipment_payload_shape() {
        let config = shipment_wizard();
        let mut session = WizardSession::new(config);
        let fields = session.fields_mut();
        fields.set_text(shipment_fields::DIRECTION, "export");
        fields.set_text(shipment_fields::ORIGIN, "Rotterdam");
        fields.set_text(shipment_fields::DESTINATION, "Singapore");
        fields.set_text(shipment_fields::DEPARTURE, "2026-09-01");
        fields.set_text(shipment_fields::ARRIVAL, "2026-09-28");
        fields.push_item(shipment_fields::PARTNERS, json!({"id": 42, "name": "Acme"}));

        struct Capture(Option<serde_json::Value>);
        impl crate::domain::wizard::SubmissionAdapter for Capture {
            fn submit(
                &mut self,
                payload: serde_json::Value,
            ) -> Result<serde_json::Value, crate::domain::SubmissionError> {
                self.0 = Some(payload);
                Ok(json!({}))
            }
        }

        let mut capture = Capture(None);
        // Walk to the terminal step and submit.
        for _ in 0..session.step_count() {
            session.next(&mut capture);
        }
        let payload = capture.0.expect("payload submitted");
        assert_eq!(payload["direction"], "export");
        assert_eq!(payload["partners"][0]["id"], 42);
        assert_eq!(payload["documents"], json!([]));
    }
}
