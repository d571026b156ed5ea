//! Gateways to the trade backend.
//!
//! The application pulls its tables from, and submits wizard payloads to,
//! a [`TradeApi`]. Two implementations exist: [`InMemoryGateway`], a local
//! mock backend with sample data used when no remote is configured, and
//! [`HttpGateway`], which talks JSON over HTTP to a real server.
//! [`EndpointAdapter`] narrows a `TradeApi` to the single endpoint a
//! wizard session submits to.

use serde_json::{json, Value};

use crate::domain::{Partner, Shipment, SubmissionAdapter, SubmissionError, WizardKind};

/// The remote API surface the dashboard depends on.
///
/// Each UI region refetches through these calls after a mutation rather
/// than mirroring server state locally.
pub trait TradeApi {
    fn create_shipment(&mut self, payload: Value) -> Result<Value, SubmissionError>;
    fn create_partner(&mut self, payload: Value) -> Result<Value, SubmissionError>;
    fn list_shipments(&mut self) -> Result<Vec<Shipment>, SubmissionError>;
    fn list_partners(&mut self) -> Result<Vec<Partner>, SubmissionError>;
}

/// Bridges a [`TradeApi`] to the wizard engine's [`SubmissionAdapter`],
/// routing the payload to the endpoint matching the flow kind.
pub struct EndpointAdapter<'a> {
    api: &'a mut dyn TradeApi,
    kind: WizardKind,
}

impl<'a> EndpointAdapter<'a> {
    pub fn new(api: &'a mut dyn TradeApi, kind: WizardKind) -> Self {
        Self { api, kind }
    }
}

impl SubmissionAdapter for EndpointAdapter<'_> {
    fn submit(&mut self, payload: Value) -> Result<Value, SubmissionError> {
        match self.kind {
            WizardKind::Shipment => self.api.create_shipment(payload),
            WizardKind::Partner => self.api.create_partner(payload),
        }
    }
}

/// Local mock backend: assigns ids and references, keeps records in
/// memory, and never fails.
pub struct InMemoryGateway {
    next_shipment_id: u64,
    next_partner_id: u64,
    shipments: Vec<Value>,
    partners: Vec<Value>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self {
            next_shipment_id: 1,
            next_partner_id: 1,
            shipments: Vec::new(),
            partners: Vec::new(),
        }
    }
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway pre-seeded with a few partners and shipments so the
    /// dashboard has something to show offline.
    pub fn with_sample_data() -> Self {
        let mut gateway = Self::new();
        let acme = gateway
            .create_partner(json!({
                "name": "Acme Freight",
                "role": "carrier",
                "email": "ops@acmefreight.test",
                "country": "NL"
            }))
            .expect("in-memory create cannot fail");
        let borealis = gateway
            .create_partner(json!({
                "name": "Borealis Metals",
                "role": "supplier",
                "email": "sales@borealis.test",
                "country": "SE"
            }))
            .expect("in-memory create cannot fail");
        gateway
            .create_partner(json!({
                "name": "Cimbria Customs",
                "role": "broker",
                "email": "desk@cimbria.test",
                "country": "DK"
            }))
            .expect("in-memory create cannot fail");

        gateway
            .create_shipment(json!({
                "direction": "import",
                "origin": "Shanghai",
                "destination": "Rotterdam",
                "departure": "2026-08-02",
                "arrival": "2026-09-05",
                "partners": [acme.clone(), borealis],
                "documents": ["bill_of_lading", "commercial_invoice"]
            }))
            .expect("in-memory create cannot fail");
        gateway
            .create_shipment(json!({
                "direction": "export",
                "origin": "Rotterdam",
                "destination": "Santos",
                "departure": "2026-08-20",
                "arrival": "2026-09-12",
                "partners": [acme],
                "documents": ["packing_list"]
            }))
            .expect("in-memory create cannot fail");
        gateway
    }
}

impl TradeApi for InMemoryGateway {
    fn create_shipment(&mut self, payload: Value) -> Result<Value, SubmissionError> {
        let id = self.next_shipment_id;
        self.next_shipment_id += 1;

        let mut record = payload;
        let object = record
            .as_object_mut()
            .ok_or_else(|| SubmissionError::new("Shipment payload must be an object"))?;
        object.insert("id".to_string(), json!(id));
        object.insert("reference".to_string(), json!(format!("SHP-{}", 1000 + id)));
        object.insert("status".to_string(), json!("booked"));

        self.shipments.push(record.clone());
        Ok(record)
    }

    fn create_partner(&mut self, payload: Value) -> Result<Value, SubmissionError> {
        let id = self.next_partner_id;
        self.next_partner_id += 1;

        let mut record = payload;
        let object = record
            .as_object_mut()
            .ok_or_else(|| SubmissionError::new("Partner payload must be an object"))?;
        object.insert("id".to_string(), json!(id));

        self.partners.push(record.clone());
        Ok(record)
    }

    fn list_shipments(&mut self) -> Result<Vec<Shipment>, SubmissionError> {
        self.shipments
            .iter()
            .map(|v| Shipment::from_value(v).map_err(|e| SubmissionError::new(e.to_string())))
            .collect()
    }

    fn list_partners(&mut self) -> Result<Vec<Partner>, SubmissionError> {
        self.partners
            .iter()
            .map(|v| Partner::from_value(v).map_err(|e| SubmissionError::new(e.to_string())))
            .collect()
    }
}

/// JSON-over-HTTP backend: POST to create, GET to list.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn post(&self, path: &str, payload: &Value) -> Result<Value, SubmissionError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .map_err(|e| SubmissionError::new(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let detail = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(SubmissionError::new(format!("Server rejected request: {}", detail)));
        }
        response
            .json()
            .map_err(|e| SubmissionError::new(format!("Bad response body: {}", e)))
    }

    fn get(&self, path: &str) -> Result<Value, SubmissionError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| SubmissionError::new(format!("Network error: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubmissionError::new(format!("Fetch failed: {}", status)));
        }
        response
            .json()
            .map_err(|e| SubmissionError::new(format!("Bad response body: {}", e)))
    }
}

impl TradeApi for HttpGateway {
    fn create_shipment(&mut self, payload: Value) -> Result<Value, SubmissionError> {
        self.post("/shipments", &payload)
    }

    fn create_partner(&mut self, payload: Value) -> Result<Value, SubmissionError> {
        self.post("/partners", &payload)
    }

    fn list_shipments(&mut self) -> Result<Vec<Shipment>, SubmissionError> {
        let body = self.get("/shipments")?;
        serde_json::from_value(body)
            .map_err(|e| SubmissionError::new(format!("Bad shipment list: {}", e)))
    }

    fn list_partners(&mut self) -> Result<Vec<Partner>, SubmissionError> {
        let body = self.get("/partners")?;
        serde_json::from_value(body)
            .map_err(|e| SubmissionError::new(format!("Bad partner list: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PartnerRole;

    #[test]
    fn test_create_partner_assigns_ids_in_order() {
        let mut gateway = InMemoryGateway::new();
        let first = gateway
            .create_partner(json!({"name": "A", "role": "carrier", "email": "a@a.test"}))
            .unwrap();
        let second = gateway
            .create_partner(json!({"name": "B", "role": "broker", "email": "b@b.test"}))
            .unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
    }

    #[test]
    fn test_create_shipment_assigns_reference_and_status() {
        let mut gateway = InMemoryGateway::new();
        let record = gateway
            .create_shipment(json!({
                "direction": "import",
                "origin": "A",
                "destination": "B",
                "departure": "2026-01-01",
                "arrival": "2026-01-09",
                "partners": [],
                "documents": []
            }))
            .unwrap();
        assert_eq!(record["reference"], "SHP-1001");
        assert_eq!(record["status"], "booked");
    }

    #[test]
    fn test_created_records_show_up_in_lists() {
        let mut gateway = InMemoryGateway::new();
        gateway
            .create_partner(json!({"name": "Acme", "role": "carrier", "email": "a@a.test"}))
            .unwrap();
        let partners = gateway.list_partners().unwrap();
        assert_eq!(partners.len(), 1);
        assert_eq!(partners[0].name, "Acme");
        assert_eq!(partners[0].role, PartnerRole::Carrier);
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        let mut gateway = InMemoryGateway::new();
        let err = gateway.create_shipment(json!("nope")).unwrap_err();
        assert!(err.message.contains("must be an object"));
    }

    #[test]
    fn test_sample_data_is_decodable() {
        let mut gateway = InMemoryGateway::with_sample_data();
        let shipments = gateway.list_shipments().unwrap();
        let partners = gateway.list_partners().unwrap();
        assert_eq!(shipments.len(), 2);
        assert_eq!(partners.len(), 3);
        assert_eq!(shipments[0].partners.len(), 2);
    }

    #[test]
    fn test_endpoint_adapter_routes_by_kind() {
        let mut gateway = InMemoryGateway::new();
        {
            let mut endpoint = EndpointAdapter::new(&mut gateway, WizardKind::Partner);
            endpoint
                .submit(json!({"name": "Acme", "role": "carrier", "email": "a@a.test"}))
                .unwrap();
        }
        assert_eq!(gateway.list_partners().unwrap().len(), 1);
        assert!(gateway.list_shipments().unwrap().is_empty());
    }
}
