use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{DomainError, DomainResult};

/// Direction of goods movement for a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Import,
    Export,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "import" => Some(Direction::Import),
            "export" => Some(Direction::Export),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Import => "import",
            Direction::Export => "export",
        }
    }
}

/// Role a trade partner plays in a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerRole {
    Carrier,
    Supplier,
    Broker,
    Consignee,
}

impl PartnerRole {
    pub const ALL: [PartnerRole; 4] = [
        PartnerRole::Carrier,
        PartnerRole::Supplier,
        PartnerRole::Broker,
        PartnerRole::Consignee,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "carrier" => Some(PartnerRole::Carrier),
            "supplier" => Some(PartnerRole::Supplier),
            "broker" => Some(PartnerRole::Broker),
            "consignee" => Some(PartnerRole::Consignee),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PartnerRole::Carrier => "carrier",
            PartnerRole::Supplier => "supplier",
            PartnerRole::Broker => "broker",
            PartnerRole::Consignee => "consignee",
        }
    }
}

/// A trade partner record as returned by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: u64,
    pub name: String,
    pub role: PartnerRole,
    pub email: String,
    #[serde(default)]
    pub country: String,
}

impl Partner {
    /// Decodes a gateway receipt into a partner record.
    pub fn from_value(value: &Value) -> DomainResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| DomainError::MalformedRecord(format!("partner: {}", e)))
    }
}

/// Paperwork categories attachable to a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    BillOfLading,
    CommercialInvoice,
    PackingList,
    CertificateOfOrigin,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::BillOfLading,
        DocumentKind::CommercialInvoice,
        DocumentKind::PackingList,
        DocumentKind::CertificateOfOrigin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::BillOfLading => "bill_of_lading",
            DocumentKind::CommercialInvoice => "commercial_invoice",
            DocumentKind::PackingList => "packing_list",
            DocumentKind::CertificateOfOrigin => "certificate_of_origin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::BillOfLading => "Bill of Lading",
            DocumentKind::CommercialInvoice => "Commercial Invoice",
            DocumentKind::PackingList => "Packing List",
            DocumentKind::CertificateOfOrigin => "Certificate of Origin",
        }
    }
}

/// A shipment record as returned by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: u64,
    /// Server-assigned human reference, e.g. "SHP-1007".
    pub reference: String,
    pub direction: Direction,
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    #[serde(default)]
    pub partners: Vec<Partner>,
    #[serde(default)]
    pub documents: Vec<DocumentKind>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "draft".to_string()
}

impl Shipment {
    /// Decodes a gateway receipt into a shipment record.
    pub fn from_value(value: &Value) -> DomainResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| DomainError::MalformedRecord(format!("shipment: {}", e)))
    }

    /// Short partner summary for table rendering, e.g. "Acme +2".
    pub fn partner_summary(&self) -> String {
        match self.partners.as_slice() {
            [] => "-".to_string(),
            [only] => only.name.clone(),
            [first, rest @ ..] => format!("{} +{}", first.name, rest.len()),
        }
    }
}
