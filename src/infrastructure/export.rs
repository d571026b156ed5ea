use csv::Writer;

use crate::domain::Shipment;

/// Writes the shipments table to disk as CSV.
pub struct CsvExporter;

impl CsvExporter {
    pub fn export_shipments(shipments: &[Shipment], filename: &str) -> Result<String, String> {
        let mut writer = Writer::from_path(filename).map_err(|e| e.to_string())?;

        writer
            .write_record([
                "reference",
                "direction",
                "origin",
                "destination",
                "departure",
                "arrival",
                "status",
                "partners",
            ])
            .map_err(|e| e.to_string())?;

        for shipment in shipments {
            let partners = shipment
                .partners
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            writer
                .write_record([
                    shipment.reference.as_str(),
                    shipment.direction.as_str(),
                    shipment.origin.as_str(),
                    shipment.destination.as_str(),
                    shipment.departure.as_str(),
                    shipment.arrival.as_str(),
                    shipment.status.as_str(),
                    partners.as_str(),
                ])
                .map_err(|e| e.to_string())?;
        }

        writer.flush().map_err(|e| e.to_string())?;
        Ok(filename.to_string())
    }
}
