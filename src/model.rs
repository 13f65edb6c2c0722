//! Wire model for the extraction service.

use serde::{Deserialize, Serialize};

/// Header-level fields extracted from the invoice.
///
/// The service makes no promise that numeric-looking fields parse as
/// numbers; everything is a display string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub invoice_date: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub subtotal: String,
    #[serde(default)]
    pub tax: String,
    #[serde(default)]
    pub total: String,
}

/// One row of the invoice's line-item table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit_price: String,
    #[serde(default)]
    pub amount: String,
}

/// Full response of `POST /api/extract`; also the request body of
/// `POST /api/export`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub summary: Summary,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// Column order of the clipboard TSV, matching the wire field names.
const TSV_HEADER: &str = "description\tquantity\tunit_price\tamount";

impl ExtractionResult {
    /// Serialize the line items as tab-separated rows with a header row.
    ///
    /// The summary is deliberately not included; rows are joined by `\n`
    /// with no trailing newline.
    pub fn line_items_tsv(&self) -> String {
        let mut rows = vec![TSV_HEADER.to_string()];
        rows.extend(self.line_items.iter().map(|item| {
            [
                item.description.as_str(),
                item.quantity.as_str(),
                item.unit_price.as_str(),
                item.amount.as_str(),
            ]
            .join("\t")
        }));
        rows.join("\n")
    }
}

/// Trim a free-text field for display, substituting a placeholder when
/// the service returned nothing usable.
pub fn display_field(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() { "—" } else { trimmed }
}
