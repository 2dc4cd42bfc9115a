use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::constants::SUCCESS_MESSAGE;

/// A sheet received from an uploader; lives for one request only
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Hex SHA-256 of the raw bytes, used to correlate uploads in logs
    pub fn fingerprint(&self) -> String {
        let mut h = Sha256::new();
        h.update(&self.content);
        hex::encode(h.finalize())
    }
}

/// Decimal amount serialized as text with exactly two fraction digits
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Money(pub f64);

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One normalized inventory row, sent downstream as the product-creation body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowRecord {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub opening_stock: i64,
    pub purchase_stock: i64,
    pub units_sold: i64,
    pub hand_in_stock: i64,
    pub cost_price_per_unit: Money,
    pub cost_price_total: Money,
}

/// Downstream body as relayed to the uploader
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DownstreamBody {
    Json(serde_json::Value),
    Text(String),
}

/// Result of forwarding one row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardingOutcome {
    pub status_code: u16,
    pub response: DownstreamBody,
}

/// Success payload for a fully processed upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub message: String,
    pub responses: Vec<ForwardingOutcome>,
}

impl UploadSummary {
    pub fn new(responses: Vec<ForwardingOutcome>) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            responses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_record_wire_shape() {
        let record = RowRecord {
            product_id: Some("P-1".into()),
            product_name: None,
            opening_stock: 10,
            units_sold: 3,
            cost_price_per_unit: Money(2.5),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "product_id": "P-1",
                "product_name": null,
                "opening_stock": 10,
                "purchase_stock": 0,
                "units_sold": 3,
                "hand_in_stock": 0,
                "cost_price_per_unit": "2.50",
                "cost_price_total": "0.00",
            })
        );
    }

    #[test]
    fn test_money_rounds_to_two_places() {
        assert_eq!(Money(1.0 / 3.0).to_string(), "0.33");
        assert_eq!(Money(19.999).to_string(), "20.00");
        assert_eq!(Money(-4.2).to_string(), "-4.20");
    }

    #[test]
    fn test_outcome_body_is_untagged() {
        let json_outcome = ForwardingOutcome {
            status_code: 200,
            response: DownstreamBody::Json(json!({"ok": true})),
        };
        let text_outcome = ForwardingOutcome {
            status_code: 422,
            response: DownstreamBody::Text("bad product".into()),
        };
        assert_eq!(
            serde_json::to_value(vec![json_outcome, text_outcome]).unwrap(),
            json!([
                {"status_code": 200, "response": {"ok": true}},
                {"status_code": 422, "response": "bad product"},
            ])
        );
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let upload = UploadedFile::new("a.csv", b"abc".to_vec());
        assert_eq!(
            upload.fingerprint(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
