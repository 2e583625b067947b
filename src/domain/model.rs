use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One inbound logistics email. Input records are never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// One row of the UN/LOCODE reference table. Entries missing either field
/// are skipped during index construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortReferenceEntry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Pre-normalization extraction output. Numeric and incoterm fields stay as
/// raw JSON values because the LLM path can hand back strings ("12,5"),
/// numbers, or garbage; the normalizer owns the coercion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawExtraction {
    pub id: Option<String>,
    pub product_line: Option<String>,
    pub origin_port_code: Option<String>,
    pub origin_port_name: Option<String>,
    pub destination_port_code: Option<String>,
    pub destination_port_name: Option<String>,
    pub incoterm: Option<Value>,
    pub cargo_weight_kg: Option<Value>,
    pub cargo_cbm: Option<Value>,
    pub is_dangerous: Option<bool>,
}

/// Finalized extraction record, one per input email. Field declaration order
/// is the stable serialization order of the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub id: String,
    pub product_line: Option<String>,
    pub origin_port_code: Option<String>,
    pub origin_port_name: Option<String>,
    pub destination_port_code: Option<String>,
    pub destination_port_name: Option<String>,
    pub incoterm: Option<String>,
    pub cargo_weight_kg: Option<f64>,
    pub cargo_cbm: Option<f64>,
    #[serde(default)]
    pub is_dangerous: bool,
}

impl ExtractionResult {
    /// All-null record substituted when extraction fails for one email.
    /// The id is preserved so the batch stays 1:1 with its input.
    pub fn null_record(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            product_line: None,
            origin_port_code: None,
            origin_port_name: None,
            destination_port_code: None,
            destination_port_name: None,
            incoterm: None,
            cargo_weight_kg: None,
            cargo_cbm: None,
            is_dangerous: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub results: Vec<ExtractionResult>,
    pub llm_extracted: usize,
    pub rule_extracted: usize,
    pub failed: usize,
}
