use crate::domain::model::{ExtractionResult, RawExtraction};
use serde_json::Value;

/// Canonicalizes a raw record into the finalized output shape. This is the
/// single point where output values are guaranteed well-formed, whichever
/// path (rules or LLM) produced the raw record. Coercion never fails: a
/// value that cannot be interpreted becomes null.
pub fn normalize(raw: RawExtraction, fallback_id: &str) -> ExtractionResult {
    ExtractionResult {
        id: raw.id.unwrap_or_else(|| fallback_id.to_string()),
        product_line: raw.product_line,
        origin_port_code: raw.origin_port_code,
        origin_port_name: raw.origin_port_name,
        destination_port_code: raw.destination_port_code,
        destination_port_name: raw.destination_port_name,
        incoterm: normalize_incoterm(raw.incoterm),
        cargo_weight_kg: round_quantity(raw.cargo_weight_kg),
        cargo_cbm: round_quantity(raw.cargo_cbm),
        is_dangerous: raw.is_dangerous.unwrap_or(false),
    }
}

/// Rounds to 2 decimal places. Accepts JSON numbers and numeric strings;
/// anything else, including negative quantities, coerces to null.
pub fn round_quantity(value: Option<Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() || number < 0.0 {
        return None;
    }
    Some(round2(number))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Trims and upper-cases the incoterm; an empty string after trimming is
/// treated as absent. Non-string scalars are stringified first.
fn normalize_incoterm(value: Option<Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s,
        Value::Null => return None,
        other => other.to_string(),
    };
    let normalized = text.trim().to_uppercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_quantity_rounds_to_two_decimals() {
        assert_eq!(round_quantity(Some(json!(12.345))), Some(12.35));
        assert_eq!(round_quantity(Some(json!(4.53592))), Some(4.54));
        assert_eq!(round_quantity(Some(json!(0.0))), Some(0.0));
        assert_eq!(round_quantity(Some(json!(2000))), Some(2000.0));
    }

    #[test]
    fn test_round_quantity_coerces_garbage_to_null() {
        assert_eq!(round_quantity(None), None);
        assert_eq!(round_quantity(Some(Value::Null)), None);
        assert_eq!(round_quantity(Some(json!("abc"))), None);
        assert_eq!(round_quantity(Some(json!([1, 2]))), None);
        assert_eq!(round_quantity(Some(json!(-5.0))), None);
    }

    #[test]
    fn test_round_quantity_parses_numeric_strings() {
        assert_eq!(round_quantity(Some(json!("  12.345 "))), Some(12.35));
    }

    #[test]
    fn test_incoterm_normalization() {
        let raw = RawExtraction {
            id: Some("e1".to_string()),
            incoterm: Some(json!("  cif ")),
            ..Default::default()
        };
        assert_eq!(normalize(raw, "e1").incoterm, Some("CIF".to_string()));

        let raw = RawExtraction {
            incoterm: Some(json!("   ")),
            ..Default::default()
        };
        assert_eq!(normalize(raw, "e2").incoterm, None);

        let raw = RawExtraction::default();
        assert_eq!(normalize(raw, "e3").incoterm, None);
    }

    #[test]
    fn test_missing_id_falls_back_to_email_id() {
        let result = normalize(RawExtraction::default(), "mail-7");
        assert_eq!(result.id, "mail-7");
        assert!(!result.is_dangerous);
    }

    #[test]
    fn test_normalizer_is_idempotent() {
        let raw = RawExtraction {
            id: Some("e9".to_string()),
            product_line: Some("pl_sea_import_lcl".to_string()),
            incoterm: Some(json!(" fob ")),
            cargo_weight_kg: Some(json!(1234.567)),
            cargo_cbm: Some(json!("7.891")),
            is_dangerous: Some(true),
            ..Default::default()
        };
        let once = normalize(raw, "e9");

        // Feed the finalized record back through as a raw record.
        let reparsed: RawExtraction =
            serde_json::from_value(serde_json::to_value(&once).unwrap()).unwrap();
        let twice = normalize(reparsed, "e9");

        assert_eq!(once, twice);
    }
}
