use crate::core::normalize::round2;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Fields scored by the evaluation, in report order.
pub const EVAL_FIELDS: [&str; 9] = [
    "product_line",
    "origin_port_code",
    "origin_port_name",
    "destination_port_code",
    "destination_port_name",
    "incoterm",
    "cargo_weight_kg",
    "cargo_cbm",
    "is_dangerous",
];

#[derive(Debug, Clone, Serialize)]
pub struct FieldAccuracy {
    pub field: String,
    pub correct: usize,
    pub total: usize,
}

impl FieldAccuracy {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub generated_at: String,
    pub fields: Vec<FieldAccuracy>,
    pub correct_values: usize,
    pub total_values: usize,
}

impl EvaluationReport {
    pub fn overall_percent(&self) -> f64 {
        if self.total_values == 0 {
            0.0
        } else {
            self.correct_values as f64 / self.total_values as f64 * 100.0
        }
    }
}

/// Field comparison policy: both-null matches, one-sided null does not;
/// anything numeric on either side is compared at 2 decimals; everything
/// else as case-insensitive, whitespace-trimmed text.
pub fn compare_field(a: &Value, b: &Value) -> bool {
    if a.is_null() && b.is_null() {
        return true;
    }
    if a.is_null() || b.is_null() {
        return false;
    }
    if a.is_number() || b.is_number() {
        return match (coerce_f64(a), coerce_f64(b)) {
            (Some(x), Some(y)) => round2(x) == round2(y),
            _ => false,
        };
    }
    text_of(a).trim().to_lowercase() == text_of(b).trim().to_lowercase()
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Joins output and ground truth by `id` and scores every field of every
/// joined record. Output records whose id is absent from the truth set are
/// skipped, matching the original scoring behavior.
pub fn evaluate(output: &[Value], truth: &[Value]) -> EvaluationReport {
    let truth_by_id: HashMap<&str, &Value> = truth
        .iter()
        .filter_map(|t| t.get("id").and_then(Value::as_str).map(|id| (id, t)))
        .collect();

    let mut fields: Vec<FieldAccuracy> = EVAL_FIELDS
        .iter()
        .map(|f| FieldAccuracy {
            field: f.to_string(),
            correct: 0,
            total: 0,
        })
        .collect();
    let mut correct_values = 0;
    let mut total_values = 0;

    for record in output {
        let Some(id) = record.get("id").and_then(Value::as_str) else {
            continue;
        };
        let Some(gold) = truth_by_id.get(id) else {
            continue;
        };

        for accuracy in fields.iter_mut() {
            let ours = record.get(&accuracy.field).unwrap_or(&Value::Null);
            let theirs = gold.get(&accuracy.field).unwrap_or(&Value::Null);
            accuracy.total += 1;
            total_values += 1;
            if compare_field(ours, theirs) {
                accuracy.correct += 1;
                correct_values += 1;
            }
        }
    }

    EvaluationReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        fields,
        correct_values,
        total_values,
    }
}
