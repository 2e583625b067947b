use crate::core::matcher::find_ports_in_text;
use crate::core::parsers::{detect_dangerous, parse_cbm, parse_incoterm, parse_weight_kg};
use crate::core::port_index::PortIndex;
use crate::core::rules::choose_product_line;
use crate::domain::model::{EmailRecord, RawExtraction};
use serde_json::Value;

/// Rule-based extraction over one email. Pure function of the email and the
/// shared read-only index; tolerates missing or ambiguous input and never
/// fails.
///
/// Field precedence: the body wins wholesale over the subject for ports
/// (the subject is only consulted when the body yields nothing), and
/// per-field for incoterm, volume and weight. Dangerous-goods detection
/// runs over subject and body combined.
pub fn rule_extract(email: &EmailRecord, index: &PortIndex) -> RawExtraction {
    let body_ports = find_ports_in_text(&email.body, index);
    let ports = if body_ports.is_empty() {
        find_ports_in_text(&email.subject, index)
    } else {
        body_ports
    };

    // First port is the origin, second the destination; the rest are noise.
    let origin = ports.first().cloned();
    let dest = ports.get(1).cloned();

    let incoterm = parse_incoterm(&email.body)
        .or_else(|| parse_incoterm(&email.subject))
        .unwrap_or_else(|| "FOB".to_string());
    let cbm = parse_cbm(&email.body).or_else(|| parse_cbm(&email.subject));
    let weight = parse_weight_kg(&email.body).or_else(|| parse_weight_kg(&email.subject));

    let combined = format!("{}\n{}", email.subject, email.body);
    let dangerous = detect_dangerous(&combined);

    let product_line = choose_product_line(origin.as_deref(), dest.as_deref());

    RawExtraction {
        id: Some(email.id.clone()),
        product_line,
        origin_port_name: origin
            .as_deref()
            .and_then(|code| index.name_for(code))
            .map(str::to_string),
        destination_port_name: dest
            .as_deref()
            .and_then(|code| index.name_for(code))
            .map(str::to_string),
        origin_port_code: origin,
        destination_port_code: dest,
        incoterm: Some(Value::String(incoterm)),
        cargo_weight_kg: weight.map(Value::from),
        cargo_cbm: cbm.map(Value::from),
        is_dangerous: Some(dangerous),
    }
}
