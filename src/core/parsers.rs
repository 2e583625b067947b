use regex::Regex;

/// The fixed incoterm vocabulary. Anything outside this set is ignored.
pub const VALID_INCOTERMS: [&str; 10] = [
    "FOB", "CIF", "CFR", "EXW", "DDP", "DAP", "FCA", "CPT", "CIP", "DPU",
];

/// Scans for incoterms on word boundaries, case-insensitive. Zero matches
/// yield `None`; exactly one distinct match yields that term; more than one
/// distinct match is ambiguous and resolves to "FOB" by business rule.
pub fn parse_incoterm(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let upper = text.to_uppercase();
    let re = Regex::new(r"\b(FOB|CIF|CFR|EXW|DDP|DAP|FCA|CPT|CIP|DPU)\b").unwrap();

    let mut found: Vec<&str> = Vec::new();
    for m in re.find_iter(&upper) {
        if !found.contains(&m.as_str()) {
            found.push(m.as_str());
        }
    }

    match found.len() {
        0 => None,
        1 => Some(found[0].to_string()),
        _ => Some("FOB".to_string()),
    }
}

/// Cargo volume in cubic meters. Accepts comma or dot decimal separators;
/// the value is returned unconverted.
pub fn parse_cbm(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    let re =
        Regex::new(r"(?i)(\d+(?:[\.,]\d+)?)\s*(?:cbm|m3|cubic meters|cubic metres)\b").unwrap();
    re.captures(text)
        .and_then(|caps| parse_number(&caps[1]))
}

/// Cargo weight normalized to kilograms. Unit patterns are tried in order
/// (kg, metric tons, pounds) and the first match wins. With no unit-bearing
/// number, an explicit "0 <unit>" is meaningful and returns 0.0; placeholder
/// phrases (TBD, N/A, ...) and everything else return `None`.
pub fn parse_weight_kg(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    let kg = Regex::new(r"(?i)(\d+(?:[\.,]\d+)?)\s*(?:kg|kgs)\b").unwrap();
    if let Some(caps) = kg.captures(text) {
        return parse_number(&caps[1]);
    }

    let tonnes = Regex::new(r"(?i)(\d+(?:[\.,]\d+)?)\s*(?:tonne|tonnes|t|mt)\b").unwrap();
    if let Some(caps) = tonnes.captures(text) {
        return parse_number(&caps[1]).map(|v| v * 1000.0);
    }

    let lbs = Regex::new(r"(?i)(\d+(?:[\.,]\d+)?)\s*(?:lb|lbs)\b").unwrap();
    if let Some(caps) = lbs.captures(text) {
        return parse_number(&caps[1]).map(|v| v * 0.453592);
    }

    let explicit_zero = Regex::new(r"\b0\s*(?:kg|kgs|lb|lbs|tonne|t|mt)\b").unwrap();
    if explicit_zero.is_match(text) {
        return Some(0.0);
    }

    // TODO: confirm with the product owner whether placeholders should win
    // over an explicit zero in phrasing like "TBD, 0 kg"; current order
    // preserves the established behavior.
    let placeholder = Regex::new(r"(?i)\b(?:TBD|N/A|TO BE CONFIRMED|TO BE ADVISED)\b").unwrap();
    if placeholder.is_match(text) {
        return None;
    }

    None
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse::<f64>().ok()
}

const NEGATION_PHRASES: [&str; 5] = [
    "non-hazardous",
    "non hazardous",
    "non-dg",
    "not dangerous",
    "non dg",
];

const DANGER_KEYWORDS: [&str; 5] = ["dg", "dangerous", "hazardous", "imo", "imdg"];

/// Dangerous-goods signal over lowercased text. Any negation phrase anywhere
/// wins over any positive keyword elsewhere in the text; absent or empty
/// text is not dangerous.
pub fn detect_dangerous(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let lowered = text.to_lowercase();

    if NEGATION_PHRASES.iter().any(|n| lowered.contains(n)) {
        return false;
    }
    if DANGER_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return true;
    }
    Regex::new(r"class \d").unwrap().is_match(&lowered)
}
