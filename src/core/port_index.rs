use crate::domain::model::PortReferenceEntry;
use regex::Regex;
use std::collections::HashMap;

/// Lookup structures derived from the UN/LOCODE reference table. Built once
/// per run, read-only afterwards, shared across all records.
#[derive(Debug, Clone, Default)]
pub struct PortIndex {
    token_to_code: HashMap<String, String>,
    code_to_name: HashMap<String, String>,
    // Registration order of tokens. Fuzzy scans iterate this so that ties
    // resolve toward earlier reference entries, deterministically.
    tokens: Vec<String>,
}

impl PortIndex {
    /// Builds both mappings from the reference table. Entries missing a code
    /// or a name are skipped. The full lowercased name and every sub-token of
    /// at least two characters (split on whitespace, comma, hyphen, slash)
    /// are registered with an insert-if-absent policy: earlier entries'
    /// tokens are never overwritten by later, more generic ones.
    pub fn build(reference: &[PortReferenceEntry]) -> Self {
        let splitter = Regex::new(r"[\s,\-/]+").unwrap();
        let mut index = PortIndex::default();

        for entry in reference {
            let (Some(code), Some(name)) = (entry.code.as_deref(), entry.name.as_deref()) else {
                continue;
            };
            if code.is_empty() || name.is_empty() {
                continue;
            }

            index.code_to_name.insert(code.to_string(), name.to_string());

            let lowered = name.to_lowercase();
            index.register(&lowered, code);
            for token in splitter.split(&lowered) {
                if token.chars().count() >= 2 {
                    index.register(token, code);
                }
            }
        }

        index
    }

    fn register(&mut self, token: &str, code: &str) {
        if !self.token_to_code.contains_key(token) {
            self.tokens.push(token.to_string());
            self.token_to_code.insert(token.to_string(), code.to_string());
        }
    }

    pub fn code_for(&self, token: &str) -> Option<&str> {
        self.token_to_code.get(token).map(String::as_str)
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.code_to_name.get(code).map(String::as_str)
    }

    /// Registered tokens in registration order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn port_count(&self) -> usize {
        self.code_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
