use crate::domain::model::EmailRecord;
use crate::domain::ports::{ConfigProvider, LlmClient};
use crate::utils::error::{EtlError, Result};
use regex::Regex;
use serde_json::json;
use std::time::Duration;

/// Instruction preamble sent ahead of every email.
pub const BASE_PROMPT: &str = r#"Extract shipment details from the email. Return a JSON object with keys:
id, product_line, origin_port_code, origin_port_name, destination_port_code, destination_port_name, incoterm, cargo_weight_kg, cargo_cbm, is_dangerous

Follow these rules:
- Use UN/LOCODE for ports when possible; if unknown set code and name to null.
- Normalize incoterm to uppercase; default to FOB if missing or ambiguous.
- Numeric fields: round to 2 decimals; missing -> null; explicit 0 allowed.
- Detect dangerous goods using keywords; negations ("non-dangerous") mean false.
"#;

pub fn build_prompt(email: &EmailRecord) -> String {
    format!(
        "{}\nSubject: {}\n\nBody:\n{}\n",
        BASE_PROMPT, email.subject, email.body
    )
}

/// Finds the one embedded JSON object in a model response: everything from
/// the first opening brace to the last closing brace. Returns `None` when
/// the response carries no braces at all.
pub fn locate_json_block(text: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)\{.*\}").unwrap();
    re.find(text).map(|m| m.as_str())
}

/// Chat-completions client for the Groq API (or any OpenAI-compatible
/// endpoint). Owns the retry loop: bounded attempts with exponential
/// backoff, 1s doubling and capped at 10s.
pub struct GroqClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl GroqClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        max_retries: u32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            max_retries: max_retries.max(1),
        }
    }

    /// Builds a client from the run configuration, taking the API key from
    /// the GROQ_API_KEY environment variable. Returns `None` when the key is
    /// absent; the pipeline then runs rule-based extraction only.
    pub fn from_config(config: &impl ConfigProvider) -> Option<Self> {
        let api_key = std::env::var("GROQ_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }
        Some(Self::new(
            config.api_endpoint(),
            api_key,
            config.model(),
            config.temperature(),
            config.max_retries(),
        ))
    }

    async fn request_once(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(EtlError::LlmError {
                message: format!("API error ({}): {}", status, text),
            });
        }

        let payload: serde_json::Value = response.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|content| content.to_string())
            .ok_or_else(|| EtlError::LlmError {
                message: "response carries no message content".to_string(),
            })
    }
}

#[async_trait::async_trait]
impl LlmClient for GroqClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let mut delay = Duration::from_secs(1);
        let mut last_error = EtlError::LlmError {
            message: "no attempts made".to_string(),
        };

        for attempt in 1..=self.max_retries {
            match self.request_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::warn!(
                        "LLM call attempt {}/{} failed: {}",
                        attempt,
                        self.max_retries,
                        e
                    );
                    last_error = e;
                }
            }
            if attempt < self.max_retries {
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(Duration::from_secs(10));
            }
        }

        Err(last_error)
    }
}
