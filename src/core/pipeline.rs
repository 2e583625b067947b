use crate::core::extractor::rule_extract;
use crate::core::llm::{build_prompt, locate_json_block, GroqClient};
use crate::core::normalize::normalize;
use crate::core::port_index::PortIndex;
use crate::core::{ConfigProvider, EmailRecord, LlmClient, Pipeline, Storage};
use crate::domain::model::{ExtractionResult, PortReferenceEntry, RawExtraction, TransformResult};
use crate::utils::error::Result;

const OUTPUT_FILE: &str = "output.json";

enum ExtractionSource {
    Llm,
    Rules,
}

/// Batch pipeline over logistics emails: read the input file, extract one
/// record per email (LLM first when configured, rule engine otherwise),
/// write the finalized records as one JSON array.
pub struct ExtractionPipeline<S: Storage, C: ConfigProvider, L: LlmClient = GroqClient> {
    storage: S,
    config: C,
    llm: Option<L>,
}

impl<S: Storage, C: ConfigProvider> ExtractionPipeline<S, C, GroqClient> {
    pub fn new(storage: S, config: C) -> Self {
        let llm = if config.rules_only() {
            None
        } else {
            let client = GroqClient::from_config(&config);
            if client.is_none() {
                tracing::warn!(
                    "GROQ_API_KEY not set; falling back to rule-based extraction for every record"
                );
            }
            client
        };
        Self {
            storage,
            config,
            llm,
        }
    }
}

impl<S: Storage, C: ConfigProvider, L: LlmClient> ExtractionPipeline<S, C, L> {
    /// Injects a specific LLM client. Used by tests and alternate endpoints.
    pub fn with_llm(storage: S, config: C, llm: L) -> Self {
        Self {
            storage,
            config,
            llm: Some(llm),
        }
    }

    async fn extract_one(
        &self,
        email: &EmailRecord,
        index: &PortIndex,
    ) -> Result<(ExtractionResult, ExtractionSource)> {
        if let Some(llm) = &self.llm {
            let prompt = build_prompt(email);
            match llm.complete(&prompt).await {
                Ok(response) => {
                    if let Some(block) = locate_json_block(&response) {
                        // A located block that does not parse is a record
                        // failure, not a fallback; the caller substitutes a
                        // null record for this id.
                        let raw: RawExtraction = serde_json::from_str(block)?;
                        return Ok((normalize(raw, &email.id), ExtractionSource::Llm));
                    }
                    tracing::warn!(
                        "LLM returned no JSON; falling back to rules for id={}",
                        email.id
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "LLM call failed for id={}: {}; falling back to rules",
                        email.id,
                        e
                    );
                }
            }
        }

        let raw = rule_extract(email, index);
        Ok((normalize(raw, &email.id), ExtractionSource::Rules))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, L: LlmClient> Pipeline for ExtractionPipeline<S, C, L> {
    async fn extract(&self) -> Result<Vec<EmailRecord>> {
        tracing::debug!("Reading emails from: {}", self.config.emails_path());
        let bytes = self.storage.read_file(self.config.emails_path()).await?;
        let emails: Vec<EmailRecord> = serde_json::from_slice(&bytes)?;
        Ok(emails)
    }

    async fn transform(&self, emails: Vec<EmailRecord>) -> Result<TransformResult> {
        // The index is built once per run, before the record loop, and is
        // read-only afterwards.
        let bytes = self
            .storage
            .read_file(self.config.ports_reference_path())
            .await?;
        let reference: Vec<PortReferenceEntry> = serde_json::from_slice(&bytes)?;
        let index = PortIndex::build(&reference);
        tracing::info!(
            "📇 Port index ready: {} ports, {} tokens",
            index.port_count(),
            index.token_count()
        );

        let mut results = Vec::with_capacity(emails.len());
        let mut llm_extracted = 0;
        let mut rule_extracted = 0;
        let mut failed = 0;

        for email in &emails {
            match self.extract_one(email, &index).await {
                Ok((result, ExtractionSource::Llm)) => {
                    llm_extracted += 1;
                    results.push(result);
                }
                Ok((result, ExtractionSource::Rules)) => {
                    rule_extracted += 1;
                    results.push(result);
                }
                // One bad email never blocks the batch: substitute a
                // null record and keep going.
                Err(e) => {
                    tracing::error!("❌ Extraction failed for email {}: {}", email.id, e);
                    failed += 1;
                    results.push(ExtractionResult::null_record(email.id.clone()));
                }
            }
        }

        Ok(TransformResult {
            results,
            llm_extracted,
            rule_extracted,
            failed,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = format!("{}/{}", self.config.output_path(), OUTPUT_FILE);
        let payload = serde_json::to_vec_pretty(&result.results)?;

        tracing::debug!(
            "Writing {} records ({} bytes) to storage",
            result.results.len(),
            payload.len()
        );
        self.storage.write_file(&output_path, &payload).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig;

    impl ConfigProvider for MockConfig {
        fn emails_path(&self) -> &str {
            "emails_input.json"
        }

        fn ports_reference_path(&self) -> &str {
            "port_codes_reference.json"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn api_endpoint(&self) -> &str {
            "http://unused.test"
        }

        fn model(&self) -> &str {
            "test-model"
        }

        fn temperature(&self) -> f32 {
            0.0
        }

        fn max_retries(&self) -> u32 {
            1
        }

        fn rules_only(&self) -> bool {
            true
        }
    }

    /// Scripted LLM: one canned response per call, in order.
    struct MockLlm {
        responses: Mutex<Vec<Result<String>>>,
    }

    impl MockLlm {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for MockLlm {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            let mut responses = self.responses.lock().await;
            if responses.is_empty() {
                return Err(EtlError::LlmError {
                    message: "script exhausted".to_string(),
                });
            }
            responses.remove(0)
        }
    }

    async fn seed_storage(storage: &MockStorage, emails: serde_json::Value) {
        let reference = serde_json::json!([
            {"code": "INNSA", "name": "Nhava Sheva"},
            {"code": "DEHAM", "name": "Hamburg"},
            {"code": "CNSHA", "name": "Shanghai"}
        ]);
        storage
            .put_file(
                "port_codes_reference.json",
                reference.to_string().as_bytes(),
            )
            .await;
        storage
            .put_file("emails_input.json", emails.to_string().as_bytes())
            .await;
    }

    #[tokio::test]
    async fn test_rules_only_end_to_end() {
        let storage = MockStorage::new();
        seed_storage(
            &storage,
            serde_json::json!([
                {
                    "id": "e1",
                    "subject": "Quote needed",
                    "body": "Load in Nhava Sheva.\nDischarge: Hamburg.\nCIF, 10 cbm, 2 t."
                }
            ]),
        )
        .await;

        let pipeline = ExtractionPipeline::<_, _, GroqClient> {
            storage: storage.clone(),
            config: MockConfig,
            llm: None,
        };

        let emails = pipeline.extract().await.unwrap();
        assert_eq!(emails.len(), 1);

        let result = pipeline.transform(emails).await.unwrap();
        assert_eq!(result.rule_extracted, 1);
        assert_eq!(result.llm_extracted, 0);
        assert_eq!(result.failed, 0);

        let record = &result.results[0];
        assert_eq!(record.id, "e1");
        assert_eq!(record.origin_port_code.as_deref(), Some("INNSA"));
        assert_eq!(record.destination_port_code.as_deref(), Some("DEHAM"));
        assert_eq!(record.product_line.as_deref(), Some("pl_sea_export_lcl"));
        assert_eq!(record.incoterm.as_deref(), Some("CIF"));
        assert_eq!(record.cargo_cbm, Some(10.0));
        assert_eq!(record.cargo_weight_kg, Some(2000.0));
        assert!(!record.is_dangerous);

        let output_path = pipeline.load(result).await.unwrap();
        assert_eq!(output_path, "test_output/output.json");

        let written = storage.get_file("test_output/output.json").await.unwrap();
        let parsed: Vec<ExtractionResult> = serde_json::from_slice(&written).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "e1");
    }

    #[tokio::test]
    async fn test_llm_result_wins_when_json_parses() {
        let storage = MockStorage::new();
        seed_storage(
            &storage,
            serde_json::json!([
                {"id": "e1", "subject": "", "body": "ex Shanghai"}
            ]),
        )
        .await;

        let llm = MockLlm::new(vec![Ok(
            "{\"id\": \"e1\", \"incoterm\": \"exw\", \"cargo_weight_kg\": \"150.456\", \"is_dangerous\": true}"
                .to_string(),
        )]);
        let pipeline = ExtractionPipeline::with_llm(storage, MockConfig, llm);

        let emails = pipeline.extract().await.unwrap();
        let result = pipeline.transform(emails).await.unwrap();

        assert_eq!(result.llm_extracted, 1);
        let record = &result.results[0];
        assert_eq!(record.incoterm.as_deref(), Some("EXW"));
        assert_eq!(record.cargo_weight_kg, Some(150.46));
        assert!(record.is_dangerous);
        // The rule path never ran, so no port was resolved.
        assert_eq!(record.origin_port_code, None);
    }

    #[tokio::test]
    async fn test_llm_without_json_falls_back_to_rules() {
        let storage = MockStorage::new();
        seed_storage(
            &storage,
            serde_json::json!([
                {"id": "e1", "subject": "", "body": "ex Shanghai, FOB"}
            ]),
        )
        .await;

        let llm = MockLlm::new(vec![Ok("I could not find any details.".to_string())]);
        let pipeline = ExtractionPipeline::with_llm(storage, MockConfig, llm);

        let emails = pipeline.extract().await.unwrap();
        let result = pipeline.transform(emails).await.unwrap();

        assert_eq!(result.rule_extracted, 1);
        assert_eq!(result.llm_extracted, 0);
        assert_eq!(result.results[0].origin_port_code.as_deref(), Some("CNSHA"));
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_rules() {
        let storage = MockStorage::new();
        seed_storage(
            &storage,
            serde_json::json!([
                {"id": "e1", "subject": "", "body": "ex Shanghai"}
            ]),
        )
        .await;

        let llm = MockLlm::new(vec![Err(EtlError::LlmError {
            message: "boom".to_string(),
        })]);
        let pipeline = ExtractionPipeline::with_llm(storage, MockConfig, llm);

        let emails = pipeline.extract().await.unwrap();
        let result = pipeline.transform(emails).await.unwrap();

        assert_eq!(result.rule_extracted, 1);
        assert_eq!(result.failed, 0);
        assert_eq!(result.results[0].origin_port_code.as_deref(), Some("CNSHA"));
    }

    #[tokio::test]
    async fn test_unparsable_json_block_yields_null_record_only_for_that_id() {
        let storage = MockStorage::new();
        seed_storage(
            &storage,
            serde_json::json!([
                {"id": "e1", "subject": "", "body": "ex Shanghai"},
                {"id": "e2", "subject": "", "body": "ex Hamburg"},
                {"id": "e3", "subject": "", "body": "ex Nhava Sheva"}
            ]),
        )
        .await;

        let llm = MockLlm::new(vec![
            Ok("{\"id\": \"e1\"}".to_string()),
            // Braces present but not valid JSON: a record-level failure.
            Ok("{this is { not json }".to_string()),
            Ok("{\"id\": \"e3\", \"incoterm\": \"CIF\"}".to_string()),
        ]);
        let pipeline = ExtractionPipeline::with_llm(storage, MockConfig, llm);

        let emails = pipeline.extract().await.unwrap();
        let result = pipeline.transform(emails).await.unwrap();

        assert_eq!(result.results.len(), 3);
        assert_eq!(result.llm_extracted, 2);
        assert_eq!(result.failed, 1);

        let ids: Vec<&str> = result.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2", "e3"]);

        let failed = &result.results[1];
        assert_eq!(*failed, ExtractionResult::null_record("e2"));
    }

    #[tokio::test]
    async fn test_missing_input_file_is_fatal() {
        let storage = MockStorage::new();
        let pipeline = ExtractionPipeline::<_, _, GroqClient> {
            storage,
            config: MockConfig,
            llm: None,
        };

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::IoError(_)));
    }
}
