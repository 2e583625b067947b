use crate::domain::model::{EmailRecord, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn emails_path(&self) -> &str;
    fn ports_reference_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn api_endpoint(&self) -> &str;
    fn model(&self) -> &str;
    fn temperature(&self) -> f32;
    fn max_retries(&self) -> u32;
    /// Skip the LLM entirely and extract with the rule engine only.
    fn rules_only(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<EmailRecord>>;
    async fn transform(&self, emails: Vec<EmailRecord>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}

/// Narrow seam around the language model: one prompt in, raw response text
/// out. Retry policy lives behind this trait, not in the pipeline.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
