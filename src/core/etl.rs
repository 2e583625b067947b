use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting extraction run");
        self.monitor.log_stats("Startup");

        let emails = self.pipeline.extract().await?;
        tracing::info!("📨 Extracted {} emails", emails.len());
        self.monitor.log_stats("Extract");

        let result = self.pipeline.transform(emails).await?;
        tracing::info!(
            "🛠  Transformed {} records (llm: {}, rules: {}, failed: {})",
            result.results.len(),
            result.llm_extracted,
            result.rule_extracted,
            result.failed
        );
        self.monitor.log_stats("Transform");

        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
