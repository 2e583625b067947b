pub mod cli;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "shipmail-etl")]
#[command(about = "Extracts structured shipment details from logistics emails")]
pub struct CliConfig {
    #[arg(long, default_value = "./emails_input.json")]
    pub emails_path: String,

    #[arg(long, default_value = "./port_codes_reference.json")]
    pub ports_reference_path: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(
        long,
        default_value = "https://api.groq.com/openai/v1/chat/completions"
    )]
    pub api_endpoint: String,

    #[arg(long, default_value = "llama-3.1-70b-versatile")]
    pub model: String,

    #[arg(long, default_value = "0.0")]
    pub temperature: f32,

    #[arg(long, default_value = "3")]
    pub max_retries: u32,

    #[arg(long, help = "Use the rule-based extractor instead of calling the LLM")]
    pub mock: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn emails_path(&self) -> &str {
        &self.emails_path
    }

    fn ports_reference_path(&self) -> &str {
        &self.ports_reference_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn rules_only(&self) -> bool {
        self.mock
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("emails_path", &self.emails_path)?;
        validate_path("ports_reference_path", &self.ports_reference_path)?;
        validate_path("output_path", &self.output_path)?;
        validate_file_extensions(
            "input_files",
            &[
                self.emails_path.clone(),
                self.ports_reference_path.clone(),
            ],
            &["json"],
        )?;

        if !self.mock {
            validate_url("api_endpoint", &self.api_endpoint)?;
            validate_non_empty_string("model", &self.model)?;
            validate_range("temperature", self.temperature, 0.0, 2.0)?;
            validate_positive_number("max_retries", self.max_retries as usize, 1)?;
        }

        Ok(())
    }
}
