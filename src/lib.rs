pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{cli::LocalStorage, CliConfig};

pub use crate::core::llm::GroqClient;
pub use crate::core::{etl::EtlEngine, pipeline::ExtractionPipeline};
pub use crate::utils::error::{EtlError, Result};
