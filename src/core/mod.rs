pub mod etl;
pub mod evaluate;
pub mod extractor;
pub mod llm;
pub mod matcher;
pub mod normalize;
pub mod parsers;
pub mod pipeline;
pub mod port_index;
pub mod rules;

pub use crate::domain::model::{
    EmailRecord, ExtractionResult, PortReferenceEntry, RawExtraction, TransformResult,
};
pub use crate::domain::ports::{ConfigProvider, LlmClient, Pipeline, Storage};
pub use crate::utils::error::Result;
