pub mod extraction_client;
pub mod llm_client;

pub use extraction_client::{AdeClient, DocumentExtractor};
pub use llm_client::{LanguageModel, OpenAiClient};
