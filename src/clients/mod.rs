pub mod llm_client;
pub mod retrieval_client;

pub use llm_client::LlmClient;
pub use retrieval_client::RetrievalClient;
