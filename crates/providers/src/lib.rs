pub mod ollama;
pub mod reasoner;

pub use ollama::OllamaClient;
pub use reasoner::{invoke_structured, Reasoner};
