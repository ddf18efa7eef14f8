pub mod client;
pub mod config;
pub mod models;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use client::{GeminiClient, ModelProvider};
pub use config::{LLMConfig, ModelSelection};
pub use models::{resolve_model, ModelHandle};
