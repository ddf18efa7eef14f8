use serde::{Deserialize, Serialize};

use crate::error::ChatError;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// How the session picks its model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelSelection {
    /// Use this identifier as-is, no network call.
    Fixed(String),
    /// Ask the provider and take the first generation-capable model.
    Discover,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub api_url: String,
    pub model: ModelSelection,
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: ModelSelection::Fixed(DEFAULT_MODEL.to_string()),
            system_instruction: None,
            temperature: None,
        }
    }
}

impl LLMConfig {
    pub fn new(api_url: String, model: ModelSelection) -> Self {
        Self {
            api_url,
            model,
            ..Self::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: Option<String>) -> Self {
        // A blank instruction is the same as none.
        self.system_instruction = instruction.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if self.api_url.trim().is_empty() {
            return Err(ChatError::invalid_config("API URL is empty"));
        }
        if let ModelSelection::Fixed(name) = &self.model {
            if name.trim().is_empty() {
                return Err(ChatError::invalid_config("model name is empty"));
            }
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ChatError::invalid_config(format!(
                    "temperature {} is outside 0.0..=2.0",
                    t
                )));
            }
        }
        Ok(())
    }
}
