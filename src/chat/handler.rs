use tracing::{info, warn};

use crate::error::ChatError;
use crate::llm::types::GenerateRequest;
use crate::llm::{resolve_model, LLMConfig, ModelHandle, ModelProvider};
use crate::utils::secrets::{Credential, SecretStore, API_KEY_NAME};

/// Result of one submission.
#[derive(Debug)]
pub enum Outcome {
    /// Blank input; nothing was sent.
    Rejected,
    Answered(String),
    Failed(ChatError),
}

/// Session-wide request handler. Built once by [`initialize`], read-only
/// afterwards; each `submit` is independent of the previous ones.
pub struct ChatHandler<P> {
    provider: P,
    model: ModelHandle,
    system_instruction: Option<String>,
    temperature: Option<f32>,
}

impl<P: ModelProvider> ChatHandler<P> {
    pub fn new(provider: P, model: ModelHandle, config: &LLMConfig) -> Self {
        Self {
            provider,
            model,
            system_instruction: config.system_instruction.clone(),
            temperature: config.temperature,
        }
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    #[cfg(test)]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn submit(&self, input: &str) -> Outcome {
        if input.trim().is_empty() {
            warn!("Rejected blank input");
            return Outcome::Rejected;
        }

        let request = GenerateRequest {
            model: self.model.resource_name().to_string(),
            prompt: input.to_string(),
            system_instruction: self.system_instruction.clone(),
            temperature: self.temperature,
        };

        match self.provider.generate_content(&request).await {
            Ok(text) => {
                info!("Received {} chars from {}", text.len(), self.model);
                Outcome::Answered(text)
            }
            Err(e) => {
                warn!("Generation failed: {}", e);
                Outcome::Failed(e)
            }
        }
    }
}

/// Look up the credential, build the provider and pick the model.
///
/// The provider is only constructed once a credential exists, so a missing
/// key never reaches the network.
pub async fn initialize<P, F>(
    secrets: &dyn SecretStore,
    config: &LLMConfig,
    connect: F,
) -> Result<ChatHandler<P>, ChatError>
where
    P: ModelProvider,
    F: FnOnce(Credential) -> P,
{
    config.validate()?;

    let credential = secrets
        .get(API_KEY_NAME)?
        .ok_or_else(|| ChatError::MissingCredential { key: API_KEY_NAME.to_string() })?;

    let provider = connect(credential);
    let model = resolve_model(&provider, &config.model).await?;
    Ok(ChatHandler::new(provider, model, config))
}
