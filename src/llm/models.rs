use std::fmt;

use tracing::{info, warn};

use super::client::ModelProvider;
use super::config::ModelSelection;
use super::types::ModelDescriptor;
use crate::error::ChatError;

const RESOURCE_PREFIX: &str = "models/";

/// The model every generation call of a session goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    resource_name: String,
}

impl ModelHandle {
    /// Accepts `gemini-1.5-flash` or `models/gemini-1.5-flash`.
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        let resource_name = if name.starts_with(RESOURCE_PREFIX) {
            name.to_string()
        } else {
            format!("{}{}", RESOURCE_PREFIX, name)
        };
        Self { resource_name }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn id(&self) -> &str {
        self.resource_name
            .strip_prefix(RESOURCE_PREFIX)
            .unwrap_or(&self.resource_name)
    }
}

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// First model, in provider order, that can generate content.
pub fn select_generation_model(models: &[ModelDescriptor]) -> Option<&ModelDescriptor> {
    models.iter().find(|m| m.can_generate())
}

pub fn generation_models(models: &[ModelDescriptor]) -> Vec<&ModelDescriptor> {
    models.iter().filter(|m| m.can_generate()).collect()
}

pub async fn resolve_model<P>(provider: &P, selection: &ModelSelection) -> Result<ModelHandle, ChatError>
where
    P: ModelProvider + ?Sized,
{
    match selection {
        ModelSelection::Fixed(name) => {
            let handle = ModelHandle::new(name);
            info!("Using configured model {}", handle);
            Ok(handle)
        }
        ModelSelection::Discover => {
            info!("Discovering available models");
            let models = provider
                .list_models()
                .await
                .map_err(|e| ChatError::Discovery(e.to_string()))?;

            match select_generation_model(&models) {
                Some(model) => {
                    let handle = ModelHandle::new(&model.name);
                    info!("Discovered model {} among {} candidates", handle, models.len());
                    Ok(handle)
                }
                None => {
                    warn!("None of the {} listed models supports generateContent", models.len());
                    Err(ChatError::NoGenerationModel)
                }
            }
        }
    }
}
