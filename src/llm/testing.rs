use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::ModelProvider;
use super::types::{GenerateRequest, ModelDescriptor};
use crate::error::ChatError;

pub fn descriptor(name: &str, methods: &[&str]) -> ModelDescriptor {
    ModelDescriptor {
        name: name.to_string(),
        display_name: None,
        supported_generation_methods: methods.iter().map(|m| m.to_string()).collect(),
    }
}

/// Scripted provider that counts its calls.
pub struct FakeProvider {
    models: Result<Vec<ModelDescriptor>, String>,
    reply: Result<String, String>,
    list_calls: AtomicUsize,
    generate_calls: AtomicUsize,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl FakeProvider {
    pub fn answering(text: &str) -> Self {
        Self {
            models: Ok(Vec::new()),
            reply: Ok(text.to_string()),
            list_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::answering("")
        }
    }

    pub fn with_models(mut self, models: Vec<ModelDescriptor>) -> Self {
        self.models = Ok(models);
        self
    }

    pub fn with_listing_failure(mut self, message: &str) -> Self {
        self.models = Err(message.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for FakeProvider {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ChatError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.models.clone().map_err(|message| ChatError::Provider { status: 0, message })
    }

    async fn generate_content(&self, request: &GenerateRequest) -> Result<String, ChatError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.reply
            .clone()
            .map_err(|message| ChatError::Provider { status: 500, message })
    }
}
