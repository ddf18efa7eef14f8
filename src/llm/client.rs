use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, error, info};

use super::types::{
    ErrorEnvelope, GenerateContentBody, GenerateContentResponse, GenerateRequest,
    ListModelsResponse, ModelDescriptor,
};
use crate::error::ChatError;
use crate::utils::secrets::Credential;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Remote text-generation backend.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ChatError>;

    async fn generate_content(&self, request: &GenerateRequest) -> Result<String, ChatError>;
}

/// Client for the Google Generative Language API.
pub struct GeminiClient {
    client: Client,
    api_url: String,
    credential: Credential,
}

impl GeminiClient {
    pub fn new(api_url: &str, credential: Credential) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            credential,
        }
    }
}

/// Turn a non-2xx response into a provider error, using the API's error
/// envelope when the body has one.
async fn error_from_response(response: Response) -> ChatError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => match envelope.error.status {
            Some(kind) => format!("{} ({})", envelope.error.message, kind),
            None => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body,
    };
    error!("Provider error {}: {}", status, message);
    ChatError::Provider { status, message }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ChatError> {
        let url = format!("{}/models", self.api_url);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, self.credential.expose())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let listing: ListModelsResponse = response.json().await?;
        info!("Provider advertised {} models", listing.models.len());
        Ok(listing.models)
    }

    async fn generate_content(&self, request: &GenerateRequest) -> Result<String, ChatError> {
        let url = format!("{}/{}:generateContent", self.api_url, request.model);
        debug!("POST {} ({} chars)", url, request.prompt.len());

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.credential.expose())
            .json(&GenerateContentBody::from_request(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| ChatError::invalid_response(format!("malformed JSON: {}", e)))?;
        parsed.into_text()
    }
}
