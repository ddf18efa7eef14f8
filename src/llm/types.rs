//! Wire types for the Generative Language REST API.

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

pub const GENERATE_CONTENT: &str = "generateContent";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelDescriptor {
    pub fn can_generate(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_CONTENT)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

/// One generation call: a single prompt, optionally a system instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentBody<'a> {
    pub contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
    pub parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TextPart<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationConfig {
    pub temperature: f32,
}

impl<'a> GenerateContentBody<'a> {
    pub fn from_request(request: &'a GenerateRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![TextPart { text: &request.prompt }],
            }],
            system_instruction: request.system_instruction.as_deref().map(|text| Content {
                role: None,
                parts: vec![TextPart { text }],
            }),
            generation_config: request
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ApiError,
}

impl GenerateContentResponse {
    /// Text of the first candidate, with all its text parts joined.
    pub fn into_text(self) -> Result<String, ChatError> {
        if let Some(error) = self.error {
            return Err(ChatError::Provider {
                status: error.code.unwrap_or(0),
                message: error.message,
            });
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return match self.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => Err(ChatError::Blocked(reason)),
                None => Err(ChatError::invalid_response("no candidates returned")),
            };
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if texts.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
            return Err(ChatError::invalid_response(format!(
                "candidate has no text (finish reason: {})",
                reason
            )));
        }

        Ok(texts.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let response = parse(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Salut " }, { "text": "toi." }] }, "finishReason": "STOP" },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }));
        assert_eq!(response.into_text().unwrap(), "Salut toi.");
    }

    #[test]
    fn blocked_prompt_reports_reason() {
        let response = parse(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        match response.into_text() {
            Err(ChatError::Blocked(reason)) => assert_eq!(reason, "SAFETY"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn candidate_without_text_reports_finish_reason() {
        let response = parse(json!({ "candidates": [{ "finishReason": "RECITATION" }] }));
        let err = response.into_text().unwrap_err();
        assert!(err.to_string().contains("RECITATION"));
    }

    #[test]
    fn empty_body_is_invalid() {
        let err = parse(json!({})).into_text().unwrap_err();
        assert!(matches!(err, ChatError::InvalidResponse(_)));
    }

    #[test]
    fn body_omits_optional_fields() {
        let request = GenerateRequest {
            model: "models/gemini-1.5-flash".into(),
            prompt: "Bonjour".into(),
            system_instruction: None,
            temperature: None,
        };
        let body = serde_json::to_value(GenerateContentBody::from_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({ "contents": [{ "role": "user", "parts": [{ "text": "Bonjour" }] }] })
        );
    }

    #[test]
    fn body_carries_system_instruction_and_temperature() {
        let request = GenerateRequest {
            model: "models/gemini-1.5-flash".into(),
            prompt: "Bonjour".into(),
            system_instruction: Some("Sois bref.".into()),
            temperature: Some(0.5),
        };
        let body = serde_json::to_value(GenerateContentBody::from_request(&request)).unwrap();
        assert_eq!(body["systemInstruction"], json!({ "parts": [{ "text": "Sois bref." }] }));
        assert_eq!(body["generationConfig"]["temperature"], json!(0.5));
    }

    #[test]
    fn descriptor_capability_check() {
        let model: ModelDescriptor = serde_json::from_value(json!({
            "name": "models/embedding-001",
            "supportedGenerationMethods": ["embedContent"]
        }))
        .unwrap();
        assert!(!model.can_generate());
    }
}
