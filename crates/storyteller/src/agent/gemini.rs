//! Google Gemini `generateContent` backend.
//!
//! The allowed actions are sent as an enum in the response schema, so a
//! well-behaved model cannot pick anything else.

use async_trait::async_trait;
use grimoire::{ChatRole, ChatTurn};
use serde_json::{json, Value};

use super::{http_client, AgentRequest, PlayerAgent};
use crate::config::AgentConfig;
use crate::errors::GameError;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiAgent {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    client: reqwest::Client,
}

impl GeminiAgent {
    pub fn new(config: &AgentConfig) -> Result<Self, GameError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GameError::Configuration("GEMINI_API_KEY is not set".into()))?;
        Ok(Self {
            api_key,
            model: config.model.clone(),
            base_url: GEMINI_BASE_URL.to_string(),
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
            client: http_client(config)?,
        })
    }

    /// Point at a different host, e.g. a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_body(&self, request: &AgentRequest<'_>) -> Value {
        let mut contents: Vec<Value> = request.history.iter().map(content).collect();
        contents.push(content(&ChatTurn::user(request.prompt)));

        json!({
            "systemInstruction": { "parts": [{ "text": request.system_instruction }] },
            "contents": contents,
            "generationConfig": {
                "temperature": self.temperature,
                "topP": self.top_p,
                "topK": self.top_k,
                "maxOutputTokens": self.max_output_tokens,
                "responseMimeType": "application/json",
                "responseSchema": response_schema(&request.allowed_names()),
            }
        })
    }
}

fn content(turn: &ChatTurn) -> Value {
    let role = match turn.role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    };
    json!({ "role": role, "parts": [{ "text": turn.text }] })
}

fn response_schema(allowed: &[&str]) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "reasoning": { "type": "STRING" },
            "action": { "type": "STRING", "format": "enum", "enum": allowed },
            "message": { "type": "STRING" },
            "players": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["action", "reasoning"]
    })
}

#[async_trait]
impl PlayerAgent for GeminiAgent {
    fn backend(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &AgentRequest<'_>) -> Result<String, GameError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| GameError::generation("gemini", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GameError::generation(
                "gemini",
                format!("Gemini API error ({status}): {body}"),
            ));
        }

        let resp_json: Value = response
            .json()
            .await
            .map_err(|e| GameError::generation("gemini", e.to_string()))?;

        resp_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| GameError::generation("gemini", "response had no candidate text"))
    }
}
