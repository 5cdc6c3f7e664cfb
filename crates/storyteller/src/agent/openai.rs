//! OpenAI-compatible `chat/completions` backend for local inference servers.
//!
//! JSON mode only guarantees an object; the allowed actions are repeated in
//! a trailing system note and enforced by the client's whitelist check.

use async_trait::async_trait;
use grimoire::ChatRole;
use serde_json::{json, Value};

use super::{http_client, AgentRequest, PlayerAgent};
use crate::config::AgentConfig;
use crate::errors::GameError;

pub struct OpenAiAgent {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiAgent {
    pub fn new(config: &AgentConfig) -> Result<Self, GameError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().unwrap_or_else(|| "local".into()),
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_output_tokens,
            client: http_client(config)?,
        })
    }

    fn request_body(&self, request: &AgentRequest<'_>) -> Value {
        let mut messages = vec![json!({
            "role": "system",
            "content": request.system_instruction,
        })];
        for turn in request.history {
            let role = match turn.role {
                ChatRole::User => "user",
                ChatRole::Model => "assistant",
            };
            messages.push(json!({ "role": role, "content": turn.text }));
        }
        messages.push(json!({ "role": "user", "content": request.prompt }));
        messages.push(json!({
            "role": "system",
            "content": format!(
                "Reply with a single JSON object with the keys 'reasoning', 'action', and optionally 'message' and 'players'. 'action' must be one of: {}.",
                request.allowed_names().join(", ")
            ),
        }));

        json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "top_p": self.top_p,
            "max_tokens": self.max_tokens,
            "response_format": { "type": "json_object" },
        })
    }
}

#[async_trait]
impl PlayerAgent for OpenAiAgent {
    fn backend(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &AgentRequest<'_>) -> Result<String, GameError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| GameError::generation("openai", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GameError::generation(
                "openai",
                format!("Completion API error ({status}): {body}"),
            ));
        }

        let resp_json: Value = response
            .json()
            .await
            .map_err(|e| GameError::generation("openai", e.to_string()))?;

        resp_json["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| GameError::generation("openai", "response had no message content"))
    }
}

#[cfg(test)]
mod tests {
    use grimoire::actions::PRIVATE_CHAT_ACTIONS;
    use grimoire::ChatTurn;

    use super::*;
    use crate::config::Backend;

    #[test]
    fn test_body_maps_roles_and_lists_actions() {
        let mut config = AgentConfig::for_backend(Backend::Openai);
        config.base_url = "http://localhost:8080/v1/".into();
        config.model = "qwen".into();
        let agent = OpenAiAgent::new(&config).unwrap();
        assert_eq!(agent.base_url, "http://localhost:8080/v1");

        let history = vec![ChatTurn::user("hi"), ChatTurn::model("{}")];
        let request = AgentRequest {
            player: "Anne",
            system_instruction: "rules",
            history: &history,
            prompt: "Anything to add?",
            allowed_actions: PRIVATE_CHAT_ACTIONS,
        };
        let body = agent.request_body(&request);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["content"], "Anything to add?");
        assert!(messages[4]["content"]
            .as_str()
            .unwrap()
            .contains("idle, private_message"));
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["model"], "qwen");
    }
}
