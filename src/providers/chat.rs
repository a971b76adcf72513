//! Chat-completion backends (OpenAI-compatible APIs).
//!
//! One adapter covers every backend that speaks the chat-completions shape;
//! they differ only in default endpoint and default model. The model gets a
//! fixed translate-only instruction as the system turn and the caption text
//! as the user turn.

use serde::Deserialize;

use super::client::UREQ_AGENT;
use super::{lang, ProviderError, ProviderResult, TranslateProvider};
use crate::config::ProviderConfig;

pub struct ChatProvider {
    name: &'static str,
    default_endpoint: &'static str,
    default_model: &'static str,
}

pub static OPENAI: ChatProvider = ChatProvider {
    name: "openai api key",
    default_endpoint: "https://api.openai.com/v1/chat/completions",
    default_model: "gpt-4o-mini",
};

pub static DEEPSEEK: ChatProvider = ChatProvider {
    name: "deepseek api key",
    default_endpoint: "https://api.deepseek.com/v1/chat/completions",
    default_model: "deepseek-chat",
};

pub static GLM: ChatProvider = ChatProvider {
    name: "glm api key",
    default_endpoint: "https://open.bigmodel.cn/api/paas/v4/chat/completions",
    default_model: "glm-4-flash",
};

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// System turn: translate only, keep the tone, no commentary.
pub(crate) fn instruction(source: &str, target: &str) -> String {
    let target_name = lang::language_name(target);
    if source == "auto" {
        format!(
            "You are a professional subtitle translator. Translate the user's text into {}. \
             Preserve the tone of the original. Output only the translation, nothing else.",
            target_name
        )
    } else {
        format!(
            "You are a professional subtitle translator. Translate the user's text from {} into {}. \
             Preserve the tone of the original. Output only the translation, nothing else.",
            lang::language_name(source),
            target_name
        )
    }
}

impl TranslateProvider for ChatProvider {
    fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        config: &ProviderConfig,
    ) -> ProviderResult {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential(self.name));
        }

        let endpoint = if config.endpoint.trim().is_empty() {
            self.default_endpoint
        } else {
            config.endpoint.trim()
        };
        let model = if config.model.trim().is_empty() {
            self.default_model
        } else {
            config.model.trim()
        };

        let payload = serde_json::json!({
            "model": model,
            "messages": [
                { "role": "system", "content": instruction(source, target) },
                { "role": "user", "content": text }
            ],
            "temperature": 0.3
        });

        let resp = UREQ_AGENT
            .post(endpoint)
            .header("Authorization", &format!("Bearer {}", config.api_key))
            .header("Content-Type", "application/json")
            .send_json(payload)
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let body: ChatCompletionResponse = resp
            .into_body()
            .read_json()
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        let content = content.trim();

        if content.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "empty completion".to_string(),
            ));
        }
        Ok(content.to_string())
    }
}
