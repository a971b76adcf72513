//! DeepL API. Key-based; free-tier keys end in ":fx" and use the free host.

use serde::Deserialize;

use super::client::UREQ_AGENT;
use super::{lang, ProviderError, ProviderResult, TranslateProvider};
use crate::config::ProviderConfig;

const FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";
const PRO_ENDPOINT: &str = "https://api.deepl.com/v2/translate";

pub struct DeepL;

#[derive(Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Deserialize)]
struct DeepLTranslation {
    text: String,
}

impl TranslateProvider for DeepL {
    fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        config: &ProviderConfig,
    ) -> ProviderResult {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential("deepl api key"));
        }

        let endpoint = endpoint_for(config);

        let mut payload = serde_json::json!({
            "text": [text],
            "target_lang": lang::deepl_code(target),
        });
        // Omitting source_lang asks DeepL to detect it.
        if source != "auto" {
            payload["source_lang"] = serde_json::Value::String(lang::deepl_code(source));
        }

        let resp = UREQ_AGENT
            .post(&endpoint)
            .header(
                "Authorization",
                &format!("DeepL-Auth-Key {}", config.api_key),
            )
            .send_json(payload)
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let body: DeepLResponse = resp
            .into_body()
            .read_json()
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| ProviderError::MalformedResponse("empty translation list".to_string()))
    }
}

fn endpoint_for(config: &ProviderConfig) -> String {
    let override_endpoint = config.endpoint.trim();
    if !override_endpoint.is_empty() {
        return override_endpoint.to_string();
    }
    if config.api_key.ends_with(":fx") {
        FREE_ENDPOINT.to_string()
    } else {
        PRO_ENDPOINT.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_fails_before_the_network() {
        let err = DeepL
            .translate("hi", "en", "zh-CN", &ProviderConfig::default())
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential(_)));
    }

    #[test]
    fn free_keys_route_to_the_free_host() {
        let config = ProviderConfig {
            api_key: "abc123:fx".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(endpoint_for(&config), FREE_ENDPOINT);

        let config = ProviderConfig {
            api_key: "abc123".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(endpoint_for(&config), PRO_ENDPOINT);
    }

    #[test]
    fn endpoint_override_wins() {
        let config = ProviderConfig {
            api_key: "abc123:fx".to_string(),
            endpoint: "https://proxy.example.com/v2/translate".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(endpoint_for(&config), "https://proxy.example.com/v2/translate");
    }
}
