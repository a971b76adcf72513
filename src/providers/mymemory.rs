//! MyMemory translation API. Free, no key, but no language detection.

use super::client::UREQ_AGENT;
use super::{ProviderError, ProviderResult, TranslateProvider};
use crate::config::ProviderConfig;

pub struct MyMemory;

impl TranslateProvider for MyMemory {
    fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        _config: &ProviderConfig,
    ) -> ProviderResult {
        if source == "auto" {
            return Err(ProviderError::UnsupportedLanguage(
                "mymemory requires a concrete source language".to_string(),
            ));
        }

        let langpair = format!("{}|{}", source, target);
        let url = format!(
            "https://api.mymemory.translated.net/get?q={}&langpair={}",
            urlencoding::encode(text),
            urlencoding::encode(&langpair)
        );

        let resp = UREQ_AGENT
            .get(&url)
            .call()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let json: serde_json::Value = resp
            .into_body()
            .read_json()
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        parse_response(&json)
    }
}

pub(crate) fn parse_response(json: &serde_json::Value) -> ProviderResult {
    let status = json
        .get("responseStatus")
        .and_then(|v| v.as_i64())
        .unwrap_or(0);

    if status == 200 {
        return json
            .pointer("/responseData/translatedText")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ProviderError::MalformedResponse("missing translatedText".to_string())
            });
    }

    let details = json
        .get("responseDetails")
        .and_then(|v| v.as_str())
        .unwrap_or("request rejected");
    Err(ProviderError::Provider(details.to_string()))
}
