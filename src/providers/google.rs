//! Free Google translate endpoint (gtx client). No key required.

use super::client::UREQ_AGENT;
use super::{ProviderError, ProviderResult, TranslateProvider};
use crate::config::ProviderConfig;

pub struct Google;

impl TranslateProvider for Google {
    fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        _config: &ProviderConfig,
    ) -> ProviderResult {
        let url = format!(
            "https://translate.googleapis.com/translate_a/single?client=gtx&sl={}&tl={}&dt=t&q={}",
            source,
            target,
            urlencoding::encode(text)
        );

        let resp = UREQ_AGENT
            .get(&url)
            .header("User-Agent", "Mozilla/5.0")
            .call()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let json: serde_json::Value = resp
            .into_body()
            .read_json()
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        parse_response(&json)
    }
}

/// The gtx endpoint answers with nested arrays; sentence segments sit at
/// `[0][i][0]` and concatenate into the full translation.
pub(crate) fn parse_response(json: &serde_json::Value) -> ProviderResult {
    let sentences = json
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::MalformedResponse("missing sentence list".to_string()))?;

    let mut full_text = String::new();
    for sentence_node in sentences {
        if let Some(segment) = sentence_node.get(0).and_then(|s| s.as_str()) {
            full_text.push_str(segment);
        }
    }

    if full_text.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "empty translation".to_string(),
        ));
    }
    Ok(full_text)
}
