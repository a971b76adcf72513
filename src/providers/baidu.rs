//! Baidu fanyi API. Signed query requests: every call carries an app id, a
//! fresh salt, and an MD5 signature over appid + text + salt + secret.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::client::UREQ_AGENT;
use super::{lang, ProviderError, ProviderResult, TranslateProvider};
use crate::config::ProviderConfig;

const ENDPOINT: &str = "https://fanyi-api.baidu.com/api/trans/vip/translate";

/// Per-request salt. Seeded from the clock on first use and strictly
/// increasing afterwards, so no two requests of a process share a signature
/// input even inside the same millisecond.
static SALT: AtomicU64 = AtomicU64::new(0);

fn next_salt() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1);
    SALT.fetch_max(now, Ordering::Relaxed);
    SALT.fetch_add(1, Ordering::Relaxed)
}

/// Signature per Baidu's contract: md5 of the concatenation
/// appid + query + salt + secret, lowercase hex.
pub(crate) fn sign(app_id: &str, text: &str, salt: u64, secret: &str) -> String {
    let digest = md5::compute(format!("{}{}{}{}", app_id, text, salt, secret));
    format!("{:x}", digest)
}

pub struct Baidu;

impl TranslateProvider for Baidu {
    fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        config: &ProviderConfig,
    ) -> ProviderResult {
        if config.app_id.trim().is_empty() {
            return Err(ProviderError::MissingCredential("baidu app id"));
        }
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential("baidu secret key"));
        }

        let salt = next_salt();
        let sign = sign(&config.app_id, text, salt, &config.api_key);
        let url = format!(
            "{}?q={}&from={}&to={}&appid={}&salt={}&sign={}",
            ENDPOINT,
            urlencoding::encode(text),
            lang::baidu_code(source),
            lang::baidu_code(target),
            config.app_id,
            salt,
            sign
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
    // Errors come back as {"error_code": "...", "error_msg": "..."}.
    if let Some(code) = json.get("error_code") {
        let code = code
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string());
        let msg = json
            .get("error_msg")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error");
        return Err(ProviderError::Provider(format!("{}: {}", code, msg)));
    }

    let results = json
        .get("trans_result")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderError::MalformedResponse("missing trans_result".to_string()))?;

    let lines: Vec<&str> = results
        .iter()
        .filter_map(|row| row.get("dst").and_then(|v| v.as_str()))
        .collect();

    if lines.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "empty trans_result".to_string(),
        ));
    }
    Ok(lines.join("\n"))
}
