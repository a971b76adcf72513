//! Translation provider adapters.
//!
//! Every backend implements [`TranslateProvider`] behind one uniform call;
//! the differences live in request shape (query-string GET vs JSON POST),
//! authentication (none, bearer key, signed query), language-code vocabulary,
//! and where the translated text sits in the response. Dispatch goes through
//! [`provider_for`], so adding a backend means one more table entry.

pub mod baidu;
pub mod chat;
pub mod client;
pub mod deepl;
pub mod google;
pub mod lang;
pub mod mymemory;

use thiserror::Error;

use crate::config::{ProviderConfig, ProviderId};

/// Failure modes of a provider call.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("provider error: {0}")]
    Provider(String),
}

pub type ProviderResult = Result<String, ProviderError>;

/// Uniform translation capability implemented by every backend.
///
/// `source` and `target` are canonical language tags ("en", "zh-CN", ...);
/// `source` may be "auto" for backends that support detection. `config` is an
/// immutable snapshot, so settings edits never affect a call in flight.
pub trait TranslateProvider: Send + Sync {
    fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        config: &ProviderConfig,
    ) -> ProviderResult;
}

/// Look up the adapter serving a provider id.
pub fn provider_for(id: ProviderId) -> &'static dyn TranslateProvider {
    match id {
        ProviderId::Google => &google::Google,
        ProviderId::MyMemory => &mymemory::MyMemory,
        ProviderId::DeepL => &deepl::DeepL,
        ProviderId::Baidu => &baidu::Baidu,
        ProviderId::DeepSeek => &chat::DEEPSEEK,
        ProviderId::OpenAi => &chat::OPENAI,
        ProviderId::Glm => &chat::GLM,
    }
}
