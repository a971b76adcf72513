//! Settings struct and the identifiers derived from it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a translation backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ProviderId {
    #[default]
    Google,
    MyMemory,
    DeepL,
    Baidu,
    DeepSeek,
    OpenAi,
    Glm,
}

impl ProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Google => "google",
            ProviderId::MyMemory => "mymemory",
            ProviderId::DeepL => "deepl",
            ProviderId::Baidu => "baidu",
            ProviderId::DeepSeek => "deepseek",
            ProviderId::OpenAi => "openai",
            ProviderId::Glm => "glm",
        }
    }

    /// Parse a stored id. Unknown or empty ids fall back to the default
    /// backend rather than failing the whole settings load.
    pub fn parse(s: &str) -> Self {
        match s {
            "google" => ProviderId::Google,
            "mymemory" => ProviderId::MyMemory,
            "deepl" => ProviderId::DeepL,
            "baidu" => ProviderId::Baidu,
            "deepseek" => ProviderId::DeepSeek,
            "openai" => ProviderId::OpenAi,
            "glm" => ProviderId::Glm,
            _ => ProviderId::default(),
        }
    }
}

impl Serialize for ProviderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ProviderId::parse(&s))
    }
}

/// The (provider, language pair) triple cache entries are valid under.
/// Changing any of the three invalidates the cached working set.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scope {
    pub provider: ProviderId,
    pub source_lang: String,
    pub target_lang: String,
}

/// Immutable per-call snapshot of provider credentials and overrides.
/// Settings edits never mutate an in-flight request's view of these.
#[derive(Clone, Debug, Default)]
pub struct ProviderConfig {
    pub api_key: String,
    pub app_id: String,
    pub endpoint: String,
    pub model: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub translator: ProviderId,
    #[serde(default)]
    pub api_key: String,
    /// Account id for backends that sign requests (Baidu).
    #[serde(default)]
    pub app_id: String,
    /// Endpoint override; empty means the backend default.
    #[serde(default)]
    pub api_endpoint: String,
    /// Model name for chat-completion backends; empty means the default.
    #[serde(default)]
    pub ai_model: String,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    // --- Display styling, consumed by the overlay collaborator only ---
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_font_color")]
    pub font_color: String,
    #[serde(default = "default_bg_opacity")]
    pub bg_opacity: f32,
}

impl Settings {
    /// The cache-scoping triple of this settings snapshot.
    pub fn scope(&self) -> Scope {
        Scope {
            provider: self.translator,
            source_lang: self.source_lang.clone(),
            target_lang: self.target_lang.clone(),
        }
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.api_key.clone(),
            app_id: self.app_id.clone(),
            endpoint: self.api_endpoint.clone(),
            model: self.ai_model.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            translator: ProviderId::default(),
            api_key: String::new(),
            app_id: String::new(),
            api_endpoint: String::new(),
            ai_model: String::new(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            font_size: default_font_size(),
            font_color: default_font_color(),
            bg_opacity: default_bg_opacity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_source_lang() -> String {
    "auto".to_string()
}

fn default_target_lang() -> String {
    "zh-CN".to_string()
}

fn default_font_size() -> f32 {
    1.8
}

fn default_font_color() -> String {
    "#ffd700".to_string()
}

fn default_bg_opacity() -> f32 {
    0.75
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_id_falls_back_to_default() {
        assert_eq!(ProviderId::parse("yandex"), ProviderId::Google);
        assert_eq!(ProviderId::parse(""), ProviderId::Google);
        assert_eq!(ProviderId::parse("baidu"), ProviderId::Baidu);
    }

    #[test]
    fn settings_deserialize_with_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{"translator":"deepl"}"#).unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.translator, ProviderId::DeepL);
        assert_eq!(settings.source_lang, "auto");
        assert_eq!(settings.target_lang, "zh-CN");
    }

    #[test]
    fn scope_ignores_styling_fields() {
        let mut a = Settings::default();
        let mut b = Settings::default();
        b.font_size = 2.4;
        b.bg_opacity = 0.3;
        assert_eq!(a.scope(), b.scope());
        a.target_lang = "fr".to_string();
        assert_ne!(a.scope(), b.scope());
    }
}
