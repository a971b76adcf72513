//! Per-provider language-code vocabularies.
//!
//! The crate speaks canonical tags ("en", "zh-CN", ...). Each backend has its
//! own code set; unmapped tags fall through to a documented default instead
//! of failing, since backends reject codes they do not know anyway.

/// DeepL speaks uppercase codes and folds both Chinese variants into ZH.
/// Unmapped tags fall back to the uppercased primary subtag.
pub fn deepl_code(tag: &str) -> String {
    match tag {
        "en" => "EN".to_string(),
        "zh-CN" | "zh-TW" | "zh" => "ZH".to_string(),
        "ja" => "JA".to_string(),
        "ko" => "KO".to_string(),
        "fr" => "FR".to_string(),
        "de" => "DE".to_string(),
        "es" => "ES".to_string(),
        "ru" => "RU".to_string(),
        "pt" => "PT".to_string(),
        "it" => "IT".to_string(),
        _ => primary_subtag(tag).to_ascii_uppercase(),
    }
}

/// Baidu's own vocabulary. Unmapped tags pass through as their primary
/// subtag, which covers the codes Baidu shares with ISO 639-1.
pub fn baidu_code(tag: &str) -> String {
    match tag {
        "auto" => "auto".to_string(),
        "zh-CN" | "zh" => "zh".to_string(),
        "zh-TW" => "cht".to_string(),
        "ja" => "jp".to_string(),
        "ko" => "kor".to_string(),
        "fr" => "fra".to_string(),
        "es" => "spa".to_string(),
        "ar" => "ara".to_string(),
        "vi" => "vie".to_string(),
        _ => primary_subtag(tag).to_string(),
    }
}

/// English name of a language tag, for instructing chat-completion models.
/// Unresolvable tags pass through verbatim.
pub fn language_name(tag: &str) -> String {
    match tag {
        "zh-CN" => return "Simplified Chinese".to_string(),
        "zh-TW" => return "Traditional Chinese".to_string(),
        _ => {}
    }
    isolang::Language::from_639_1(primary_subtag(tag))
        .map(|lang| lang.to_name().to_string())
        .unwrap_or_else(|| tag.to_string())
}

fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deepl_codes() {
        assert_eq!(deepl_code("en"), "EN");
        assert_eq!(deepl_code("zh-CN"), "ZH");
        assert_eq!(deepl_code("zh-TW"), "ZH");
        // Fallback: uppercase the primary subtag.
        assert_eq!(deepl_code("nl"), "NL");
        assert_eq!(deepl_code("pt-BR"), "PT");
    }

    #[test]
    fn baidu_codes() {
        assert_eq!(baidu_code("auto"), "auto");
        assert_eq!(baidu_code("zh-CN"), "zh");
        assert_eq!(baidu_code("zh-TW"), "cht");
        assert_eq!(baidu_code("ja"), "jp");
        assert_eq!(baidu_code("ko"), "kor");
        // Passthrough fallback.
        assert_eq!(baidu_code("en"), "en");
        assert_eq!(baidu_code("de"), "de");
    }

    #[test]
    fn language_names() {
        assert_eq!(language_name("en"), "English");
        assert_eq!(language_name("ja"), "Japanese");
        assert_eq!(language_name("zh-CN"), "Simplified Chinese");
        // Unresolvable tags pass through.
        assert_eq!(language_name("x-custom"), "x-custom");
    }
}
