//! Text normalization applied before synthesis.
//!
//! The normalizer tokenizes Indic text so that punctuation (including the
//! danda) stands apart from words while numbers and dates stay intact. It
//! never fails: if tokenization errors, the input is passed through as-is.

mod tokenizer;

pub use tokenizer::{is_supported_language, trivial_tokenize, NormalizationError};

/// Language tag used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "hi";

/// Tokenize `text` for `language` and re-join tokens with single spaces.
///
/// Falls back to the input text unchanged on any tokenization failure.
pub fn normalize(text: &str, language: &str) -> String {
    match try_normalize(text, language) {
        Ok(normalized) => normalized,
        Err(e) => {
            log::warn!("Error preprocessing text, using it unchanged: {e}");
            text.to_string()
        }
    }
}

/// Tokenize `text` for `language`, surfacing tokenizer errors.
pub fn try_normalize(text: &str, language: &str) -> Result<String, NormalizationError> {
    Ok(trivial_tokenize(text, language)?.join(" "))
}

/// Normalizer bound to the language of the deployed voice.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    language: String,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl TextNormalizer {
    pub fn new(language: impl Into<String>) -> Self {
        let language = language.into();
        if !is_supported_language(&language) {
            log::warn!("Language '{language}' has no dedicated tokenizer rules; using the Indic rules");
        }
        Self { language }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn normalize(&self, text: &str) -> String {
        normalize(text, &self.language)
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize, try_normalize, TextNormalizer};

    #[test]
    fn splits_punctuation_from_hindi_words() {
        assert_eq!(
            normalize("हेलो, यह एक टेस्ट है।", "hi"),
            "हेलो , यह एक टेस्ट है ।"
        );
    }

    #[test]
    fn unlisted_language_is_still_tokenized() {
        assert_eq!(try_normalize("hello,world", "en").unwrap(), "hello , world");
        assert_eq!(normalize("hello,world", "xx"), "hello , world");
    }

    #[test]
    fn normalizer_uses_configured_language() {
        let normalizer = TextNormalizer::new("ur");
        assert_eq!(normalizer.language(), "ur");
        assert_eq!(normalizer.normalize("سلام، دنیا۔"), "سلام ، دنیا ۔");
    }

    #[test]
    fn default_normalizer_is_hindi() {
        assert_eq!(TextNormalizer::default().language(), "hi");
    }
}
