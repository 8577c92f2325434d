//! Translation safety layer
//!
//! [`TranslationGuard::translate`] is a total function: for any input string
//! it returns a usable string and never errors. Every failure mode along the
//! way (undetectable language, backend outage, polluted error-message
//! results) falls back to the original text.

use regex::Regex;
use whatlang::Lang;

use crate::pipeline::NormalizedPosting;
use crate::retry::RetryPolicy;
use crate::translate::backend::{TranslateBackend, TranslateError};

/// Maximum characters sent to the backend (API ceiling is 5,000)
pub const MAX_CHARS: usize = 4_900;

/// Detection only needs a leading sample
const DETECTION_SAMPLE_CHARS: usize = 500;

/// Known backend error phrases that sometimes come back as the "translation"
const BAD_TRANSLATION_PATTERN: &str = r"(?i)auto\s*is\s*(an?\s*)?invalid\s*source\s*language|invalid\s*(source|target)\s*language|translation\s*not\s*available|could\s*not\s*translate";

/// Per-field language detection and translation with layered fallbacks
pub struct TranslationGuard {
    backend: TranslateBackend,
    retry: RetryPolicy,
    bad_patterns: Regex,
}

impl TranslationGuard {
    pub fn new(backend: TranslateBackend) -> Self {
        Self::with_retry(backend, RetryPolicy::for_translation())
    }

    pub fn with_retry(backend: TranslateBackend, retry: RetryPolicy) -> Self {
        let bad_patterns =
            Regex::new(BAD_TRANSLATION_PATTERN).expect("bad-translation pattern set is valid");
        Self {
            backend,
            retry,
            bad_patterns,
        }
    }

    pub fn with_default_backend() -> Result<Self, reqwest::Error> {
        Ok(Self::new(TranslateBackend::default_endpoint()?))
    }

    /// Safely translates `text` to English; returns the original on empty
    /// input, failed detection, English input, backend failure, or a known
    /// bad result
    pub async fn translate(&self, text: &str, field_label: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        // Truncate to the API limit before anything else
        let text = truncate_chars(text, MAX_CHARS);

        let sample: String = text.chars().take(DETECTION_SAMPLE_CHARS).collect();
        let lang = match detect_language(&sample) {
            Some(lang) => lang,
            None => {
                tracing::debug!(
                    "  [translator] Could not detect language for '{}' — skipping",
                    field_label
                );
                return text;
            }
        };

        if lang == Lang::Eng {
            // Already English, fast-path return without a network call
            return text;
        }

        let source_code = match iso639_1(lang) {
            Some(code) => code,
            None => {
                tracing::debug!(
                    "  [translator] No backend code for detected language {:?} of '{}' — skipping",
                    lang,
                    field_label
                );
                return text;
            }
        };

        tracing::debug!(
            "  [translator] Translating '{}' from {} → en",
            field_label,
            source_code
        );

        let translated = match self
            .retry
            .run(
                || self.backend.translate(&text, source_code),
                TranslateError::is_transient,
            )
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(
                    "  [translator] Translation failed for '{}': {} — using original",
                    field_label,
                    e
                );
                return text;
            }
        };

        let translated = translated.trim();
        if translated.is_empty() || self.bad_patterns.is_match(translated) {
            tracing::warn!(
                "  [translator] Bad translation result for '{}' (lang={}) — using original",
                field_label,
                source_code
            );
            return text;
        }

        translated.to_string()
    }

    /// Translates each translatable field of a shallow copy; the caller's
    /// posting is never mutated and per-field failures are isolated
    pub async fn translate_fields(&self, posting: &NormalizedPosting) -> NormalizedPosting {
        let mut out = posting.clone();
        out.title = self.translate(&out.title, "title").await;
        out.company = self.translate(&out.company, "company").await;
        out.location = self.translate(&out.location, "location").await;
        out.description = self.translate(&out.description, "description").await;
        out.employment_type = self.translate(&out.employment_type, "employment_type").await;
        out
    }
}

/// Detects the language of `sample`; None when detection fails or is not
/// reliable enough to name a source language
fn detect_language(sample: &str) -> Option<Lang> {
    let sample = sample.trim();
    if sample.is_empty() {
        return None;
    }
    let info = whatlang::detect(sample)?;
    if !info.is_reliable() {
        return None;
    }
    Some(info.lang())
}

/// Truncates to at most `max` characters on a char boundary
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Maps a detected language to the ISO-639-1 code the backend accepts.
/// Unmapped languages are treated as detection failures upstream.
fn iso639_1(lang: Lang) -> Option<&'static str> {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Pol => "pl",
        Lang::Nld => "nl",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Fin => "fi",
        Lang::Nob => "no",
        Lang::Ces => "cs",
        Lang::Slk => "sk",
        Lang::Hun => "hu",
        Lang::Ron => "ro",
        Lang::Bul => "bg",
        Lang::Ell => "el",
        Lang::Tur => "tr",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Ben => "bn",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh-CN",
        Lang::Vie => "vi",
        Lang::Tha => "th",
        Lang::Ind => "id",
        Lang::Cat => "ca",
        Lang::Hrv => "hr",
        Lang::Srp => "sr",
        Lang::Lit => "lt",
        Lang::Lav => "lv",
        Lang::Est => "et",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard_with_unreachable_backend() -> TranslationGuard {
        // Port 9 is discard; any call fails fast. The tests below never get
        // that far because they exercise the pre-network fallbacks.
        let backend = TranslateBackend::new("http://127.0.0.1:9").unwrap();
        TranslationGuard::with_retry(
            backend,
            RetryPolicy::new(
                1,
                std::time::Duration::from_millis(1),
                std::time::Duration::from_millis(1),
            ),
        )
    }

    #[tokio::test]
    async fn test_empty_input_returned_unchanged() {
        let guard = guard_with_unreachable_backend();
        assert_eq!(guard.translate("", "title").await, "");
        assert_eq!(guard.translate("   ", "title").await, "   ");
    }

    #[tokio::test]
    async fn test_english_fast_path_is_identity() {
        let guard = guard_with_unreachable_backend();
        let text = "We are looking for a senior backend engineer to join our fully \
                    remote team and build distributed systems.";
        assert_eq!(guard.translate(text, "description").await, text);
    }

    #[tokio::test]
    async fn test_undetectable_input_returned_unchanged() {
        let guard = guard_with_unreachable_backend();
        let text = "1234 5678 !!!";
        assert_eq!(guard.translate(text, "title").await, text);
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_to_original() {
        let guard = guard_with_unreachable_backend();
        // Reliably Spanish, so the guard actually attempts the (dead) backend
        let text = "Buscamos una persona desarrolladora con experiencia en sistemas \
                    distribuidos para trabajar de forma remota desde cualquier lugar.";
        assert_eq!(guard.translate(text, "description").await, text);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multi-byte characters count as one
        assert_eq!(truncate_chars("ééééé", 3), "ééé");
    }

    #[test]
    fn test_bad_pattern_matching() {
        let guard = guard_with_unreachable_backend();
        assert!(guard.bad_patterns.is_match("AUTO IS AN INVALID SOURCE LANGUAGE"));
        assert!(guard.bad_patterns.is_match("auto is invalid source language"));
        assert!(guard.bad_patterns.is_match("Invalid target language"));
        assert!(guard.bad_patterns.is_match("Translation not available"));
        assert!(guard.bad_patterns.is_match("Sorry, could not translate this"));
        assert!(!guard.bad_patterns.is_match("A perfectly fine translation"));
    }

    #[test]
    fn test_iso_mapping_covers_common_languages() {
        assert_eq!(iso639_1(Lang::Spa), Some("es"));
        assert_eq!(iso639_1(Lang::Deu), Some("de"));
        assert_eq!(iso639_1(Lang::Cmn), Some("zh-CN"));
    }

    #[test]
    fn test_detection_rejects_empty_sample() {
        assert_eq!(detect_language("   "), None);
    }
}
