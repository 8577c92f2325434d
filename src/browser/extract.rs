//! Tolerant field extraction over an HTML snapshot
//!
//! Upstream markup drifts often. Every reader here returns the declared
//! default instead of failing, and records whether it fell back so callers
//! can observe extraction gaps without parsing logs. There is no retry:
//! re-running a selector against the same snapshot cannot change the outcome.

use scraper::{Html, Selector};

/// The result of a defensive field lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// The extracted (trimmed) value, or the declared default
    pub value: String,
    /// True when the selector did not produce a value and the default was used
    pub fell_back: bool,
}

impl Extracted {
    fn found(value: String) -> Self {
        Self {
            value,
            fell_back: false,
        }
    }

    fn fallback(default: &str) -> Self {
        Self {
            value: default.to_string(),
            fell_back: true,
        }
    }

    /// Consumes the extraction, keeping only the value
    pub fn into_value(self) -> String {
        self.value
    }
}

/// Extracts the inner text of the first element matching `selector`
///
/// Selector lists (`"h1.old, h1.new"`) are supported; the first match in
/// document order wins.
pub fn text(document: &Html, selector: &str, default: &str) -> Extracted {
    let parsed = match Selector::parse(selector) {
        Ok(parsed) => parsed,
        Err(_) => return Extracted::fallback(default),
    };

    match document.select(&parsed).next() {
        Some(element) => {
            let value = element.text().collect::<String>().trim().to_string();
            Extracted::found(value)
        }
        None => Extracted::fallback(default),
    }
}

/// Extracts an attribute value from the first element matching `selector`
pub fn attribute(document: &Html, selector: &str, attr: &str, default: &str) -> Extracted {
    let parsed = match Selector::parse(selector) {
        Ok(parsed) => parsed,
        Err(_) => return Extracted::fallback(default),
    };

    match document
        .select(&parsed)
        .next()
        .and_then(|element| element.value().attr(attr))
    {
        Some(value) => Extracted::found(value.trim().to_string()),
        None => Extracted::fallback(default),
    }
}

/// Extracts the inner text of every element matching `selector`, in document
/// order; an unparsable selector yields an empty list
pub fn text_all(document: &Html, selector: &str) -> Vec<String> {
    let parsed = match Selector::parse(selector) {
        Ok(parsed) => parsed,
        Err(_) => return Vec::new(),
    };

    document
        .select(&parsed)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .collect()
}
