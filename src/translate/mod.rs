//! Translation safety layer
//!
//! Language detection plus translation with multi-layer fallback to the
//! original text. The guard is total: no input can make it fail.

pub mod backend;
mod guard;

pub use backend::{TranslateBackend, TranslateError, DEFAULT_ENDPOINT};
pub use guard::{TranslationGuard, MAX_CHARS};
