//! Browser session and defensive field extraction
//!
//! The search surface renders listings with JavaScript and lazy loading, so
//! crawling runs through a real browser session ([`BrowserSession`]). Field
//! extraction ([`extract`]) operates on HTML snapshots of the live page and
//! never fails; markup drift yields declared defaults instead of errors.

pub mod extract;
mod session;

pub use extract::{attribute, text, text_all, Extracted};
pub use session::BrowserSession;
