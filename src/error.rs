//! Structured error types for the Folio report engine.
//!
//! Rendering degrades silently on odd content, so only three things can
//! fail: parsing the JSON document, writing to the output sink, and a page
//! geometry that cannot describe a page at all.

use thiserror::Error;

/// The unified error type returned by all public Folio API functions.
#[derive(Debug, Error)]
pub enum Error {
    /// JSON input failed to parse as a valid Folio document.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
    /// The output sink rejected a write.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
    /// Page geometry is unusable (zero-sized page, margins wider than the page).
    #[error("Geometry error: {0}")]
    Geometry(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the Folio document schema. Check element types and field names.".to_string()
            }
            serde_json::error::Category::Eof => "Unexpected end of input, is the JSON truncated?".to_string(),
            serde_json::error::Category::Io => String::new(),
        };
        Error::Parse { source: e, hint }
    }
}
