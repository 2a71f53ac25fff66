//! # Folio
//!
//! A streaming HTML report layout engine.
//!
//! A report arrives as an ordered list of positioned elements (cells, text
//! boxes, text runs, lines, images, footnote references and raw markup)
//! split into a page header, a header, a body and a footer. Folio turns it
//! into one continuously scrolling HTML page. Nothing is laid out twice:
//! every element is emitted in order against a moving cursor, and each
//! container is sized afterwards from the lowest point its content reached.
//!
//! Page breaks are simulated. There is only one page, so a break leaves a
//! small gap and advances the page counter.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]     Document: geometry, styles, four entry buckets
//!       ↓
//!   [style]     Style registry and style sheet rules
//!       ↓
//!   [layout]    Cursor, container extent, page breaks
//!   [text]      Approximate metrics and wrapping
//!   [footnote]  Deduplicated, numbered footnotes
//!       ↓
//!   [html]      Stream HTML fragments to a writer
//! ```

pub mod error;
pub mod footnote;
pub mod html;
pub mod layout;
pub mod model;
pub mod style;
pub mod text;

pub use error::Error;

use std::io::Write;
use std::time::Instant;

use html::{HtmlBackend, ReportBackend};
use model::Document;
use style::StyleRegistry;

/// Render a document into `out`, returning the writer once everything has
/// been flushed.
pub fn render_to<W: Write>(document: &Document, out: W) -> Result<W, Error> {
    let t0 = Instant::now();

    document.geometry.validate()?;
    let styles = StyleRegistry::from_specs(&document.styles, document.default_style.as_deref());

    let mut backend = HtmlBackend::new();
    backend.initialize(&document.geometry, document.attribution.as_ref());
    let out = backend.render_document(document.buckets(), &styles, out)?;

    log::info!(
        "Timing: render={:.1}ms for '{}' ({} styles, {} body entries)",
        t0.elapsed().as_secs_f64() * 1000.0,
        document.title.as_deref().unwrap_or("untitled"),
        styles.len(),
        document.body.len(),
    );
    Ok(out)
}

/// Render a document to an HTML string.
pub fn render(document: &Document) -> Result<String, Error> {
    let bytes = render_to(document, Vec::new())?;
    // Every fragment is built from `&str`, so the buffer is valid UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Render a document described as JSON to an HTML string.
pub fn render_json(json: &str) -> Result<String, Error> {
    let document: Document = serde_json::from_str(json)?;
    render(&document)
}
