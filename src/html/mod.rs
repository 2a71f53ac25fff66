//! # HTML Renderer
//!
//! Streams a report as styled HTML. Output is written in document order and
//! never revised, so each container's height is only known once its content
//! has gone out. Containers are therefore emitted in two steps: open, stream,
//! close; then a short script that sizes the container to the lowest point
//! its content reached.
//!
//! ```text
//! <style>        one class per registered style
//! headermargin   spacer
//! headerdiv      header bucket            -> sized from the top margin
//! bodydiv        page header + body       -> sized to max_y
//! bottommargin   spacer
//! footerdiv      footer bucket (+ attribution) -> sized to max_y
//! footermargin   spacer
//! ```

mod elements;
mod textbox;

pub use elements::Render;

use std::fmt;
use std::io::{self, Write};

use crate::error::Error;
use crate::footnote::{anchor, FootnoteRegistry, NumberedFootnote};
use crate::layout::LayoutState;
use crate::model::{
    Align, Attribution, Cell, CellFlow, Document, Entry, Margins, PageGeometry, TextDirection,
};
use crate::style::{Color, Style, StyleRegistry, DEFAULT_FONT_FAMILY};
use crate::text;

/// Padding around cell content, in points.
pub const CELL_PADDING: f64 = 2.0;

/// Gap kept between the header container and the body.
const HEADER_GAP: f64 = 6.0;

/// Style used for footnote reference numbers.
pub const FOOTNOTE_NUMBER_STYLE: &str = "footnotenum";

/// Style used for the attribution line.
pub const ATTRIBUTION_STYLE: &str = "genby";

/// A length in points, printed with at most two decimals.
#[derive(Debug, Clone, Copy)]
pub struct Pt(pub f64);

impl fmt::Display for Pt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `+ 0.0` turns -0 into 0.
        let v = (self.0 * 100.0).round() / 100.0 + 0.0;
        write!(f, "{}", v)
    }
}

/// The four element sequences of a report.
#[derive(Debug, Clone, Copy)]
pub struct Buckets<'a> {
    pub page_header: &'a [Entry],
    pub header: &'a [Entry],
    pub body: &'a [Entry],
    pub footer: &'a [Entry],
}

impl Document {
    pub fn buckets(&self) -> Buckets<'_> {
        Buckets {
            page_header: &self.page_header,
            header: &self.header,
            body: &self.body,
            footer: &self.footer,
        }
    }
}

/// A rendering backend: set up once with the page geometry, then render a
/// document to a sink.
pub trait ReportBackend {
    fn initialize(&mut self, geometry: &PageGeometry, attribution: Option<&Attribution>);

    fn render_document<W: Write>(
        &mut self,
        buckets: Buckets<'_>,
        styles: &StyleRegistry,
        out: W,
    ) -> Result<W, Error>;
}

/// Values derived from the geometry during setup.
#[derive(Debug, Clone)]
pub struct Setup {
    pub printable_width: f64,
    pub margins: Margins,
    pub direction: TextDirection,
    /// CSS side that horizontal offsets are measured from.
    pub align_side: &'static str,
    /// Direction mark appended to footnote numbers.
    pub direction_entity: &'static str,
    pub default_family: &'static str,
    /// Entries appended after the footer bucket.
    pub footer_extra: Vec<Entry>,
}

impl Setup {
    pub fn new(geometry: &PageGeometry, attribution: Option<&Attribution>) -> Self {
        let (align_side, direction_entity) = match geometry.direction {
            TextDirection::Ltr => ("left", "&lrm;"),
            TextDirection::Rtl => ("right", "&rlm;"),
        };

        let mut footer_extra = Vec::new();
        if let Some(attribution) = attribution.filter(|a| a.enabled) {
            footer_extra.push(Entry::Cell(Cell {
                width: 0.0,
                height: 10.0,
                align: Some(Align::Center),
                style: ATTRIBUTION_STYLE.to_string(),
                flow: CellFlow::NextLine,
                url: attribution.url.clone(),
                text: attribution.text.clone(),
                ..Default::default()
            }));
        }

        Self {
            printable_width: geometry.printable_width(),
            margins: geometry.margins,
            direction: geometry.direction,
            align_side,
            direction_entity,
            default_family: DEFAULT_FONT_FAMILY,
            footer_extra,
        }
    }
}

/// The HTML backend.
#[derive(Debug, Clone)]
pub struct HtmlBackend {
    setup: Setup,
}

impl Default for HtmlBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlBackend {
    pub fn new() -> Self {
        Self {
            setup: Setup::new(&PageGeometry::default(), None),
        }
    }
}

impl ReportBackend for HtmlBackend {
    fn initialize(&mut self, geometry: &PageGeometry, attribution: Option<&Attribution>) {
        self.setup = Setup::new(geometry, attribution);
    }

    fn render_document<W: Write>(
        &mut self,
        buckets: Buckets<'_>,
        styles: &StyleRegistry,
        out: W,
    ) -> Result<W, Error> {
        let mut ctx = RenderContext::new(out, styles, &self.setup);
        ctx.page_header = buckets.page_header.to_vec();
        ctx.write_style_sheet()?;

        let width = Pt(self.setup.printable_width);
        let margins = self.setup.margins;

        // Header
        write!(
            ctx.out,
            "<div id=\"headermargin\" style=\"position: relative; top: auto; height: {}pt; width: {}pt;\"></div>",
            Pt(margins.header),
            width
        )?;
        let header = Container::open(&mut ctx, "headerdiv", "")?;
        ctx.dispatch(buckets.header)?;
        header.close(&mut ctx, margins.top - margins.header - HEADER_GAP)?;

        // Body, with the running header replayed once at the top
        let body = Container::open(&mut ctx, "bodydiv", " height: 100%;")?;
        ctx.state.reset_container();
        let page_header = ctx.page_header.clone();
        ctx.dispatch(&page_header)?;
        ctx.dispatch(buckets.body)?;
        let body_height = ctx.state.max_y();
        body.close(&mut ctx, body_height)?;

        // Footer
        write!(
            ctx.out,
            "<div id=\"bottommargin\" style=\"position: relative; top: auto; height: {}pt;width:{}pt;\"></div>",
            Pt(margins.bottom - margins.footer),
            width
        )?;
        let footer = Container::open(&mut ctx, "footerdiv", "height:auto;")?;
        ctx.state.reset_origin();
        ctx.dispatch(buckets.footer)?;
        ctx.dispatch(&self.setup.footer_extra)?;
        let footer_height = ctx.state.max_y();
        footer.close(&mut ctx, footer_height)?;
        write!(
            ctx.out,
            "<div id=\"footermargin\" style=\"position: relative; top: auto; height: {}pt;width:{}pt;\"></div>\n",
            Pt(margins.footer),
            width
        )?;

        log::debug!(
            "Rendered {} footnotes over {} simulated pages",
            ctx.footnotes.len(),
            ctx.state.page_number()
        );
        ctx.out.flush()?;
        Ok(ctx.out)
    }
}

/// An open container whose height is patched in after its content.
#[must_use]
struct Container {
    id: &'static str,
}

impl Container {
    fn open<W: Write>(ctx: &mut RenderContext<'_, W>, id: &'static str, extra: &str) -> io::Result<Self> {
        write!(
            ctx.out,
            "<div id=\"{}\" style=\"position: relative; top: auto; width: {}pt;{}\">",
            id,
            Pt(ctx.setup.printable_width),
            extra
        )?;
        Ok(Container { id })
    }

    fn close<W: Write>(self, ctx: &mut RenderContext<'_, W>, height: f64) -> io::Result<()> {
        ctx.out.write_all(b"</div>")?;
        writeln!(
            ctx.out,
            "<script>document.getElementById(\"{}\").style.height=\"{}pt\";</script>",
            self.id,
            Pt(height)
        )
    }
}

/// Bounds of the last image placed, for collision checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ImageBounds {
    pub(crate) page: u32,
    pub(crate) left: f64,
    pub(crate) right: f64,
    pub(crate) bottom: f64,
}

/// Everything one rendering pass reads and mutates.
pub struct RenderContext<'a, W: Write> {
    pub out: W,
    pub state: LayoutState,
    pub footnotes: FootnoteRegistry,
    pub styles: &'a StyleRegistry,
    pub setup: &'a Setup,
    /// Running header installed by a page header block.
    pub(crate) page_header: Vec<Entry>,
    pub(crate) last_image: Option<ImageBounds>,
}

impl<'a, W: Write> RenderContext<'a, W> {
    pub fn new(out: W, styles: &'a StyleRegistry, setup: &'a Setup) -> Self {
        Self {
            out,
            state: LayoutState::new(),
            footnotes: FootnoteRegistry::new(),
            styles,
            setup,
            page_header: Vec::new(),
            last_image: None,
        }
    }

    /// The active style, or the default one when none is active.
    pub fn current_style(&self) -> &'a Style {
        let styles: &'a StyleRegistry = self.styles;
        styles.resolve(self.state.current_style())
    }

    /// Width left between the cursor and the right margin.
    pub fn remaining_width(&self) -> f64 {
        (self.setup.printable_width - self.state.x()).trunc()
    }

    /// Apply the content substitutions: page number and source title underlining.
    pub fn substitute(&self, text: &str) -> String {
        text.replace("#PAGENUM#", &self.state.page_number().to_string())
            .replace('«', "<u>")
            .replace('»', "</u>")
    }

    /// Stream a sequence of entries.
    pub fn dispatch(&mut self, entries: &[Entry]) -> io::Result<()> {
        for entry in entries {
            self.dispatch_one(entry)?;
        }
        Ok(())
    }

    pub fn dispatch_one(&mut self, entry: &Entry) -> io::Result<()> {
        log::trace!("{} at ({}, {})", entry.kind_name(), self.state.x(), self.state.y());
        match entry {
            Entry::Cell(cell) => cell.render(self),
            Entry::TextBox(text_box) => text_box.render(self),
            Entry::Text(run) => run.render(self),
            Entry::Line(line) => line.render(self),
            Entry::Image(image) => image.render(self),
            Entry::Html(markup) => markup.render(self),
            Entry::Footnote(note) => note.render(self),
            Entry::PageHeader(block) => block.render(self),
            Entry::FlushFootnotes => self.flush_footnotes(),
            Entry::PageBreak => {
                self.state.page_break();
                Ok(())
            }
            Entry::Unknown => {
                log::debug!("Skipping unknown entry");
                Ok(())
            }
        }
    }

    /// Write a text span in the current style.
    pub fn write_text(&mut self, text: &str, color: Option<&str>, use_class: bool) -> io::Result<()> {
        let mut html = format!("<span dir=\"{}\"", self.setup.direction.as_str());
        if use_class {
            let name = &self.current_style().name;
            if !name.is_empty() {
                html.push_str(&format!(" class=\"{}\"", name));
            }
        }
        if let Some(color) = color.and_then(Color::parse) {
            html.push_str(&format!(" style=\"color:{};\"", color));
        }
        html.push('>');
        html.push_str(text);
        html.push_str("</span>");
        let html = html
            .replace('\n', "<br>")
            .replace("> ", ">&nbsp;")
            .replace(" <", "&nbsp;<");
        self.out.write_all(html.as_bytes())
    }

    /// Text of a flushed footnote block, substitutions applied.
    fn footnote_text(&self, note: &NumberedFootnote) -> String {
        self.substitute(&format!("{}. {}", note.number, note.text))
    }

    /// Height of a footnote's text block, as flushed.
    pub fn footnote_height(&self, note: &NumberedFootnote) -> f64 {
        let style = self.styles.resolve(&note.style);
        text::cell_height(&self.footnote_text(note), style)
    }

    /// Total height of all registered footnotes.
    pub fn footnotes_height(&self) -> f64 {
        self.footnotes.iter().map(|n| self.footnote_height(n)).sum()
    }

    /// Render the text of every registered footnote.
    pub fn flush_footnotes(&mut self) -> io::Result<()> {
        self.state.clear_current_style();
        let notes: Vec<NumberedFootnote> = self.footnotes.iter().cloned().collect();
        for note in &notes {
            self.state.set_current_style(&note.style);
            let content = self.footnote_text(note);
            write!(self.out, "\n<div><a name=\"{}\"></a>", anchor(note.number))?;
            self.write_text(&content, None, true)?;
            self.out.write_all(b"</div>")?;
            let height = text::cell_height(&content, self.styles.resolve(&note.style));
            self.state.set_xy(0.0, self.state.y() + height);
        }
        Ok(())
    }

    fn write_style_sheet(&mut self) -> io::Result<()> {
        self.out.write_all(b"<style type=\"text/css\">")?;
        for style in self.styles.iter() {
            writeln!(
                self.out,
                ".{} {{ {}}}",
                style.name,
                style.css_declarations(self.setup.default_family)
            )?;
        }
        self.out.write_all(b"</style>\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Footnote;
    use crate::style::StyleSpec;

    fn registry() -> StyleRegistry {
        StyleRegistry::from_specs(
            &[
                StyleSpec {
                    name: "text".to_string(),
                    font: "dejavusans".to_string(),
                    size: 10.0,
                    style: String::new(),
                    color: None,
                },
                StyleSpec {
                    name: "footnote".to_string(),
                    font: "dejavusans".to_string(),
                    size: 8.0,
                    style: "I".to_string(),
                    color: None,
                },
            ],
            None,
        )
    }

    fn output(ctx: RenderContext<'_, Vec<u8>>) -> String {
        String::from_utf8(ctx.out).unwrap()
    }

    #[test]
    fn pt_formatting() {
        assert_eq!(Pt(10.0).to_string(), "10");
        assert_eq!(Pt(26.8 - 4.9 - 6.0).to_string(), "15.9");
        assert_eq!(Pt(-0.0).to_string(), "0");
        assert_eq!(Pt(1.005).to_string(), "1");
        assert_eq!(Pt(2.5).to_string(), "2.5");
    }

    #[test]
    fn write_text_replaces_breaks_and_edge_spaces() {
        let styles = registry();
        let setup = Setup::new(&PageGeometry::default(), None);
        let mut ctx = RenderContext::new(Vec::new(), &styles, &setup);
        ctx.state.set_current_style("text");
        ctx.write_text(" a\nb ", Some("#f00"), true).unwrap();
        assert_eq!(
            output(ctx),
            "<span dir=\"ltr\" class=\"text\" style=\"color:#ff0000;\">&nbsp;a<br>b&nbsp;</span>"
        );
    }

    #[test]
    fn malformed_color_is_dropped() {
        let styles = registry();
        let setup = Setup::new(&PageGeometry::default(), None);
        let mut ctx = RenderContext::new(Vec::new(), &styles, &setup);
        ctx.write_text("x", Some("not-a-color"), false).unwrap();
        assert_eq!(output(ctx), "<span dir=\"ltr\">x</span>");
    }

    #[test]
    fn substitutions() {
        let styles = registry();
        let setup = Setup::new(&PageGeometry::default(), None);
        let mut ctx = RenderContext::new(Vec::new(), &styles, &setup);
        ctx.state.page_break();
        assert_eq!(ctx.substitute("Page #PAGENUM# of «Title»"), "Page 2 of <u>Title</u>");
    }

    #[test]
    fn flush_resets_style_and_advances() {
        let styles = registry();
        let setup = Setup::new(&PageGeometry::default(), None);
        let mut ctx = RenderContext::new(Vec::new(), &styles, &setup);
        ctx.state.set_current_style("text");
        ctx.footnotes.check(&Footnote {
            style: "footnote".to_string(),
            text: "Birth record".to_string(),
        });
        ctx.flush_footnotes().unwrap();
        // 8pt * 1.8 = 14.4 -> 15
        assert_eq!(ctx.state.y(), 15.0);
        assert_eq!(ctx.state.current_style(), "footnote");
        let html = output(ctx);
        assert!(html.contains("<a name=\"footnote1\"></a>"));
        assert!(html.contains("class=\"footnote\">1. Birth record</span>"));
    }

    #[test]
    fn flushed_height_matches_emitted_text() {
        let styles = registry();
        let setup = Setup::new(&PageGeometry::default(), None);
        let mut ctx = RenderContext::new(Vec::new(), &styles, &setup);
        ctx.state.page_break();
        for note in ["Page #PAGENUM# of «Kirkebok»", "Line one\nline two"] {
            ctx.footnotes.check(&Footnote {
                style: "footnote".to_string(),
                text: note.to_string(),
            });
        }
        let expected = ctx.footnotes_height();
        let start = ctx.state.y();
        ctx.flush_footnotes().unwrap();
        // 15 for the first note, 29 for the two-line one
        assert_eq!(expected, 44.0);
        assert_eq!(ctx.state.y() - start, expected);
        let html = output(ctx);
        assert!(html.contains(">1. Page 2 of&nbsp;<u>Kirkebok</u></span>"));
    }

    #[test]
    fn rtl_setup() {
        let mut geometry = PageGeometry::default();
        geometry.direction = TextDirection::Rtl;
        let setup = Setup::new(&geometry, None);
        assert_eq!(setup.align_side, "right");
        assert_eq!(setup.direction_entity, "&rlm;");
    }

    #[test]
    fn attribution_becomes_a_footer_cell() {
        let attribution = Attribution {
            enabled: true,
            text: "Generated by folio".to_string(),
            url: Some("https://example.org/".to_string()),
        };
        let setup = Setup::new(&PageGeometry::default(), Some(&attribution));
        assert_eq!(setup.footer_extra.len(), 1);
        match &setup.footer_extra[0] {
            Entry::Cell(cell) => {
                assert_eq!(cell.style, ATTRIBUTION_STYLE);
                assert_eq!(cell.align, Some(Align::Center));
                assert_eq!(cell.height, 10.0);
            }
            other => panic!("expected cell, got {:?}", other),
        }

        let disabled = Attribution {
            enabled: false,
            ..attribution
        };
        assert!(Setup::new(&PageGeometry::default(), Some(&disabled)).footer_extra.is_empty());
    }
}
