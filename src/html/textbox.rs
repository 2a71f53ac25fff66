//! Text boxes.
//!
//! A text box lays out a mix of runs, footnote references and other
//! elements as one flowing block. Before anything is emitted its children
//! are collapsed (adjacent runs of one style merged, footnotes numbered and
//! grouped after the text they follow) and measured, because the box's
//! height has to be on its opening tag.

use std::collections::BTreeSet;
use std::io::{self, Write};

use super::{Pt, RenderContext, CELL_PADDING, FOOTNOTE_NUMBER_STYLE};
use crate::model::{Entry, Footnote, TextBox, TextRun};
use crate::style::Color;
use crate::text::{self, LINE_HEIGHT_RATIO};

/// A collapsed child of a text box.
#[derive(Debug)]
enum Item<'e> {
    Text(TextRun),
    Footnote(usize),
    Element(&'e Entry),
    FlushFootnotes,
    PageBreak,
}

/// How a measured item ends.
#[derive(Debug, Clone, Copy, PartialEq)]
enum LineEnd {
    /// Continues the current line.
    Open,
    /// Was wrapped; the next item starts after its last line.
    Wrapped,
    /// Ends with an explicit line break.
    Broken,
}

#[derive(Debug, Clone, Copy)]
struct Measure {
    width: f64,
    end: LineEnd,
    line_feeds: usize,
}

/// Merge same-style runs and number footnotes, keeping document order.
fn collapse<'e, W: Write>(entries: &'e [Entry], ctx: &mut RenderContext<'_, W>) -> Vec<Item<'e>> {
    let mut items: Vec<Item<'e>> = Vec::new();
    let mut pending_text: Option<TextRun> = None;
    let mut pending_notes: BTreeSet<usize> = BTreeSet::new();

    fn flush_notes(items: &mut Vec<Item<'_>>, notes: &mut BTreeSet<usize>) {
        items.extend(std::mem::take(notes).into_iter().map(Item::Footnote));
    }

    for entry in entries {
        match entry {
            Entry::Text(run) => {
                flush_notes(&mut items, &mut pending_notes);
                match pending_text.as_mut() {
                    Some(last) if last.style == run.style => {
                        last.text.push_str(&run.text.replace('\n', "<br>"));
                    }
                    _ => {
                        if let Some(last) = pending_text.replace(run.clone()) {
                            items.push(Item::Text(last));
                        }
                    }
                }
            }
            Entry::Footnote(note) => {
                if note.text.trim().is_empty() {
                    continue;
                }
                let number = ctx.footnotes.check(note).number();
                if let Some(last) = pending_text.take() {
                    items.push(Item::Text(last));
                }
                pending_notes.insert(number);
            }
            Entry::Unknown => {}
            other => {
                if let Some(last) = pending_text.take() {
                    items.push(Item::Text(last));
                }
                flush_notes(&mut items, &mut pending_notes);
                items.push(match other {
                    Entry::FlushFootnotes => Item::FlushFootnotes,
                    Entry::PageBreak => Item::PageBreak,
                    element => Item::Element(element),
                });
            }
        }
    }
    if let Some(last) = pending_text.take() {
        items.push(Item::Text(last));
    }
    flush_notes(&mut items, &mut pending_notes);
    items
}

/// Measure one text against the remaining line, wrapping it in place when
/// it does not fit.
fn measure_text<W: Write>(
    text: &mut String,
    style_name: &str,
    remaining: f64,
    cell_width: f64,
    largest_font_size: &mut f64,
    ctx: &mut RenderContext<'_, W>,
) -> Measure {
    ctx.state.set_current_style(style_name);
    let style = ctx.current_style();
    if style.size_pt > *largest_font_size {
        *largest_font_size = style.size_pt;
    }

    let width = text::string_width(text, style);
    if remaining > 0.0 && (width >= remaining.trunc() || text::line_count(text) > 1) {
        let (wrapped, last_width) = text::wrap_remaining(text, remaining, cell_width, style);
        *text = wrapped;
        return Measure {
            width: last_width,
            end: LineEnd::Wrapped,
            line_feeds: text.matches('\n').count(),
        };
    }

    let line_feeds = text.matches('\n').count();
    Measure {
        width,
        end: if line_feeds > 0 { LineEnd::Broken } else { LineEnd::Open },
        line_feeds,
    }
}

/// Remaining width for an item: the whole cell for multi-line text,
/// otherwise what is left on the current line.
fn wrap_budget(text: &str, used: f64, cell_width: f64) -> f64 {
    if text.contains('\n') {
        cell_width
    } else {
        cell_width - used - 2.0
    }
}

/// Height of a multi-line run when laid out on its own.
fn text_height(run: &TextRun, ctx: &RenderContext<'_, impl Write>) -> f64 {
    let mut lines = run.text.matches('\n').count();
    if lines > 0 {
        lines += 1;
    }
    ctx.styles.resolve(&run.style).size_pt * lines as f64 * LINE_HEIGHT_RATIO
}

pub(super) fn render<W: Write>(text_box: &TextBox, ctx: &mut RenderContext<'_, W>) -> io::Result<()> {
    let mut items = collapse(&text_box.elements, ctx);

    let left = match text_box.left {
        Some(left) => {
            ctx.state.set_x(left);
            left
        }
        None => ctx.state.x(),
    };
    let top = match text_box.top {
        Some(top) => {
            ctx.state.set_y(top);
            top
        }
        None => ctx.state.y(),
    };

    let remaining = ctx.remaining_width();
    let width = if text_box.width == 0.0 || text_box.width > remaining {
        remaining
    } else {
        text_box.width
    };
    let padding = if text_box.padding { CELL_PADDING } else { 0.0 };
    let cell_width = width - padding * 2.0;

    // Measure: count line feeds of the text, sum heights of everything else.
    let mut line_feeds = 0usize;
    let mut element_height = 0.0;
    let mut footnote_height = 0.0;
    let mut used = 0.0;
    let mut largest_font_size = 0.0;
    for item in items.iter_mut() {
        let measure = match item {
            Item::Text(run) => {
                let budget = wrap_budget(&run.text, used, cell_width);
                if budget == cell_width {
                    used = 0.0;
                }
                let style_name = run.style.clone();
                let m = measure_text(
                    &mut run.text,
                    &style_name,
                    budget,
                    cell_width,
                    &mut largest_font_size,
                    ctx,
                );
                element_height += text_height(run, ctx);
                m
            }
            Item::Footnote(number) => {
                let mut label = format!("{} ", number);
                let budget = wrap_budget(&label, used, cell_width);
                if budget == cell_width {
                    used = 0.0;
                }
                let m = measure_text(
                    &mut label,
                    FOOTNOTE_NUMBER_STYLE,
                    budget,
                    cell_width,
                    &mut largest_font_size,
                    ctx,
                );
                Measure {
                    end: LineEnd::Wrapped,
                    ..m
                }
            }
            Item::Element(Entry::Image(image)) => {
                element_height += image.height;
                Measure {
                    width: image.width,
                    end: LineEnd::Open,
                    line_feeds: 0,
                }
            }
            Item::Element(_) | Item::PageBreak => Measure {
                width: 0.0,
                end: LineEnd::Open,
                line_feeds: 0,
            },
            Item::FlushFootnotes => {
                footnote_height += ctx.footnotes_height();
                continue;
            }
        };

        line_feeds += measure.line_feeds;
        used = match measure.end {
            LineEnd::Wrapped => measure.width,
            LineEnd::Broken => 0.0,
            LineEnd::Open => used + measure.width,
        };
        if used > cell_width {
            used = measure.width;
        }
    }

    let mut height = text_box.height;
    if !items.is_empty() {
        if element_height == 0.0 {
            let text_height = (line_feeds + 1) as f64 * LINE_HEIGHT_RATIO * largest_font_size;
            if height < text_height {
                height = text_height;
            }
        } else {
            if height < element_height {
                height = element_height;
            }
            height += footnote_height;
        }
    }
    if height < ctx.state.last_cell_height() {
        height = ctx.state.last_cell_height();
    }
    ctx.state.record_max_y(top + height);

    // Emit
    let mut css = format!(
        "position:absolute;top:{}pt;{}:{}pt;",
        Pt(top),
        ctx.setup.align_side,
        Pt(left)
    );
    if text_box.fill {
        if let Some(bg) = text_box.background.as_deref().and_then(Color::parse) {
            css.push_str(&format!(" background-color:{};", bg));
        }
    }
    if text_box.padding {
        css.push_str(&format!("padding:{}pt;", Pt(padding)));
    }
    if text_box.border {
        css.push_str(&format!(
            " border:solid black 1pt;width:{}pt;height:{}pt;",
            Pt(width - 1.0 - padding * 2.0),
            Pt(height - 1.0)
        ));
    } else {
        css.push_str(&format!(
            "width:{}pt;height:{}pt;",
            Pt(width - padding * 2.0),
            Pt(height)
        ));
    }
    write!(ctx.out, "<div style=\"{}\">", css)?;

    // Children are positioned relative to the box.
    let (saved_x, saved_y) = (ctx.state.x(), ctx.state.y());
    ctx.state.set_xy(0.0, 0.0);
    for item in &items {
        match item {
            Item::Text(run) => run.render_inline(ctx)?,
            Item::Footnote(number) => Footnote::render_reference(*number, ctx)?,
            Item::Element(entry) => ctx.dispatch_one(entry)?,
            Item::FlushFootnotes => ctx.flush_footnotes()?,
            Item::PageBreak => ctx.state.page_break(),
        }
    }
    ctx.out.write_all(b"</div>\n")?;
    ctx.state.set_xy(saved_x, saved_y);

    let flow_height = if text_box.reset_height { 0.0 } else { height };
    if text_box.newline {
        ctx.state.set_xy(0.0, top + flow_height + padding * 2.0);
        ctx.state.set_last_cell_height(0.0);
    } else {
        ctx.state.set_xy(left + width, top);
        ctx.state.set_last_cell_height(flow_height);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::Setup;
    use crate::model::{Image, PageGeometry};
    use crate::style::{StyleRegistry, StyleSpec};

    fn styles() -> StyleRegistry {
        let spec = |name: &str, size: f64| StyleSpec {
            name: name.to_string(),
            font: "dejavusans".to_string(),
            size,
            style: String::new(),
            color: None,
        };
        StyleRegistry::from_specs(
            &[spec("text", 10.0), spec("label", 12.0), spec("footnotenum", 6.0)],
            None,
        )
    }

    fn text(style: &str, text: &str) -> Entry {
        Entry::Text(TextRun {
            style: style.to_string(),
            color: None,
            text: text.to_string(),
        })
    }

    fn note(text: &str) -> Entry {
        Entry::Footnote(Footnote {
            style: "footnote".to_string(),
            text: text.to_string(),
        })
    }

    fn with_ctx<F, R>(f: F) -> R
    where
        F: FnOnce(&mut RenderContext<'_, Vec<u8>>) -> R,
    {
        let styles = styles();
        let setup = Setup::new(&PageGeometry::default(), None);
        let mut ctx = RenderContext::new(Vec::new(), &styles, &setup);
        f(&mut ctx)
    }

    #[test]
    fn collapse_merges_same_style_runs() {
        let entries = vec![
            text("text", "Born "),
            text("text", "1850\nin Oslo"),
            text("label", "Died"),
        ];
        with_ctx(|ctx| {
            let items = collapse(&entries, ctx);
            assert_eq!(items.len(), 2);
            match &items[0] {
                Item::Text(run) => assert_eq!(run.text, "Born 1850<br>in Oslo"),
                other => panic!("unexpected {:?}", other),
            }
        });
    }

    #[test]
    fn collapse_orders_footnotes_by_number() {
        let entries = vec![
            note("first"),
            text("text", "A"),
            note("second"),
            note("first"),
            note("   "),
            text("text", "B"),
        ];
        with_ctx(|ctx| {
            let items = collapse(&entries, ctx);
            let shape: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Item::Text(run) => run.text.clone(),
                    Item::Footnote(number) => format!("[{}]", number),
                    other => format!("{:?}", other),
                })
                .collect();
            assert_eq!(shape, ["[1]", "A", "[1]", "[2]", "B"]);
            assert_eq!(ctx.footnotes.len(), 2);
        });
    }

    #[test]
    fn text_only_box_uses_largest_font() {
        let text_box = TextBox {
            width: 200.0,
            newline: true,
            elements: vec![text("text", "small"), text("label", "big")],
            ..Default::default()
        };
        let (html, y, max_y) = with_ctx(|ctx| {
            render(&text_box, ctx).unwrap();
            (String::from_utf8(ctx.out.clone()).unwrap(), ctx.state.y(), ctx.state.max_y())
        });
        // one line, 12pt: 1.8 * 12 = 21.6
        assert!(html.starts_with("<div style=\"position:absolute;top:0pt;left:0pt;width:200pt;height:21.6pt;\">"));
        assert!(html.contains("class=\"text\">small</span><span dir=\"ltr\" class=\"label\">big</span>"));
        assert!((y - 21.6).abs() < 1e-9);
        assert!(max_y >= y);
    }

    #[test]
    fn font_size_does_not_carry_into_next_box() {
        let large = TextBox {
            width: 200.0,
            newline: true,
            elements: vec![text("label", "big")],
            ..Default::default()
        };
        let small = TextBox {
            width: 200.0,
            newline: true,
            elements: vec![text("text", "small")],
            ..Default::default()
        };
        let y = with_ctx(|ctx| {
            render(&large, ctx).unwrap();
            render(&small, ctx).unwrap();
            ctx.state.y()
        });
        // 1.8 * 12 for the first box, 1.8 * 10 for the second
        assert!((y - 39.6).abs() < 1e-9, "y = {}", y);
    }

    #[test]
    fn long_text_adds_line_feeds() {
        let text_box = TextBox {
            width: 100.0,
            newline: true,
            elements: vec![text("text", "alpha beta gamma delta epsilon zeta eta theta")],
            ..Default::default()
        };
        let y = with_ctx(|ctx| {
            render(&text_box, ctx).unwrap();
            ctx.state.y()
        });
        // 98pt budget at 5pt per char, words wrapped onto three lines
        assert!((y - 3.0 * 18.0).abs() < 1e-9, "y = {}", y);
    }

    #[test]
    fn image_box_uses_element_height() {
        let text_box = TextBox {
            width: 100.0,
            height: 10.0,
            border: true,
            elements: vec![Entry::Image(Image {
                src: "p.jpg".to_string(),
                width: 50.0,
                height: 80.0,
                ..Default::default()
            })],
            ..Default::default()
        };
        let (html, x, last) = with_ctx(|ctx| {
            render(&text_box, ctx).unwrap();
            (
                String::from_utf8(ctx.out.clone()).unwrap(),
                ctx.state.x(),
                ctx.state.last_cell_height(),
            )
        });
        assert!(html.contains(" border:solid black 1pt;width:99pt;height:79pt;"));
        assert_eq!(x, 100.0);
        assert_eq!(last, 80.0);
    }

    #[test]
    fn reset_height_does_not_push_next_line() {
        let text_box = TextBox {
            width: 100.0,
            height: 50.0,
            newline: true,
            reset_height: true,
            padding: true,
            elements: vec![text("text", "x")],
            ..Default::default()
        };
        let (y, max_y) = with_ctx(|ctx| {
            render(&text_box, ctx).unwrap();
            (ctx.state.y(), ctx.state.max_y())
        });
        assert_eq!(y, 4.0);
        assert_eq!(max_y, 50.0);
    }

    #[test]
    fn footnotes_in_box_link_to_registry() {
        let text_box = TextBox {
            elements: vec![text("text", "Census"), note("Census 1881, folio 12")],
            ..Default::default()
        };
        let html = with_ctx(|ctx| {
            render(&text_box, ctx).unwrap();
            render(&text_box, ctx).unwrap();
            assert_eq!(ctx.footnotes.len(), 1);
            String::from_utf8(ctx.out.clone()).unwrap()
        });
        assert_eq!(html.matches("<a href=\"#footnote1\"><sup>").count(), 2);
    }
}
