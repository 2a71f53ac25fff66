//! Per-element HTML emission.
//!
//! Every element renders itself against the shared context: it may move
//! the cursor, and it appends its fragment to the output in order. Absent
//! positions resolve to the cursor at render time; the elements themselves
//! are never modified.

use std::io::{self, Write};

use super::{ImageBounds, RenderContext, CELL_PADDING, FOOTNOTE_NUMBER_STYLE};
use crate::footnote::anchor;
use crate::model::{
    Align, Borders, Cell, CellFlow, Footnote, Image, Line, PageHeaderBlock, RawMarkup, TextBox,
    TextRun,
};
use crate::style::Color;
use crate::text;

use super::Pt;

/// An element that can stream itself into a rendering pass.
pub trait Render {
    fn render<W: Write>(&self, ctx: &mut RenderContext<'_, W>) -> io::Result<()>;
}

fn align_css(align: Option<Align>) -> &'static str {
    match align {
        Some(Align::Left) => " text-align:left;",
        Some(Align::Center) => " text-align:center;",
        Some(Align::Right) => " text-align:right;",
        Some(Align::Justify) => " text-align:justify;",
        None => "",
    }
}

/// Border color, defaulting to black when unset or unparsable.
fn border_color(code: Option<&str>) -> String {
    code.and_then(Color::parse)
        .map(|c| c.to_string())
        .unwrap_or_else(|| "black".to_string())
}

impl Render for Cell {
    fn render<W: Write>(&self, ctx: &mut RenderContext<'_, W>) -> io::Result<()> {
        let mut content = ctx.substitute(&self.text);
        ctx.state.set_current_style(&self.style);
        let cp = CELL_PADDING;

        let left = match self.left {
            Some(left) => {
                ctx.state.set_x(left);
                left
            }
            None => ctx.state.x(),
        };
        let top = match self.top {
            Some(top) => {
                ctx.state.set_y(top);
                top
            }
            None => ctx.state.y(),
        };

        let mut css = format!(
            "position:absolute;top:{}pt;padding:{}pt;{}:{}pt;",
            Pt(top),
            Pt(cp),
            ctx.setup.align_side,
            Pt(left)
        );
        if let Some(bg) = self.background.as_deref().and_then(Color::parse) {
            css.push_str(&format!("background-color:{};", bg));
        }

        // Border pixels come off the content box so the outer size holds.
        let borders = Borders::from_code(&self.border);
        let color = border_color(self.border_color.as_deref());
        let (mut border_x, mut border_y) = (0.0, 0.0);
        if borders.is_all() {
            css.push_str(&format!(" border:solid {} 1pt;", color));
            border_x = 1.0;
            border_y = 1.0;
        } else {
            for (present, side) in [
                (borders.top, "top"),
                (borders.bottom, "bottom"),
                (borders.right, "right"),
                (borders.left, "left"),
            ] {
                if present {
                    css.push_str(&format!(" border-{}:solid {} 1pt;", side, color));
                    if side == "top" || side == "bottom" {
                        border_y = 1.0;
                    } else {
                        border_x = 1.0;
                    }
                }
            }
        }

        let remaining = ctx.remaining_width();
        let width = if self.width == 0.0 || self.width > remaining {
            remaining
        } else {
            self.width
        };
        let inner_width = width - cp * 2.0;

        let mut height = self.height;
        if !content.is_empty() {
            let style = ctx.current_style();
            content = text::wrap(&content, inner_width, style);
            let text_height = text::cell_height(&content, style);
            height += cp;
            if text_height > height {
                height = text_height;
            }
        }
        if ctx.state.last_cell_height() > height {
            height = ctx.state.last_cell_height();
        }
        css.push_str(&format!(
            " width:{}pt;height:{}pt;",
            Pt(inner_width - border_x),
            Pt(height - border_y)
        ));
        css.push_str(align_css(self.align));

        write!(ctx.out, "<div class=\"{}\" style=\"{}\">", self.style, css)?;
        if let Some(url) = &self.url {
            write!(ctx.out, "<a href=\"{}\">", url)?;
        }
        ctx.write_text(&content, self.text_color.as_deref(), false)?;
        if self.url.is_some() {
            ctx.out.write_all(b"</a>")?;
        }
        ctx.out.write_all(b"</div>\n")?;

        match self.flow {
            CellFlow::Beside => {
                ctx.state.set_xy(left + width, top);
                ctx.state.set_last_cell_height(height);
            }
            CellFlow::NextLine => {
                ctx.state.set_xy(0.0, top + height + cp * 2.0);
                ctx.state.set_last_cell_height(0.0);
            }
            CellFlow::Below => {
                ctx.state.set_xy(left + width, top + height + cp * 2.0);
                ctx.state.set_last_cell_height(0.0);
            }
        }
        Ok(())
    }
}

impl Render for TextBox {
    fn render<W: Write>(&self, ctx: &mut RenderContext<'_, W>) -> io::Result<()> {
        super::textbox::render(self, ctx)
    }
}

impl TextRun {
    /// Emit as a bare span, for runs inside a text box.
    pub(crate) fn render_inline<W: Write>(&self, ctx: &mut RenderContext<'_, W>) -> io::Result<()> {
        ctx.state.set_current_style(&self.style);
        let content = ctx.substitute(&self.text);
        if content.is_empty() {
            return Ok(());
        }
        ctx.write_text(&content, self.color.as_deref(), true)
    }
}

impl Render for TextRun {
    fn render<W: Write>(&self, ctx: &mut RenderContext<'_, W>) -> io::Result<()> {
        ctx.state.set_current_style(&self.style);
        let content = ctx.substitute(&self.text);
        if content.is_empty() {
            return Ok(());
        }

        let start_x = ctx.state.x();
        let mut start_y = ctx.state.y();
        let width = ctx.remaining_width();
        let style = ctx.current_style();

        if text::string_width(&content, style) > width {
            for line in content.split('\n') {
                write!(
                    ctx.out,
                    "<div style=\"position:absolute;top:{}pt;{}:{}pt;width:{}pt;\">",
                    Pt(start_y),
                    ctx.setup.align_side,
                    Pt(start_x),
                    Pt(width)
                )?;
                let line = text::wrap(line, width, style);
                start_y += text::cell_height(&line, style);
                ctx.state.set_y(start_y);
                ctx.write_text(&line, self.color.as_deref(), true)?;
                ctx.out.write_all(b"</div>\n")?;
            }
        } else {
            write!(
                ctx.out,
                "<div style=\"position:absolute;top:{}pt;{}:{}pt;width:{}pt;\">",
                Pt(start_y),
                ctx.setup.align_side,
                Pt(start_x),
                Pt(width)
            )?;
            ctx.write_text(&content, self.color.as_deref(), true)?;
            ctx.out.write_all(b"</div>\n")?;
            ctx.state.set_x(start_x + text::string_width(&content, style));
            if text::line_count(&content) != 1 {
                ctx.state.set_xy(0.0, start_y + text::cell_height(&content, style));
            }
        }
        Ok(())
    }
}

impl Render for Line {
    fn render<W: Write>(&self, ctx: &mut RenderContext<'_, W>) -> io::Result<()> {
        let x1 = self.x1.unwrap_or_else(|| ctx.state.x());
        let y1 = self.y1.unwrap_or_else(|| ctx.state.y());
        let x2 = self.x2.unwrap_or_else(|| ctx.remaining_width());
        let y2 = self.y2.unwrap_or_else(|| ctx.state.y());
        let side = ctx.setup.align_side;

        if x1 == x2 {
            writeln!(
                ctx.out,
                "<div style=\"position:absolute;overflow:hidden;border-{}:solid black 1pt;{}:{}pt;top:{}pt;width:1pt;height:{}pt;\"> </div>",
                side,
                side,
                Pt(x1),
                Pt(y1 + 1.0),
                Pt(y2 - y1)
            )?;
        }
        if y1 == y2 {
            writeln!(
                ctx.out,
                "<div style=\"position:absolute;overflow:hidden;border-top:solid black 1pt;{}:{}pt;top:{}pt;width:{}pt;height:1pt;\"> </div>",
                side,
                Pt(x1),
                Pt(y1 + 1.0),
                Pt(x2 - x1)
            )?;
        }

        ctx.state.record_max_y(y1);
        ctx.state.record_max_y(y2);
        Ok(())
    }
}

impl Render for Image {
    fn render<W: Write>(&self, ctx: &mut RenderContext<'_, W>) -> io::Result<()> {
        let x = self.x.unwrap_or_else(|| ctx.state.x());
        let y = match self.y {
            Some(y) => y,
            None => {
                // Stack below the previous image instead of overlapping it.
                if let Some(last) = ctx.last_image {
                    if last.page == ctx.state.page_number()
                        && last.bottom >= ctx.state.y()
                        && x >= last.left
                        && x <= last.right
                    {
                        ctx.state.set_y(last.bottom + CELL_PADDING * 2.0);
                    }
                }
                ctx.state.y()
            }
        };

        let img = format!(
            "<img src=\"{}\" style=\"width:{}pt;height:{}pt;\" alt=\"\">",
            self.src,
            Pt(self.width),
            Pt(self.height)
        );
        match self.align {
            Some(align @ (Align::Left | Align::Center | Align::Right)) => {
                let text_align = match align {
                    Align::Left => "left",
                    Align::Center => "center",
                    _ => "right",
                };
                writeln!(
                    ctx.out,
                    "<div style=\"position:absolute;top:{}pt;{}:0pt;width:{}pt;text-align:{};\">",
                    Pt(y),
                    ctx.setup.align_side,
                    Pt(ctx.remaining_width()),
                    text_align
                )?;
                writeln!(ctx.out, "{}\n</div>", img)?;
            }
            _ => {
                writeln!(
                    ctx.out,
                    "<img src=\"{}\" style=\"position:absolute;{}:{}pt;top:{}pt;width:{}pt;height:{}pt;\" alt=\"\">",
                    self.src,
                    ctx.setup.align_side,
                    Pt(x),
                    Pt(y),
                    Pt(self.width),
                    Pt(self.height)
                )?;
            }
        }

        let bounds = ImageBounds {
            page: ctx.state.page_number(),
            left: x,
            right: x + self.width,
            bottom: y + self.height,
        };
        ctx.last_image = Some(bounds);
        if self.next_line {
            ctx.state.set_y(bounds.bottom);
        }
        ctx.state.record_max_y(bounds.bottom);
        Ok(())
    }
}

/// Elements that never take a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "wbr"];

impl Render for RawMarkup {
    fn render<W: Write>(&self, ctx: &mut RenderContext<'_, W>) -> io::Result<()> {
        if let Some(style) = &self.style {
            ctx.state.set_current_style(style);
        }
        if !self.tag.is_empty() {
            write!(ctx.out, "<{}", self.tag)?;
            for (name, value) in &self.attrs {
                write!(ctx.out, " {}=\"{}\"", name, value)?;
            }
            ctx.out.write_all(b">")?;
        }
        if !self.text.is_empty() {
            ctx.write_text(&self.text, None, true)?;
        }
        ctx.dispatch(&self.children)?;
        let is_void = VOID_TAGS.contains(&self.tag.to_ascii_lowercase().as_str());
        if !self.tag.is_empty() && !is_void {
            write!(ctx.out, "</{}>", self.tag)?;
        }
        Ok(())
    }
}

impl Footnote {
    /// Emit the superscript reference for an already numbered footnote.
    pub(crate) fn render_reference<W: Write>(
        number: usize,
        ctx: &mut RenderContext<'_, W>,
    ) -> io::Result<()> {
        ctx.state.set_current_style(FOOTNOTE_NUMBER_STYLE);
        write!(ctx.out, "<a href=\"#{}\"><sup>", anchor(number))?;
        let label = format!("{}{}", ctx.setup.direction_entity, number);
        ctx.write_text(&label, None, true)?;
        ctx.out.write_all(b"</sup></a>\n")
    }
}

impl Render for Footnote {
    fn render<W: Write>(&self, ctx: &mut RenderContext<'_, W>) -> io::Result<()> {
        let number = ctx.footnotes.check(self).number();
        Footnote::render_reference(number, ctx)
    }
}

impl Render for PageHeaderBlock {
    fn render<W: Write>(&self, ctx: &mut RenderContext<'_, W>) -> io::Result<()> {
        ctx.page_header = self.elements.clone();
        Ok(())
    }
}
