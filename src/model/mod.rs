//! # Document Model
//!
//! The input to the engine: page geometry, style declarations and four
//! ordered buckets of entries (page header, header, body, footer). An
//! upstream builder materializes these from the report description; the
//! engine only reads them.
//!
//! An entry is either a drawing element or one of two control markers that
//! sit inline in the same sequence. Position fields that are absent mean
//! "wherever the cursor is".

use crate::error::Error;
use crate::style::StyleSpec;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A complete report ready for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Page title, for the surrounding page chrome. Not rendered here.
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub geometry: PageGeometry,

    #[serde(default)]
    pub styles: Vec<StyleSpec>,

    /// Style used for unknown style names.
    #[serde(default)]
    pub default_style: Option<String>,

    /// "Generated by" line appended to the footer.
    #[serde(default)]
    pub attribution: Option<Attribution>,

    /// Running header, replayed once at the top of the body.
    #[serde(default)]
    pub page_header: Vec<Entry>,
    #[serde(default)]
    pub header: Vec<Entry>,
    #[serde(default)]
    pub body: Vec<Entry>,
    #[serde(default)]
    pub footer: Vec<Entry>,
}

/// Attribution line settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub text: String,
    #[serde(default)]
    pub url: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Page size, orientation, margins and text direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub direction: TextDirection,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            orientation: Orientation::Portrait,
            margins: Margins::default(),
            direction: TextDirection::Ltr,
        }
    }
}

impl PageGeometry {
    /// Width and height in points, after applying the orientation.
    pub fn dimensions(&self) -> (f64, f64) {
        let (w, h) = self.size.dimensions();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Page width between the left and right margins, truncated to whole points.
    pub fn printable_width(&self) -> f64 {
        let (w, _) = self.dimensions();
        (w - self.margins.left - self.margins.right).trunc()
    }

    /// Reject geometry that cannot describe a page.
    pub fn validate(&self) -> Result<(), Error> {
        let (w, h) = self.dimensions();
        if !(w.is_finite() && w > 0.0 && h.is_finite() && h > 0.0) {
            return Err(Error::Geometry(format!("page size must be positive, got {}x{}", w, h)));
        }
        let m = &self.margins;
        let all = [m.top, m.bottom, m.left, m.right, m.header, m.footer];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::Geometry("margins must be non-negative".to_string()));
        }
        if m.left + m.right >= w {
            return Err(Error::Geometry(format!(
                "horizontal margins ({}) leave no room on a {}pt wide page",
                m.left + m.right,
                w
            )));
        }
        Ok(())
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points, portrait.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

/// Page margins in points. `header` and `footer` are the distances of the
/// header and footer from the page edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub header: f64,
    pub footer: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 26.8,
            bottom: 21.6,
            left: 18.0,
            right: 9.9,
            header: 4.9,
            footer: 9.9,
        }
    }
}

/// One entry of a bucket: an element or a control marker.
///
/// Entries are objects tagged by `"type"`. Control markers may also appear
/// as bare strings, including the legacy spellings `"addpage"` and
/// `"footnotetexts"`. Anything else, an unknown tag, a tagless object or a
/// stray value, becomes [`Entry::Unknown`] instead of failing the document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Entry {
    Cell(Cell),
    TextBox(TextBox),
    Text(TextRun),
    Line(Line),
    Image(Image),
    Html(RawMarkup),
    Footnote(Footnote),
    PageHeader(PageHeaderBlock),

    /// Render every footnote registered so far.
    FlushFootnotes,
    /// Simulate a page break.
    PageBreak,

    /// Anything this version does not know. Skipped when rendering.
    Unknown,
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Entry::from_value(value).map_err(de::Error::custom)
    }
}

impl Entry {
    /// Build an entry from a JSON value. Only a recognized element whose
    /// fields do not match its schema is an error.
    fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let kind = match &value {
            Value::String(name) => return Ok(Entry::from_marker(name)),
            Value::Object(map) => match map.get("type").and_then(Value::as_str) {
                Some(kind) => kind.to_string(),
                None => {
                    log::debug!("Entry without a type tag");
                    return Ok(Entry::Unknown);
                }
            },
            other => {
                log::debug!("Entry is not an object: {}", other);
                return Ok(Entry::Unknown);
            }
        };

        let entry = match kind.as_str() {
            "Cell" => Entry::Cell(serde_json::from_value(value)?),
            "TextBox" => Entry::TextBox(serde_json::from_value(value)?),
            "Text" => Entry::Text(serde_json::from_value(value)?),
            "Line" => Entry::Line(serde_json::from_value(value)?),
            "Image" => Entry::Image(serde_json::from_value(value)?),
            "Html" => Entry::Html(serde_json::from_value(value)?),
            "Footnote" => Entry::Footnote(serde_json::from_value(value)?),
            "PageHeader" => Entry::PageHeader(serde_json::from_value(value)?),
            marker => Entry::from_marker(marker),
        };
        Ok(entry)
    }

    fn from_marker(name: &str) -> Self {
        match name {
            "FlushFootnotes" | "footnotetexts" => Entry::FlushFootnotes,
            "PageBreak" | "addpage" => Entry::PageBreak,
            _ => {
                log::debug!("Unknown entry type '{}'", name);
                Entry::Unknown
            }
        }
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    #[serde(rename = "L", alias = "left")]
    Left,
    #[serde(rename = "C", alias = "center")]
    Center,
    #[serde(rename = "R", alias = "right")]
    Right,
    #[serde(rename = "J", alias = "justify")]
    Justify,
}

/// Where the cursor goes after a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellFlow {
    /// To the right of the cell, same top.
    Beside,
    /// To the left margin, below the cell.
    #[default]
    NextLine,
    /// Below the cell, at its right edge.
    Below,
}

/// Which sides of a cell get a border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Borders {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Borders {
    /// Parse a border code: `"1"` for all sides, or any mix of the letters
    /// T, B, L and R. Empty or `"0"` means no border.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        if code == "1" {
            return Borders::all();
        }
        let has = |c: char| code.chars().any(|x| x.eq_ignore_ascii_case(&c));
        Borders {
            top: has('T'),
            bottom: has('B'),
            left: has('L'),
            right: has('R'),
        }
    }

    pub fn all() -> Self {
        Borders {
            top: true,
            bottom: true,
            left: true,
            right: true,
        }
    }

    pub fn is_all(&self) -> bool {
        self.top && self.bottom && self.left && self.right
    }

    pub fn any(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }
}

/// A bordered, optionally filled box holding a single text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cell {
    /// Width in points; 0 takes the remaining width.
    pub width: f64,
    pub height: f64,
    pub left: Option<f64>,
    pub top: Option<f64>,
    /// Border code, see [`Borders::from_code`].
    pub border: String,
    pub border_color: Option<String>,
    pub align: Option<Align>,
    pub background: Option<String>,
    pub fill: bool,
    pub style: String,
    pub text_color: Option<String>,
    pub flow: CellFlow,
    pub url: Option<String>,
    pub text: String,
}

/// A box that lays out a mix of text runs, footnote references and images.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextBox {
    pub width: f64,
    pub height: f64,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub border: bool,
    pub background: Option<String>,
    pub fill: bool,
    pub padding: bool,
    /// Move below the box when true, beside it when false.
    pub newline: bool,
    /// Do not let this box's height push the next line down.
    pub reset_height: bool,
    pub elements: Vec<Entry>,
}

/// A run of text in one style.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextRun {
    pub style: String,
    pub color: Option<String>,
    pub text: String,
}

/// A horizontal or vertical rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Line {
    pub x1: Option<f64>,
    pub y1: Option<f64>,
    pub x2: Option<f64>,
    pub y2: Option<f64>,
}

/// An image referenced by URL. The engine never reads the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Image {
    pub src: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: f64,
    pub height: f64,
    pub align: Option<Align>,
    /// Move the cursor below the image.
    pub next_line: bool,
}

/// Markup passed through as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMarkup {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    /// Style to activate before the content.
    pub style: Option<String>,
    pub text: String,
    pub children: Vec<Entry>,
}

/// A footnote. Numbered by the footnote registry on first reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Footnote {
    pub style: String,
    pub text: String,
}

impl Default for Footnote {
    fn default() -> Self {
        Self {
            style: "footnote".to_string(),
            text: String::new(),
        }
    }
}

/// Replaces the running page header when rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageHeaderBlock {
    pub elements: Vec<Entry>,
}

impl Entry {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Entry::Cell(_) => "Cell",
            Entry::TextBox(_) => "TextBox",
            Entry::Text(_) => "Text",
            Entry::Line(_) => "Line",
            Entry::Image(_) => "Image",
            Entry::Html(_) => "Html",
            Entry::Footnote(_) => "Footnote",
            Entry::PageHeader(_) => "PageHeader",
            Entry::FlushFootnotes => "FlushFootnotes",
            Entry::PageBreak => "PageBreak",
            Entry::Unknown => "Unknown",
        }
    }
}
