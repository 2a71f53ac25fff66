//! # Style Registry
//!
//! Named text styles, as declared by the report description. A style is a
//! font family, a size in points, a short decoration code and an optional
//! color. Styles are immutable once registered and are looked up by name;
//! an unknown name resolves to the registry's default style instead of
//! failing.
//!
//! The decoration code is a handful of letters, matched case-insensitively,
//! each toggling one independent flag:
//!
//! ```text
//! B  bold        I  italic
//! U  underline   D  strikethrough
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as FmtWrite};

/// Generic font placeholder used by report descriptions. It names the
/// embedded font of print backends and means nothing to a browser.
pub const PLACEHOLDER_FONT: &str = "dejavusans";

/// Family substituted for [`PLACEHOLDER_FONT`] in the style sheet.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Size used when no style is active.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Independent decoration flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoration {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl Decoration {
    /// Parse a decoration code. Unknown letters and duplicates are ignored.
    pub fn from_code(code: &str) -> Self {
        let mut flags = Decoration::default();
        for ch in code.chars() {
            match ch.to_ascii_uppercase() {
                'B' => flags.bold = true,
                'I' => flags.italic = true,
                'U' => flags.underline = true,
                'D' => flags.strikethrough = true,
                _ => {}
            }
        }
        flags
    }
}

/// An RGB color, parsed from a hex code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb`. Anything else is `None`,
    /// and callers drop the color styling.
    pub fn parse(code: &str) -> Option<Self> {
        let hex = code.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => Some(Color {
                r: channel(&hex[0..1].repeat(2))?,
                g: channel(&hex[1..2].repeat(2))?,
                b: channel(&hex[2..3].repeat(2))?,
            }),
            6 => Some(Color {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A style as declared in the document input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSpec {
    pub name: String,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_size")]
    pub size: f64,
    /// Decoration code, e.g. `"BU"`.
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_font() -> String {
    PLACEHOLDER_FONT.to_string()
}

fn default_size() -> f64 {
    DEFAULT_FONT_SIZE
}

/// A registered, immutable style.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub name: String,
    pub font_family: String,
    pub size_pt: f64,
    pub flags: Decoration,
    pub color: Option<Color>,
}

impl Style {
    pub fn from_spec(spec: &StyleSpec) -> Self {
        Self {
            name: spec.name.clone(),
            font_family: spec.font.clone(),
            size_pt: spec.size,
            flags: Decoration::from_code(&spec.style),
            color: spec.color.as_deref().and_then(Color::parse),
        }
    }

    /// The nameless style used when nothing else applies.
    pub fn fallback() -> Self {
        Self {
            name: String::new(),
            font_family: PLACEHOLDER_FONT.to_string(),
            size_pt: DEFAULT_FONT_SIZE,
            flags: Decoration::default(),
            color: None,
        }
    }

    /// CSS declarations for this style's class rule.
    pub fn css_declarations(&self, default_family: &str) -> String {
        let family = if self.font_family == PLACEHOLDER_FONT {
            default_family
        } else {
            self.font_family.as_str()
        };
        let mut css = String::new();
        let _ = write!(css, "font-family: {}; ", family);
        let _ = write!(css, "font-size: {}pt; ", crate::html::Pt(self.size_pt));
        if self.flags.bold {
            css.push_str("font-weight: bold; ");
        }
        if self.flags.italic {
            css.push_str("font-style: italic; ");
        }
        match (self.flags.underline, self.flags.strikethrough) {
            (true, true) => css.push_str("text-decoration: underline line-through; "),
            (true, false) => css.push_str("text-decoration: underline; "),
            (false, true) => css.push_str("text-decoration: line-through; "),
            (false, false) => {}
        }
        if let Some(color) = self.color {
            let _ = write!(css, "color: {}; ", color);
        }
        css
    }
}

/// All styles of a document, in registration order.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: Vec<Style>,
    default: Style,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self {
            styles: Vec::new(),
            default: Style::fallback(),
        }
    }
}

impl StyleRegistry {
    /// Build a registry from declared styles. `default_style` names the
    /// style used for unknown lookups; without it the fallback style is used.
    /// A later declaration with an already registered name replaces it.
    pub fn from_specs(specs: &[StyleSpec], default_style: Option<&str>) -> Self {
        let mut registry = StyleRegistry::default();
        for spec in specs {
            registry.register(Style::from_spec(spec));
        }
        if let Some(style) = default_style.and_then(|name| registry.get(name)) {
            registry.default = style.clone();
        }
        registry
    }

    pub fn register(&mut self, style: Style) {
        match self.styles.iter_mut().find(|s| s.name == style.name) {
            Some(existing) => *existing = style,
            None => self.styles.push(style),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.name == name)
    }

    /// Resolve a style name, falling back to the default style.
    pub fn resolve(&self, name: &str) -> &Style {
        match self.get(name) {
            Some(style) => style,
            None => {
                if !name.is_empty() {
                    log::debug!("Unknown style '{}', using default", name);
                }
                &self.default
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Style> {
        self.styles.iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
