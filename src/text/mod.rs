//! # Text Metrics
//!
//! Approximate text measurement and line wrapping. There are no glyph
//! metrics here: every character is assumed to be half the font size wide,
//! and every line is `LINE_HEIGHT_RATIO` times the font size tall. Viewers
//! reflow the text anyway; these numbers only decide cursor movement and
//! container heights.
//!
//! Widths count characters (code points), never bytes.

use crate::style::Style;

/// Line height as a multiple of the font size, for every style.
pub const LINE_HEIGHT_RATIO: f64 = 1.8;

/// Number of lines in `text`. Empty text has no lines.
pub fn line_count(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    text.matches('\n').count() + 1
}

/// Height of a cell holding `text`, rounded up to whole points.
pub fn cell_height(text: &str, style: &Style) -> f64 {
    (style.size_pt * LINE_HEIGHT_RATIO * line_count(text) as f64).ceil()
}

/// Average glyph width for a style.
pub fn char_width(style: &Style) -> f64 {
    style.size_pt / 2.0
}

/// Approximate width of `text` in points.
pub fn string_width(text: &str, style: &Style) -> f64 {
    text.chars().count() as f64 * char_width(style)
}

/// How many characters fit on a line `width_pt` wide.
pub fn chars_per_line(width_pt: f64, style: &Style) -> usize {
    let per_line = (width_pt / char_width(style)).floor();
    if per_line.is_finite() && per_line > 0.0 {
        per_line as usize
    } else {
        0
    }
}

/// Wrap `text` to `width_pt`. Existing line breaks are kept; each line is
/// word-wrapped on its own. Wrapping already-wrapped text at the same width
/// returns it unchanged.
pub fn wrap(text: &str, width_pt: f64, style: &Style) -> String {
    let limit = chars_per_line(width_pt, style);
    text.split('\n')
        .map(|line| word_wrap(line, limit))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a line into words, each paired with the whitespace character that
/// precedes it. The first word is paired with a space.
fn words(line: &str) -> Vec<(char, &str)> {
    let mut words = Vec::new();
    let mut separator = ' ';
    let mut start = 0;
    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            words.push((separator, &line[start..i]));
            separator = c;
            start = i + c.len_utf8();
        }
    }
    words.push((separator, &line[start..]));
    words
}

/// Word-wrap a single line to `limit` characters. Breaks replace the
/// whitespace they occur at; other separators are kept as they are. A word
/// longer than the limit is cut. A zero limit leaves the line alone.
pub fn word_wrap(line: &str, limit: usize) -> String {
    if limit == 0 || line.chars().count() <= limit {
        return line.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    let mut open = false;

    for (separator, word) in words(line) {
        let word_len = word.chars().count();
        if open && current_len + 1 + word_len <= limit {
            current.push(separator);
            current.push_str(word);
            current_len += 1 + word_len;
            continue;
        }
        if open {
            lines.push(std::mem::take(&mut current));
        }

        // Hard-cut words that can never fit.
        let mut rest: Vec<char> = word.chars().collect();
        while rest.len() > limit {
            let tail = rest.split_off(limit);
            lines.push(rest.into_iter().collect());
            rest = tail;
        }
        current_len = rest.len();
        current = rest.into_iter().collect();
        open = true;
    }
    if open {
        lines.push(current);
    }
    lines.join("\n")
}

/// Greedy wrap against a first-line budget that resets to `cell_width`
/// after every break. Used when several runs share one text box and the
/// first run starts mid-line. Returns the wrapped text and the width of its
/// last line.
pub fn wrap_remaining(text: &str, remaining: f64, cell_width: f64, style: &Style) -> (String, f64) {
    let mut budget = remaining.trunc();
    let mut out = String::new();
    let mut last_width = 0.0;
    let mut lines_left = line_count(text);

    for line in text.split('\n') {
        let line_width = string_width(line, style);
        if line_width > budget {
            let words: Vec<&str> = line.split(' ').collect();
            let mut spaces_left = words.len();
            last_width = 0.0;
            for word in words {
                spaces_left -= 1;
                let word_width = string_width(word, style) + char_width(style);
                last_width += word_width;
                if last_width <= budget {
                    out.push_str(word);
                } else {
                    last_width = word_width;
                    out.push('\n');
                    out.push_str(word);
                    budget = cell_width;
                }
                if spaces_left != 0 {
                    out.push(' ');
                }
            }
        } else {
            out.push_str(line);
            last_width = line_width;
        }
        if lines_left > 1 {
            out.push('\n');
            last_width = 0.0;
            budget = cell_width;
        }
        lines_left = lines_left.saturating_sub(1);
    }
    (out, last_width)
}
