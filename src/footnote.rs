//! # Footnote Registry
//!
//! Footnotes are deduplicated by text and numbered in order of first
//! reference. The registry only grows: a number, once handed out, always
//! maps to the same text for the rest of the rendering pass.

use crate::model::Footnote;

/// Outcome of [`FootnoteRegistry::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootnoteCheck {
    /// Same text was registered before under this number.
    PreviouslySeen(usize),
    /// Newly registered under this number.
    Fresh(usize),
}

impl FootnoteCheck {
    /// The 1-based footnote number, also the back-link target.
    pub fn number(&self) -> usize {
        match self {
            FootnoteCheck::PreviouslySeen(n) | FootnoteCheck::Fresh(n) => *n,
        }
    }
}

/// A footnote with its assigned number.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedFootnote {
    pub number: usize,
    pub style: String,
    pub text: String,
}

impl NumberedFootnote {
    /// Anchor name of the footnote text, targeted by every reference to it.
    pub fn anchor(&self) -> String {
        anchor(self.number)
    }
}

/// Anchor name for footnote `number`.
pub fn anchor(number: usize) -> String {
    format!("footnote{}", number)
}

#[derive(Debug, Default)]
pub struct FootnoteRegistry {
    entries: Vec<NumberedFootnote>,
}

impl FootnoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look the footnote up by text, registering it if it is new.
    pub fn check(&mut self, footnote: &Footnote) -> FootnoteCheck {
        if let Some(i) = self.entries.iter().position(|e| e.text == footnote.text) {
            return FootnoteCheck::PreviouslySeen(i + 1);
        }
        let number = self.entries.len() + 1;
        log::debug!("Registered footnote {}", number);
        self.entries.push(NumberedFootnote {
            number,
            style: footnote.style.clone(),
            text: footnote.text.clone(),
        });
        FootnoteCheck::Fresh(number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NumberedFootnote> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> Footnote {
        Footnote {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn same_text_same_number() {
        let mut registry = FootnoteRegistry::new();
        assert_eq!(registry.check(&note("Census 1881")), FootnoteCheck::Fresh(1));
        assert_eq!(registry.check(&note("Parish register")), FootnoteCheck::Fresh(2));
        assert_eq!(
            registry.check(&note("Census 1881")),
            FootnoteCheck::PreviouslySeen(1)
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn grows_once_per_distinct_text() {
        let mut registry = FootnoteRegistry::new();
        let texts = ["a", "b", "a", "c", "b", "a", "c"];
        for text in texts {
            registry.check(&note(text));
        }
        assert_eq!(registry.len(), 3);
        let numbers: Vec<_> = texts.iter().map(|t| registry.check(&note(t)).number()).collect();
        assert_eq!(numbers, [1, 2, 1, 3, 2, 1, 3]);
    }

    #[test]
    fn first_occurrence_keeps_its_style() {
        let mut registry = FootnoteRegistry::new();
        registry.check(&Footnote {
            style: "small".to_string(),
            text: "x".to_string(),
        });
        registry.check(&note("x"));
        let first = registry.iter().next().unwrap();
        assert_eq!(first.style, "small");
        assert_eq!(first.anchor(), "footnote1");
    }
}
