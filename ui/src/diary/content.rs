//! Page sequence and content resolution for the diary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Configuration string that marks the closing-message slot.
pub const CLOSING_SENTINEL: &str = "handwritten";

/// Inline placeholder shown when a page image fails to load. A `data:` URI so
/// the fallback itself can never fail.
pub const PLACEHOLDER_SRC: &str = "data:image/svg+xml;utf8,\
<svg xmlns='http://www.w3.org/2000/svg' width='300' height='400' viewBox='0 0 300 400'>\
<rect width='300' height='400' fill='%23fdf2f4'/>\
<text x='150' y='210' font-size='64' text-anchor='middle'>%E2%9D%A4</text></svg>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEntry {
    Image(String),
    Closing,
}

impl PageEntry {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == CLOSING_SENTINEL {
            Self::Closing
        } else {
            Self::Image(trimmed.to_string())
        }
    }

    pub fn is_closing(&self) -> bool {
        matches!(self, Self::Closing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingMessage {
    pub lines: Vec<String>,
    pub signoff: String,
}

impl Default for ClosingMessage {
    fn default() -> Self {
        Self {
            lines: vec![
                "Ignore the bad handwriting…".to_string(),
                "I wrote so much after 4–5 months just for you.".to_string(),
            ],
            signoff: "Happy Princess Day once again, my love ❤️".to_string(),
        }
    }
}

/// What a single face of the diary shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    Image { src: String, alt: String },
    Closing(ClosingMessage),
}

impl PageContent {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Image { src, .. } if src == PLACEHOLDER_SRC)
    }
}

/// Ordered, fixed-length list of pages. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageSequence {
    entries: Vec<PageEntry>,
    closing: ClosingMessage,
}

impl PageSequence {
    pub fn new(entries: Vec<PageEntry>, closing: ClosingMessage) -> Self {
        Self { entries, closing }
    }

    pub fn from_config<S: AsRef<str>>(pages: &[S], closing: ClosingMessage) -> Self {
        let entries = pages.iter().map(|raw| PageEntry::parse(raw.as_ref())).collect();
        Self::new(entries, closing)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest valid position; 0 for an empty sequence.
    pub fn last_position(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn entry(&self, position: usize) -> Option<&PageEntry> {
        self.entries.get(position)
    }

    pub fn image_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_closing()).count()
    }

    /// Content shown for `position`, or `None` when out of range.
    pub fn resolve(&self, position: usize, failed: &BTreeSet<usize>) -> Option<PageContent> {
        let entry = self.entries.get(position)?;
        let content = match entry {
            PageEntry::Closing => PageContent::Closing(self.closing.clone()),
            PageEntry::Image(src) => {
                let src = if failed.contains(&position) || src.is_empty() {
                    PLACEHOLDER_SRC.to_string()
                } else {
                    src.clone()
                };
                PageContent::Image {
                    src,
                    alt: format!("Diary page {}", position + 1),
                }
            }
        };
        Some(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence() -> PageSequence {
        PageSequence::from_config(
            &["images/p1.jpeg", "images/p2.jpeg", "handwritten"],
            ClosingMessage::default(),
        )
    }

    #[test]
    fn sentinel_becomes_closing_slot() {
        let seq = sequence();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.image_count(), 2);
        assert_eq!(seq.entry(2), Some(&PageEntry::Closing));
        assert_eq!(seq.last_position(), 2);
    }

    #[test]
    fn resolves_images_and_closing() {
        let seq = sequence();
        let failed = BTreeSet::new();

        match seq.resolve(1, &failed) {
            Some(PageContent::Image { src, alt }) => {
                assert_eq!(src, "images/p2.jpeg");
                assert_eq!(alt, "Diary page 2");
            }
            other => panic!("expected image, got {other:?}"),
        }

        assert_eq!(
            seq.resolve(2, &failed),
            Some(PageContent::Closing(ClosingMessage::default()))
        );
    }

    #[test]
    fn failed_image_resolves_to_placeholder() {
        let seq = sequence();
        let failed: BTreeSet<usize> = [0].into_iter().collect();
        let content = seq.resolve(0, &failed).unwrap();
        assert!(content.is_placeholder());
        assert!(!seq.resolve(1, &failed).unwrap().is_placeholder());
    }

    #[test]
    fn out_of_range_is_none() {
        let seq = sequence();
        assert!(seq.resolve(3, &BTreeSet::new()).is_none());
        assert!(PageSequence::default().resolve(0, &BTreeSet::new()).is_none());
        assert_eq!(PageSequence::default().last_position(), 0);
    }
}
