//! Markup scanner: splits a document into text units for classification.
//!
//! The scanner is a two-state machine. In verbatim mode (inside a code-like
//! container) text is accumulated into one buffer and flushed as a single
//! unit when the container closes, so claims split across several text
//! events stay whole. In prose mode each text event is its own unit, unless
//! it contains a qualified-identifier marker, in which case it joins the
//! buffer as if it were verbatim.

use tracing::trace;

use super::tokenizer::{tokenize, MarkupEvent};

/// Containers treated as verbatim when no configuration overrides them.
pub const DEFAULT_VERBATIM_TAGS: &[&str] = &["code", "pre"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Prose,
    Verbatim,
}

/// Splits markup into classification units.
#[derive(Debug, Clone)]
pub struct Scanner {
    verbatim_tags: Vec<String>,
    qualified_marker: String,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(
            DEFAULT_VERBATIM_TAGS.iter().map(|t| t.to_string()),
            super::rules::QUALIFIED_MARKER,
        )
    }
}

impl Scanner {
    pub fn new<I>(verbatim_tags: I, qualified_marker: &str) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            verbatim_tags: verbatim_tags
                .into_iter()
                .map(|t| t.to_ascii_lowercase())
                .collect(),
            qualified_marker: qualified_marker.to_string(),
        }
    }

    fn is_verbatim_tag(&self, name: &str) -> bool {
        self.verbatim_tags.iter().any(|t| t == name)
    }

    /// Scan a document and return its text units in document order.
    pub fn scan(&self, markup: &str) -> Vec<String> {
        let mut state = ScanState::new();

        for event in tokenize(markup) {
            match event {
                MarkupEvent::StartTag(name) if self.is_verbatim_tag(&name) => {
                    state.mode = Mode::Verbatim;
                }
                MarkupEvent::EndTag(name) if self.is_verbatim_tag(&name) => {
                    state.mode = Mode::Prose;
                    state.flush();
                }
                MarkupEvent::StartTag(_) | MarkupEvent::EndTag(_) => {}
                MarkupEvent::Text(text) => {
                    if state.mode == Mode::Verbatim || text.contains(&self.qualified_marker) {
                        state.buffer.push_str(&text);
                    } else {
                        state.flush();
                        state.emit(text);
                    }
                }
            }
        }

        // Unclosed containers still get classified.
        state.flush();
        trace!(units = state.units.len(), "scanned markup");
        state.units
    }
}

struct ScanState {
    mode: Mode,
    buffer: String,
    units: Vec<String>,
}

impl ScanState {
    fn new() -> Self {
        Self {
            mode: Mode::Prose,
            buffer: String::new(),
            units: Vec::new(),
        }
    }

    fn flush(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);
        self.emit(buffer);
    }

    fn emit(&mut self, unit: String) {
        if !unit.trim().is_empty() {
            self.units.push(unit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbatim_text_is_buffered_until_close() {
        let scanner = Scanner::default();
        let units = scanner.scan("<pre>Magento&#92;Customer<b></b>&#92;Model&#92;Customer</pre>");
        assert_eq!(units, vec!["Magento\\Customer\\Model\\Customer"]);
    }

    #[test]
    fn test_prose_text_is_emitted_per_event() {
        let scanner = Scanner::default();
        let units = scanner.scan("<p>first</p><p>second</p>");
        assert_eq!(units, vec!["first", "second"]);
    }

    #[test]
    fn test_prose_with_marker_joins_buffer() {
        let scanner = Scanner::default();
        let units = scanner.scan("<p>See Magento\\Customer</p><code>\\Model\\Customer</code>");
        assert_eq!(units, vec!["See Magento\\Customer\\Model\\Customer"]);
    }

    #[test]
    fn test_plain_prose_flushes_pending_buffer_first() {
        let scanner = Scanner::default();
        let units = scanner.scan("<p>Magento\\Customer\\Model</p><p>next paragraph</p>");
        assert_eq!(units, vec!["Magento\\Customer\\Model", "next paragraph"]);
    }

    #[test]
    fn test_unclosed_container_is_flushed_at_end() {
        let scanner = Scanner::default();
        let units = scanner.scan("<p>intro</p><code>save()");
        assert_eq!(units, vec!["intro", "save()"]);
    }

    #[test]
    fn test_whitespace_units_dropped() {
        let scanner = Scanner::default();
        let units = scanner.scan("<div>\n  <p>text</p>\n</div>");
        assert_eq!(units, vec!["text"]);
    }

    #[test]
    fn test_custom_verbatim_tags() {
        let scanner = Scanner::new(vec!["SAMP".to_string()], "Magento\\");
        let units = scanner.scan("<samp>a</samp><code>b</code><samp>c</samp>");
        // `code` is prose here, so `b` stands alone
        assert_eq!(units, vec!["a", "b", "c"]);
    }
}
