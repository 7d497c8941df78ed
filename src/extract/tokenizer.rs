//! Markup tokenizer.
//!
//! Adapts the html5ever tokenizer to a flat stream of start-tag, end-tag and
//! text events. Character references are decoded with the full HTML5 table,
//! including legacy forms without a trailing `;`. Malformed markup is
//! recovered the way browsers recover it and never aborts tokenization.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

/// One event in the markup stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// Opening tag, name lowercased.
    StartTag(String),
    /// Closing tag, name lowercased.
    EndTag(String),
    /// Text between tags with character references decoded.
    Text(String),
}

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Collects tokenizer output, joining adjacent character runs into one
/// text event.
#[derive(Default)]
struct EventSink {
    events: Vec<MarkupEvent>,
    text: String,
}

impl EventSink {
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.events.push(MarkupEvent::Text(std::mem::take(&mut self.text)));
        }
    }
}

impl TokenSink for EventSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => self.text.push_str(&text),
            Token::TagToken(tag) => {
                self.flush_text();
                let name = tag.name.to_string();
                match tag.kind {
                    TagKind::StartTag => {
                        let raw = !tag.self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str());
                        self.events.push(MarkupEvent::StartTag(name));
                        if raw {
                            return TokenSinkResult::RawData(RawKind::Rawtext);
                        }
                    }
                    TagKind::EndTag => self.events.push(MarkupEvent::EndTag(name)),
                }
            }
            // Comments and doctypes still separate the text around them.
            Token::CommentToken(_) | Token::DoctypeToken(_) | Token::EOFToken => self.flush_text(),
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

/// Tokenize a whole document.
pub fn tokenize(markup: &str) -> Vec<MarkupEvent> {
    if markup.is_empty() {
        return Vec::new();
    }

    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from_slice(markup));

    let mut tokenizer = Tokenizer::new(EventSink::default(), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();
    tokenizer.sink.events
}
