//! Plain and tagged text replies
//!
//! Identification commands (`AT+CGMI`, `AT+CGSN`, ...) answer with bare text,
//! while most others answer with one or more `+TAG: payload` lines. A command
//! can provoke several tagged lines for unrelated tags, so [`TaggedDecoder`]
//! only keeps the payload of lines carrying its own tag.

use crate::buffer::{self, TextBuffer};
use crate::config::DecoderConfig;
use crate::decoder::{self, ResponseDecoder};
use crate::fragment::{CompletionStatus, Continuation, FragmentKind};

/// Collects every unlabeled fragment, without line terminators
#[derive(Debug, Clone)]
pub struct PlainDecoder {
    text: TextBuffer,
    status: CompletionStatus,
    debug: bool,
}

impl PlainDecoder {
    /// Create a decoder with default limits
    pub fn new() -> Self {
        Self::from_config(&DecoderConfig::default())
    }

    /// Create a decoder from configuration
    pub fn from_config(config: &DecoderConfig) -> Self {
        Self {
            text: TextBuffer::new(config.max_text_len),
            status: CompletionStatus::Pending,
            debug: config.enable_debug,
        }
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        self.text.as_str()
    }
}

impl Default for PlainDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseDecoder for PlainDecoder {
    fn parse(&mut self, kind: FragmentKind, bytes: &[u8]) -> Continuation {
        if self.debug {
            decoder::log_fragment(kind, bytes);
        }
        if kind == FragmentKind::Unlabeled {
            self.text.append(bytes, true);
        } else if let Some(status) = decoder::terminal_status(kind) {
            self.status = status;
        }
        Continuation::Wait
    }

    fn status(&self) -> CompletionStatus {
        self.status
    }

    fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }
}

/// Collects the payload of `+TAG: ` lines for one tag
#[derive(Debug, Clone)]
pub struct TaggedDecoder {
    tag: String,
    marker: Vec<u8>,
    text: TextBuffer,
    status: CompletionStatus,
    debug: bool,
}

impl TaggedDecoder {
    /// Create a decoder for `tag` (without `AT+`, e.g. `CCID`)
    pub fn new(tag: impl Into<String>) -> Self {
        Self::from_config(&DecoderConfig::default(), tag)
    }

    /// Create a decoder for `tag` from configuration
    pub fn from_config(config: &DecoderConfig, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let marker = format!("\n+{}: ", tag).into_bytes();
        Self {
            tag,
            marker,
            text: TextBuffer::new(config.max_text_len),
            status: CompletionStatus::Pending,
            debug: config.enable_debug,
        }
    }

    /// The tag this decoder selects
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Payload accumulated so far
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Append the payload of a tagged fragment if it carries our tag
    ///
    /// The payload runs from after `"\n+TAG: "` up to the next CR, or to the
    /// end of the fragment when there is none.
    pub(crate) fn accumulate(&mut self, kind: FragmentKind, bytes: &[u8]) {
        if kind != FragmentKind::Tagged {
            return;
        }
        let bytes = buffer::bounded(bytes);
        let Some(pos) = buffer::find_bytes(bytes, &self.marker) else {
            return;
        };
        let payload = &bytes[pos + self.marker.len()..];
        let end = payload
            .iter()
            .position(|&b| b == b'\r')
            .unwrap_or(payload.len());
        self.text.append(&payload[..end], false);
    }

    /// Text between double quotes in the payload
    ///
    /// With `only_first` the first quoted run is returned; otherwise every
    /// quoted run is concatenated.
    pub fn double_quoted_part(&self, only_first: bool) -> String {
        double_quoted(self.text(), only_first)
    }
}

/// Extract quoted text from `text`
pub(crate) fn double_quoted(text: &str, only_first: bool) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_quotes = false;
    for ch in text.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            if !in_quotes && only_first {
                break;
            }
        } else if in_quotes {
            result.push(ch);
        }
    }
    result
}

impl ResponseDecoder for TaggedDecoder {
    fn parse(&mut self, kind: FragmentKind, bytes: &[u8]) -> Continuation {
        if self.debug {
            decoder::log_fragment(kind, bytes);
        }
        if let Some(status) = decoder::terminal_status(kind) {
            self.status = status;
        } else {
            self.accumulate(kind, bytes);
        }
        Continuation::Wait
    }

    fn status(&self) -> CompletionStatus {
        self.status
    }

    fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_collects_unlabeled() {
        let mut decoder = PlainDecoder::new();
        decoder.parse(FragmentKind::Unlabeled, b"\r\nu-blox\r\n");
        decoder.parse(FragmentKind::Tagged, b"\r\n+CREG: 0,1\r\n");
        assert_eq!(decoder.status(), CompletionStatus::Pending);

        decoder.parse(FragmentKind::Ok, b"\r\nOK\r\n");
        assert_eq!(decoder.text(), "u-blox");
        assert_eq!(decoder.status(), CompletionStatus::Ok);
    }

    #[test]
    fn test_plain_error() {
        let mut decoder = PlainDecoder::new();
        decoder.parse(FragmentKind::Error, b"\r\nERROR\r\n");
        assert_eq!(decoder.status(), CompletionStatus::Error);
        assert_eq!(decoder.text(), "");
    }

    #[test]
    fn test_tagged_selects_own_tag() {
        let mut decoder = TaggedDecoder::new("CCID");
        assert_eq!(decoder.tag(), "CCID");
        decoder.parse(FragmentKind::Tagged, b"\r\n+CREG: 2\r\n");
        decoder.parse(FragmentKind::Tagged, b"\r\n+CCID: 8934076500002587657\r\n");
        decoder.parse(FragmentKind::Unlabeled, b"\r\nnoise\r\n");
        decoder.parse(FragmentKind::Ok, b"\r\nOK\r\n");

        assert_eq!(decoder.text(), "8934076500002587657");
        assert_eq!(decoder.status(), CompletionStatus::Ok);
    }

    #[test]
    fn test_tagged_requires_exact_marker() {
        let mut decoder = TaggedDecoder::new("CSQ");
        // no leading newline, and a tag that only shares a prefix
        decoder.parse(FragmentKind::Tagged, b"+CSQ: 1,2\r\n");
        decoder.parse(FragmentKind::Tagged, b"\r\n+CSQX: 3,4\r\n");
        assert_eq!(decoder.text(), "");
    }

    #[test]
    fn test_tagged_without_carriage_return() {
        let mut decoder = TaggedDecoder::new("CSQ");
        decoder.parse(FragmentKind::Tagged, b"\n+CSQ: 17,99");
        assert_eq!(decoder.text(), "17,99");
    }

    #[test]
    fn test_tagged_fragment_cut_at_nul() {
        let mut decoder = TaggedDecoder::new("CSQ");
        decoder.parse(FragmentKind::Tagged, b"\r\n+CSQ: 17\0,99\r\n");
        assert_eq!(decoder.text(), "17");
    }

    #[test]
    fn test_double_quoted_part() {
        let mut decoder = TaggedDecoder::new("UDOPN");
        decoder.parse(FragmentKind::Tagged, b"\r\n+UDOPN: 9,\"T-Mobile\",\"US\"\r\n");
        assert_eq!(decoder.double_quoted_part(true), "T-Mobile");
        assert_eq!(decoder.double_quoted_part(false), "T-MobileUS");
    }

    #[test]
    fn test_double_quoted_unterminated() {
        assert_eq!(double_quoted("1,\"abc", true), "abc");
        assert_eq!(double_quoted("no quotes", true), "");
    }
}
