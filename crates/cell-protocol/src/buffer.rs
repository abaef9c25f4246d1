//! Bounded text accumulation for reply fragments
//!
//! Fragments handed over by the transport are not guaranteed to be NUL-free
//! or NUL-terminated, so every copy is first cut at the first NUL byte and
//! then appended byte-for-byte (each byte becomes one `char`, the way the
//! modem's 8-bit character set maps onto Latin-1).

/// Cut a fragment at its first NUL byte
pub fn bounded(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Convert fragment bytes to text without interpreting them as UTF-8
pub fn to_text(bytes: &[u8]) -> String {
    bounded(bytes).iter().map(|&b| char::from(b)).collect()
}

/// Position of the first occurrence of `needle` in `haystack`
pub fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Iterate over the non-empty lines of `text`, splitting on CR and LF
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\r', '\n']).filter(|line| !line.is_empty())
}

/// Text buffer that grows by reserve-then-append up to a fixed maximum length
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    max_len: usize,
    truncated: bool,
}

impl TextBuffer {
    /// Create an empty buffer holding at most `max_len` characters
    pub fn new(max_len: usize) -> Self {
        Self {
            text: String::new(),
            max_len,
            truncated: false,
        }
    }

    /// Append fragment bytes, optionally dropping CR and LF
    ///
    /// Bytes beyond the maximum length are discarded.
    pub fn append(&mut self, bytes: &[u8], strip_eol: bool) {
        let bytes = bounded(bytes);
        let room = self.max_len.saturating_sub(self.text.chars().count());
        self.text.reserve(bytes.len().min(room));

        let mut kept = 0;
        for &b in bytes {
            if strip_eol && (b == b'\r' || b == b'\n') {
                continue;
            }
            if kept == room {
                if !self.truncated {
                    tracing::warn!("reply text exceeds {} characters, truncating", self.max_len);
                    self.truncated = true;
                }
                break;
            }
            self.text.push(char::from(b));
            kept += 1;
        }
    }

    /// Accumulated text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether bytes were dropped because the buffer was full
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Discard the accumulated text
    pub fn clear(&mut self) {
        self.text.clear();
        self.truncated = false;
    }
}

/// Render fragment bytes for diagnostics, one entry per reply line
///
/// CR and LF are shown as `\r` and `\n`, other control or non-ASCII bytes as
/// `0xNN`. A new entry starts after every LF.
pub fn escape_lines(bytes: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut line = String::new();
    for &b in bytes {
        match b {
            b'\n' => {
                line.push_str("\\n");
                out.push(std::mem::take(&mut line));
            }
            b'\r' => line.push_str("\\r"),
            b' '..=b'~' => line.push(char::from(b)),
            _ => line.push_str(&format!("0x{:02x}", b)),
        }
    }
    if !line.is_empty() {
        out.push(line);
    }
    out
}
