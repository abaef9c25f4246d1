//! Reply fragment classification
//!
//! The transport splits a modem reply into fragments and tags each one with a
//! kind before handing it to the active decoder. The kinds mirror the result
//! codes of the V.25ter command set plus the information-text forms.
//!
//! # Kinds
//! - `Unlabeled` - information text without a `+NAME:` prefix (`u-blox`)
//! - `Tagged` - information text starting with `+NAME:` (`+CSQ: 17,99`)
//! - `Ok` - final result code `OK`
//! - `Error` - `ERROR`, `+CME ERROR: n`, `+CMS ERROR: n`
//! - `Ring`, `Connect`, `NoCarrier`, `NoDialtone`, `Busy`, `NoAnswer`,
//!   `Prompt` - link-state result codes
//! - `Aborted` - produced by the transport when it gives up on a command
//! - `Unknown` - anything the transport could not classify

/// Kind tag attached to each reply fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FragmentKind {
    /// Information text without a `+NAME:` prefix
    Unlabeled,
    /// Information text with a `+NAME:` prefix
    Tagged,
    /// Final result code `OK`
    Ok,
    /// Final result code `ERROR` (including `+CME ERROR` / `+CMS ERROR`)
    Error,
    /// `RING`
    Ring,
    /// `CONNECT`
    Connect,
    /// `NO CARRIER`
    NoCarrier,
    /// `NO DIALTONE`
    NoDialtone,
    /// `BUSY`
    Busy,
    /// `NO ANSWER`
    NoAnswer,
    /// Data prompt `>`
    Prompt,
    /// Command aborted or timed out by the transport
    Aborted,
    /// Not classified by the transport
    Unknown,
}

impl FragmentKind {
    /// Returns a human-readable name for the kind
    pub fn name(&self) -> &'static str {
        match self {
            FragmentKind::Unlabeled => "UNLABELED",
            FragmentKind::Tagged => "TAGGED",
            FragmentKind::Ok => "OK",
            FragmentKind::Error => "ERROR",
            FragmentKind::Ring => "RING",
            FragmentKind::Connect => "CONNECT",
            FragmentKind::NoCarrier => "NO CARRIER",
            FragmentKind::NoDialtone => "NO DIALTONE",
            FragmentKind::Busy => "BUSY",
            FragmentKind::NoAnswer => "NO ANSWER",
            FragmentKind::Prompt => "PROMPT",
            FragmentKind::Aborted => "ABORTED",
            FragmentKind::Unknown => "UNKNOWN",
        }
    }

    /// Whether this kind carries reply text a decoder may accumulate
    pub fn is_payload(&self) -> bool {
        matches!(self, FragmentKind::Unlabeled | FragmentKind::Tagged)
    }

    /// Whether this kind ends the command
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            FragmentKind::Unlabeled | FragmentKind::Tagged | FragmentKind::Unknown
        )
    }

    /// Whether this kind ends the command unsuccessfully
    pub fn is_failure(&self) -> bool {
        self.is_terminal() && *self != FragmentKind::Ok
    }

    /// Classify a raw reply chunk by its first non-blank line
    ///
    /// `Aborted` is never returned; only the transport knows when it gave up.
    pub fn classify(bytes: &[u8]) -> FragmentKind {
        let bytes = crate::buffer::bounded(bytes);
        let Some(line) = bytes
            .split(|&b| b == b'\r' || b == b'\n')
            .find(|line| !line.iter().all(u8::is_ascii_whitespace))
        else {
            return FragmentKind::Unlabeled;
        };
        let start = line
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(line.len());
        let end = line
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(start, |i| i + 1);
        let line = &line[start..end];

        match line {
            b"OK" => FragmentKind::Ok,
            b"ERROR" => FragmentKind::Error,
            b"RING" => FragmentKind::Ring,
            b"NO CARRIER" => FragmentKind::NoCarrier,
            b"NO DIALTONE" => FragmentKind::NoDialtone,
            b"BUSY" => FragmentKind::Busy,
            b"NO ANSWER" => FragmentKind::NoAnswer,
            b">" => FragmentKind::Prompt,
            _ if line.starts_with(b"+CME ERROR") || line.starts_with(b"+CMS ERROR") => {
                FragmentKind::Error
            }
            _ if line.starts_with(b"CONNECT") => FragmentKind::Connect,
            _ if line.starts_with(b"+") => FragmentKind::Tagged,
            _ => FragmentKind::Unlabeled,
        }
    }
}

/// Code handed back to the transport after each fragment
///
/// Every decoder in this crate returns [`Continuation::Wait`]. The transport
/// decides when a command is finished from the terminal fragment and then
/// reads the decoder's [`CompletionStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Continuation {
    /// Keep delivering fragments until the command finishes
    Wait,
    /// The sink needs no further fragments
    ///
    /// Reserved for sinks outside this crate.
    Stop,
}

/// Completion state recorded by a decoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompletionStatus {
    /// More fragments are expected
    #[default]
    Pending,
    /// The reply finished and was understood
    Ok,
    /// The reply failed or could not be understood
    Error,
}

impl CompletionStatus {
    /// Whether the decoder is still waiting
    pub fn is_pending(&self) -> bool {
        *self == CompletionStatus::Pending
    }
}
