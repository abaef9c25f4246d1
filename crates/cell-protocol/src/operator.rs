//! Operator name lookup (`AT+COPN`, `AT+UDOPN`)
//!
//! `AT+COPN` dumps the modem's whole operator table, thousands of lines like
//! `+COPN: "901012","MCP Maritime Com"`. Only the names of operators that were
//! requested beforehand are kept, so the cache stays small.

use std::fmt;

use crate::cell::CellRecord;
use crate::config::DecoderConfig;
use crate::decoder::{self, ResponseDecoder};
use crate::error::ParseError;
use crate::fragment::{CompletionStatus, Continuation, FragmentKind};
use crate::{buffer, scan};

/// Name returned for operators that are not cached or not yet named
pub const UNKNOWN_OPERATOR: &str = "unknown";

/// Name formats accepted by `AT+UDOPN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperatorNameFormat {
    /// Numeric `cccnnn` (or `cccnn`) code
    Numeric,
    ShortRom,
    LongRom,
    ShortCphs,
    LongCphs,
    ShortNitz,
    LongNitz,
    ServiceProvider,
    ShortEons,
    /// Recommended format
    #[default]
    LongEons,
    ShortNetworkOperator,
    LongNetworkOperator,
}

impl OperatorNameFormat {
    /// Numeric value sent in the command
    pub fn code(&self) -> u8 {
        match self {
            OperatorNameFormat::Numeric => 0,
            OperatorNameFormat::ShortRom => 1,
            OperatorNameFormat::LongRom => 2,
            OperatorNameFormat::ShortCphs => 3,
            OperatorNameFormat::LongCphs => 4,
            OperatorNameFormat::ShortNitz => 5,
            OperatorNameFormat::LongNitz => 6,
            OperatorNameFormat::ServiceProvider => 7,
            OperatorNameFormat::ShortEons => 8,
            OperatorNameFormat::LongEons => 9,
            OperatorNameFormat::ShortNetworkOperator => 11,
            OperatorNameFormat::LongNetworkOperator => 12,
        }
    }

    /// Look up a format by its numeric value
    pub fn from_code(code: u8) -> Option<Self> {
        let format = match code {
            0 => OperatorNameFormat::Numeric,
            1 => OperatorNameFormat::ShortRom,
            2 => OperatorNameFormat::LongRom,
            3 => OperatorNameFormat::ShortCphs,
            4 => OperatorNameFormat::LongCphs,
            5 => OperatorNameFormat::ShortNitz,
            6 => OperatorNameFormat::LongNitz,
            7 => OperatorNameFormat::ServiceProvider,
            8 => OperatorNameFormat::ShortEons,
            9 => OperatorNameFormat::LongEons,
            11 => OperatorNameFormat::ShortNetworkOperator,
            12 => OperatorNameFormat::LongNetworkOperator,
            _ => return None,
        };
        Some(format)
    }
}

/// One requested operator
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperatorEntry {
    pub mcc: u16,
    pub mnc: u16,
    /// Name from the operator table, once it has been seen
    pub name: Option<String>,
}

impl OperatorEntry {
    /// Whether the operator table has named this entry
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

impl fmt::Display for OperatorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:03}{:03} {}",
            self.mcc,
            self.mnc,
            self.name.as_deref().unwrap_or(UNKNOWN_OPERATOR)
        )
    }
}

/// Parse `"<mccmnc>","<name>"`
///
/// The code must be exactly six characters: three for the country code and
/// three for the network code.
pub fn parse_operator_line(line: &str) -> Result<(u16, u16, String), ParseError> {
    let invalid = || ParseError::InvalidOperatorLine(line.to_string());

    let rest = line.strip_prefix('"').ok_or_else(invalid)?;
    let (code, rest) = rest.split_once('"').ok_or_else(invalid)?;
    if code.len() != 6 || !code.is_char_boundary(3) {
        return Err(invalid());
    }
    let mcc = scan::to_u16(scan::decimal(&code[..3]));
    let mnc = scan::to_u16(scan::decimal(&code[3..]));

    let (_, rest) = rest.split_once('"').ok_or_else(invalid)?;
    let (name, _) = rest.split_once('"').ok_or_else(invalid)?;
    Ok((mcc, mnc, name.to_string()))
}

/// Fixed-capacity set of operators whose names are wanted
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperatorCache {
    entries: Vec<OperatorEntry>,
    capacity: usize,
}

impl OperatorCache {
    /// Create an empty cache holding at most `capacity` operators
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Create an empty cache sized from configuration
    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::new(config.operator_capacity)
    }

    /// Ask for the name of an operator
    ///
    /// Requests for operators already present, or beyond capacity, are ignored.
    pub fn request(&mut self, mcc: u16, mnc: u16) {
        if self.find(mcc, mnc).is_some() {
            return;
        }
        if self.entries.len() < self.capacity {
            self.entries.push(OperatorEntry {
                mcc,
                mnc,
                name: None,
            });
        }
    }

    /// Ask for the operator of a cell, if the cell has a plausible country code
    pub fn request_cell(&mut self, cell: &CellRecord) {
        if cell.is_valid(true) {
            self.request(cell.mcc, cell.mnc);
        }
    }

    /// Apply one operator table line, returning whether a requested entry was named
    pub fn ingest(&mut self, line: &str) -> bool {
        let (mcc, mnc, name) = match parse_operator_line(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::trace!("{}", e);
                return false;
            }
        };
        match self.entries.iter_mut().find(|e| e.mcc == mcc && e.mnc == mnc) {
            Some(entry) => {
                entry.name = Some(name);
                true
            }
            None => false,
        }
    }

    /// Name of an operator, or `"unknown"`
    pub fn resolve(&self, mcc: u16, mnc: u16) -> &str {
        self.find(mcc, mnc)
            .and_then(|entry| entry.name.as_deref())
            .unwrap_or(UNKNOWN_OPERATOR)
    }

    fn find(&self, mcc: u16, mnc: u16) -> Option<&OperatorEntry> {
        self.entries.iter().find(|e| e.mcc == mcc && e.mnc == mnc)
    }

    /// Number of requested operators
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been requested
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of operators
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Requested operators in request order
    pub fn iter(&self) -> impl Iterator<Item = &OperatorEntry> {
        self.entries.iter()
    }
}

/// Decoder feeding `+COPN` lines into an [`OperatorCache`]
#[derive(Debug, Clone)]
pub struct OperatorNameDecoder {
    cache: OperatorCache,
    status: CompletionStatus,
    debug: bool,
}

impl OperatorNameDecoder {
    /// Create a decoder that fills in `cache`
    pub fn new(cache: OperatorCache) -> Self {
        Self {
            cache,
            status: CompletionStatus::Pending,
            debug: false,
        }
    }

    /// Create a decoder with an empty cache sized from configuration
    pub fn from_config(config: &DecoderConfig) -> Self {
        let mut decoder = Self::new(OperatorCache::from_config(config));
        decoder.debug = config.enable_debug;
        decoder
    }

    pub fn cache(&self) -> &OperatorCache {
        &self.cache
    }

    /// Cache access for requesting operators before the command is sent
    pub fn cache_mut(&mut self) -> &mut OperatorCache {
        &mut self.cache
    }

    pub fn into_cache(self) -> OperatorCache {
        self.cache
    }
}

impl ResponseDecoder for OperatorNameDecoder {
    fn parse(&mut self, kind: FragmentKind, bytes: &[u8]) -> Continuation {
        if self.debug {
            decoder::log_fragment(kind, bytes);
        }
        if kind == FragmentKind::Tagged {
            let text = buffer::to_text(bytes);
            for line in buffer::lines(&text) {
                if let Some(payload) = line.strip_prefix("+COPN: ") {
                    self.cache.ingest(payload);
                }
            }
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
