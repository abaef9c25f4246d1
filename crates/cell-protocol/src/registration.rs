//! Network registration replies (`AT+CREG?`)
//!
//! SARA-R4 modules include the `<n>` setting in the reply, SARA-U and SARA-G
//! modules do not:
//!
//! ```text
//! +CREG: 2,1,"FFFE","C45C010",8
//! +CREG: 1,"8A4F","2D7E6F1",2
//! ```

use std::fmt;

use crate::config::DecoderConfig;
use crate::decoder::{self, ResponseDecoder};
use crate::error::ParseError;
use crate::fragment::{CompletionStatus, Continuation, FragmentKind};
use crate::scan;
use crate::text::TaggedDecoder;

/// Registration state (`<stat>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegistrationStatus {
    /// Not registered and not searching
    NotRegistered,
    /// Registered on the home network
    Home,
    /// Not registered, searching for an operator
    Searching,
    /// Registration denied
    Denied,
    /// Unknown, e.g. out of coverage
    Unknown,
    /// Registered, roaming
    Roaming,
    /// Registered for SMS only, home network
    SmsOnlyHome,
    /// Registered for SMS only, roaming
    SmsOnlyRoaming,
    /// Registered for CSFB not preferred, home network
    CsfbNotPreferredHome,
    /// Registered for CSFB not preferred, roaming
    CsfbNotPreferredRoaming,
    /// Any other code
    Other(i32),
}

impl RegistrationStatus {
    /// Map the numeric `<stat>` value
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RegistrationStatus::NotRegistered,
            1 => RegistrationStatus::Home,
            2 => RegistrationStatus::Searching,
            3 => RegistrationStatus::Denied,
            4 => RegistrationStatus::Unknown,
            5 => RegistrationStatus::Roaming,
            6 => RegistrationStatus::SmsOnlyHome,
            7 => RegistrationStatus::SmsOnlyRoaming,
            9 => RegistrationStatus::CsfbNotPreferredHome,
            10 => RegistrationStatus::CsfbNotPreferredRoaming,
            other => RegistrationStatus::Other(other),
        }
    }

    /// Whether the modem is registered in any form
    pub fn is_registered(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::Home
                | RegistrationStatus::Roaming
                | RegistrationStatus::SmsOnlyHome
                | RegistrationStatus::SmsOnlyRoaming
                | RegistrationStatus::CsfbNotPreferredHome
                | RegistrationStatus::CsfbNotPreferredRoaming
        )
    }

    /// Whether the modem is registered on a visited network
    pub fn is_roaming(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::Roaming
                | RegistrationStatus::SmsOnlyRoaming
                | RegistrationStatus::CsfbNotPreferredRoaming
        )
    }
}

/// Access technology of the serving cell (`<AcTStatus>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessTechnology {
    Gsm,
    GsmCompact,
    Utran,
    GsmEdge,
    UtranHsdpa,
    UtranHsupa,
    UtranHsdpaHsupa,
    EUtran,
    /// The modem reported the value as invalid (255)
    Invalid,
    Other(i32),
}

impl AccessTechnology {
    /// Map the numeric `<AcTStatus>` value
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => AccessTechnology::Gsm,
            1 => AccessTechnology::GsmCompact,
            2 => AccessTechnology::Utran,
            3 => AccessTechnology::GsmEdge,
            4 => AccessTechnology::UtranHsdpa,
            5 => AccessTechnology::UtranHsupa,
            6 => AccessTechnology::UtranHsdpaHsupa,
            7 => AccessTechnology::EUtran,
            255 => AccessTechnology::Invalid,
            other => AccessTechnology::Other(other),
        }
    }
}

/// Decoded `+CREG` reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegistrationResult {
    /// Whether the reply matched one of the grammars
    pub valid: bool,
    /// Unsolicited result setting, only present in the 5 field form
    pub n: Option<i32>,
    /// Raw `<stat>` value
    pub stat: i32,
    /// Location or tracking area code
    pub lac: u32,
    /// Cell identity
    pub ci: u32,
    /// Raw `<AcTStatus>` value
    pub rat: i32,
}

impl Default for RegistrationResult {
    fn default() -> Self {
        Self {
            valid: false,
            n: None,
            stat: 0,
            lac: 0xFFFF,
            ci: 0xFFFF_FFFF,
            rat: 0,
        }
    }
}

impl RegistrationResult {
    /// Typed registration state
    pub fn status(&self) -> RegistrationStatus {
        RegistrationStatus::from_code(self.stat)
    }

    /// Typed access technology
    pub fn access_technology(&self) -> AccessTechnology {
        AccessTechnology::from_code(self.rat)
    }
}

impl fmt::Display for RegistrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            write!(
                f,
                "stat={} lac=0x{:x} ci=0x{:x} rat={}",
                self.stat, self.lac, self.ci, self.rat
            )
        } else {
            write!(f, "valid=false")
        }
    }
}

enum Field {
    Int,
    QuotedHex,
}

/// Match `line` against a comma separated field layout
fn match_fields(line: &str, layout: &[Field]) -> Result<Vec<i64>, ParseError> {
    let mut values = Vec::with_capacity(layout.len());
    for (field, text) in layout.iter().zip(line.split(',')) {
        let value = match field {
            Field::Int => scan::strict(text, 10),
            Field::QuotedHex => text
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
                .and_then(|hex| scan::strict(hex, 16)),
        };
        match value {
            Some(value) => values.push(value),
            None => break,
        }
    }
    if values.len() < layout.len() {
        return Err(ParseError::FieldCount {
            expected: layout.len(),
            actual: values.len(),
        });
    }
    Ok(values)
}

/// Parse the payload of a `+CREG` line
///
/// The 5 field form `n,stat,"lac","ci",rat` is tried first, then the 4 field
/// form `stat,"lac","ci",rat`.
pub fn parse_registration(line: &str) -> Result<RegistrationResult, ParseError> {
    use Field::{Int, QuotedHex};

    if let Ok(v) = match_fields(line, &[Int, Int, QuotedHex, QuotedHex, Int]) {
        return Ok(RegistrationResult {
            valid: true,
            n: Some(scan::to_i32(v[0])),
            stat: scan::to_i32(v[1]),
            lac: scan::to_u32(v[2]),
            ci: scan::to_u32(v[3]),
            rat: scan::to_i32(v[4]),
        });
    }

    let v = match_fields(line, &[Int, QuotedHex, QuotedHex, Int])?;
    Ok(RegistrationResult {
        valid: true,
        n: None,
        stat: scan::to_i32(v[0]),
        lac: scan::to_u32(v[1]),
        ci: scan::to_u32(v[2]),
        rat: scan::to_i32(v[3]),
    })
}

/// Decoder for `+CREG` replies
///
/// The status follows the transport; whether the reply could be decoded is
/// reported by [`RegistrationResult::valid`].
#[derive(Debug, Clone)]
pub struct RegistrationDecoder {
    line: TaggedDecoder,
    result: RegistrationResult,
    status: CompletionStatus,
    debug: bool,
}

impl RegistrationDecoder {
    /// Create a decoder with default limits
    pub fn new() -> Self {
        Self::from_config(&DecoderConfig::default())
    }

    /// Create a decoder from configuration
    pub fn from_config(config: &DecoderConfig) -> Self {
        Self {
            line: TaggedDecoder::from_config(config, "CREG"),
            result: RegistrationResult::default(),
            status: CompletionStatus::Pending,
            debug: config.enable_debug,
        }
    }

    /// Decoded registration
    pub fn result(&self) -> &RegistrationResult {
        &self.result
    }

    fn postprocess(&mut self) {
        match parse_registration(self.line.text()) {
            Ok(result) => self.result = result,
            Err(e) => tracing::debug!("CREG reply {:?} did not parse: {}", self.line.text(), e),
        }
    }
}

impl Default for RegistrationDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseDecoder for RegistrationDecoder {
    fn parse(&mut self, kind: FragmentKind, bytes: &[u8]) -> Continuation {
        if self.debug {
            decoder::log_fragment(kind, bytes);
        }
        match decoder::terminal_status(kind) {
            Some(CompletionStatus::Ok) => {
                self.status = CompletionStatus::Ok;
                self.postprocess();
            }
            Some(status) => self.status = status,
            None => self.line.accumulate(kind, bytes),
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
