//! Cell locate replies (`AT+ULOC`)
//!
//! The fix arrives as `+UULOC: <date>,<time>,<lat>,<long>,<alt>,<uncertainty>`.
//! The modem usually answers `OK` first and sends the fix later, so the
//! decoder keeps accumulating after `OK` and a later `OK` decodes again.

use std::fmt;

use crate::config::DecoderConfig;
use crate::decoder::{self, ResponseDecoder};
use crate::error::ParseError;
use crate::fragment::{CompletionStatus, Continuation, FragmentKind};
use crate::scan;
use crate::text::TaggedDecoder;

/// Fields in a `+UULOC` line
const LOCATION_FIELDS: usize = 6;

/// Decoded position fix
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationResult {
    /// Whether every field was decoded
    pub valid: bool,
    /// Date of the fix, `DD/MM/YYYY`
    pub date: String,
    /// UTC time of the fix, `hh:mm:ss.sss`
    pub time: String,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Altitude in meters
    pub alt: i32,
    /// Estimated position error in meters
    pub uncertainty: i32,
}

impl fmt::Display for LocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            write!(
                f,
                "lat={:.6} lon={:.6} alt={} uncertainty={}",
                self.lat, self.lon, self.alt, self.uncertainty
            )
        } else {
            write!(f, "valid=false")
        }
    }
}

/// Parse the payload of a `+UULOC` line
///
/// Empty fields are skipped rather than counted, and anything after the sixth
/// field is ignored.
pub fn parse_location(line: &str) -> Result<LocationResult, ParseError> {
    let fields: Vec<&str> = line
        .split(',')
        .filter(|field| !field.is_empty())
        .take(LOCATION_FIELDS)
        .collect();
    if fields.len() < LOCATION_FIELDS {
        return Err(ParseError::FieldCount {
            expected: LOCATION_FIELDS,
            actual: fields.len(),
        });
    }

    Ok(LocationResult {
        valid: true,
        date: fields[0].to_string(),
        time: fields[1].to_string(),
        lat: scan::float(fields[2]),
        lon: scan::float(fields[3]),
        alt: scan::to_i32(scan::decimal(fields[4])),
        uncertainty: scan::to_i32(scan::decimal(fields[5])),
    })
}

/// Decoder for `+UULOC` replies
#[derive(Debug, Clone)]
pub struct LocationDecoder {
    line: TaggedDecoder,
    result: LocationResult,
    status: CompletionStatus,
    debug: bool,
}

impl LocationDecoder {
    /// Create a decoder with default limits
    pub fn new() -> Self {
        Self::from_config(&DecoderConfig::default())
    }

    /// Create a decoder from configuration
    pub fn from_config(config: &DecoderConfig) -> Self {
        Self {
            line: TaggedDecoder::from_config(config, "UULOC"),
            result: LocationResult::default(),
            status: CompletionStatus::Pending,
            debug: config.enable_debug,
        }
    }

    /// Decoded fix; `valid` is false until every field arrived
    pub fn result(&self) -> &LocationResult {
        &self.result
    }

    /// Whether a complete fix was decoded
    pub fn is_valid(&self) -> bool {
        self.result.valid
    }

    /// Decode the accumulated line
    ///
    /// Hosts polling for a late fix call this after each empty command. When
    /// fields are still missing the status stays pending.
    pub fn postprocess(&mut self) {
        if self.result.valid {
            return;
        }
        match parse_location(self.line.text()) {
            Ok(result) => {
                self.result = result;
                self.status = CompletionStatus::Ok;
            }
            Err(e) => {
                tracing::debug!("no location fix yet: {}", e);
                self.status = CompletionStatus::Pending;
            }
        }
    }
}

impl Default for LocationDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseDecoder for LocationDecoder {
    fn parse(&mut self, kind: FragmentKind, bytes: &[u8]) -> Continuation {
        if self.debug {
            decoder::log_fragment(kind, bytes);
        }
        match decoder::terminal_status(kind) {
            Some(CompletionStatus::Ok) => self.postprocess(),
            Some(status) => {
                if !self.result.valid {
                    self.status = status;
                }
            }
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
