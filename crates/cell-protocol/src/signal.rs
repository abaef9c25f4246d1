//! Signal quality replies (`AT+CSQ`, `AT+CESQ`)

use std::fmt;

use crate::band;
use crate::config::DecoderConfig;
use crate::decoder::{self, ResponseDecoder};
use crate::error::ParseError;
use crate::fragment::{CompletionStatus, Continuation, FragmentKind};
use crate::scan;
use crate::text::TaggedDecoder;

/// RSSI or quality value meaning "not known or not detectable"
pub const RSSI_UNKNOWN: i32 = 99;

/// Unknown value for the 2G/3G level and error rate fields of `+CESQ`
pub const CESQ_LEVEL_UNKNOWN: u8 = 99;

/// Unknown value for the 3G quality and 4G fields of `+CESQ`
pub const CESQ_QUALITY_UNKNOWN: u8 = 255;

/// Decoded `+CSQ: <rssi>,<qual>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalQuality {
    /// RSSI in dBm, or [`RSSI_UNKNOWN`]
    pub rssi: i32,
    /// Signal quality code as reported, 99 when unknown
    pub qual: i32,
}

impl Default for SignalQuality {
    fn default() -> Self {
        Self {
            rssi: RSSI_UNKNOWN,
            qual: RSSI_UNKNOWN,
        }
    }
}

impl SignalQuality {
    /// RSSI in dBm, `None` when the modem could not measure it
    pub fn rssi_dbm(&self) -> Option<i32> {
        (self.rssi != RSSI_UNKNOWN).then_some(self.rssi)
    }

    /// Signal strength as 0-5 bars
    pub fn bars(&self) -> u8 {
        self.rssi_dbm().map_or(0, band::bars_from_rssi)
    }
}

impl fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rssi={} qual={}", self.rssi, self.qual)
    }
}

/// Parse the payload of a `+CSQ` line
///
/// The RSSI code is rescaled to dBm: `0` is -113 dBm or less, each step adds
/// 2 dBm and `31` is -51 dBm or more. Codes of 99 and above stay 99, negative
/// codes read as 0.
pub fn parse_signal_quality(line: &str) -> Result<SignalQuality, ParseError> {
    let fields = scan::integer_fields(line, 2)?;
    let code = scan::to_i32(fields[0].max(0));
    let rssi = if code < RSSI_UNKNOWN {
        -113 + code * 2
    } else {
        RSSI_UNKNOWN
    };
    Ok(SignalQuality {
        rssi,
        qual: scan::to_i32(fields[1]),
    })
}

/// Decoded `+CESQ: <rxlev>,<ber>,<rscp>,<ecn0>,<rsrq>,<rsrp>`
///
/// Values are the raw codes from the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtendedSignalQuality {
    /// 2G received signal strength level
    pub rxlev: u8,
    /// 2G bit error rate
    pub ber: u8,
    /// 3G received signal code power
    pub rscp: u8,
    /// 3G ratio of received energy per chip to power density
    pub ecn0: u8,
    /// 4G reference signal received quality
    pub rsrq: u8,
    /// 4G reference signal received power
    pub rsrp: u8,
}

impl Default for ExtendedSignalQuality {
    fn default() -> Self {
        Self {
            rxlev: CESQ_LEVEL_UNKNOWN,
            ber: CESQ_LEVEL_UNKNOWN,
            rscp: CESQ_LEVEL_UNKNOWN,
            ecn0: CESQ_QUALITY_UNKNOWN,
            rsrq: CESQ_QUALITY_UNKNOWN,
            rsrp: CESQ_QUALITY_UNKNOWN,
        }
    }
}

impl fmt::Display for ExtendedSignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rxlev={} ber={} rscp={} ecn0={} rsrq={} rsrp={}",
            self.rxlev, self.ber, self.rscp, self.ecn0, self.rsrq, self.rsrp
        )
    }
}

/// Parse the payload of a `+CESQ` line
pub fn parse_extended_signal_quality(line: &str) -> Result<ExtendedSignalQuality, ParseError> {
    let fields = scan::integer_fields(line, 6)?;
    Ok(ExtendedSignalQuality {
        rxlev: scan::to_u8(fields[0]),
        ber: scan::to_u8(fields[1]),
        rscp: scan::to_u8(fields[2]),
        ecn0: scan::to_u8(fields[3]),
        rsrq: scan::to_u8(fields[4]),
        rsrp: scan::to_u8(fields[5]),
    })
}

/// Implements a decoder that accumulates one tagged line and parses it on `OK`
///
/// A line that does not match the grammar turns the `OK` into an error.
macro_rules! impl_quality_decoder {
    ($decoder:ident, $result:ty, $tag:literal, $parse:path) => {
        #[doc = concat!("Decoder for `+", $tag, "` replies")]
        #[derive(Debug, Clone)]
        pub struct $decoder {
            line: TaggedDecoder,
            result: $result,
            status: CompletionStatus,
            debug: bool,
        }

        impl $decoder {
            /// Create a decoder with default limits
            pub fn new() -> Self {
                Self::from_config(&DecoderConfig::default())
            }

            /// Create a decoder from configuration
            pub fn from_config(config: &DecoderConfig) -> Self {
                Self {
                    line: TaggedDecoder::from_config(config, $tag),
                    result: <$result>::default(),
                    status: CompletionStatus::Pending,
                    debug: config.enable_debug,
                }
            }

            /// Decoded values; defaults until a matching line was seen
            pub fn result(&self) -> &$result {
                &self.result
            }

            /// Raw payload accumulated so far
            pub fn text(&self) -> &str {
                self.line.text()
            }

            fn postprocess(&mut self) {
                match $parse(self.line.text()) {
                    Ok(result) => {
                        self.result = result;
                        self.status = CompletionStatus::Ok;
                    }
                    Err(e) => {
                        tracing::debug!(
                            "{} reply {:?} did not parse: {}",
                            $tag,
                            self.line.text(),
                            e
                        );
                        self.status = CompletionStatus::Error;
                    }
                }
            }
        }

        impl Default for $decoder {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ResponseDecoder for $decoder {
            fn parse(&mut self, kind: FragmentKind, bytes: &[u8]) -> Continuation {
                if self.debug {
                    decoder::log_fragment(kind, bytes);
                }
                match decoder::terminal_status(kind) {
                    Some(CompletionStatus::Ok) => self.postprocess(),
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
    };
}

impl_quality_decoder!(SignalQualityDecoder, SignalQuality, "CSQ", parse_signal_quality);
impl_quality_decoder!(
    ExtendedSignalQualityDecoder,
    ExtendedSignalQuality,
    "CESQ",
    parse_extended_signal_quality
);
