//! Query catalog
//!
//! Each constructor pairs the command text to send with a decoder for its
//! reply and how long the transport should wait for it. Sending is left to
//! the transport binding.

use std::time::Duration;

use crate::config::DecoderConfig;
use crate::decoder::Decoder;
use crate::environment::{
    EnvironmentDecoder, ENVIRONMENT_SERVING_CELL, ENVIRONMENT_SERVING_CELL_AND_NEIGHBORS,
};
use crate::location::LocationDecoder;
use crate::operator::{OperatorCache, OperatorNameDecoder, OperatorNameFormat};
use crate::registration::RegistrationDecoder;
use crate::signal::{ExtendedSignalQualityDecoder, SignalQualityDecoder};
use crate::text::{PlainDecoder, TaggedDecoder};

/// Timeout for ordinary commands
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for an operator scan, which can take minutes
pub const OPERATOR_SCAN_TIMEOUT: Duration = Duration::from_secs(360);

/// Timeout for dumping the operator table
pub const OPERATOR_LIST_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for the cell locate setup command
pub const LOCATION_SETUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Model prefix of LTE Cat M1 modules
const LTE_MODEL_PREFIX: &str = "SARA-R4";

/// Whether a model string (from `AT+CGMM`) names an LTE module
pub fn is_lte_model(model: &str) -> bool {
    model.starts_with(LTE_MODEL_PREFIX)
}

/// What `AT+CGED` reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnvironmentMode {
    /// Serving cell only
    ServingCell,
    /// Serving cell and neighbor cells
    #[default]
    ServingCellAndNeighbors,
}

impl EnvironmentMode {
    /// Numeric mode sent in the command
    pub fn code(&self) -> u8 {
        match self {
            EnvironmentMode::ServingCell => ENVIRONMENT_SERVING_CELL,
            EnvironmentMode::ServingCellAndNeighbors => ENVIRONMENT_SERVING_CELL_AND_NEIGHBORS,
        }
    }
}

/// A command, the decoder for its reply and its timeout
#[derive(Debug, Clone)]
pub struct Query {
    /// Command text including the trailing `\r\n`
    pub command: String,
    pub decoder: Decoder,
    pub timeout: Duration,
    /// Command that must succeed before `command` is sent
    pub setup: Option<String>,
    /// How long to wait for the reply to `setup`
    pub setup_timeout: Duration,
    /// Command that restores the modem's default afterwards
    pub teardown: Option<String>,
}

impl Query {
    /// Build a query for `command` (without line terminator)
    pub fn new(command: &str, decoder: impl Into<Decoder>, timeout: Duration) -> Self {
        Self {
            command: format!("{}\r\n", command),
            decoder: decoder.into(),
            timeout,
            setup: None,
            setup_timeout: DEFAULT_TIMEOUT,
            teardown: None,
        }
    }

    fn with_setup(mut self, setup: &str, timeout: Duration) -> Self {
        self.setup = Some(format!("{}\r\n", setup));
        self.setup_timeout = timeout;
        self
    }

    fn with_teardown(mut self, teardown: &str) -> Self {
        self.teardown = Some(format!("{}\r\n", teardown));
        self
    }

    fn plain(command: &str) -> Self {
        Self::new(command, PlainDecoder::new(), DEFAULT_TIMEOUT)
    }

    /// Manufacturer, typically `u-blox`
    pub fn manufacturer() -> Self {
        Self::plain("AT+CGMI")
    }

    /// Model, e.g. `SARA-U260`
    pub fn model() -> Self {
        Self::plain("AT+CGMM")
    }

    /// Ordering code, e.g. `SARA-U260-00S-00`
    pub fn ordering_code() -> Self {
        Self::plain("ATI0")
    }

    /// Firmware version
    pub fn firmware_version() -> Self {
        Self::plain("AT+CGMR")
    }

    /// IMEI of the modem
    pub fn imei() -> Self {
        Self::plain("AT+CGSN")
    }

    /// IMSI of the SIM
    pub fn imsi() -> Self {
        Self::plain("AT+CIMI")
    }

    /// ICCID of the SIM
    pub fn iccid() -> Self {
        Self::new("AT+CCID", TaggedDecoder::new("CCID"), DEFAULT_TIMEOUT)
    }

    /// Name of the registered operator; read it with `double_quoted_part`
    pub fn operator_name(format: OperatorNameFormat) -> Self {
        Self::new(
            &format!("AT+UDOPN={}", format.code()),
            TaggedDecoder::new("UDOPN"),
            DEFAULT_TIMEOUT,
        )
    }

    /// RSSI and quality of the serving cell
    pub fn signal_quality() -> Self {
        Self::new("AT+CSQ", SignalQualityDecoder::new(), DEFAULT_TIMEOUT)
    }

    /// Extended signal quality, LTE modules only
    pub fn extended_signal_quality() -> Self {
        Self::new(
            "AT+CESQ",
            ExtendedSignalQualityDecoder::new(),
            DEFAULT_TIMEOUT,
        )
    }

    /// Serving cell and optionally neighbor cells, 2G/3G modules only
    pub fn environment(config: &DecoderConfig, mode: EnvironmentMode) -> Self {
        Self::new(
            &format!("AT+CGED={}", mode.code()),
            EnvironmentDecoder::from_config(config, "CGED"),
            DEFAULT_TIMEOUT,
        )
    }

    /// Scan every cell in range
    pub fn operator_scan(config: &DecoderConfig) -> Self {
        Self::new(
            "AT+COPS=5",
            EnvironmentDecoder::from_config(config, "COPS"),
            OPERATOR_SCAN_TIMEOUT,
        )
    }

    /// Fill in the names of the operators requested in `cache`
    pub fn operator_list(cache: OperatorCache) -> Self {
        Self::new(
            "AT+COPN",
            OperatorNameDecoder::new(cache),
            OPERATOR_LIST_TIMEOUT,
        )
    }

    /// Cell based location fix
    ///
    /// The fix usually arrives after `OK`; the transport should keep polling
    /// until the decoder is valid or `timeout` passes.
    pub fn location(timeout: Duration) -> Self {
        Self::new(
            &format!("AT+ULOC=2,2,0,{},5000", timeout.as_secs()),
            LocationDecoder::new(),
            timeout,
        )
        .with_setup("AT+ULOCCELL=0", LOCATION_SETUP_TIMEOUT)
    }

    /// Registration state with location area and cell identity
    pub fn registration() -> Self {
        Self::new("AT+CREG?", RegistrationDecoder::new(), DEFAULT_TIMEOUT)
            .with_setup("AT+CREG=2", DEFAULT_TIMEOUT)
            .with_teardown("AT+CREG=0")
    }
}
