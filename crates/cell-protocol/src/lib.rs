//! Cellular Protocol Library
//!
//! This crate decodes the replies of u-blox SARA cellular modems (SARA-G, SARA-U
//! and SARA-R4) to the AT commands used for diagnostics:
//!
//! - **Identification**: manufacturer, model, firmware, IMEI, IMSI, ICCID
//! - **Signal**: `AT+CSQ` and `AT+CESQ` signal quality
//! - **Environment**: serving and neighbor cells from `AT+CGED` / `AT+COPS=5`
//! - **Operators**: operator names from `AT+UDOPN` and the `AT+COPN` table
//! - **Location**: cell based position fix from `AT+ULOC`
//! - **Registration**: `AT+CREG?` state, area code and cell identity
//!
//! # Architecture
//!
//! The transport (serial port, modem firmware API, ...) splits each reply
//! into fragments, tags each one with a [`FragmentKind`] and hands it to a
//! [`Session`]. The session forwards every fragment to one [`Decoder`], which
//! accumulates what it needs and decodes it when the final `OK` arrives.
//! Nothing here performs I/O.
//!
//! Cell descriptions are decoded into [`CellRecord`]s, from which the
//! frequency band, RSSI and signal bars are derived.
//!
//! # Example
//!
//! ```rust
//! use cell_protocol::{Decoder, FragmentKind, Query, Session};
//!
//! let query = Query::signal_quality();
//! assert_eq!(query.command, "AT+CSQ\r\n");
//!
//! let mut session = Session::new(query.decoder);
//! session.dispatch(FragmentKind::Tagged, b"\r\n+CSQ: 17,99\r\n");
//! session.dispatch(FragmentKind::Ok, b"\r\nOK\r\n");
//!
//! if let Decoder::SignalQuality(decoder) = session.into_decoder() {
//!     assert_eq!(decoder.result().rssi, -79);
//!     assert_eq!(decoder.result().bars(), 3);
//! }
//! ```

pub mod band;
pub mod buffer;
pub mod cell;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod fragment;
pub mod location;
pub mod operator;
pub mod query;
pub mod registration;
mod scan;
pub mod signal;
pub mod text;

pub use band::{Band, RadioAccess};
pub use cell::CellRecord;
pub use config::DecoderConfig;
pub use decoder::{Decoder, ResponseDecoder};
pub use dispatch::Session;
pub use environment::{EnvironmentDecoder, EnvironmentResult};
pub use error::ParseError;
pub use fragment::{CompletionStatus, Continuation, FragmentKind};
pub use location::{LocationDecoder, LocationResult};
pub use operator::{OperatorCache, OperatorEntry, OperatorNameDecoder, OperatorNameFormat};
pub use query::{is_lte_model, EnvironmentMode, Query};
pub use registration::{
    AccessTechnology, RegistrationDecoder, RegistrationResult, RegistrationStatus,
};
pub use signal::{
    ExtendedSignalQuality, ExtendedSignalQualityDecoder, SignalQuality, SignalQualityDecoder,
};
pub use text::{PlainDecoder, TaggedDecoder};
