//! Cellular Modem Simulation Library
//!
//! This crate provides a simulated u-blox SARA modem for exercising the
//! `cell-protocol` decoders without hardware. [`VirtualModem`] answers AT
//! commands with protocol-accurate replies, already split into the tagged
//! fragments a transport would deliver, and can run a [`Query`] end to end.
//!
//! # Example
//!
//! ```rust
//! use cell_sim::VirtualModem;
//! use cell_protocol::{Decoder, FragmentKind, Query};
//!
//! let mut modem = VirtualModem::new();
//! let mut query = Query::model();
//!
//! assert_eq!(modem.execute(&mut query), FragmentKind::Ok);
//! if let Decoder::Plain(decoder) = &query.decoder {
//!     assert_eq!(decoder.text(), "SARA-U260");
//! }
//! ```
//!
//! [`Query`]: cell_protocol::Query

pub mod error;
pub mod modem;

pub use error::SimError;
pub use modem::{
    Fragment, LocationFix, OperatorRow, RegistrationConfig, VirtualModem, VirtualModemConfig,
};
