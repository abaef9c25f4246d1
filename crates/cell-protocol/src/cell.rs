//! Cell description records
//!
//! `AT+CGED` and `AT+COPS=5` describe each cell as one line of comma separated
//! `KEY:value` pairs:
//!
//! ```text
//! MCC:310, MNC:260, LAC:ab22, CI:a78a, BSIC:23, Arfcn:596, RxLev:24
//! RAT:UMTS, MCC:310, MNC:410, LAC:8a4f, CI:2d7e6f1, DLF:4385, ULF:4160, RSCP LEV:40
//! ```
//!
//! Key case varies between firmware versions, so keys are matched
//! case-insensitively. Some values are decimal and some hexadecimal; the
//! channel number is decimal even though the vendor documentation calls it
//! hex.

use std::fmt;

use crate::band::{self, Band, RadioAccess};
use crate::scan;

/// Longest key accepted by the decoder
const MAX_KEY_LEN: usize = 15;

/// Country code value meaning "not set"
pub const MCC_UNSET: u16 = 65535;

/// Network code value meaning "not set"
pub const MNC_UNSET: u16 = 255;

/// Level value meaning "not known"
pub const LEVEL_UNKNOWN: i32 = 255;

/// Measurements for one radio cell (serving or neighbor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRecord {
    /// Mobile country code (decimal)
    pub mcc: u16,
    /// Mobile network code (decimal)
    pub mnc: u16,
    /// Location area code (hex in the reply)
    pub lac: u32,
    /// Cell identity (hex in the reply)
    pub ci: u32,
    /// Base station identity code, 2G only (hex in the reply)
    pub bsic: u32,
    /// Absolute radio frequency channel number, 2G only
    pub arfcn: i32,
    /// Received signal level, 2G only (hex in the reply)
    pub rxlev: i32,
    /// Radio access technology
    pub access: RadioAccess,
    /// Downlink frequency channel, 3G only
    pub dlf: i32,
    /// Uplink frequency channel, 3G only
    pub ulf: i32,
    /// Received signal code power level, 3G only
    pub rscp_lev: i32,
}

impl Default for CellRecord {
    fn default() -> Self {
        Self {
            mcc: MCC_UNSET,
            mnc: MNC_UNSET,
            lac: 0,
            ci: 0,
            bsic: 0,
            arfcn: 0,
            rxlev: LEVEL_UNKNOWN,
            access: RadioAccess::Gsm,
            dlf: 0,
            ulf: 0,
            rscp_lev: LEVEL_UNKNOWN,
        }
    }
}

/// Split a cell description line into `(key, value)` pairs
///
/// Segments are separated by commas; leading spaces are trimmed and the key
/// ends at the first colon. Segments without a colon are skipped.
pub fn split_pairs(line: &str) -> impl Iterator<Item = (&str, &str)> {
    line.split(',')
        .map(|segment| segment.trim_start_matches(' '))
        .filter_map(|segment| segment.split_once(':'))
}

impl CellRecord {
    /// Create a record with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one description line into this record
    ///
    /// Fields not mentioned on the line keep their current values, so a `RAT:`
    /// line can be merged into a record parsed earlier.
    pub fn parse(&mut self, line: &str) {
        for (key, value) in split_pairs(line) {
            self.add_key_value(key, value);
        }
    }

    /// Apply one `key:value` pair
    pub fn add_key_value(&mut self, key: &str, value: &str) {
        if key.len() > MAX_KEY_LEN {
            tracing::debug!("key too long key={} value={}", key, value);
            return;
        }

        match key.to_ascii_uppercase().as_str() {
            "RAT" => {
                self.access = if value.contains("UMTS") {
                    RadioAccess::Umts
                } else {
                    RadioAccess::Gsm
                };
            }
            "MCC" => self.mcc = scan::to_u16(scan::decimal(value)),
            "MNC" => self.mnc = scan::to_u16(scan::decimal(value)),
            "LAC" => self.lac = scan::to_u32(scan::hex(value)),
            "CI" => self.ci = scan::to_u32(scan::hex(value)),
            "BSIC" => self.bsic = scan::to_u32(scan::hex(value)),
            // Documented as hex, but modems report it in decimal
            "ARFCN" => self.arfcn = scan::to_i32(scan::decimal(value)),
            "RXLEV" => self.rxlev = scan::to_i32(scan::hex(value)),
            "DLF" => self.dlf = scan::to_i32(scan::decimal(value)),
            "ULF" => {
                self.ulf = scan::to_i32(scan::decimal(value));
                // AT+COPS=5 omits RAT; an uplink channel only exists on 3G
                self.access = RadioAccess::Umts;
            }
            "RSCP LEV" => self.rscp_lev = scan::to_i32(scan::decimal(value)),
            "ARFCN_DED" | "RXLEVSUB" | "T_ADV" | "RAC" | "SC" | "ECN0 LEV" => {}
            _ => tracing::debug!("unknown key={} value={}", key, value),
        }
    }

    /// Whether the record holds a plausible cell
    ///
    /// A record that was never written fails this check too, because its
    /// country code is still unset.
    pub fn is_valid(&self, ignore_ci: bool) -> bool {
        if self.mcc > 999 {
            return false;
        }

        if !ignore_ci {
            let limit = match self.access {
                RadioAccess::Umts => 0x0FFF_FFFF,
                RadioAccess::Gsm => 0xFFFF,
            };
            if self.ci >= limit {
                return false;
            }
        }
        true
    }

    /// Whether this is a 3G cell
    pub fn is_umts(&self) -> bool {
        self.access.is_umts()
    }

    /// Channel number the band is derived from (ULF for 3G, ARFCN for 2G)
    pub fn channel(&self) -> i32 {
        match self.access {
            RadioAccess::Umts => self.ulf,
            RadioAccess::Gsm => self.arfcn,
        }
    }

    /// Frequency band of the cell
    pub fn band(&self) -> Band {
        band::classify_band(self.access, self.channel())
    }

    /// Display label for the band, e.g. `UMTS 850`
    pub fn band_label(&self) -> String {
        band::band_label(self.access, self.channel())
    }

    /// RSSI in dBm, 0 when unknown
    pub fn rssi(&self) -> i32 {
        match self.access {
            RadioAccess::Umts => band::rssi_from_level(self.rscp_lev),
            RadioAccess::Gsm => band::rssi_from_level(self.rxlev),
        }
    }

    /// Signal strength as 0-5 bars
    pub fn bars(&self) -> u8 {
        band::bars_from_rssi(self.rssi())
    }

    /// Combined `MCCMNC` code, e.g. `310260`
    pub fn operator_code(&self) -> String {
        format!("{:03}{:03}", self.mcc, self.mnc)
    }
}

impl fmt::Display for CellRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let common = format!(
            "mcc={}, mnc={}, lac={:x} ci={:x} band={} rssi={}",
            self.mcc,
            self.mnc,
            self.lac,
            self.ci,
            self.band_label(),
            self.rssi()
        );
        match self.access {
            RadioAccess::Umts => write!(f, "rat=UMTS {} dlf={} ulf={}", common, self.dlf, self.ulf),
            RadioAccess::Gsm => write!(
                f,
                "rat=GSM {} bsic={:x} arfcn={} rxlev={}",
                common, self.bsic, self.arfcn, self.rxlev
            ),
        }
    }
}
