//! Frequency band and signal strength lookup tables
//!
//! The modem reports channel numbers (ARFCN for GSM, UARFCN for UMTS) and coded
//! signal levels rather than physical quantities. This module maps them to the
//! band a user would recognise and to the 0-5 "bars" shown on phones.
//!
//! The UMTS table lists individual uplink channel numbers from the North
//! American band plans (PCS, AWS, CLR, ...) before falling back to the general
//! channel ranges. Entries are matched in order, so a channel listed in the
//! exact table wins over an overlapping range.

use std::fmt;

/// Radio access technology of a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RadioAccess {
    /// 2G GSM
    #[default]
    Gsm,
    /// 3G UMTS
    Umts,
}

impl RadioAccess {
    /// Returns whether this is a 3G cell
    pub fn is_umts(&self) -> bool {
        *self == RadioAccess::Umts
    }

    /// Short generation label, `2G` or `3G`
    pub fn generation(&self) -> &'static str {
        match self {
            RadioAccess::Gsm => "2G",
            RadioAccess::Umts => "3G",
        }
    }
}

/// Frequency band of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Band {
    Mhz700,
    Mhz800,
    Mhz850,
    Mhz900,
    Mhz1700,
    Mhz1800,
    Mhz1900,
    Mhz2100,
    Mhz2600,
    /// Channel number outside every known allocation
    Unknown,
}

impl Band {
    /// Nominal frequency in MHz, `None` when unknown
    pub fn mhz(&self) -> Option<u16> {
        match self {
            Band::Mhz700 => Some(700),
            Band::Mhz800 => Some(800),
            Band::Mhz850 => Some(850),
            Band::Mhz900 => Some(900),
            Band::Mhz1700 => Some(1700),
            Band::Mhz1800 => Some(1800),
            Band::Mhz1900 => Some(1900),
            Band::Mhz2100 => Some(2100),
            Band::Mhz2600 => Some(2600),
            Band::Unknown => None,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mhz() {
            Some(mhz) => write!(f, "{}", mhz),
            None => f.write_str("unknown"),
        }
    }
}

/// Exact UMTS uplink channels from the North American band plans
const UMTS_CHANNELS: &[(&[i32], Band)] = &[
    // PCS A-F
    (
        &[12, 37, 62, 87, 112, 137, 162, 187, 212, 237, 262, 287],
        Band::Mhz1900,
    ),
    // AWS A-F
    (
        &[1662, 1687, 1712, 1737, 1762, 1787, 1812, 1837, 1862],
        Band::Mhz1700,
    ),
    // CLR
    (&[782, 787, 807, 812, 837, 862], Band::Mhz850),
    // IMT-E
    (
        &[
            2362, 2387, 2412, 2437, 2462, 2487, 2512, 2537, 2562, 2587, 2612, 2637, 2662, 2687,
        ],
        Band::Mhz2600,
    ),
    // EAWS A-G
    (
        &[
            3187, 3212, 3237, 3262, 3287, 3312, 3337, 3362, 3387, 3412, 3437, 3462,
        ],
        Band::Mhz1700,
    ),
    // LSMH A/B/C
    (&[3707, 3732, 3737, 3762, 3767], Band::Mhz700),
    // USMH C
    (&[3842, 3867], Band::Mhz700),
    // USMH D
    (&[3942, 3967], Band::Mhz700),
    (&[387, 412, 437], Band::Mhz800),
    // EPCS A-G
    (
        &[
            6067, 6092, 6117, 6142, 6167, 6192, 6217, 6242, 6267, 6292, 6317, 6342, 6367,
        ],
        Band::Mhz1900,
    ),
    // ECLR
    (
        &[
            5712, 5737, 5762, 5767, 5787, 5792, 5812, 5817, 5837, 5842, 5862,
        ],
        Band::Mhz850,
    ),
];

/// GSM ARFCN ranges, also the first ranges consulted for UMTS
const GSM_RANGES: &[(i32, i32, Band)] = &[
    (0, 124, Band::Mhz900),
    (128, 251, Band::Mhz850),
    (512, 885, Band::Mhz1800),
    (975, 1023, Band::Mhz900),
];

/// UMTS uplink ranges consulted after the GSM ranges
const UMTS_RANGES: &[(i32, i32, Band)] = &[
    (1312, 1513, Band::Mhz1700),
    (2712, 2863, Band::Mhz900),
    (4132, 4233, Band::Mhz850),
    (4162, 4188, Band::Mhz800),
    (20312, 20363, Band::Mhz800),
    (9262, 9538, Band::Mhz1900),
    (9612, 9888, Band::Mhz2100),
];

fn lookup_range(ranges: &[(i32, i32, Band)], channel: i32) -> Option<Band> {
    ranges
        .iter()
        .find(|(low, high, _)| (*low..=*high).contains(&channel))
        .map(|&(_, _, band)| band)
}

/// Classify a channel number into a frequency band
///
/// For UMTS `channel` is the uplink UARFCN, for GSM the ARFCN.
pub fn classify_band(access: RadioAccess, channel: i32) -> Band {
    match access {
        RadioAccess::Umts => UMTS_CHANNELS
            .iter()
            .find(|(channels, _)| channels.contains(&channel))
            .map(|&(_, band)| band)
            .or_else(|| lookup_range(GSM_RANGES, channel))
            .or_else(|| lookup_range(UMTS_RANGES, channel))
            .unwrap_or(Band::Unknown),
        RadioAccess::Gsm => lookup_range(GSM_RANGES, channel).unwrap_or(Band::Unknown),
    }
}

/// Display label for a channel, e.g. `UMTS 1900` or `DCS 1800 or 1900`
pub fn band_label(access: RadioAccess, channel: i32) -> String {
    let band = classify_band(access, channel);
    match access {
        RadioAccess::Umts => match channel {
            0..=124 | 128..=251 => format!("GSM {}", band),
            512..=885 => "DCS 1800".to_string(),
            975..=1023 => "ESGM 900".to_string(),
            _ if band != Band::Unknown => format!("UMTS {}", band),
            _ => "3G unknown".to_string(),
        },
        RadioAccess::Gsm => match channel {
            512..=885 => "DCS 1800 or 1900".to_string(),
            975..=1024 => "EGSM 900".to_string(),
            _ if band != Band::Unknown => format!("GSM {}", band),
            _ => "2G unknown".to_string(),
        },
    }
}

/// Highest coded level that maps to a signal strength
const MAX_LEVEL: i32 = 96;

/// Convert a coded level (RXLEV or RSCP LEV) into RSSI in dBm
///
/// Returns 0 when the level is outside `0..=96`, meaning unknown.
pub fn rssi_from_level(level: i32) -> i32 {
    if (0..=MAX_LEVEL).contains(&level) {
        level - 121
    } else {
        0
    }
}

/// Convert RSSI in dBm into 0-5 bars
///
/// | RSSI    | Bars |
/// | :-----: | :--: |
/// | >= -57  | 5 |
/// | > -68   | 4 |
/// | > -80   | 3 |
/// | > -92   | 2 |
/// | > -104  | 1 |
/// | <= -104 | 0 |
///
/// Zero and positive values mean unknown and give 0 bars.
pub fn bars_from_rssi(rssi: i32) -> u8 {
    if rssi >= 0 {
        0
    } else if rssi >= -57 {
        5
    } else if rssi > -68 {
        4
    } else if rssi > -80 {
        3
    } else if rssi > -92 {
        2
    } else if rssi > -104 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_gsm_ranges() {
        assert_eq!(classify_band(RadioAccess::Gsm, 0), Band::Mhz900);
        assert_eq!(classify_band(RadioAccess::Gsm, 124), Band::Mhz900);
        assert_eq!(classify_band(RadioAccess::Gsm, 125), Band::Unknown);
        assert_eq!(classify_band(RadioAccess::Gsm, 128), Band::Mhz850);
        assert_eq!(classify_band(RadioAccess::Gsm, 251), Band::Mhz850);
        assert_eq!(classify_band(RadioAccess::Gsm, 596), Band::Mhz1800);
        assert_eq!(classify_band(RadioAccess::Gsm, 975), Band::Mhz900);
        assert_eq!(classify_band(RadioAccess::Gsm, 1023), Band::Mhz900);
        assert_eq!(classify_band(RadioAccess::Gsm, 1024), Band::Unknown);
        assert_eq!(classify_band(RadioAccess::Gsm, -1), Band::Unknown);
    }

    #[test]
    fn test_gsm_ignores_umts_table() {
        assert_eq!(classify_band(RadioAccess::Gsm, 9612), Band::Unknown);
        assert_eq!(classify_band(RadioAccess::Gsm, 1312), Band::Unknown);
    }

    #[test]
    fn test_umts_exact_channels() {
        assert_eq!(classify_band(RadioAccess::Umts, 12), Band::Mhz1900);
        assert_eq!(classify_band(RadioAccess::Umts, 1662), Band::Mhz1700);
        assert_eq!(classify_band(RadioAccess::Umts, 782), Band::Mhz850);
        assert_eq!(classify_band(RadioAccess::Umts, 2687), Band::Mhz2600);
        assert_eq!(classify_band(RadioAccess::Umts, 3462), Band::Mhz1700);
        assert_eq!(classify_band(RadioAccess::Umts, 3707), Band::Mhz700);
        assert_eq!(classify_band(RadioAccess::Umts, 3867), Band::Mhz700);
        assert_eq!(classify_band(RadioAccess::Umts, 387), Band::Mhz800);
        assert_eq!(classify_band(RadioAccess::Umts, 6367), Band::Mhz1900);
        assert_eq!(classify_band(RadioAccess::Umts, 5862), Band::Mhz850);
    }

    #[test]
    fn test_umts_upper_700_terminates() {
        assert_eq!(classify_band(RadioAccess::Umts, 3942), Band::Mhz700);
        assert_eq!(classify_band(RadioAccess::Umts, 3967), Band::Mhz700);
    }

    #[test]
    fn test_umts_exact_channel_beats_range() {
        // 12 is inside the 900 MHz GSM range but is a PCS channel
        assert_eq!(classify_band(RadioAccess::Umts, 12), Band::Mhz1900);
        assert_eq!(classify_band(RadioAccess::Umts, 13), Band::Mhz900);
    }

    #[test]
    fn test_umts_ranges() {
        assert_eq!(classify_band(RadioAccess::Umts, 1400), Band::Mhz1700);
        assert_eq!(classify_band(RadioAccess::Umts, 2800), Band::Mhz900);
        assert_eq!(classify_band(RadioAccess::Umts, 4132), Band::Mhz850);
        // overlaps the 850 range, which is consulted first
        assert_eq!(classify_band(RadioAccess::Umts, 4170), Band::Mhz850);
        assert_eq!(classify_band(RadioAccess::Umts, 20312), Band::Mhz800);
        assert_eq!(classify_band(RadioAccess::Umts, 9262), Band::Mhz1900);
        assert_eq!(classify_band(RadioAccess::Umts, 9888), Band::Mhz2100);
        assert_eq!(classify_band(RadioAccess::Umts, 9889), Band::Unknown);
        assert_eq!(classify_band(RadioAccess::Umts, 30000), Band::Unknown);
    }

    #[test]
    fn test_band_labels() {
        assert_eq!(band_label(RadioAccess::Gsm, 596), "DCS 1800 or 1900");
        assert_eq!(band_label(RadioAccess::Gsm, 1024), "EGSM 900");
        assert_eq!(band_label(RadioAccess::Gsm, 50), "GSM 900");
        assert_eq!(band_label(RadioAccess::Gsm, 2000), "2G unknown");
        assert_eq!(band_label(RadioAccess::Umts, 50), "GSM 900");
        assert_eq!(band_label(RadioAccess::Umts, 600), "DCS 1800");
        assert_eq!(band_label(RadioAccess::Umts, 1000), "ESGM 900");
        assert_eq!(band_label(RadioAccess::Umts, 9612), "UMTS 2100");
        assert_eq!(band_label(RadioAccess::Umts, 30000), "3G unknown");
    }

    #[test]
    fn test_rssi_from_level() {
        assert_eq!(rssi_from_level(36), -85);
        assert_eq!(rssi_from_level(96), -25);
        assert_eq!(rssi_from_level(97), 0);
        assert_eq!(rssi_from_level(255), 0);
        assert_eq!(rssi_from_level(0), -121);
        assert_eq!(rssi_from_level(-1), 0);
        assert_eq!(rssi_from_level(i32::MIN), 0);
    }

    #[test]
    fn test_bars_boundaries() {
        assert_eq!(bars_from_rssi(-57), 5);
        assert_eq!(bars_from_rssi(-58), 4);
        assert_eq!(bars_from_rssi(-67), 4);
        assert_eq!(bars_from_rssi(-68), 3);
        assert_eq!(bars_from_rssi(-79), 3);
        assert_eq!(bars_from_rssi(-80), 2);
        assert_eq!(bars_from_rssi(-92), 1);
        assert_eq!(bars_from_rssi(-103), 1);
        assert_eq!(bars_from_rssi(-104), 0);
        assert_eq!(bars_from_rssi(-105), 0);
        assert_eq!(bars_from_rssi(-1), 5);
        assert_eq!(bars_from_rssi(0), 0);
        assert_eq!(bars_from_rssi(31), 0);
    }

    proptest! {
        #[test]
        fn bars_monotonic_below_zero(a in -200i32..0, b in -200i32..0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(bars_from_rssi(low) <= bars_from_rssi(high));
        }

        #[test]
        fn bars_in_range(rssi in any::<i32>()) {
            prop_assert!(bars_from_rssi(rssi) <= 5);
        }

        #[test]
        fn gsm_channels_outside_ranges_are_unknown(channel in 1024i32..100_000) {
            prop_assert_eq!(classify_band(RadioAccess::Gsm, channel), Band::Unknown);
        }
    }
}
