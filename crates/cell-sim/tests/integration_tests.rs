//! Integration tests for the reply decoders
//!
//! These tests run every query in the catalog against the virtual modem:
//! - Identification and tagged text replies
//! - Signal quality on 2G/3G and LTE modules
//! - Cell environment with neighbors, operator scan and operator names
//! - Registration with and without the `<n>` field
//! - Late location fixes, failures and aborted commands

use std::time::Duration;

use cell_protocol::{
    Band, CompletionStatus, Decoder, DecoderConfig, EnvironmentMode, EnvironmentResult,
    FragmentKind, OperatorCache, OperatorNameFormat, Query, RadioAccess, ResponseDecoder,
};
use cell_sim::{LocationFix, VirtualModem, VirtualModemConfig};
use proptest::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// Route decoder logs to the test output, filtered by `RUST_LOG`
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Create a 2G modem with logging enabled
    pub fn gsm_modem() -> VirtualModem {
        init_tracing();
        VirtualModem::new()
    }

    /// Create an LTE (SARA-R4) modem
    pub fn lte_modem() -> VirtualModem {
        init_tracing();
        VirtualModem::from_config(VirtualModemConfig {
            model: "SARA-R410M-02B".to_string(),
            ..Default::default()
        })
    }

    /// Create a 3G modem camped on a UMTS cell
    pub fn umts_modem() -> VirtualModem {
        init_tracing();
        VirtualModem::from_config(VirtualModemConfig {
            serving_rat: Some("UMTS".to_string()),
            serving_cell:
                "MCC:310, MNC:410, LAC:8a4f, CI:2d7e6f1, DLF:4385, ULF:4160, RSCP LEV:40"
                    .to_string(),
            neighbor_cells: vec![
                "MCC:310, MNC:410, LAC:8a4f, CI:2d7e6f2, DLF:9712, ULF:9262, RSCP LEV:30"
                    .to_string(),
            ],
            ..Default::default()
        })
    }

    /// Run a plain or tagged text query and return the decoded text
    pub fn text_of(modem: &mut VirtualModem, mut query: Query) -> String {
        assert_eq!(modem.execute(&mut query), FragmentKind::Ok);
        match query.decoder {
            Decoder::Plain(d) => d.text().to_string(),
            Decoder::Tagged(d) => d.text().to_string(),
            other => panic!("unexpected decoder {}", other.name()),
        }
    }

    /// Run an environment query and return the decoded cells
    pub fn environment_of(modem: &mut VirtualModem, mut query: Query) -> EnvironmentResult {
        modem.execute(&mut query);
        assert_eq!(query.decoder.status(), CompletionStatus::Ok);
        match query.decoder {
            Decoder::Environment(d) => d.into_result(),
            other => panic!("unexpected decoder {}", other.name()),
        }
    }

    pub fn location_fix(late: bool) -> LocationFix {
        LocationFix {
            date: "13/04/2011".to_string(),
            time: "09:54:51.000".to_string(),
            lat: 45.633452,
            lon: 13.061862,
            alt: 49,
            uncertainty: 1,
            late,
        }
    }
}

use helpers::*;

// ============================================================================
// Identification
// ============================================================================

#[test]
fn test_identification_queries() {
    let mut modem = gsm_modem();
    assert_eq!(text_of(&mut modem, Query::manufacturer()), "u-blox");
    assert_eq!(text_of(&mut modem, Query::model()), "SARA-U260");
    assert_eq!(text_of(&mut modem, Query::ordering_code()), "SARA-U260-00S-00");
    assert_eq!(text_of(&mut modem, Query::firmware_version()), "23.20");
    assert_eq!(text_of(&mut modem, Query::imei()), "353162070000000");
    assert_eq!(text_of(&mut modem, Query::imsi()), "310260000000000");
    assert_eq!(text_of(&mut modem, Query::iccid()), "8934076500002587657");
}

#[test]
fn test_operator_name_is_quoted() {
    let mut modem = gsm_modem();
    let mut query = Query::operator_name(OperatorNameFormat::LongEons);
    modem.execute(&mut query);

    let Decoder::Tagged(decoder) = &query.decoder else {
        panic!("expected tagged decoder");
    };
    assert_eq!(decoder.text(), "9,\"T-Mobile\"");
    assert_eq!(decoder.double_quoted_part(true), "T-Mobile");
    assert_eq!(modem.commands(), ["AT+UDOPN=9"]);
}

#[test]
fn test_lte_detection_from_model_reply() {
    let mut modem = lte_modem();
    let model = text_of(&mut modem, Query::model());
    assert!(cell_protocol::is_lte_model(&model));
}

// ============================================================================
// Signal Quality
// ============================================================================

#[test]
fn test_signal_quality() {
    let mut modem = gsm_modem();
    let mut query = Query::signal_quality();
    assert_eq!(modem.execute(&mut query), FragmentKind::Ok);

    let Decoder::SignalQuality(decoder) = &query.decoder else {
        panic!("expected signal quality decoder");
    };
    assert_eq!(decoder.status(), CompletionStatus::Ok);
    assert_eq!(decoder.result().rssi, -79);
    assert_eq!(decoder.result().qual, 99);
    assert_eq!(decoder.result().to_string(), "rssi=-79 qual=99");
}

#[test]
fn test_extended_signal_quality_on_lte() {
    let mut modem = lte_modem();
    let mut query = Query::extended_signal_quality();
    modem.execute(&mut query);

    let Decoder::ExtendedSignalQuality(decoder) = &query.decoder else {
        panic!("expected extended signal quality decoder");
    };
    assert_eq!(decoder.status(), CompletionStatus::Ok);
    assert_eq!(decoder.result().rsrq, 20);
    assert_eq!(decoder.result().rsrp, 42);
}

#[test]
fn test_extended_signal_quality_unsupported() {
    let mut modem = gsm_modem();
    let mut query = Query::extended_signal_quality();
    assert_eq!(modem.execute(&mut query), FragmentKind::Error);
    assert_eq!(query.decoder.status(), CompletionStatus::Error);
}

// ============================================================================
// Environment and Operators
// ============================================================================

#[test]
fn test_environment_with_neighbors() {
    let mut modem = gsm_modem();
    let config = DecoderConfig::default();
    let result = environment_of(
        &mut modem,
        Query::environment(&config, EnvironmentMode::ServingCellAndNeighbors),
    );

    assert_eq!(result.service.mcc, 310);
    assert_eq!(result.service.mnc, 260);
    assert_eq!(result.service.lac, 0xab22);
    assert_eq!(result.service.ci, 0xa78a);
    assert_eq!(result.service.arfcn, 596);
    assert_eq!(result.service.band(), Band::Mhz1800);
    assert_eq!(result.service.bars(), 2);
    assert_eq!(result.neighbor_count(), 2);

    let neighbors: Vec<_> = result.neighbors().collect();
    assert_eq!(neighbors[0].ci, 0xa78b);
    assert_eq!(neighbors[1].band(), Band::Mhz850);
    assert_eq!(neighbors[1].band_label(), "GSM 850");
}

#[test]
fn test_environment_serving_cell_only() {
    let mut modem = gsm_modem();
    let config = DecoderConfig::default();
    let result = environment_of(
        &mut modem,
        Query::environment(&config, EnvironmentMode::ServingCell),
    );
    assert!(result.service.is_valid(false));
    assert_eq!(result.neighbor_count(), 0);
    assert_eq!(modem.commands(), ["AT+CGED=3"]);
}

#[test]
fn test_environment_umts() {
    let mut modem = umts_modem();
    let config = DecoderConfig::default();
    let result = environment_of(
        &mut modem,
        Query::environment(&config, EnvironmentMode::ServingCellAndNeighbors),
    );

    assert_eq!(result.service.access, RadioAccess::Umts);
    assert_eq!(result.service.band_label(), "UMTS 850");
    assert_eq!(result.service.rssi(), -81);
    assert_eq!(result.neighbor_count(), 1);
    assert_eq!(result.written_neighbors()[0].band(), Band::Mhz1900);
}

#[test]
fn test_neighbor_capacity_limits_cells() {
    let mut modem = gsm_modem();
    let config = DecoderConfig::default().with_neighbor_capacity(1);
    let result = environment_of(&mut modem, Query::operator_scan(&config));
    assert_eq!(result.neighbor_count(), 1);
    assert_eq!(result.neighbor_capacity(), 1);
}

#[test]
fn test_scan_then_name_operators() {
    let mut modem = gsm_modem();
    let config = DecoderConfig::default();
    let result = environment_of(&mut modem, Query::operator_scan(&config));

    let mut cache = OperatorCache::from_config(&config);
    for cell in result.cells() {
        cache.request_cell(cell);
    }
    assert_eq!(cache.len(), 2);

    let mut query = Query::operator_list(cache);
    assert_eq!(modem.execute(&mut query), FragmentKind::Ok);
    let Decoder::OperatorNames(decoder) = query.decoder else {
        panic!("expected operator names decoder");
    };
    let cache = decoder.into_cache();
    assert_eq!(cache.resolve(310, 260), "T-Mobile");
    assert_eq!(cache.resolve(310, 410), "AT&T");
    assert_eq!(cache.resolve(901, 12), "unknown");
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_registration_four_fields() {
    let mut modem = gsm_modem();
    let mut query = Query::registration();
    assert_eq!(modem.execute(&mut query), FragmentKind::Ok);
    assert_eq!(modem.commands(), ["AT+CREG=2", "AT+CREG?", "AT+CREG=0"]);

    let Decoder::Registration(decoder) = &query.decoder else {
        panic!("expected registration decoder");
    };
    let result = decoder.result();
    assert!(result.valid);
    assert_eq!(result.n, None);
    assert_eq!(result.lac, 0x8A4F);
    assert_eq!(result.ci, 0x2D7E6F1);
    assert!(result.status().is_registered());
}

#[test]
fn test_registration_five_fields_on_lte() {
    let mut modem = lte_modem();
    let mut query = Query::registration();
    modem.execute(&mut query);

    let Decoder::Registration(decoder) = &query.decoder else {
        panic!("expected registration decoder");
    };
    assert!(decoder.result().valid);
    assert_eq!(decoder.result().n, Some(2));
}

#[test]
fn test_registration_without_setup_is_invalid() {
    let mut modem = gsm_modem();
    let mut query = Query::registration();
    query.setup = None;
    modem.execute(&mut query);

    assert_eq!(query.decoder.status(), CompletionStatus::Ok);
    let Decoder::Registration(decoder) = &query.decoder else {
        panic!("expected registration decoder");
    };
    assert!(!decoder.result().valid);
    assert_eq!(decoder.result().to_string(), "valid=false");
}

#[test]
fn test_failed_setup_skips_command() {
    let mut modem = VirtualModem::from_config(VirtualModemConfig {
        fail_commands: vec!["AT+CREG=2".to_string()],
        ..Default::default()
    });
    let mut query = Query::registration();
    assert_eq!(modem.execute(&mut query), FragmentKind::Error);
    assert_eq!(modem.commands(), ["AT+CREG=2"]);
    assert_eq!(query.decoder.status(), CompletionStatus::Pending);
}

// ============================================================================
// Location
// ============================================================================

#[test]
fn test_location_immediate() {
    let mut modem = VirtualModem::from_config(VirtualModemConfig {
        location: Some(location_fix(false)),
        ..Default::default()
    });
    let mut query = Query::location(Duration::from_secs(30));
    modem.execute(&mut query);

    let Decoder::Location(decoder) = &query.decoder else {
        panic!("expected location decoder");
    };
    assert_eq!(decoder.status(), CompletionStatus::Ok);
    assert!(decoder.is_valid());
    assert_eq!(
        decoder.result().to_string(),
        "lat=45.633452 lon=13.061862 alt=49 uncertainty=1"
    );
}

#[test]
fn test_location_late_fix_needs_poll() {
    let mut modem = VirtualModem::from_config(VirtualModemConfig {
        location: Some(location_fix(true)),
        ..Default::default()
    });
    let mut query = Query::location(Duration::from_secs(30));
    assert_eq!(modem.execute(&mut query), FragmentKind::Ok);
    assert_eq!(query.decoder.status(), CompletionStatus::Pending);

    assert_eq!(modem.poll(&mut query), FragmentKind::Ok);
    assert_eq!(query.decoder.status(), CompletionStatus::Ok);
    let Decoder::Location(decoder) = &query.decoder else {
        panic!("expected location decoder");
    };
    assert_eq!(decoder.result().alt, 49);
}

#[test]
fn test_location_without_fix_stays_pending() {
    let mut modem = gsm_modem();
    let mut query = Query::location(Duration::from_secs(10));
    modem.execute(&mut query);
    modem.poll(&mut query);
    assert_eq!(query.decoder.status(), CompletionStatus::Pending);
}

// ============================================================================
// Failures and Aborts
// ============================================================================

#[test]
fn test_aborted_environment_keeps_defaults() {
    let mut modem = gsm_modem();
    let config = DecoderConfig::default();
    let mut query = Query::environment(&config, EnvironmentMode::ServingCellAndNeighbors);
    assert_eq!(modem.execute_aborted(&mut query, 0), FragmentKind::Aborted);

    assert_eq!(query.decoder.status(), CompletionStatus::Error);
    let Decoder::Environment(decoder) = &query.decoder else {
        panic!("expected environment decoder");
    };
    assert!(!decoder.result().service.is_valid(true));
}

#[test]
fn test_aborted_after_partial_reply() {
    let mut modem = gsm_modem();
    let config = DecoderConfig::default();
    let mut query = Query::environment(&config, EnvironmentMode::ServingCellAndNeighbors);
    modem.execute_aborted(&mut query, 2);

    let Decoder::Environment(decoder) = &query.decoder else {
        panic!("expected environment decoder");
    };
    assert_eq!(decoder.status(), CompletionStatus::Error);
    assert!(decoder.result().service.is_valid(false));
    assert_eq!(decoder.result().neighbor_count(), 1);
}

#[test]
fn test_failed_signal_quality() {
    let mut modem = VirtualModem::from_config(VirtualModemConfig {
        fail_commands: vec!["AT+CSQ".to_string()],
        ..Default::default()
    });
    let mut query = Query::signal_quality();
    assert_eq!(modem.execute(&mut query), FragmentKind::Error);
    let Decoder::SignalQuality(decoder) = &query.decoder else {
        panic!("expected signal quality decoder");
    };
    assert_eq!(decoder.status(), CompletionStatus::Error);
    assert_eq!(decoder.result().rssi, 99);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn neighbor_count_is_capped(neighbors in 0usize..12, capacity in 0usize..8) {
        let cells = (0..neighbors)
            .map(|i| format!("MCC:310, MNC:260, CI:{:x}, Arfcn:{}, RxLev:20", i + 1, i))
            .collect();
        let mut modem = VirtualModem::from_config(VirtualModemConfig {
            neighbor_cells: cells,
            ..Default::default()
        });
        let config = DecoderConfig::default().with_neighbor_capacity(capacity);
        let result = environment_of(&mut modem, Query::operator_scan(&config));

        prop_assert_eq!(result.neighbor_count(), neighbors.min(capacity));
        prop_assert!(result.written_neighbors().len() <= capacity);
    }

    #[test]
    fn signal_quality_rescales(code in 0i32..=31, qual in 0i32..=7) {
        let mut modem = VirtualModem::from_config(VirtualModemConfig {
            rssi_code: code,
            qual,
            ..Default::default()
        });
        let mut query = Query::signal_quality();
        modem.execute(&mut query);
        let Decoder::SignalQuality(decoder) = &query.decoder else {
            panic!("expected signal quality decoder");
        };
        prop_assert_eq!(decoder.result().rssi, -113 + 2 * code);
        prop_assert_eq!(decoder.result().qual, qual);
    }
}
