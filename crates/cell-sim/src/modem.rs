//! Virtual modem simulation
//!
//! Answers AT commands the way a u-blox SARA module does, already split into
//! the tagged fragments a transport would hand to a decoder.

use std::collections::VecDeque;
use std::path::Path;

use cell_protocol::{is_lte_model, Decoder, FragmentKind, PlainDecoder, Query, Session};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// One reply fragment: its kind and the bytes as received
pub type Fragment = (FragmentKind, Vec<u8>);

/// One row of the modem's operator table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorRow {
    /// Six digit `MCCMNC` code
    pub code: String,
    pub name: String,
}

/// Network registration the modem reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationConfig {
    pub stat: i32,
    pub lac: u32,
    pub ci: u32,
    pub rat: i32,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            stat: 1,
            lac: 0x8A4F,
            ci: 0x2D7E6F1,
            rat: 2,
        }
    }
}

/// Position fix returned by cell locate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub date: String,
    pub time: String,
    pub lat: f64,
    pub lon: f64,
    pub alt: i32,
    pub uncertainty: i32,
    /// Send the fix after `OK`, with the next command's reply
    #[serde(default)]
    pub late: bool,
}

/// Configuration for creating a virtual modem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualModemConfig {
    pub manufacturer: String,
    pub model: String,
    pub ordering_code: String,
    pub firmware_version: String,
    pub imei: String,
    pub imsi: String,
    pub iccid: String,
    /// Name returned by `AT+UDOPN`
    pub operator_name: String,
    /// Serving cell description line, e.g. `MCC:310, MNC:260, ...`
    pub serving_cell: String,
    /// Value of the `RAT:` line sent before the serving cell, if any
    pub serving_rat: Option<String>,
    /// Neighbor cell description lines
    pub neighbor_cells: Vec<String>,
    /// Operator table dumped by `AT+COPN`
    pub operators: Vec<OperatorRow>,
    /// `AT+CSQ` RSSI code (0-31, 99 unknown)
    pub rssi_code: i32,
    /// `AT+CSQ` quality code
    pub qual: i32,
    /// `AT+CESQ` values: rxlev, ber, rscp, ecn0, rsrq, rsrp
    pub extended_quality: [u8; 6],
    pub registration: RegistrationConfig,
    pub location: Option<LocationFix>,
    /// Commands (without `\r\n`) answered with `ERROR`
    pub fail_commands: Vec<String>,
}

impl Default for VirtualModemConfig {
    fn default() -> Self {
        Self {
            manufacturer: "u-blox".to_string(),
            model: "SARA-U260".to_string(),
            ordering_code: "SARA-U260-00S-00".to_string(),
            firmware_version: "23.20".to_string(),
            imei: "353162070000000".to_string(),
            imsi: "310260000000000".to_string(),
            iccid: "8934076500002587657".to_string(),
            operator_name: "T-Mobile".to_string(),
            serving_cell: "MCC:310, MNC:260, LAC:ab22, CI:a78a, BSIC:23, Arfcn:596, RxLev:24"
                .to_string(),
            serving_rat: None,
            neighbor_cells: vec![
                "MCC:310, MNC:260, LAC:ab22, CI:a78b, BSIC:19, Arfcn:600, RxLev:1a".to_string(),
                "MCC:310, MNC:410, LAC:8a4f, CI:3c21, BSIC:07, Arfcn:128, RxLev:10".to_string(),
            ],
            operators: vec![
                OperatorRow {
                    code: "310260".to_string(),
                    name: "T-Mobile".to_string(),
                },
                OperatorRow {
                    code: "310410".to_string(),
                    name: "AT&T".to_string(),
                },
                OperatorRow {
                    code: "901012".to_string(),
                    name: "MCP Maritime Com".to_string(),
                },
            ],
            rssi_code: 17,
            qual: 99,
            extended_quality: [99, 99, 255, 255, 20, 42],
            registration: RegistrationConfig::default(),
            location: None,
            fail_commands: Vec::new(),
        }
    }
}

impl VirtualModemConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

fn line(kind: FragmentKind, text: &str) -> Fragment {
    (kind, format!("\r\n{}\r\n", text).into_bytes())
}

fn ok() -> Fragment {
    line(FragmentKind::Ok, "OK")
}

fn error() -> Fragment {
    line(FragmentKind::Error, "ERROR")
}

/// A simulated modem answering AT commands
#[derive(Debug)]
pub struct VirtualModem {
    config: VirtualModemConfig,
    /// `<n>` set by `AT+CREG=<n>`
    creg_mode: i32,
    /// Unsolicited fragments delivered ahead of the next reply
    pending: VecDeque<Fragment>,
    commands: Vec<String>,
}

impl VirtualModem {
    /// Create a virtual modem with default settings
    pub fn new() -> Self {
        Self::from_config(VirtualModemConfig::default())
    }

    /// Create a virtual modem from configuration
    pub fn from_config(config: VirtualModemConfig) -> Self {
        Self {
            config,
            creg_mode: 0,
            pending: VecDeque::new(),
            commands: Vec::new(),
        }
    }

    pub fn config(&self) -> &VirtualModemConfig {
        &self.config
    }

    /// Whether the simulated module is an LTE model
    pub fn is_lte(&self) -> bool {
        is_lte_model(&self.config.model)
    }

    /// Commands received so far, without line terminators
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Whether unsolicited output is waiting for the next command
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Reply to one command, split into fragments
    ///
    /// Unsolicited output queued by an earlier command comes first. The last
    /// fragment is always `OK` or `ERROR`.
    pub fn respond(&mut self, command: &str) -> Vec<Fragment> {
        let command = command.trim_end_matches(['\r', '\n']);
        self.commands.push(command.to_string());
        tracing::debug!("virtual modem received {:?}", command);

        let mut fragments: Vec<Fragment> = self.pending.drain(..).collect();
        if self.config.fail_commands.iter().any(|c| c == command) {
            fragments.push(error());
            return fragments;
        }
        match self.reply(command) {
            Some(reply) => {
                fragments.extend(reply);
                fragments.push(ok());
            }
            None => {
                tracing::debug!("virtual modem does not support {:?}", command);
                fragments.push(error());
            }
        }
        fragments
    }

    /// Information text for a supported command, `None` for unsupported ones
    fn reply(&mut self, command: &str) -> Option<Vec<Fragment>> {
        let config = &self.config;
        let plain = |text: &str| Some(vec![line(FragmentKind::Unlabeled, text)]);

        match command {
            "" | "AT" => Some(Vec::new()),
            "AT+CGMI" => plain(&config.manufacturer),
            "AT+CGMM" => plain(&config.model),
            "ATI0" => plain(&config.ordering_code),
            "AT+CGMR" => plain(&config.firmware_version),
            "AT+CGSN" => plain(&config.imei),
            "AT+CIMI" => plain(&config.imsi),
            "AT+CCID" => Some(vec![line(
                FragmentKind::Tagged,
                &format!("+CCID: {}", config.iccid),
            )]),
            "AT+CSQ" => Some(vec![line(
                FragmentKind::Tagged,
                &format!("+CSQ: {},{}", config.rssi_code, config.qual),
            )]),
            "AT+CESQ" if self.is_lte() => {
                let values: Vec<String> = config
                    .extended_quality
                    .iter()
                    .map(|v| v.to_string())
                    .collect();
                Some(vec![line(
                    FragmentKind::Tagged,
                    &format!("+CESQ: {}", values.join(",")),
                )])
            }
            "AT+CGED=3" if !self.is_lte() => Some(self.environment("CGED", false)),
            "AT+CGED=5" if !self.is_lte() => Some(self.environment("CGED", true)),
            "AT+COPS=5" => Some(self.environment("COPS", true)),
            "AT+COPN" => Some(
                config
                    .operators
                    .iter()
                    .map(|op| {
                        line(
                            FragmentKind::Tagged,
                            &format!("+COPN: \"{}\",\"{}\"", op.code, op.name),
                        )
                    })
                    .collect(),
            ),
            "AT+ULOCCELL=0" => Some(Vec::new()),
            "AT+CREG?" => Some(vec![self.registration()]),
            _ => {
                if let Some(format) = command.strip_prefix("AT+UDOPN=") {
                    return Some(vec![line(
                        FragmentKind::Tagged,
                        &format!("+UDOPN: {},\"{}\"", format, config.operator_name),
                    )]);
                }
                if let Some(mode) = command.strip_prefix("AT+CREG=") {
                    self.creg_mode = mode.parse().ok()?;
                    return Some(Vec::new());
                }
                if command.starts_with("AT+ULOC=") {
                    return Some(self.location());
                }
                None
            }
        }
    }

    fn environment(&self, tag: &str, with_neighbors: bool) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        if let Some(rat) = &self.config.serving_rat {
            fragments.push(line(
                FragmentKind::Tagged,
                &format!("+{}: RAT:\"{}\",", tag, rat),
            ));
        }
        fragments.push(line(
            FragmentKind::Tagged,
            &format!("+{}: {}", tag, self.config.serving_cell),
        ));
        if with_neighbors {
            fragments.extend(
                self.config
                    .neighbor_cells
                    .iter()
                    .map(|cell| line(FragmentKind::Unlabeled, cell)),
            );
        }
        fragments
    }

    fn registration(&self) -> Fragment {
        let reg = &self.config.registration;
        let text = if self.creg_mode != 2 {
            format!("+CREG: {},{}", self.creg_mode, reg.stat)
        } else if self.is_lte() {
            format!(
                "+CREG: 2,{},\"{:X}\",\"{:X}\",{}",
                reg.stat, reg.lac, reg.ci, reg.rat
            )
        } else {
            format!("+CREG: {},\"{:X}\",\"{:X}\",{}", reg.stat, reg.lac, reg.ci, reg.rat)
        };
        line(FragmentKind::Tagged, &text)
    }

    fn location(&mut self) -> Vec<Fragment> {
        let Some(fix) = &self.config.location else {
            return Vec::new();
        };
        let fragment = line(
            FragmentKind::Tagged,
            &format!(
                "+UULOC: {},{},{:.7},{:.7},{},{}",
                fix.date, fix.time, fix.lat, fix.lon, fix.alt, fix.uncertainty
            ),
        );
        if fix.late {
            self.pending.push_back(fragment);
            Vec::new()
        } else {
            vec![fragment]
        }
    }

    /// Send a query to the modem and feed the whole reply to its decoder
    ///
    /// The setup command runs first and must succeed; the teardown command runs
    /// after a successful reply. Returns the kind of the reply's final fragment.
    pub fn execute(&mut self, query: &mut Query) -> FragmentKind {
        if let Some(setup) = query.setup.clone() {
            let kind = final_kind(&self.respond(&setup));
            if kind != FragmentKind::Ok {
                tracing::debug!("setup {:?} failed", setup.trim_end());
                return kind;
            }
        }

        let reply = self.respond(&query.command);
        let kind = feed(query, &reply);

        if kind == FragmentKind::Ok {
            if let Some(teardown) = query.teardown.clone() {
                self.respond(&teardown);
            }
        }
        kind
    }

    /// Send an empty command and feed its reply to the query's decoder
    ///
    /// Picks up output the modem sends after `OK`, such as a late location fix.
    pub fn poll(&mut self, query: &mut Query) -> FragmentKind {
        let reply = self.respond("");
        feed(query, &reply)
    }

    /// Like [`execute`](Self::execute), but the transport gives up after
    /// `after` fragments and delivers an `Aborted` fragment instead
    pub fn execute_aborted(&mut self, query: &mut Query, after: usize) -> FragmentKind {
        let mut reply = self.respond(&query.command);
        reply.truncate(after);
        reply.push((FragmentKind::Aborted, Vec::new()));
        feed(query, &reply)
    }
}

impl Default for VirtualModem {
    fn default() -> Self {
        Self::new()
    }
}

fn final_kind(reply: &[Fragment]) -> FragmentKind {
    reply
        .last()
        .map(|(kind, _)| *kind)
        .unwrap_or(FragmentKind::Unknown)
}

/// Run every fragment through a session over the query's decoder
fn feed(query: &mut Query, reply: &[Fragment]) -> FragmentKind {
    let decoder = std::mem::replace(&mut query.decoder, Decoder::from(PlainDecoder::new()));
    let mut session = Session::new(decoder);
    let mut last = FragmentKind::Unknown;
    for (kind, bytes) in reply {
        session.dispatch(*kind, bytes);
        if kind.is_terminal() {
            last = *kind;
        }
    }
    tracing::debug!(
        "fed {} fragments, status {:?}",
        session.fragments_seen(),
        session.status()
    );
    query.decoder = session.into_decoder();
    last
}
