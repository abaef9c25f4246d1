//! Cell environment replies (`AT+CGED`, `AT+COPS=5`)
//!
//! The reply describes the serving cell first and then any neighbor cells, one
//! `MCC:...` line per cell. 3G modems add a separate `RAT:` line that always
//! belongs to the serving cell, wherever it appears in the reply.
//!
//! ```text
//! +CGED: RAT:"UMTS",
//! MCC:310, MNC:410, LAC:8a4f, CI:2d7e6f1, DLF:4385, ULF:4160, RSCP LEV:40
//! ```
//!
//! Neighbor cells are written into a fixed number of slots chosen when the
//! decoder is built; cells beyond that are dropped.

use std::fmt;

use crate::buffer;
use crate::cell::CellRecord;
use crate::config::DecoderConfig;
use crate::decoder::{self, ResponseDecoder};
use crate::fragment::{CompletionStatus, Continuation, FragmentKind};

/// Key that starts a cell description line
const RECORD_KEY: &str = "MCC:";

/// Key of the serving cell's access technology line
const RAT_KEY: &str = "RAT:";

/// Environment mode reporting only the serving cell
pub const ENVIRONMENT_SERVING_CELL: u8 = 3;

/// Environment mode reporting the serving cell and its neighbors
pub const ENVIRONMENT_SERVING_CELL_AND_NEIGHBORS: u8 = 5;

fn starts_with_key(line: &str, key: &str) -> bool {
    line.get(..key.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(key))
}

/// Fixed-capacity storage for neighbor cells
///
/// Slots are written in order; once every slot is used further cells are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSlots {
    slots: Box<[CellRecord]>,
    written: usize,
}

impl CellSlots {
    /// Create `capacity` unwritten slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![CellRecord::default(); capacity].into_boxed_slice(),
            written: 0,
        }
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Claim the next slot if there is room
    pub fn push_slot(&mut self) -> Option<&mut CellRecord> {
        let slot = self.slots.get_mut(self.written)?;
        self.written += 1;
        Some(slot)
    }

    /// Written slots, in reply order
    pub fn as_slice(&self) -> &[CellRecord] {
        &self.slots[..self.written]
    }

    /// Reset every slot to unwritten
    pub fn clear(&mut self) {
        self.slots.fill(CellRecord::default());
        self.written = 0;
    }
}

/// Which record the next cell description line is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Nothing written yet; the next line is the serving cell
    Service,
    /// The next line is neighbor `n` (dropped if `n` is past capacity)
    Neighbor(usize),
}

/// Serving cell plus neighbor cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentResult {
    /// The cell the modem is camped on
    pub service: CellRecord,
    neighbors: CellSlots,
    service_written: bool,
}

impl EnvironmentResult {
    /// Create an empty result with room for `neighbor_capacity` neighbors
    pub fn new(neighbor_capacity: usize) -> Self {
        Self {
            service: CellRecord::default(),
            neighbors: CellSlots::with_capacity(neighbor_capacity),
            service_written: false,
        }
    }

    /// Where the next cell description line goes
    pub fn cursor(&self) -> Cursor {
        if self.service_written {
            Cursor::Neighbor(self.neighbors.written())
        } else {
            Cursor::Service
        }
    }

    /// Neighbor slot count
    pub fn neighbor_capacity(&self) -> usize {
        self.neighbors.capacity()
    }

    /// Write a cell description line at the cursor and advance it
    pub fn push_record_line(&mut self, line: &str) {
        if !self.service_written {
            self.service.parse(line);
            self.service_written = true;
        } else if let Some(slot) = self.neighbors.push_slot() {
            slot.parse(line);
        } else {
            tracing::trace!("no room for neighbor cell, dropping: {}", line);
        }
    }

    /// Merge a `RAT:` line into the serving cell without moving the cursor
    pub fn apply_rat_line(&mut self, line: &str) {
        self.service.parse(line);
    }

    /// Every neighbor slot written so far, valid or not
    pub fn written_neighbors(&self) -> &[CellRecord] {
        self.neighbors.as_slice()
    }

    /// Number of neighbors reported
    ///
    /// Counting stops at the first written neighbor that fails the full
    /// validity check, including its cell identity range.
    pub fn neighbor_count(&self) -> usize {
        match self.cursor() {
            Cursor::Service => 0,
            Cursor::Neighbor(written) => self
                .neighbors
                .as_slice()
                .iter()
                .position(|cell| !cell.is_valid(false))
                .unwrap_or(written),
        }
    }

    /// Written neighbors with a plausible country code
    pub fn neighbors(&self) -> impl Iterator<Item = &CellRecord> {
        self.neighbors
            .as_slice()
            .iter()
            .filter(|cell| cell.is_valid(true))
    }

    /// The serving cell followed by the plausible neighbors
    pub fn cells(&self) -> impl Iterator<Item = &CellRecord> {
        std::iter::once(&self.service).chain(self.neighbors())
    }

    /// Forget every cell so the result can be reused
    pub fn clear(&mut self) {
        self.service = CellRecord::default();
        self.neighbors.clear();
        self.service_written = false;
    }

    /// Log the serving cell and plausible neighbors at info level
    pub fn log_response(&self) {
        tracing::info!("service {}", self.service);
        for (index, cell) in self.neighbors.as_slice().iter().enumerate() {
            if cell.is_valid(true) {
                tracing::info!("neighbor {} {}", index, cell);
            }
        }
    }
}

impl fmt::Display for EnvironmentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service {}", self.service)?;
        for (index, cell) in self.neighbors.as_slice().iter().enumerate() {
            if cell.is_valid(true) {
                write!(f, "\nneighbor {} {}", index, cell)?;
            }
        }
        Ok(())
    }
}

/// Decoder for environment replies
#[derive(Debug, Clone)]
pub struct EnvironmentDecoder {
    tag_prefix: String,
    result: EnvironmentResult,
    status: CompletionStatus,
    debug: bool,
}

impl EnvironmentDecoder {
    /// Create a decoder for replies tagged `tag` with room for `neighbor_capacity` neighbors
    pub fn new(tag: &str, neighbor_capacity: usize) -> Self {
        Self::from_config(
            &DecoderConfig::default().with_neighbor_capacity(neighbor_capacity),
            tag,
        )
    }

    /// Create a decoder from configuration
    pub fn from_config(config: &DecoderConfig, tag: &str) -> Self {
        Self {
            tag_prefix: format!("+{}: ", tag),
            result: EnvironmentResult::new(config.neighbor_capacity),
            status: CompletionStatus::Pending,
            debug: config.enable_debug,
        }
    }

    /// Cells decoded so far
    pub fn result(&self) -> &EnvironmentResult {
        &self.result
    }

    /// Take the decoded cells
    pub fn into_result(self) -> EnvironmentResult {
        self.result
    }

    /// Reset for another command
    pub fn clear(&mut self) {
        self.result.clear();
        self.status = CompletionStatus::Pending;
    }

    fn ingest(&mut self, kind: FragmentKind, bytes: &[u8]) {
        let text = buffer::to_text(bytes);
        for line in buffer::lines(&text) {
            let line = match kind {
                FragmentKind::Tagged => line.strip_prefix(&self.tag_prefix).unwrap_or(line),
                _ => line,
            };

            if starts_with_key(line, RECORD_KEY) {
                self.result.push_record_line(line);
            } else if starts_with_key(line, RAT_KEY) {
                self.result.apply_rat_line(line);
            } else {
                tracing::trace!("ignoring environment line: {}", line);
            }
        }
    }
}

impl ResponseDecoder for EnvironmentDecoder {
    fn parse(&mut self, kind: FragmentKind, bytes: &[u8]) -> Continuation {
        if self.debug {
            decoder::log_fragment(kind, bytes);
        }
        if kind.is_payload() {
            self.ingest(kind, bytes);
        } else if let Some(status) = decoder::terminal_status(kind) {
            self.status = status;
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
