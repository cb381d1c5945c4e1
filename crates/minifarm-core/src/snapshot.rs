//! Save-game snapshots with a versioned header.
//!
//! Binary persistence via `bitcode`, JSON via `serde_json` for debug and
//! hand-inspection. Records reference factories by config name, so a
//! save survives factory ids changing between sessions, and unknown
//! names in a stale save are skipped rather than rejected.
//!
//! Restoring replays the offline gap: every producing record runs
//! through the same time-advance path as live ticking, so the state
//! after load is exactly what incremental ticking through the gap would
//! have produced.

use crate::factory::Factory;
use crate::fixed::Seconds;
use crate::orchestrator::FactoryOrchestrator;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a save-game snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x4D46_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while encoding or decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("json encoding failed: {0}")]
    JsonEncode(String),
    #[error("json decoding failed: {0}")]
    JsonDecode(String),
}

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Header prepended to every snapshot. Enables format detection and
/// version checking before trusting the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
}

impl SnapshotHeader {
    pub fn new() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(SnapshotError::FutureVersion(self.version));
        }
        Ok(())
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Saved state of one factory, keyed by config name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryRecord {
    pub name: String,
    pub current_stock: u32,
    pub production_queue: u32,
    pub is_producing: bool,
    pub remaining_time: Seconds,
    /// When this factory's timer state was captured, unix milliseconds.
    pub saved_at_unix_ms: i64,
}

impl FactoryRecord {
    fn capture(factory: &Factory, now_ms: i64) -> Self {
        Self {
            name: factory.name().to_string(),
            current_stock: factory.current_stock(),
            production_queue: factory.production_queue(),
            is_producing: factory.is_producing(),
            remaining_time: factory.remaining_time(),
            saved_at_unix_ms: now_ms,
        }
    }
}

/// A complete save: the ledger plus one record per factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub header: SnapshotHeader,
    /// Ledger contents, sorted by resource name.
    pub resources: Vec<(String, u32)>,
    pub factories: Vec<FactoryRecord>,
    pub saved_at_unix_ms: i64,
}

impl GameSnapshot {
    /// Encode to compact binary bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bitcode::serialize(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decode from binary bytes, validating the header before the
    /// payload is trusted.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: GameSnapshot =
            bitcode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        Ok(snapshot)
    }

    /// Encode to pretty JSON for inspection and hand-editing.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::JsonEncode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: GameSnapshot =
            serde_json::from_str(json).map_err(|e| SnapshotError::JsonDecode(e.to_string()))?;
        snapshot.header.validate()?;
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Orchestrator snapshot methods
// ---------------------------------------------------------------------------

impl FactoryOrchestrator {
    /// Capture the current game state. `now_ms` is the caller's wall
    /// clock in unix milliseconds; it is stored, never read here.
    pub fn capture_snapshot(&self, now_ms: i64) -> GameSnapshot {
        let mut factories: Vec<FactoryRecord> = self
            .factories
            .values()
            .map(|factory| FactoryRecord::capture(factory, now_ms))
            .collect();
        // Records are sorted for a stable byte layout.
        factories.sort_by(|a, b| a.name.cmp(&b.name));
        GameSnapshot {
            header: SnapshotHeader::new(),
            resources: self.ledger.snapshot().into_iter().collect(),
            factories,
            saved_at_unix_ms: now_ms,
        }
    }

    /// Restore a save and replay the offline gap.
    ///
    /// Resources are overwritten wholesale. Each record is matched to a
    /// live factory by name; records naming no live factory are skipped.
    /// For records that were producing, the gap between the record's own
    /// timestamp and `now_ms` is applied through the regular time-advance
    /// path. A clock that moved backwards yields a non-positive gap and
    /// no catch-up.
    pub fn restore_snapshot(&mut self, snapshot: &GameSnapshot, now_ms: i64) {
        for (resource, amount) in &snapshot.resources {
            self.ledger.set(resource, *amount);
        }
        for record in &snapshot.factories {
            let Some(id) = self.find_by_name(&record.name) else {
                continue;
            };
            let factory = &mut self.factories[id];
            factory.restore_state(
                record.current_stock,
                record.production_queue,
                record.is_producing,
                record.remaining_time,
            );
            if self.factories[id].is_producing() {
                let elapsed = (now_ms - record.saved_at_unix_ms) as f64 / 1000.0;
                self.apply_offline_elapsed(id, elapsed);
            }
        }
        self.emit_resources_changed();
        self.deliver_events();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
