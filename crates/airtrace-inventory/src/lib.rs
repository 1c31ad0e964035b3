//! airtrace-inventory: JSON-document inventory of Wi-Fi scan snapshots.
//!
//! Saved scans accumulate in a single JSON document alongside a
//! per-BSSID history index and derived statistics. The document is
//! loaded fully into memory on open and rewritten fully on every
//! mutation; the supported usage is one interactive process per store
//! path at a time.

pub mod diff;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use airtrace_core::types::{Encryption, NetworkRecord, ScanSnapshot};

/// File name used when the caller does not supply a store path.
pub const DEFAULT_INVENTORY_FILE: &str = "airtrace_inventory.json";

/// Schema version written into new inventory documents.
pub const INVENTORY_VERSION: &str = "1.0";

/// A persisted scan snapshot, keyed by its generated id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredScan {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub interface: String,
    pub total_networks: usize,
    #[serde(default)]
    pub scan_duration: Option<f64>,
    pub networks: Vec<NetworkRecord>,
}

impl StoredScan {
    fn from_snapshot(id: String, snapshot: &ScanSnapshot) -> Self {
        Self {
            id,
            timestamp: snapshot.timestamp,
            interface: snapshot.interface.clone(),
            total_networks: snapshot.networks.len(),
            scan_duration: snapshot.scan_duration,
            networks: snapshot.networks.clone(),
        }
    }

    /// Rebuild the snapshot value, recomputing the derived count.
    pub fn snapshot(&self) -> ScanSnapshot {
        let mut snapshot =
            ScanSnapshot::new(self.interface.clone(), self.networks.clone(), self.timestamp);
        snapshot.scan_duration = self.scan_duration;
        snapshot
    }
}

/// One signal observation for a BSSID, recorded on every sighting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalSample {
    pub timestamp: DateTime<Utc>,
    pub signal_level: i32,
    pub quality: String,
}

/// Everything ever observed for one BSSID across saved scans.
///
/// `ssid_history` and `encryption_history` hold distinct values in
/// first-observed order; `signal_history` holds one entry per sighting
/// whether or not the level changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkHistory {
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub ssid_history: Vec<String>,
    pub signal_history: Vec<SignalSample>,
    pub encryption_history: Vec<Encryption>,
    pub total_scans: u32,
}

impl NetworkHistory {
    fn new(first_seen: DateTime<Utc>) -> Self {
        Self {
            first_seen,
            last_seen: first_seen,
            ssid_history: Vec::new(),
            signal_history: Vec::new(),
            encryption_history: Vec::new(),
            total_scans: 0,
        }
    }

    fn record_sighting(&mut self, record: &NetworkRecord, at: DateTime<Utc>) {
        self.last_seen = at;
        self.total_scans += 1;

        if !self.ssid_history.contains(&record.ssid) {
            self.ssid_history.push(record.ssid.clone());
        }

        self.signal_history.push(SignalSample {
            timestamp: at,
            signal_level: record.signal_level,
            quality: record.quality.clone(),
        });

        if !self.encryption_history.contains(&record.encryption) {
            self.encryption_history.push(record.encryption);
        }
    }
}

/// Derived store statistics, recomputed on every mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InventoryStats {
    pub total_scans: usize,
    pub unique_networks: usize,
    pub last_scan_date: Option<DateTime<Utc>>,
}
