//! Inventory store: whole-document JSON persistence.
//!
//! The store keeps the full document in memory and rewrites the file
//! on every mutating call. There is no locking; concurrent writers to
//! the same path race with last-writer-wins semantics.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use airtrace_core::types::{Bssid, ScanSnapshot};

use crate::diff::{self, ScanComparison};
use crate::{InventoryStats, NetworkHistory, StoredScan, INVENTORY_VERSION};

/// Errors that can occur during inventory operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Scan not found: {0}")]
    ScanNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// The serialized document layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InventoryDocument {
    version: String,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
    scans: Vec<StoredScan>,
    networks: BTreeMap<String, NetworkHistory>,
    statistics: InventoryStats,
}

impl InventoryDocument {
    fn empty(now: DateTime<Utc>) -> Self {
        Self {
            version: INVENTORY_VERSION.to_string(),
            created_at: now,
            last_updated: now,
            scans: Vec::new(),
            networks: BTreeMap::new(),
            statistics: InventoryStats::default(),
        }
    }
}

/// JSON-document-backed inventory of scan snapshots.
pub struct InventoryStore {
    path: PathBuf,
    doc: InventoryDocument,
}

impl InventoryStore {
    /// Open the store at `path`, loading the existing document or
    /// starting fresh. A missing, unreadable, or corrupt document is
    /// never fatal: the store starts empty and the broken file is
    /// replaced on the next successful write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut doc = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<InventoryDocument>(&json) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Corrupt inventory document, starting fresh"
                    );
                    InventoryDocument::empty(Utc::now())
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => InventoryDocument::empty(Utc::now()),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Unreadable inventory document, starting fresh"
                );
                InventoryDocument::empty(Utc::now())
            }
        };

        // The count is derived; restore the invariant for documents
        // edited outside this process.
        for scan in &mut doc.scans {
            scan.total_networks = scan.networks.len();
        }

        Self { path, doc }
    }

    /// Persist a snapshot and index every record into the per-BSSID
    /// history. Returns the generated scan id.
    ///
    /// Ids carry second precision (`scan_%Y%m%d_%H%M%S`); two
    /// snapshots captured within the same UTC second collide and the
    /// later save replaces the earlier scan entry. Known limitation.
    ///
    /// A write failure is fatal to this call and leaves the on-disk
    /// document untouched.
    pub fn save_scan(&mut self, snapshot: &ScanSnapshot) -> Result<String> {
        let scan_id = format!("scan_{}", snapshot.timestamp.format("%Y%m%d_%H%M%S"));
        let stored = StoredScan::from_snapshot(scan_id.clone(), snapshot);

        match self.doc.scans.iter().position(|s| s.id == scan_id) {
            Some(existing) => self.doc.scans[existing] = stored,
            None => self.doc.scans.push(stored),
        }

        for record in &snapshot.networks {
            self.doc
                .networks
                .entry(record.bssid.to_string())
                .or_insert_with(|| NetworkHistory::new(snapshot.timestamp))
                .record_sighting(record, snapshot.timestamp);
        }

        self.recompute_statistics();
        self.doc.last_updated = Utc::now();
        self.persist()?;

        tracing::info!(
            scan_id = %scan_id,
            networks = snapshot.networks.len(),
            "Scan saved"
        );

        Ok(scan_id)
    }

    /// Look up a saved scan by id.
    pub fn get_scan(&self, scan_id: &str) -> Option<&StoredScan> {
        self.doc.scans.iter().find(|s| s.id == scan_id)
    }

    /// All saved scans in save order.
    pub fn all_scans(&self) -> &[StoredScan] {
        &self.doc.scans
    }

    /// Accumulated history for one BSSID.
    pub fn network_history(&self, bssid: &Bssid) -> Option<&NetworkHistory> {
        self.doc.networks.get(bssid.as_str())
    }

    /// The full per-BSSID history index.
    pub fn networks(&self) -> &BTreeMap<String, NetworkHistory> {
        &self.doc.networks
    }

    pub fn statistics(&self) -> &InventoryStats {
        &self.doc.statistics
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compare two saved scans by id. An unknown id is a distinct
    /// not-found error, never an empty comparison.
    pub fn compare_scans(&self, id_a: &str, id_b: &str) -> Result<ScanComparison> {
        let scan_a = self
            .get_scan(id_a)
            .ok_or_else(|| StoreError::ScanNotFound(id_a.to_string()))?;
        let scan_b = self
            .get_scan(id_b)
            .ok_or_else(|| StoreError::ScanNotFound(id_b.to_string()))?;
        Ok(diff::compare(scan_a, scan_b))
    }

    fn recompute_statistics(&mut self) {
        self.doc.statistics = InventoryStats {
            total_scans: self.doc.scans.len(),
            unique_networks: self.doc.networks.len(),
            last_scan_date: self.doc.scans.last().map(|s| s.timestamp),
        };
    }

    // Write-then-rename keeps the previous document intact if this
    // call fails partway.
    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "Inventory document written");
        Ok(())
    }
}
