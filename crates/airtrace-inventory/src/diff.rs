//! Snapshot comparison: set differences and field-level changes
//! between two saved scans, keyed by BSSID.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use airtrace_core::types::NetworkRecord;

use crate::StoredScan;

/// Field-level changes for one network present in both scans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangedNetwork {
    pub bssid: String,
    pub changes: Vec<String>,
}

/// Counts for the three difference categories.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComparisonSummary {
    pub total_new: usize,
    pub total_disappeared: usize,
    pub total_changed: usize,
}

/// The outcome of comparing two saved scans.
///
/// A value of differences only: producing it never touches the store,
/// and it serializes verbatim for callers that persist or display it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanComparison {
    pub scan_a: String,
    pub scan_b: String,
    pub scan_a_timestamp: DateTime<Utc>,
    pub scan_b_timestamp: DateTime<Utc>,
    pub new_networks: Vec<String>,
    pub disappeared_networks: Vec<String>,
    pub changed_networks: Vec<ChangedNetwork>,
    pub summary: ComparisonSummary,
}

/// Compare two scans' network sets. Pure: the result is a function of
/// the two scans alone. BSSID lists come out lexicographically sorted
/// so repeated comparisons are diff-stable.
pub fn compare(scan_a: &StoredScan, scan_b: &StoredScan) -> ScanComparison {
    let nets_a: BTreeMap<&str, &NetworkRecord> = scan_a
        .networks
        .iter()
        .map(|n| (n.bssid.as_str(), n))
        .collect();
    let nets_b: BTreeMap<&str, &NetworkRecord> = scan_b
        .networks
        .iter()
        .map(|n| (n.bssid.as_str(), n))
        .collect();

    let new_networks: Vec<String> = nets_b
        .keys()
        .filter(|bssid| !nets_a.contains_key(*bssid))
        .map(|bssid| bssid.to_string())
        .collect();

    let disappeared_networks: Vec<String> = nets_a
        .keys()
        .filter(|bssid| !nets_b.contains_key(*bssid))
        .map(|bssid| bssid.to_string())
        .collect();

    let mut changed_networks = Vec::new();
    for (bssid, net_a) in &nets_a {
        let Some(net_b) = nets_b.get(bssid) else {
            continue;
        };
        let changes = field_changes(net_a, net_b);
        if !changes.is_empty() {
            changed_networks.push(ChangedNetwork {
                bssid: bssid.to_string(),
                changes,
            });
        }
    }

    let summary = ComparisonSummary {
        total_new: new_networks.len(),
        total_disappeared: disappeared_networks.len(),
        total_changed: changed_networks.len(),
    };

    ScanComparison {
        scan_a: scan_a.id.clone(),
        scan_b: scan_b.id.clone(),
        scan_a_timestamp: scan_a.timestamp,
        scan_b_timestamp: scan_b.timestamp,
        new_networks,
        disappeared_networks,
        changed_networks,
        summary,
    }
}

/// Exactly four fields participate in change detection, in this fixed
/// order. Cipher, authentication, and protocol drift is out of scope.
fn field_changes(a: &NetworkRecord, b: &NetworkRecord) -> Vec<String> {
    let mut changes = Vec::new();

    if a.ssid != b.ssid {
        changes.push(format!("SSID: {} → {}", a.ssid, b.ssid));
    }
    if a.signal_level != b.signal_level {
        changes.push(format!("Signal: {} → {} dBm", a.signal_level, b.signal_level));
    }
    if a.encryption != b.encryption {
        changes.push(format!("Encryption: {} → {}", a.encryption, b.encryption));
    }
    if a.channel != b.channel {
        changes.push(format!("Channel: {} → {}", a.channel, b.channel));
    }

    changes
}
