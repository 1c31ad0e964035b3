//! End-to-end pipeline: raw capture → parser → inventory → diff → report.

use chrono::{Duration, TimeZone, Utc};

use airtrace_core::types::{Encryption, ScanSnapshot};
use airtrace_inventory::store::InventoryStore;
use airtrace_report::{render, ReportFormat};
use airtrace_scan::iwlist::IwlistParser;
use airtrace_scan::scanner::SAMPLE_CAPTURE;

const SECOND_CAPTURE: &str = r#"
Cell 01 - Address: 00:11:22:33:44:55
                    ESSID:"RenamedNetwork"
                    Protocol:IEEE 802.11bgn
                    Frequency:2.437 GHz (Channel 6)
                    Encryption key:on
                    IE: IEEE 802.11i/WPA2 Version 1
                        Group Cipher : CCMP
                        Authentication Suites (1) : PSK
                    Quality=60/70  Signal level=-38 dBm

Cell 02 - Address: 12:34:56:78:9A:BC
                    ESSID:"Newcomer"
                    Frequency:5.180 GHz (Channel 36)
                    Encryption key:off
                    Quality=40/70  Signal level=-60 dBm
"#;

/// Re-stamp a parsed snapshot so saved ids are distinct and stable.
fn at(snapshot: ScanSnapshot, offset_secs: i64) -> ScanSnapshot {
    let base = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap();
    ScanSnapshot::new(
        snapshot.interface.clone(),
        snapshot.networks,
        base + Duration::seconds(offset_secs),
    )
}

#[test]
fn capture_to_comparison_pipeline() {
    let parser = IwlistParser::new();
    let dir = tempfile::tempdir().unwrap();
    let mut store = InventoryStore::open(dir.path().join("inventory.json"));

    // First capture: two networks.
    let first = at(parser.parse(SAMPLE_CAPTURE, "wlan0"), 0);
    assert_eq!(first.total_networks, 2);
    let id_a = store.save_scan(&first).unwrap();

    // Saved scan reads back field-for-field.
    let stored = store.get_scan(&id_a).unwrap();
    assert_eq!(stored.networks, first.networks);

    // Second capture: the WPA2 network renamed and stronger, the open
    // network gone, one newcomer.
    let second = at(parser.parse(SECOND_CAPTURE, "wlan0"), 60);
    assert_eq!(second.total_networks, 2);
    let id_b = store.save_scan(&second).unwrap();
    assert_ne!(id_a, id_b);

    let cmp = store.compare_scans(&id_a, &id_b).unwrap();
    assert_eq!(cmp.new_networks, vec!["12:34:56:78:9A:BC"]);
    assert_eq!(cmp.disappeared_networks, vec!["AA:BB:CC:DD:EE:FF"]);
    assert_eq!(cmp.changed_networks.len(), 1);

    let changed = &cmp.changed_networks[0];
    assert_eq!(changed.bssid, "00:11:22:33:44:55");
    assert_eq!(
        changed.changes,
        vec![
            "SSID: TestNetwork1 → RenamedNetwork",
            "Signal: -30 → -38 dBm",
        ]
    );
    assert_eq!(cmp.summary.total_new, 1);
    assert_eq!(cmp.summary.total_disappeared, 1);
    assert_eq!(cmp.summary.total_changed, 1);
}

#[test]
fn sample_capture_survives_history_accumulation() {
    let parser = IwlistParser::new();
    let dir = tempfile::tempdir().unwrap();
    let mut store = InventoryStore::open(dir.path().join("inventory.json"));

    store
        .save_scan(&at(parser.parse(SAMPLE_CAPTURE, "wlan0"), 0))
        .unwrap();
    store
        .save_scan(&at(parser.parse(SECOND_CAPTURE, "wlan0"), 60))
        .unwrap();

    let history = store
        .network_history(&"00:11:22:33:44:55".parse().unwrap())
        .unwrap();
    assert_eq!(history.ssid_history, vec!["TestNetwork1", "RenamedNetwork"]);
    assert_eq!(history.encryption_history, vec![Encryption::Wpa2]);
    assert_eq!(history.signal_history.len(), 2);
    assert_eq!(history.total_scans, 2);

    let stats = store.statistics();
    assert_eq!(stats.total_scans, 2);
    assert_eq!(stats.unique_networks, 3);
}

#[test]
fn parsed_snapshot_renders_in_every_format() {
    let parser = IwlistParser::new();
    let snapshot = parser.parse(SAMPLE_CAPTURE, "wlan0");

    let reports = render(&snapshot, ReportFormat::All).unwrap();
    assert_eq!(reports.len(), 3);

    let json = &reports[0].text;
    assert!(json.contains("\"TestNetwork1\""));
    assert!(json.contains("\"WPA2\""));

    let md = &reports[1].text;
    assert!(md.contains("# Wi-Fi Scan Report"));
    assert!(md.contains("| TestNetwork1 | 00:11:22:33:44:55 |"));

    let csv_text = &reports[2].text;
    assert!(csv_text.starts_with("bssid,ssid,"));
    assert!(csv_text.contains("AA:BB:CC:DD:EE:FF,OpenNetwork,11"));
}
