//! iwlist scan-output parsing.
//!
//! `iwlist <iface> scanning` emits loosely structured plaintext: one
//! "Cell" block per visible access point, fields in no guaranteed
//! order. This module splits the text into blocks and extracts each
//! field with its own pattern, so a corrupt block is skipped without
//! discarding the rest of the scan.

use chrono::Utc;
use regex::Regex;

use airtrace_core::types::{
    Authentication, Bssid, Cipher, Encryption, NetworkRecord, ScanSnapshot, DEFAULT_MODE,
    DEFAULT_PROTOCOL, DEFAULT_QUALITY, DEFAULT_SIGNAL_LEVEL, HIDDEN_SSID,
};

/// Parser for iwlist scan output.
///
/// Field patterns are compiled once at construction. `parse` itself
/// never fails; blocks that cannot be keyed by a valid hardware
/// address are logged and dropped.
pub struct IwlistParser {
    cell_re: Regex,
    bssid_re: Regex,
    ssid_re: Regex,
    channel_re: Regex,
    frequency_re: Regex,
    signal_re: Regex,
    quality_re: Regex,
    protocol_re: Regex,
}

impl IwlistParser {
    pub fn new() -> Self {
        Self {
            cell_re: Regex::new(r"Cell \d+ - Address:").expect("hardcoded pattern"),
            bssid_re: Regex::new(r"Address: ([0-9A-Fa-f:]{17})").expect("hardcoded pattern"),
            ssid_re: Regex::new(r#"ESSID:"([^"]*)""#).expect("hardcoded pattern"),
            channel_re: Regex::new(r"Channel (\d+)").expect("hardcoded pattern"),
            frequency_re: Regex::new(r"(\d+\.\d+) GHz").expect("hardcoded pattern"),
            signal_re: Regex::new(r"Signal level=(-?\d+) dBm").expect("hardcoded pattern"),
            quality_re: Regex::new(r"Quality=(\d+/\d+)").expect("hardcoded pattern"),
            protocol_re: Regex::new(r"Protocol:(IEEE 802\.11[a-z]*)").expect("hardcoded pattern"),
        }
    }

    /// Parse raw scan output captured from `interface` into a snapshot.
    ///
    /// Text with no cell markers yields an empty network list, not an
    /// error.
    pub fn parse(&self, raw: &str, interface: &str) -> ScanSnapshot {
        let cells = self.split_cells(raw);
        let networks: Vec<NetworkRecord> = cells
            .iter()
            .filter_map(|cell| self.parse_cell(cell))
            .collect();

        tracing::info!(
            interface = %interface,
            cells = cells.len(),
            networks = networks.len(),
            "Parsed scan output"
        );

        ScanSnapshot::new(interface, networks, Utc::now())
    }

    /// Split output into per-cell blocks, each starting at its header
    /// marker and running to just before the next marker.
    fn split_cells<'a>(&self, raw: &'a str) -> Vec<&'a str> {
        let starts: Vec<usize> = self.cell_re.find_iter(raw).map(|m| m.start()).collect();
        starts
            .iter()
            .enumerate()
            .map(|(i, &start)| match starts.get(i + 1) {
                Some(&next) => &raw[start..next],
                None => &raw[start..],
            })
            .collect()
    }

    /// Extract one record from a cell block. Every field except the
    /// hardware address falls back to its default when missing.
    fn parse_cell(&self, cell: &str) -> Option<NetworkRecord> {
        let raw_bssid = match self.bssid_re.captures(cell) {
            Some(caps) => caps.get(1)?.as_str(),
            None => {
                tracing::warn!("Cell without hardware address, skipping");
                return None;
            }
        };

        let bssid: Bssid = match raw_bssid.parse() {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping cell");
                return None;
            }
        };

        let ssid = self
            .ssid_re
            .captures(cell)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(HIDDEN_SSID)
            .to_string();

        let channel = self
            .channel_re
            .captures(cell)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);

        let frequency = self
            .frequency_re
            .captures(cell)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0.0);

        let signal_level = self
            .signal_re
            .captures(cell)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(DEFAULT_SIGNAL_LEVEL);

        let quality = self
            .quality_re
            .captures(cell)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_QUALITY.to_string());

        let mut encryption = Encryption::Open;
        let mut cipher = None;
        let mut authentication = None;

        if cell.contains("Encryption key:on") {
            // Family markers checked in this order; "WPA" is a substring
            // of WPA3 text, so WPA3 cells resolve through the WPA arm.
            if cell.contains("WPA2") || cell.contains("rsn_ie") {
                encryption = Encryption::Wpa2;
            } else if cell.contains("WPA") {
                encryption = Encryption::Wpa;
            } else if cell.contains("WEP") {
                encryption = Encryption::Wep;
            } else if cell.contains("WPA3") {
                encryption = Encryption::Wpa3;
            }

            if cell.contains("CCMP") {
                cipher = Some(Cipher::Ccmp);
            } else if cell.contains("TKIP") {
                cipher = Some(Cipher::Tkip);
            }

            if cell.contains("PSK") {
                authentication = Some(Authentication::Psk);
            } else if cell.contains("EAP") {
                authentication = Some(Authentication::Eap);
            }
        }

        let protocol = self
            .protocol_re
            .captures(cell)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string());

        let record = NetworkRecord {
            bssid,
            ssid,
            channel,
            frequency,
            signal_level,
            quality,
            encryption,
            cipher,
            authentication,
            mode: DEFAULT_MODE.to_string(),
            protocol,
        };

        if !record.signal_in_expected_range() {
            tracing::warn!(
                bssid = %record.bssid,
                signal_level = record.signal_level,
                "Unusual signal level"
            );
        }

        Some(record)
    }
}

impl Default for IwlistParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::SAMPLE_CAPTURE;

    fn parse(raw: &str) -> ScanSnapshot {
        IwlistParser::new().parse(raw, "wlan0")
    }

    #[test]
    fn parses_sample_capture() {
        let snap = parse(SAMPLE_CAPTURE);
        assert_eq!(snap.total_networks, 2);
        assert_eq!(snap.interface, "wlan0");

        let wpa2 = &snap.networks[0];
        assert_eq!(wpa2.bssid.as_str(), "00:11:22:33:44:55");
        assert_eq!(wpa2.ssid, "TestNetwork1");
        assert_eq!(wpa2.channel, 6);
        assert_eq!(wpa2.frequency, 2.437);
        assert_eq!(wpa2.signal_level, -30);
        assert_eq!(wpa2.quality, "70/70");
        assert_eq!(wpa2.encryption, Encryption::Wpa2);
        assert_eq!(wpa2.cipher, Some(Cipher::Ccmp));
        assert_eq!(wpa2.authentication, Some(Authentication::Psk));
        assert_eq!(wpa2.protocol, "IEEE 802.11bgn");
        assert_eq!(wpa2.mode, "Master");

        let open = &snap.networks[1];
        assert_eq!(open.bssid.as_str(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(open.ssid, "OpenNetwork");
        assert_eq!(open.channel, 11);
        assert_eq!(open.encryption, Encryption::Open);
        assert!(open.cipher.is_none());
        assert!(open.authentication.is_none());
    }

    #[test]
    fn no_cell_markers_yields_empty_snapshot() {
        let snap = parse("iwlist: interface doesn't support scanning\n");
        assert!(snap.networks.is_empty());
        assert_eq!(snap.total_networks, 0);

        let snap = parse("");
        assert!(snap.networks.is_empty());
    }

    #[test]
    fn cell_without_address_is_skipped() {
        let raw = "\
Cell 01 - Address: garbage here
                    ESSID:\"Broken\"
Cell 02 - Address: 00:11:22:33:44:55
                    ESSID:\"Survivor\"
                    Quality=40/70  Signal level=-55 dBm
";
        let snap = parse(raw);
        assert_eq!(snap.total_networks, 1);
        assert_eq!(snap.networks[0].ssid, "Survivor");
    }

    #[test]
    fn cell_with_malformed_address_is_skipped() {
        // 17 chars of hex and colons, but not grouped as a MAC.
        let raw = "\
Cell 01 - Address: 001:122:334:455:6
                    ESSID:\"BadMac\"
Cell 02 - Address: aa:bb:cc:dd:ee:ff
                    ESSID:\"GoodMac\"
";
        let snap = parse(raw);
        assert_eq!(snap.total_networks, 1);
        assert_eq!(snap.networks[0].bssid.as_str(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let raw = "Cell 01 - Address: 00:11:22:33:44:55\n";
        let snap = parse(raw);
        assert_eq!(snap.total_networks, 1);

        let net = &snap.networks[0];
        assert_eq!(net.ssid, "Hidden");
        assert_eq!(net.channel, 0);
        assert_eq!(net.frequency, 0.0);
        assert_eq!(net.signal_level, -100);
        assert_eq!(net.quality, "0/70");
        assert_eq!(net.encryption, Encryption::Open);
        assert!(net.cipher.is_none());
        assert!(net.authentication.is_none());
        assert_eq!(net.protocol, "IEEE 802.11");
    }

    #[test]
    fn empty_essid_becomes_hidden() {
        let raw = "Cell 01 - Address: 00:11:22:33:44:55\n    ESSID:\"\"\n";
        let snap = parse(raw);
        assert_eq!(snap.networks[0].ssid, "Hidden");
    }

    #[test]
    fn encryption_off_means_open_even_with_family_markers() {
        let raw = "\
Cell 01 - Address: 00:11:22:33:44:55
                    ESSID:\"Tricky\"
                    Encryption key:off
                    IE: WPA2 something CCMP PSK
";
        let snap = parse(raw);
        let net = &snap.networks[0];
        assert_eq!(net.encryption, Encryption::Open);
        assert!(net.cipher.is_none());
        assert!(net.authentication.is_none());
    }

    #[test]
    fn encryption_on_without_family_marker_stays_open() {
        let raw = "\
Cell 01 - Address: 00:11:22:33:44:55
                    Encryption key:on
";
        let snap = parse(raw);
        assert_eq!(snap.networks[0].encryption, Encryption::Open);
    }

    #[test]
    fn wpa2_marker_wins_over_wpa() {
        let raw = "\
Cell 01 - Address: 00:11:22:33:44:55
                    Encryption key:on
                    IE: IEEE 802.11i/WPA2 Version 1
                    IE: WPA Version 1
";
        let snap = parse(raw);
        assert_eq!(snap.networks[0].encryption, Encryption::Wpa2);
    }

    #[test]
    fn rsn_ie_marker_alone_resolves_wpa2() {
        let raw = "\
Cell 01 - Address: 00:11:22:33:44:55
                    Encryption key:on
                    Extra:rsn_ie=30140100000fac040100000fac040100000fac020000
";
        let snap = parse(raw);
        assert_eq!(snap.networks[0].encryption, Encryption::Wpa2);
    }

    #[test]
    fn wpa3_text_resolves_through_wpa_arm() {
        let raw = "\
Cell 01 - Address: 00:11:22:33:44:55
                    Encryption key:on
                    IE: WPA3 SAE
";
        let snap = parse(raw);
        assert_eq!(snap.networks[0].encryption, Encryption::Wpa);
    }

    #[test]
    fn wep_detection() {
        let raw = "\
Cell 01 - Address: 00:11:22:33:44:55
                    Encryption key:on
                    IE: Unknown WEP
";
        let snap = parse(raw);
        assert_eq!(snap.networks[0].encryption, Encryption::Wep);
    }

    #[test]
    fn cipher_prefers_ccmp_then_tkip() {
        let raw = "\
Cell 01 - Address: 00:11:22:33:44:55
                    Encryption key:on
                    Group Cipher : TKIP
                    Pairwise Ciphers (2) : CCMP TKIP
";
        let snap = parse(raw);
        assert_eq!(snap.networks[0].cipher, Some(Cipher::Ccmp));

        let raw = "\
Cell 01 - Address: 00:11:22:33:44:55
                    Encryption key:on
                    Group Cipher : TKIP
";
        let snap = parse(raw);
        assert_eq!(snap.networks[0].cipher, Some(Cipher::Tkip));
    }

    #[test]
    fn eap_authentication() {
        let raw = "\
Cell 01 - Address: 00:11:22:33:44:55
                    Encryption key:on
                    Authentication Suites (1) : 802.1x EAP
";
        let snap = parse(raw);
        assert_eq!(snap.networks[0].authentication, Some(Authentication::Eap));
    }

    #[test]
    fn out_of_range_signal_is_accepted() {
        let raw = "\
Cell 01 - Address: 00:11:22:33:44:55
                    Quality=70/70  Signal level=12 dBm
";
        let snap = parse(raw);
        assert_eq!(snap.total_networks, 1);
        assert_eq!(snap.networks[0].signal_level, 12);
    }

    #[test]
    fn bssid_is_normalized_on_ingestion() {
        let raw = "Cell 01 - Address: aa:bb:cc:dd:ee:01\n";
        let snap = parse(raw);
        assert_eq!(snap.networks[0].bssid.as_str(), "AA:BB:CC:DD:EE:01");
    }

    #[test]
    fn records_keep_discovery_order() {
        let raw = "\
Cell 01 - Address: 00:00:00:00:00:03
Cell 02 - Address: 00:00:00:00:00:01
Cell 03 - Address: 00:00:00:00:00:02
";
        let snap = parse(raw);
        let order: Vec<&str> = snap.networks.iter().map(|n| n.bssid.as_str()).collect();
        assert_eq!(
            order,
            vec!["00:00:00:00:00:03", "00:00:00:00:00:01", "00:00:00:00:00:02"]
        );
    }
}
