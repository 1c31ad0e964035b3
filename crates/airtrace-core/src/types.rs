//! Core domain types for Wi-Fi scan results.
//!
//! A scan produces one [`ScanSnapshot`] holding an ordered list of
//! [`NetworkRecord`]s, each keyed by its validated [`Bssid`]. Records are
//! immutable values once constructed; validation happens at construction
//! time rather than on use.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// SSID placeholder for access points that do not broadcast a name.
pub const HIDDEN_SSID: &str = "Hidden";

/// Quality fraction reported when the scan output carries none.
pub const DEFAULT_QUALITY: &str = "0/70";

/// Signal level assumed when the scan output carries none.
pub const DEFAULT_SIGNAL_LEVEL: i32 = -100;

/// AP role reported by the scan tool for infrastructure networks.
pub const DEFAULT_MODE: &str = "Master";

/// Protocol string assumed when the scan output carries no variant.
pub const DEFAULT_PROTOCOL: &str = "IEEE 802.11";

// ── BSSID ─────────────────────────────────────────────────────────

static MAC_RE: OnceLock<Regex> = OnceLock::new();

fn mac_re() -> &'static Regex {
    MAC_RE.get_or_init(|| {
        Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").expect("hardcoded pattern")
    })
}

/// Hardware (MAC) address uniquely identifying one access point.
///
/// Held in canonical form: uppercase, colon-separated hex
/// (`AA:BB:CC:DD:EE:FF`). Construction normalizes case and `-`
/// separators and rejects anything that is not MAC syntax, so a value
/// of this type is always a valid inventory key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Bssid(String);

impl Bssid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Bssid {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !mac_re().is_match(s) {
            return Err(CoreError::InvalidMac(s.to_string()));
        }
        Ok(Self(s.to_uppercase().replace('-', ":")))
    }
}

impl TryFrom<String> for Bssid {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Bssid> for String {
    fn from(bssid: Bssid) -> Self {
        bssid.0
    }
}

impl fmt::Display for Bssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Security enums ────────────────────────────────────────────────

/// Encryption family advertised by an access point.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Encryption {
    #[default]
    #[serde(rename = "Open")]
    Open,
    Wep,
    Wpa,
    Wpa2,
    Wpa3,
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "Open",
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
            Self::Wpa2 => "WPA2",
            Self::Wpa3 => "WPA3",
        };
        write!(f, "{s}")
    }
}

/// Pairwise cipher suite, when the scan output exposes one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cipher {
    Ccmp,
    Tkip,
}

impl fmt::Display for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ccmp => "CCMP",
            Self::Tkip => "TKIP",
        };
        write!(f, "{s}")
    }
}

/// Authentication suite, when the scan output exposes one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Authentication {
    Psk,
    Eap,
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Psk => "PSK",
            Self::Eap => "EAP",
        };
        write!(f, "{s}")
    }
}

// ── Network record ────────────────────────────────────────────────

/// One observed access point at scan time.
///
/// The natural key is `bssid`. Signal levels outside the expected
/// -100..=0 dBm range are accepted but flagged by callers via
/// [`NetworkRecord::signal_in_expected_range`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkRecord {
    pub bssid: Bssid,
    pub ssid: String,
    pub channel: u32,
    pub frequency: f64,
    pub signal_level: i32,
    pub quality: String,
    #[serde(default)]
    pub encryption: Encryption,
    #[serde(default)]
    pub cipher: Option<Cipher>,
    #[serde(default)]
    pub authentication: Option<Authentication>,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_mode() -> String {
    DEFAULT_MODE.to_string()
}

fn default_protocol() -> String {
    DEFAULT_PROTOCOL.to_string()
}

impl NetworkRecord {
    /// Whether the signal level falls inside the plausible dBm range.
    pub fn signal_in_expected_range(&self) -> bool {
        (-100..=0).contains(&self.signal_level)
    }
}

// ── Scan snapshot ─────────────────────────────────────────────────

/// One full scan event: the complete set of networks observed during a
/// single invocation of the scan tool (or one replayed capture).
///
/// `total_networks` always mirrors `networks.len()`; it is set by the
/// constructor and recomputed when snapshots are loaded back from the
/// inventory, never tracked independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanSnapshot {
    pub timestamp: DateTime<Utc>,
    pub interface: String,
    pub networks: Vec<NetworkRecord>,
    pub total_networks: usize,
    #[serde(default)]
    pub scan_duration: Option<f64>,
}

impl ScanSnapshot {
    pub fn new(
        interface: impl Into<String>,
        networks: Vec<NetworkRecord>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let total_networks = networks.len();
        Self {
            timestamp,
            interface: interface.into(),
            networks,
            total_networks,
            scan_duration: None,
        }
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.scan_duration = Some(secs);
        self
    }
}
