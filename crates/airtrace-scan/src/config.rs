//! Configuration for the airtrace scanner.

use serde::Deserialize;

/// Top-level airtrace configuration.
///
/// Loaded from `airtrace.toml` `[airtrace]` section or `AIRTRACE__`
/// environment variables; every field has a serde default so a missing
/// config file means defaults, not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct AirtraceConfig {
    /// Path to the iwlist binary (default: "iwlist").
    #[serde(default = "default_iwlist_path")]
    pub iwlist_path: String,

    /// Wireless interface to scan; auto-detected when absent.
    #[serde(default)]
    pub interface: Option<String>,

    /// Upper bound on a single scan invocation, in seconds.
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_secs: u64,

    /// Path of the JSON inventory document.
    #[serde(default = "default_inventory_path")]
    pub inventory_path: String,
}

fn default_iwlist_path() -> String {
    "iwlist".to_string()
}

fn default_scan_timeout() -> u64 {
    30
}

fn default_inventory_path() -> String {
    airtrace_inventory::DEFAULT_INVENTORY_FILE.to_string()
}

impl Default for AirtraceConfig {
    fn default() -> Self {
        Self {
            iwlist_path: default_iwlist_path(),
            interface: None,
            scan_timeout_secs: default_scan_timeout(),
            inventory_path: default_inventory_path(),
        }
    }
}
