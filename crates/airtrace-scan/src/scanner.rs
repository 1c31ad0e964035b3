//! Scan acquisition.
//!
//! Live scans shell out to `iwlist` via `tokio::process::Command` under
//! a bounded timeout. Sandbox mode replays a capture from disk, and
//! dry-run mode substitutes a built-in sample, so every downstream
//! stage can run without a wireless interface.

use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::config::AirtraceConfig;
use crate::error::{Result, ScanError};

/// Timeout for interface-detection probes.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for tool-availability checks.
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Built-in two-cell capture used by dry-run mode and tests.
pub const SAMPLE_CAPTURE: &str = r#"
Cell 01 - Address: 00:11:22:33:44:55
                    ESSID:"TestNetwork1"
                    Protocol:IEEE 802.11bgn
                    Mode:Master
                    Frequency:2.437 GHz (Channel 6)
                    Encryption key:on
                    Bit Rates:54 Mb/s
                    Extra:rsn_ie=30140100000fac040100000fac040100000fac020000
                    IE: IEEE 802.11i/WPA2 Version 1
                        Group Cipher : CCMP
                        Pairwise Ciphers (1) : CCMP
                        Authentication Suites (1) : PSK
                    Quality=70/70  Signal level=-30 dBm
                    Extra:fm=0001

Cell 02 - Address: aa:bb:cc:dd:ee:ff
                    ESSID:"OpenNetwork"
                    Protocol:IEEE 802.11bgn
                    Mode:Master
                    Frequency:2.462 GHz (Channel 11)
                    Encryption key:off
                    Bit Rates:54 Mb/s
                    Quality=50/70  Signal level=-45 dBm
"#;

/// Availability of one external tool.
#[derive(Debug, Clone)]
pub struct ToolCheck {
    pub name: String,
    pub available: bool,
}

/// Wrapper around the system scan tooling.
pub struct WifiScanner {
    iwlist_path: String,
    scan_timeout: Duration,
    dry_run: bool,
}

impl WifiScanner {
    pub fn new(config: &AirtraceConfig, dry_run: bool) -> Self {
        Self {
            iwlist_path: config.iwlist_path.clone(),
            scan_timeout: Duration::from_secs(config.scan_timeout_secs),
            dry_run,
        }
    }

    /// Run `iwlist <interface> scanning` and return its raw output.
    ///
    /// A missing tool, non-zero exit, or timeout is surfaced as an
    /// error; an empty scan is never fabricated.
    pub async fn scan(&self, interface: &str) -> Result<String> {
        if self.dry_run {
            tracing::info!(interface = %interface, "Dry run, returning sample capture");
            return Ok(SAMPLE_CAPTURE.to_string());
        }

        tracing::info!(
            interface = %interface,
            tool = %self.iwlist_path,
            "Starting Wi-Fi scan"
        );

        let invocation = Command::new(&self.iwlist_path)
            .arg(interface)
            .arg("scanning")
            .output();

        let output = timeout(self.scan_timeout, invocation)
            .await
            .map_err(|_| ScanError::Timeout {
                secs: self.scan_timeout.as_secs(),
            })?
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ScanError::ToolNotFound {
                    path: self.iwlist_path.clone(),
                },
                _ => ScanError::Io(e),
            })?;

        if !output.status.success() {
            return Err(ScanError::ScanFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        tracing::info!(interface = %interface, "Scan complete");
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Read a captured scan from disk (sandbox/offline mode). The
    /// parser treats the result exactly like live output.
    pub fn scan_from_file(path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(ScanError::SampleNotFound {
                path: path.to_path_buf(),
            });
        }
        tracing::info!(path = %path.display(), "Loading scan capture from file");
        Ok(std::fs::read_to_string(path)?)
    }

    /// Auto-detect a wireless interface, probing `nmcli`, then
    /// `iwconfig`, then `ip link`, each under its own timeout.
    pub async fn detect_interface(&self) -> Result<String> {
        if self.dry_run {
            return Ok("wlan0".to_string());
        }

        if let Some(stdout) = probe("nmcli", &["device", "status"]).await {
            if let Some(iface) = interface_from_nmcli(&stdout) {
                tracing::info!(interface = %iface, "Detected interface via nmcli");
                return Ok(iface);
            }
        }

        if let Some(stdout) = probe("iwconfig", &[]).await {
            if let Some(iface) = interface_from_iwconfig(&stdout) {
                tracing::info!(interface = %iface, "Detected interface via iwconfig");
                return Ok(iface);
            }
        }

        if let Some(stdout) = probe("ip", &["link", "show"]).await {
            if let Some(iface) = interface_from_ip_link(&stdout) {
                tracing::info!(interface = %iface, "Detected interface via ip link");
                return Ok(iface);
            }
        }

        Err(ScanError::NoInterface)
    }

    /// Report which of the external tools are present on this host.
    pub async fn verify_tools(&self) -> Vec<ToolCheck> {
        let mut checks = Vec::new();
        for name in [self.iwlist_path.as_str(), "nmcli", "iwconfig", "ip"] {
            checks.push(ToolCheck {
                name: name.to_string(),
                available: tool_available(name).await,
            });
        }
        checks
    }
}

/// Run a detection probe, swallowing every failure mode into `None`.
async fn probe(program: &str, args: &[&str]) -> Option<String> {
    let invocation = Command::new(program).args(args).output();
    match timeout(PROBE_TIMEOUT, invocation).await {
        Ok(Ok(output)) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).to_string())
        }
        _ => None,
    }
}

async fn tool_available(program: &str) -> bool {
    let invocation = Command::new(program).arg("--version").output();
    matches!(
        timeout(CHECK_TIMEOUT, invocation).await,
        Ok(Ok(output)) if output.status.success()
    )
}

/// Pick the connected wifi device out of `nmcli device status` output.
fn interface_from_nmcli(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find(|line| {
            let lower = line.to_lowercase();
            lower.contains("wifi") && lower.contains("connected")
        })
        .and_then(|line| line.split_whitespace().next())
        .map(String::from)
}

/// Pick the first 802.11 device out of `iwconfig` output.
fn interface_from_iwconfig(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find(|line| line.contains("IEEE 802.11"))
        .and_then(|line| line.split_whitespace().next())
        .map(String::from)
}

/// Pick a wlan-looking device out of `ip link show` output.
fn interface_from_ip_link(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .filter(|line| line.contains("wlan") || line.contains("wifi"))
        .find_map(|line| {
            let mut parts = line.splitn(3, ':');
            let _index = parts.next()?;
            let name = parts.next()?.trim();
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        })
}

/// Loose sanity check on interface names supplied by the caller.
pub fn plausible_interface(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    ["wlan", "wifi", "eth", "en", "wl"]
        .iter()
        .any(|prefix| name.to_lowercase().starts_with(prefix))
}
