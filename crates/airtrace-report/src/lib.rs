//! airtrace-report: render scan snapshots as JSON, Markdown, or CSV.
//!
//! Rendering is pure in-memory computation; callers decide whether the
//! text goes to a terminal, a file, or elsewhere.

use airtrace_core::types::ScanSnapshot;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    CsvBuffer(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
    Csv,
    /// All three formats at once.
    All,
}

/// One rendered report plus the file extension it conventionally
/// carries.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub extension: &'static str,
    pub text: String,
}

/// Render a snapshot in the requested format. `All` yields one entry
/// per concrete format, in json/markdown/csv order.
pub fn render(snapshot: &ScanSnapshot, format: ReportFormat) -> Result<Vec<RenderedReport>> {
    match format {
        ReportFormat::Json => Ok(vec![RenderedReport {
            extension: "json",
            text: render_json(snapshot)?,
        }]),
        ReportFormat::Markdown => Ok(vec![RenderedReport {
            extension: "md",
            text: render_markdown(snapshot),
        }]),
        ReportFormat::Csv => Ok(vec![RenderedReport {
            extension: "csv",
            text: render_csv(snapshot)?,
        }]),
        ReportFormat::All => Ok(vec![
            RenderedReport {
                extension: "json",
                text: render_json(snapshot)?,
            },
            RenderedReport {
                extension: "md",
                text: render_markdown(snapshot),
            },
            RenderedReport {
                extension: "csv",
                text: render_csv(snapshot)?,
            },
        ]),
    }
}

/// Full structured serialization of the snapshot, struct-order keys.
pub fn render_json(snapshot: &ScanSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Human-readable document: title, summary line, one table row per
/// network.
pub fn render_markdown(snapshot: &ScanSnapshot) -> String {
    let mut out = String::new();

    out.push_str("# Wi-Fi Scan Report\n\n");
    out.push_str(&format!(
        "{} networks observed on `{}` at {}\n\n",
        snapshot.total_networks,
        snapshot.interface,
        snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    ));

    out.push_str("| SSID | BSSID | Channel | Signal | Encryption |\n");
    out.push_str("|------|-------|---------|--------|------------|\n");
    for net in &snapshot.networks {
        out.push_str(&format!(
            "| {} | {} | {} | {} dBm ({}) | {} |\n",
            net.ssid,
            net.bssid,
            net.channel,
            net.signal_level,
            signal_grade(net.signal_level),
            net.encryption,
        ));
    }

    out
}

/// One header row naming every record field, one data row per network,
/// quoting per standard CSV rules.
pub fn render_csv(snapshot: &ScanSnapshot) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "bssid",
        "ssid",
        "channel",
        "frequency",
        "signal_level",
        "quality",
        "encryption",
        "cipher",
        "authentication",
        "mode",
        "protocol",
    ])?;

    for net in &snapshot.networks {
        writer.write_record([
            net.bssid.to_string(),
            net.ssid.clone(),
            net.channel.to_string(),
            net.frequency.to_string(),
            net.signal_level.to_string(),
            net.quality.clone(),
            net.encryption.to_string(),
            net.cipher.map(|c| c.to_string()).unwrap_or_default(),
            net.authentication.map(|a| a.to_string()).unwrap_or_default(),
            net.mode.clone(),
            net.protocol.clone(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::CsvBuffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::CsvBuffer(e.to_string()))
}

/// Coarse human label for a dBm reading.
pub fn signal_grade(signal_level: i32) -> &'static str {
    if signal_level >= -30 {
        "Excellent"
    } else if signal_level >= -50 {
        "Good"
    } else if signal_level >= -70 {
        "Fair"
    } else {
        "Poor"
    }
}
