//! CLI entry point for the airtrace Wi-Fi auditor.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use airtrace_core::types::Bssid;
use airtrace_inventory::store::InventoryStore;
use airtrace_report::{render, ReportFormat};

use airtrace_scan::config::AirtraceConfig;
use airtrace_scan::iwlist::IwlistParser;
use airtrace_scan::scanner::{plausible_interface, WifiScanner};

#[derive(Parser)]
#[command(name = "airtrace")]
#[command(about = "Wi-Fi audit and inventory tool")]
struct Cli {
    /// Config file prefix (default: airtrace).
    #[arg(short, long, default_value = "airtrace")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for Wi-Fi networks and render a report.
    Scan {
        /// Wireless interface to use (auto-detected when omitted).
        #[arg(short, long)]
        interface: Option<String>,

        /// Replay a captured scan from a file instead of scanning live.
        #[arg(long)]
        sandbox: Option<PathBuf>,

        /// Use the built-in sample capture instead of invoking the scan tool.
        #[arg(long)]
        dry_run: bool,

        /// Report format.
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: FormatArg,

        /// Write reports to `<stem>.<ext>` files instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the snapshot to the inventory store.
        #[arg(long)]
        save: bool,
    },

    /// Compare two saved scans by id.
    Diff {
        scan_a: String,
        scan_b: String,

        /// Write the comparison JSON to a file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show inventory statistics, one saved scan, or one network history.
    Inventory {
        /// Show one saved scan by id.
        #[arg(long)]
        scan_id: Option<String>,

        /// Show the accumulated history of one BSSID.
        #[arg(long)]
        bssid: Option<String>,
    },

    /// Check which external scan tools are available.
    Doctor,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Markdown,
    Csv,
    All,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::All => ReportFormat::All,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Scan {
            interface,
            sandbox,
            dry_run,
            format,
            output,
            save,
        } => {
            run_scan(&config, interface, sandbox, dry_run, format.into(), output, save).await
        }
        Commands::Diff {
            scan_a,
            scan_b,
            output,
        } => run_diff(&config, &scan_a, &scan_b, output),
        Commands::Inventory { scan_id, bssid } => run_inventory(&config, scan_id, bssid),
        Commands::Doctor => run_doctor(&config).await,
    }
}

async fn run_scan(
    config: &AirtraceConfig,
    interface: Option<String>,
    sandbox: Option<PathBuf>,
    dry_run: bool,
    format: ReportFormat,
    output: Option<PathBuf>,
    save: bool,
) -> anyhow::Result<()> {
    let scanner = WifiScanner::new(config, dry_run);
    let parser = IwlistParser::new();

    // In sandbox mode the snapshot is labeled with the source file name
    // instead of an interface.
    let (raw, source) = match &sandbox {
        Some(path) => {
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            (WifiScanner::scan_from_file(path)?, label)
        }
        None => {
            let iface = match interface.or_else(|| config.interface.clone()) {
                Some(iface) => iface,
                None => scanner.detect_interface().await?,
            };
            if !plausible_interface(&iface) {
                tracing::warn!(interface = %iface, "Interface name looks unusual");
            }
            (scanner.scan(&iface).await?, iface)
        }
    };

    let snapshot = parser.parse(&raw, &source);
    println!("Found {} networks on {}", snapshot.total_networks, source);

    for report in render(&snapshot, format)? {
        match &output {
            Some(stem) => {
                let path = stem.with_extension(report.extension);
                std::fs::write(&path, &report.text)?;
                println!("Report written: {}", path.display());
            }
            None => println!("{}", report.text),
        }
    }

    if save {
        let mut store = InventoryStore::open(&config.inventory_path);
        let scan_id = store.save_scan(&snapshot)?;
        println!("Scan saved to inventory: {scan_id}");
    }

    Ok(())
}

fn run_diff(
    config: &AirtraceConfig,
    scan_a: &str,
    scan_b: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = InventoryStore::open(&config.inventory_path);
    let comparison = store.compare_scans(scan_a, scan_b)?;

    println!("Comparing {} vs {}", comparison.scan_a, comparison.scan_b);
    println!(
        "  new: {}  disappeared: {}  changed: {}",
        comparison.summary.total_new,
        comparison.summary.total_disappeared,
        comparison.summary.total_changed,
    );

    for bssid in &comparison.new_networks {
        println!("  + {bssid}");
    }
    for bssid in &comparison.disappeared_networks {
        println!("  - {bssid}");
    }
    for changed in &comparison.changed_networks {
        println!("  ~ {}", changed.bssid);
        for change in &changed.changes {
            println!("      {change}");
        }
    }

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_string_pretty(&comparison)?)?;
        println!("Comparison written: {}", path.display());
    }

    Ok(())
}

fn run_inventory(
    config: &AirtraceConfig,
    scan_id: Option<String>,
    bssid: Option<String>,
) -> anyhow::Result<()> {
    let store = InventoryStore::open(&config.inventory_path);

    if let Some(id) = scan_id {
        match store.get_scan(&id) {
            Some(scan) => {
                println!("Scan {}", scan.id);
                println!("  timestamp: {}", scan.timestamp);
                println!("  interface: {}", scan.interface);
                println!("  networks:  {}", scan.total_networks);
            }
            None => println!("Scan not found: {id}"),
        }
        return Ok(());
    }

    if let Some(raw) = bssid {
        let key: Bssid = raw.parse()?;
        match store.network_history(&key) {
            Some(history) => {
                println!("Network {key}");
                println!("  first seen: {}", history.first_seen);
                println!("  last seen:  {}", history.last_seen);
                println!("  scans:      {}", history.total_scans);
                println!("  ssids:      {}", history.ssid_history.join(", "));
            }
            None => println!("Network not found: {key}"),
        }
        return Ok(());
    }

    let stats = store.statistics();
    println!("Inventory: {}", store.path().display());
    println!("  total scans:     {}", stats.total_scans);
    println!("  unique networks: {}", stats.unique_networks);
    match stats.last_scan_date {
        Some(when) => println!("  last scan:       {when}"),
        None => println!("  last scan:       never"),
    }

    for scan in store.all_scans().iter().rev().take(5) {
        println!(
            "  {}: {} ({} networks)",
            scan.id, scan.timestamp, scan.total_networks
        );
    }

    Ok(())
}

async fn run_doctor(config: &AirtraceConfig) -> anyhow::Result<()> {
    let scanner = WifiScanner::new(config, false);
    for check in scanner.verify_tools().await {
        let status = if check.available { "ok" } else { "missing" };
        println!("{:<10} {status}", check.name);
    }
    Ok(())
}

fn load_config(file_prefix: &str) -> anyhow::Result<AirtraceConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("AIRTRACE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.get::<AirtraceConfig>("airtrace") {
        Ok(c) => Ok(c),
        Err(_) => Ok(AirtraceConfig::default()),
    }
}
