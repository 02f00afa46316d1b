use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vendorwatch::{
    config::Config,
    output::{
        format_findings_to_string, print_findings, print_report, print_vendor_table,
        FindingsPage, OutputFormat,
    },
    scan::run_scan_with_progress,
    search::default_provider,
    server::{self, AppState},
    store::Workspace,
};

/// Exit codes
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "vendorwatch")]
#[command(
    author,
    version,
    about = "Track vendors and scan the web for negative news about them"
)]
struct Cli {
    /// Directory holding vendors.csv, bad_news.json and api_usage.json
    #[arg(long, global = true, env = "VENDORWATCH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web interface
    Serve {
        /// Address to listen on (default from config: 127.0.0.1:5000)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Search every vendor now and store the results
    Scan {
        /// Report format (table, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Manage the vendor list
    Vendors {
        #[command(subcommand)]
        action: VendorCommand,
    },

    /// Show the findings of the last scan
    Findings {
        /// Output format (table, json, html)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show the search usage counter
    Usage,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Subcommand)]
enum VendorCommand {
    /// List tracked vendors
    List,
    /// Start tracking a vendor
    Add { name: String },
    /// Stop tracking a vendor
    Remove { name: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn init_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The server logs requests; one-shot commands only report problems so
/// progress bars and stdout output stay readable.
fn default_log_filter(command: &Commands) -> &'static str {
    match command {
        Commands::Serve { .. } => "vendorwatch=info,tower_http=info",
        _ => "vendorwatch=warn",
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();

    init_logging(default_log_filter(&cli.command));

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %format!("{e:#}"), "Ignoring unreadable config file");
        Config::default()
    });
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let workspace = open_workspace(&config)?;
            let provider = default_provider(&config.search)?;
            let state = Arc::new(AppState::new(workspace, Arc::new(provider)));
            server::serve(state, &bind).await?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Scan { format } => {
            let format = parse_format(format.as_deref().unwrap_or("table"))?;
            run_scan_command(&config, format).await
        }
        Commands::Vendors { action } => {
            let workspace = open_workspace(&config)?;
            handle_vendors(&workspace, action)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Findings { format, output } => {
            let format = parse_format(&format.unwrap_or(config.default_format.clone()))?;
            let workspace = open_workspace(&config)?;
            let page = FindingsPage::load(&workspace)?;

            if let Some(path) = output {
                let content = format_findings_to_string(&page, format)?;
                std::fs::write(&path, content)?;
                println!("Findings written to: {}", path);
            } else {
                print_findings(&page, format)?;
            }
            Ok(exit_codes::SUCCESS)
        }
        Commands::Usage => {
            let workspace = open_workspace(&config)?;
            let usage = workspace.usage.load()?;
            println!("{}", usage.usage_count);
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn open_workspace(config: &Config) -> Result<Workspace> {
    let workspace = Workspace::open(config.data_dir());
    workspace.initialize()?;
    Ok(workspace)
}

fn parse_format(s: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(s).map_err(|e| anyhow::anyhow!(e))
}

async fn run_scan_command(config: &Config, format: OutputFormat) -> Result<u8> {
    let workspace = open_workspace(config)?;
    let provider = default_provider(&config.search)?;
    let is_interactive = format == OutputFormat::Table;

    let progress = if is_interactive {
        let total = workspace.vendor_list().list()?.len();
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let report = run_scan_with_progress(&workspace, &provider, |_, vendor, finding| {
        if let Some(ref pb) = progress {
            pb.set_message(format!("{} ({})", vendor, finding.as_str()));
            pb.inc(1);
        }
    })
    .await?;

    if let Some(pb) = progress {
        pb.finish_with_message(format!("Scanned {} vendors", report.vendors_scanned));
    }

    print_report(&report, format)?;
    Ok(exit_codes::SUCCESS)
}

fn handle_vendors(workspace: &Workspace, action: VendorCommand) -> Result<()> {
    let vendors = workspace.vendor_list();

    match action {
        VendorCommand::List => {
            print_vendor_table(&vendors.list()?)?;
        }
        VendorCommand::Add { name } => {
            let name = vendors.add(&name)?;
            println!("Vendor '{}' added.", name);
        }
        VendorCommand::Remove { name } => {
            let name = vendors.remove(&name)?;
            println!("Vendor '{}' removed.", name);
        }
    }

    Ok(())
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'vendorwatch config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
