use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use vc_research_hub::config::HubSettings;
use vc_research_hub::dashboards::{DashboardCatalog, DashboardSelection, items_for};
use vc_research_hub::research::normalize_response;
use vc_research_hub::server::run_http_server;
use vc_research_hub::studio::run_studio;

const LOG_FILE_PREFIX: &str = "vc_research_hub.log";

#[derive(Debug, Parser)]
#[command(name = "vc_research_hub", about = "VC investment analytics canvas")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Open the native canvas studio.
    Studio,
    /// Serve dashboards and research normalization over HTTP.
    Serve {
        /// Overrides HUB_BIND_ADDR.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the items of one dashboard.
    Dashboard {
        #[arg(long)]
        folder: u32,
        #[arg(long)]
        dashboard: u32,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Normalize an assistant response read from a file, or `-` for stdin.
    Normalize {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = HubSettings::from_env().context("failed to load configuration")?;
    let _log_guard = init_tracing(&settings)?;

    match cli.command {
        Commands::Studio => run_studio(&settings)?,
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind_addr.clone());
            run_http_server(&bind).await?;
        }
        Commands::Dashboard {
            folder,
            dashboard,
            format,
        } => {
            let selection = DashboardSelection::new(folder, dashboard);
            let catalog = DashboardCatalog::default();
            info!(
                %selection,
                name = catalog.dashboard_name(selection).unwrap_or("unknown"),
                "printing dashboard"
            );
            print_output(&items_for(selection), format)?;
        }
        Commands::Normalize { input, format } => {
            let raw = read_input(&input)?;
            let normalized = normalize_response(&raw)
                .with_context(|| format!("failed to normalize `{}`", input.display()))?;
            print_output(&normalized, format)?;
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read assistant response from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read assistant response from `{}`", path.display()))
}

fn print_output<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("failed to render JSON output")?
        }
        OutputFormat::Yaml => serde_yaml::to_string(value).context("failed to render YAML output")?,
    };
    println!("{rendered}");
    Ok(())
}

fn init_tracing(settings: &HubSettings) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vc_research_hub=debug"));
    let console = fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let (file, guard) = match &settings.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_filter = EnvFilter::try_new(&settings.file_log)
                .with_context(|| format!("invalid HUB_FILE_LOG `{}`", settings.file_log))?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;
    Ok(guard)
}
