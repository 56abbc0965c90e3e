//! shiftlight - drive an RPM shift-light gauge from simulator UDP telemetry

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shiftlight::{
    Config, Dashboard, Driver, RegistryHandle, SchemaRegistry, TracingRenderer, UdpPacketSource,
};

#[derive(Parser, Debug)]
#[command(name = "shiftlight", version)]
#[command(about = "Decode sim-racing UDP telemetry and drive an RPM LED ring and gear display")]
struct Cli {
    /// Game schema dataset (YAML mapping of game id to field layout)
    #[arg(short, long, default_value = "schemas.yaml")]
    schemas: PathBuf,

    /// Gauge configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the UDP bind address from the configuration
    #[arg(short, long)]
    bind: Option<String>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind_address = bind;
    }

    let dataset = std::fs::read_to_string(&cli.schemas)
        .with_context(|| format!("reading schema dataset {}", cli.schemas.display()))?;
    let registry = SchemaRegistry::from_yaml(&dataset).context("parsing schema dataset")?;
    info!(games = ?registry.ids(), "Schema registry loaded");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    LocalSet::new().block_on(&runtime, run(config, registry))
}

async fn run(config: Config, registry: SchemaRegistry) -> Result<()> {
    let source = UdpPacketSource::bind(config.bind_address.as_str()).await?;
    let renderer = TracingRenderer::new(config.gauge.ring_pixels);
    let dashboard = Dashboard::new(RegistryHandle::new(registry), config.gauge, renderer);

    let handle = Driver::spawn(source, dashboard);
    info!(addr = %config.bind_address, "Listening for telemetry");

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    info!("Shutting down");
    handle.shutdown();
    Ok(())
}
