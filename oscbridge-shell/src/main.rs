use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use oscbridge_core::{BridgeConfig, OscBridge, UiChannel};

mod console;

#[derive(Parser, Debug, Clone)]
#[command(name = "oscbridge")]
#[command(author, version, about = "OSC relay console: shows inbound OSC as log lines, sends typed commands to a peer")]
struct Args {
    /// Path to the TOML settings file
    #[arg(long, default_value = "settings.toml")]
    settings: PathBuf,

    /// Override the UI log queue depth
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    log_buffer: Option<usize>,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("oscbridge_core=info".parse().unwrap_or_default())
        .add_directive("oscbridge_shell=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    info!("oscbridge starting. settings={}", args.settings.display());

    if let Err(e) = run_shell(args).await {
        error!("Shell error: {:?}", e);
        return Err(e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run_shell(args: Args) -> anyhow::Result<()> {
    let config = BridgeConfig::load(&args.settings)?;
    let (ui, ui_rx) = UiChannel::new(args.log_buffer);
    let bridge = OscBridge::new(ui.clone());

    bridge.open(&config).await?;
    console::push_settings_banner(&ui, &args.settings, &config);

    console::run(&bridge, ui, ui_rx).await;

    bridge.close().await;
    Ok(())
}
