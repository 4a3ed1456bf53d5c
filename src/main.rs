//! SMS simulator CLI: load config, start the monitor, run the simulation.

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sms_simulator::{
    config::{SenderSettings, SimulationConfig},
    monitor::{self, MonitorState},
    simulation::Simulation,
};

/// SMS sending simulator.
///
/// Generates a batch of random messages, "sends" them through a pool of
/// senders with randomised delays and failures, and serves running
/// statistics over HTTP while doing so.
#[derive(Parser, Debug)]
#[command(name = "sms-simulator", version, about)]
struct Args {
    /// Path to a JSON config file. Flags override values from the file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of messages to generate
    #[arg(short = 'm', long)]
    messages: Option<u64>,

    /// Number of senders. Senders without explicit settings use the
    /// defaults (0.5s mean delay, 0.5 fail rate).
    #[arg(short = 'S', long)]
    num_senders: Option<usize>,

    /// Settings for one sender as `mean_delay,fail_rate`. Repeatable.
    #[arg(short = 's', long = "sender", value_parser = parse_sender_settings)]
    sender: Vec<SenderSettings>,

    /// Poll interval advertised to monitor frontends, in seconds
    #[arg(short = 'u', long)]
    update_interval: Option<f64>,

    /// Address for the built-in monitor to listen on
    #[arg(long, default_value = "127.0.0.1:8000")]
    listen: SocketAddr,

    /// Also report every outcome to an external monitor at this URL
    #[arg(long)]
    monitor_url: Option<String>,
}

fn parse_sender_settings(raw: &str) -> Result<SenderSettings, String> {
    let (mean_delay, fail_rate) = raw
        .split_once(',')
        .ok_or_else(|| "expected mean_delay,fail_rate".to_owned())?;

    Ok(SenderSettings {
        mean_delay: mean_delay
            .trim()
            .parse()
            .map_err(|e| format!("bad mean_delay: {e}"))?,
        fail_rate: fail_rate
            .trim()
            .parse()
            .map_err(|e| format!("bad fail_rate: {e}"))?,
    })
}

fn build_config(args: &Args) -> sms_simulator::Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => {
            info!("no config file provided, using default settings");
            SimulationConfig::default()
        }
    };

    if let Some(messages) = args.messages {
        config.num_messages = messages;
    }
    if let Some(num_senders) = args.num_senders {
        config.num_senders = num_senders;
    }
    if !args.sender.is_empty() {
        config.sender_settings = args.sender.clone();
    }
    if let Some(interval) = args.update_interval {
        config.monitor_update_interval = interval;
    }
    if let Some(url) = &args.monitor_url {
        config.monitor_url = Some(url.clone());
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> sms_simulator::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let simulation = Simulation::new(config)?;

    let monitor = monitor::spawn(
        args.listen,
        MonitorState {
            stats: simulation.stats(),
            update_interval: simulation.config().monitor_update_interval,
        },
    )
    .await?;

    info!(addr = %monitor.local_addr(), "statistics available over HTTP");

    let snapshot = simulation.run().await?;

    info!(
        total = snapshot.total_messages,
        success = snapshot.success_messages,
        average_delay = snapshot.average_delay,
        "simulation complete"
    );

    info!("monitor stays up for browsing; press Ctrl-C to exit");
    let _ = tokio::signal::ctrl_c().await;
    monitor.abort();

    Ok(())
}
