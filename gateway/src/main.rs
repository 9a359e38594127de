use anyhow::Context;
use bridge::GatewayState;
use clap::Parser;
use log::{info, warn};
use service::LlmClient;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::GatewayConfig;
use workflow::runner::Runner;

mod bridge;
mod generator;
mod service;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "NavMap AIS relay and assistant gateway")]
struct Args {
    /// Load the gateway config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the bind address from the config
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Run the synthetic zone-tracking scenario and append a report
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Serve the relay and assistant routes until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = args.config {
        GatewayConfig::load(path)?
    } else {
        GatewayConfig::default()
    };
    config.apply_env();
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    if args.offline {
        let result = Runner::new(&config)
            .execute()
            .context("running offline zone scenario")?;

        println!(
            "Offline run -> ticks {}, zone entries {}, ships in zone at end {}",
            result.ticks,
            result.entries.len(),
            result.final_members
        );
        for alert in &result.recent_alerts {
            println!("  {}", alert.describe());
        }

        let report = format!(
            "ticks={} entries={} final_members={} recent={:?}\n",
            result.ticks,
            result.entries.len(),
            result.final_members,
            result
                .recent_alerts
                .iter()
                .map(|alert| alert.mmsi)
                .collect::<Vec<_>>()
        );
        let report_path = PathBuf::from("tools/data/offline_zone.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening {}", report_path.display()))?;
        file.write_all(report.as_bytes())
            .context("writing offline report")?;
    }

    if args.serve {
        serve(config)?;
    }

    Ok(())
}

fn serve(config: GatewayConfig) -> anyhow::Result<()> {
    if config.relay.api_key.is_none() {
        warn!("AIS relay key missing; /ais-stream will answer 500");
    }
    let backend = Arc::new(LlmClient::new(config.llm.clone())?);
    let state = Arc::new(GatewayState::new(config.relay.clone(), backend));
    let routes = bridge::routes(state);

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating gateway runtime")?;
    runtime.block_on(async move {
        let (addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(config.bind, async {
                let _ = signal::ctrl_c().await;
            })
            .with_context(|| format!("binding {}", config.bind))?;
        info!("gateway listening on {} (Ctrl+C to stop)", addr);
        server.await;
        info!("gateway stopped");
        Ok::<(), anyhow::Error>(())
    })
}
