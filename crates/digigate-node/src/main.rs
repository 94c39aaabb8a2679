use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, Interval};

use digigate_node::engine::{unix_now, write_uplink};
use digigate_node::gateway_init::beacon_period;
use digigate_node::{Engine, NodeConfig, NodeError};

#[derive(Parser)]
#[command(name = "digigate-node", about = "APRS internet-to-RF gateway and digipeater")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/digigate/config.toml")]
    config: PathBuf,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match NodeConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to load config from {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        digigate_node::logging::init_json(&config.logging.level);
    } else {
        digigate_node::logging::init(&config.logging.level);
    }

    let mut engine = match Engine::new(&config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("failed to build gateway: {e}");
            std::process::exit(1);
        }
    };
    if cli.check {
        tracing::info!("configuration ok");
        return;
    }

    if let Err(e) = run(&mut engine, beacon_period(config.station.beacon_interval)).await {
        tracing::error!("gateway stopped: {e}");
        std::process::exit(1);
    }
}

/// Feed APRS-IS lines from stdin until it closes or SIGINT arrives.
async fn run(engine: &mut Engine, beacon_every: Option<Duration>) -> Result<(), NodeError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut beacons = beacon_every.map(|p| tokio::time::interval_at(Instant::now() + p, p));

    tracing::info!(
        mycall = %engine.gateway().identity().mycall,
        interfaces = engine.gateway().registry().len(),
        "gateway started"
    );
    engine.send_beacons();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    let uplink = engine.handle_aprsis_line(&line, unix_now());
                    write_uplink(&mut stdout, &uplink).await?;
                }
                None => {
                    tracing::info!("APRS-IS feed closed");
                    break;
                }
            },
            _ = next_beacon_round(&mut beacons) => {
                engine.send_beacons();
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT, shutting down");
                break;
            }
        }
    }
    Ok(())
}

async fn next_beacon_round(beacons: &mut Option<Interval>) {
    match beacons {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
