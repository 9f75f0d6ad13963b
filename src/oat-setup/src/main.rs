// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

mod config;
mod port_prep;

use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tracing::{info, Level};

use oat_core::{
    HomingDirection, Latitude, Longitude, LongitudeConvention, SiteTime, ValidationError,
};
use oat_mount::{HomingMode, HomingOutcome, Mount, SerialChannel};

use config::{ConfirmationKind, SetupConfig};
use port_prep::HupclDisabler;

const PKG_DESCRIPTION: &str = concat!(
    env!("CARGO_PKG_NAME"),
    " - OpenAstroTracker site configuration and RA homing"
);

#[derive(Debug, Parser)]
#[command(version = env!("CARGO_PKG_VERSION"), about = PKG_DESCRIPTION)]
struct Cli {
    /// Site latitude: decimal degrees (51.4667) or sDD*MM (+51*28),
    /// north positive
    #[arg(allow_hyphen_values = true)]
    latitude: String,
    /// Site longitude: decimal degrees (-0.0167) or sDDD*MM (-000*01),
    /// east positive
    #[arg(allow_hyphen_values = true)]
    longitude: String,
    /// Serial port path
    #[arg(value_name = "PORT")]
    serial_port: Option<String>,
    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Encode longitude for pre-V1.9.x firmware (unsigned 0-360 west)
    #[arg(long)]
    legacy_longitude: bool,
    /// Skip the RA auto-home sequence
    #[arg(long)]
    skip_home: bool,
    /// RA home-search direction
    #[arg(long, value_enum)]
    home_direction: Option<DirectionArg>,
    /// Confirm homing on stdin instead of polling the mount status
    #[arg(long)]
    manual_home: bool,
    /// Seconds between homing status polls
    #[arg(long, value_name = "SECS")]
    poll_interval: Option<u64>,
    /// Maximum status polls before giving up
    #[arg(long, value_name = "N")]
    max_polls: Option<u32>,
    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    Right,
    Left,
}

impl From<DirectionArg> for HomingDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Right => HomingDirection::Right,
            DirectionArg::Left => HomingDirection::Left,
        }
    }
}

/// Settings after merging CLI flags over the config file.
struct ResolvedConfig {
    serial_port: String,
    baud: u32,
    convention: LongitudeConvention,
    auto_home: bool,
    homing_direction: HomingDirection,
    homing_confirmation: ConfirmationKind,
    poll_interval: Duration,
    max_polls: Option<u32>,
}

fn resolve_config(cli: &Cli, cfg: &SetupConfig) -> ResolvedConfig {
    ResolvedConfig {
        serial_port: cli
            .serial_port
            .clone()
            .unwrap_or_else(|| cfg.serial_port.clone()),
        baud: cli.baud.unwrap_or(cfg.baud),
        convention: if cli.legacy_longitude {
            LongitudeConvention::LegacyUnsigned
        } else {
            cfg.longitude_convention
        },
        auto_home: !cli.skip_home && cfg.auto_home,
        homing_direction: cli
            .home_direction
            .map(HomingDirection::from)
            .unwrap_or(cfg.homing_direction),
        homing_confirmation: if cli.manual_home {
            ConfirmationKind::Manual
        } else {
            cfg.homing_confirmation
        },
        poll_interval: Duration::from_secs(cli.poll_interval.unwrap_or(cfg.poll_interval_secs)),
        max_polls: cli.max_polls.or(cfg.max_polls),
    }
}

/// Accept either the wire-style `sDD*MM` text or decimal degrees.
fn parse_latitude(text: &str) -> Result<Latitude, ValidationError> {
    if text.contains('*') {
        text.parse()
    } else {
        let value: f64 = text.parse().map_err(|_| ValidationError::BadFormat {
            what: "latitude",
            input: text.to_string(),
        })?;
        Latitude::from_decimal_degrees(value)
    }
}

fn parse_longitude(text: &str) -> Result<Longitude, ValidationError> {
    if text.contains('*') {
        text.parse()
    } else {
        let value: f64 = text.parse().map_err(|_| ValidationError::BadFormat {
            what: "longitude",
            input: text.to_string(),
        })?;
        Longitude::from_decimal_degrees(value)
    }
}

fn init_logging(log_level: Option<&str>) {
    let level = log_level
        .and_then(|s| s.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .init();
}

/// Wait in manual mode: the operator hits Enter once the mount has
/// physically finished its home search.
fn stdin_confirmation() -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        println!("Press Enter once the mount has finished homing...");
        let mut line = String::new();
        let _ = BufReader::new(tokio::io::stdin()).read_line(&mut line).await;
        let _ = tx.send(());
    });
    rx
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = SetupConfig::load(cli.config.as_deref())?;
    init_logging(cli.log_level.as_deref().or(cfg.log_level.as_deref()));
    let resolved = resolve_config(&cli, &cfg);

    // Validate everything before a single byte goes over the wire.
    let latitude = parse_latitude(&cli.latitude)?;
    let longitude = parse_longitude(&cli.longitude)?;
    // One captured instant feeds UTC offset, local time and date, so
    // the three can never disagree.
    let time = SiteTime::from_instant(&Local::now())?;

    info!(
        "configuring mount on {} at {} baud",
        resolved.serial_port, resolved.baud
    );
    let channel =
        SerialChannel::open_prepared(&resolved.serial_port, resolved.baud, &HupclDisabler)?;
    let mut mount = Mount::new(channel, resolved.convention);

    mount.connect().await?;
    mount.configure_site(&latitude, &longitude, &time).await?;

    if resolved.auto_home {
        let mode = match resolved.homing_confirmation {
            ConfirmationKind::Manual => HomingMode::Manual(stdin_confirmation()),
            ConfirmationKind::Polled => HomingMode::Polled {
                interval: resolved.poll_interval,
                max_polls: resolved.max_polls,
            },
        };
        match mount.run_auto_home(resolved.homing_direction, mode).await? {
            HomingOutcome::Homed => info!("mount homed and site configured"),
            HomingOutcome::NotSupported => info!("site configured; homing unavailable"),
        }
    } else {
        info!("site configured; homing skipped");
    }

    mount.disconnect();
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        // Not tracing: the subscriber may not be up if the config file
        // failed to load.
        eprintln!("oat-setup: {err}");
        std::process::exit(1);
    }
}
