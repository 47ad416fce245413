//! # Blackbox Logger
//!
//! Records a simulated flight to a blackbox log.
//!
//! The control loop runs at the configured looptime, feeding the recorder one
//! sample per iteration, exactly as a flight controller would.

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use blackbox_logger::blackbox::{Blackbox, BlackboxState, SessionStats};
use blackbox_logger::config::{Config, DeviceKind, LoggingConfig};
use blackbox_logger::device::{FileDevice, LogDevice, MemoryDevice, SerialDevice};
use blackbox_logger::flight::SimulatedFlight;

/// Configuration used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Upper bound on waiting for the log to close after stopping
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Main entry point for Blackbox Logger
///
/// # Control Flow
///
/// 1. Load configuration (first argument, else `config/default.toml`, else defaults)
/// 2. Set up logging with tracing subscriber
/// 3. Open the configured log device and start the recorder
/// 4. Tick the simulated flight and the recorder every looptime
/// 5. On Ctrl+C or after `duration_s`, finish the log and print statistics
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(std::env::args().nth(1))?;
    let _log_guard = init_logging(&config.logging);

    info!("Blackbox Logger v{} starting...", env!("CARGO_PKG_VERSION"));

    let stats = match config.blackbox.device {
        DeviceKind::Memory => run(MemoryDevice::new(config.device.memory_buffer), &config).await?,
        DeviceKind::File => {
            let mut device = FileDevice::new(&config.device.log_dir);
            if let Some(limit) = config.device.max_file_bytes {
                device = device.with_max_bytes(limit);
            }
            run(device, &config).await?
        }
        DeviceKind::Serial => {
            let device = SerialDevice::new(
                &config.device.serial_paths,
                config.device.baud_rate,
                config.craft.looptime_us,
            );
            run(device, &config).await?
        }
    };

    println!("{}", serde_json::to_string(&stats)?);
    Ok(())
}

fn load_config(arg: Option<String>) -> Result<Config> {
    match arg {
        Some(path) => Config::load(&path).with_context(|| format!("Failed to load {}", path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Config::load(DEFAULT_CONFIG_PATH).with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_PATH))
        }
        None => Ok(Config::default()),
    }
}

/// Console logging, plus daily files when a directory is configured.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let console = tracing_subscriber::fmt::layer();

    match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "blackbox-logger.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(console).init();
            None
        }
    }
}

/// Run one logging session to completion.
async fn run<D: LogDevice>(device: D, config: &Config) -> Result<SessionStats> {
    let settings = config.settings()?;
    let mut env = config.craft.clone();
    env.start_datetime = Some(chrono::Local::now().into());

    let looptime = Duration::from_micros(u64::from(env.looptime_us));
    let limit = (config.blackbox.duration_s > 0).then(|| Duration::from_secs(config.blackbox.duration_s));

    let mut flight = SimulatedFlight::new(&env);
    let mut blackbox = Blackbox::new(device, settings, env);
    let clock = Instant::now();
    let now_us = |clock: &Instant| clock.elapsed().as_micros() as u64;

    blackbox.start(&flight);
    if blackbox.state() == BlackboxState::Disabled {
        bail!("Log device unavailable");
    }

    let mut ticker = interval(looptime);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!("Logging at {:?} looptime, press Ctrl+C to stop", looptime);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = now_us(&clock);
                flight.step(now);
                blackbox.update(now, &flight);

                if !blackbox.state().is_active() {
                    warn!("Recorder stopped on its own ({:?})", blackbox.state());
                    break;
                }
                if limit.map_or(false, |limit| clock.elapsed() >= limit) {
                    info!("Duration reached, stopping");
                    break;
                }
            }

            _ = &mut ctrl_c => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    blackbox.finish(&flight);
    let deadline = clock.elapsed() + SHUTDOWN_GRACE;
    while blackbox.state().is_active() && clock.elapsed() < deadline {
        ticker.tick().await;
        let now = now_us(&clock);
        flight.step(now);
        blackbox.update(now, &flight);
    }

    let stats = *blackbox.stats();
    info!("Session statistics: {}", serde_json::to_string(&stats)?);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config(duration_s: u64) -> Config {
        let mut config = Config::default();
        config.blackbox.device = DeviceKind::Memory;
        config.blackbox.duration_s = duration_s;
        config
    }

    #[test]
    fn test_run_memory_session() {
        let config = memory_config(2);
        let stats = tokio_test::block_on(run(MemoryDevice::new(4096), &config)).unwrap();

        assert!(stats.intra_frames > 0);
        assert!(stats.bytes_written > 0);
        // LogEnd
        assert!(stats.events >= 1);

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"intra_frames\""));
    }

    #[test]
    fn test_run_fails_when_device_unavailable() {
        let config = memory_config(1);
        let result = tokio_test::block_on(run(MemoryDevice::new(4096).failing_open(), &config));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        assert!(load_config(Some("/nonexistent/blackbox.toml".to_string())).is_err());
    }
}
