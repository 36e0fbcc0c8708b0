//! Runtime configuration and the fixed constants of the collector.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Smoothing factor applied to each new power sample.
pub const WATTS_ALPHA: f32 = 0.15;
/// Pause after every completed sampling cycle.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);
/// Pause between a failed session and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(1);
/// Upper bound on a TCP connect or a single register read.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Holding registers, each a big-endian f32 spanning two registers
pub const POWER_REGISTER: u16 = 0x0383;
pub const VOLTAGE_REGISTER: u16 = 0x03ED;
pub const FREQUENCY_REGISTER: u16 = 0x0401;

pub const DEFAULT_DEVICE_ADDRESS: &str = "192.168.49.5:502";
pub const DEFAULT_UNIT_ID: u8 = 0;
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8081";
pub const DEFAULT_PAGE: &str = "powermon.html";

/// Command line arguments.
#[derive(Parser, Debug, Clone)]
#[command(about = "Polls a Modbus power meter and serves smoothed readings")]
pub struct Args {
    /// Print every reading to the console instead of serving HTTP.
    #[arg(short, long)]
    pub interactive: bool,

    /// Meter address as host:port.
    #[arg(long, default_value = DEFAULT_DEVICE_ADDRESS)]
    pub device: String,

    /// Modbus unit id of the meter.
    #[arg(long, default_value_t = DEFAULT_UNIT_ID)]
    pub unit_id: u8,

    /// Address the HTTP server listens on.
    #[arg(long, default_value = DEFAULT_LISTEN_ADDRESS)]
    pub listen: String,

    /// Page served at `/`.
    #[arg(long, default_value = DEFAULT_PAGE)]
    pub page: PathBuf,
}

impl Args {
    pub fn device_config(&self) -> DeviceConfig {
        DeviceConfig {
            address: self.device.clone(),
            unit_id: self.unit_id,
        }
    }
}

/// Where to find the meter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// `host:port`, resolved again on every reconnect.
    pub address: String,
    pub unit_id: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_DEVICE_ADDRESS.to_string(),
            unit_id: DEFAULT_UNIT_ID,
        }
    }
}

/// Timing of the polling loop. The defaults are the fixed production values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    pub interval: Duration,
    pub reconnect_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            reconnect_delay: RECONNECT_DELAY,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}
