//! Power meter telemetry collector
//!
//! Polls a Modbus TCP power meter for power, voltage and frequency, smooths the power
//! with an exponential moving average and publishes the latest values for concurrent
//! readers such as the HTTP endpoint or the console printer.

pub mod config;
pub mod console;
pub mod error;
pub mod http_api;
pub mod meter_session;
pub mod polling_loop;
pub mod register_codec;
pub mod shared_state;
pub mod smoother;

// Re-export commonly used types for easier access
pub use config::{Args, DeviceConfig, PollTiming};
pub use console::ConsolePrinter;
pub use error::{CodecError, MeterError};
pub use meter_session::{MeterSession, Reading};
pub use polling_loop::{Phase, PollingHandle, PollingLoop, ReadingSink};
pub use shared_state::SharedStateStore;
pub use smoother::{SmoothedState, Smoother};
