use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::lookup_host;
use tokio::time::timeout;
use tokio_modbus::client::{Client, Context};
use tokio_modbus::prelude::*;
use tracing::{debug, info};

use crate::config::{DeviceConfig, FREQUENCY_REGISTER, POWER_REGISTER, VOLTAGE_REGISTER};
use crate::error::{MeterError, Result};
use crate::register_codec::{f32_from_registers, FLOAT_REGISTER_COUNT};

/// One sample of the meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub watts: f32,
    pub volts: f32,
    pub frequency_hz: f32,
}

impl Reading {
    /// Published when the meter cannot be read.
    pub const ZERO: Reading = Reading {
        watts: 0.0,
        volts: 0.0,
        frequency_hz: 0.0,
    };

    pub fn new(watts: f32, volts: f32, frequency_hz: f32) -> Self {
        Self {
            watts,
            volts,
            frequency_hz,
        }
    }
}

/// A single live Modbus TCP connection to the meter.
///
/// Sessions are never reused: once a cycle fails the session is dropped and a new one
/// is opened.
pub struct MeterSession {
    connection: Context,
    peer: SocketAddr,
    request_timeout: Duration,
}

impl MeterSession {
    /// Opens a connection to the meter. Both name resolution and the TCP handshake are
    /// bounded by `request_timeout`.
    pub async fn connect(device: &DeviceConfig, request_timeout: Duration) -> Result<Self> {
        let peer = timeout(request_timeout, resolve(&device.address))
            .await
            .map_err(|_| MeterError::Timeout(request_timeout))??;

        let connection = timeout(
            request_timeout,
            tcp::connect_slave(peer, Slave(device.unit_id)),
        )
        .await
        .map_err(|_| MeterError::Timeout(request_timeout))?
        .map_err(|source| MeterError::Connect {
            address: device.address.clone(),
            source,
        })?;

        info!("Connected to meter at {peer} (unit {})", device.unit_id);
        Ok(Self {
            connection,
            peer,
            request_timeout,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Reads power, voltage and frequency, in that order.
    ///
    /// The first failing read aborts the cycle; no partial reading is returned.
    pub async fn read_cycle(&mut self) -> Result<Reading> {
        let watts = self.read_float(POWER_REGISTER).await?;
        let volts = self.read_float(VOLTAGE_REGISTER).await?;
        let frequency_hz = self.read_float(FREQUENCY_REGISTER).await?;

        let reading = Reading::new(watts, volts, frequency_hz);
        debug!("Read {reading:?} from {}", self.peer);
        Ok(reading)
    }

    async fn read_float(&mut self, register: u16) -> Result<f32> {
        // Raw `call` rather than `Reader`, so a short payload reaches the codec's length
        // check as an error
        let request = Request::ReadHoldingRegisters(register, FLOAT_REGISTER_COUNT);
        let response = timeout(self.request_timeout, self.connection.call(request))
            .await
            .map_err(|_| MeterError::Timeout(self.request_timeout))??
            .map_err(|code| MeterError::Exception { register, code })?;

        let registers = match response {
            Response::ReadHoldingRegisters(registers) => registers,
            other => {
                return Err(MeterError::UnexpectedResponse {
                    register,
                    response: format!("{other:?}"),
                })
            }
        };
        f32_from_registers(&registers).map_err(|source| MeterError::Codec { register, source })
    }
}

async fn resolve(address: &str) -> Result<SocketAddr> {
    let resolve_error = |source| MeterError::Resolve {
        address: address.to_string(),
        source,
    };
    lookup_host(address)
        .await
        .map_err(resolve_error)?
        .next()
        .ok_or_else(|| {
            resolve_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no addresses found",
            ))
        })
}
