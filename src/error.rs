//! Error types for talking to the meter.

use thiserror::Error;
use tokio_modbus::ExceptionCode;

/// Errors from decoding a register block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Register payload is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },
}

/// Errors that end a sampling cycle.
///
/// None of these reach consumers of the shared state; the polling loop logs them and
/// reconnects.
#[derive(Error, Debug)]
pub enum MeterError {
    #[error("Could not resolve meter address {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not connect to meter at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Modbus transport error: {0}")]
    Transport(#[from] tokio_modbus::Error),

    #[error("Modbus exception reading register 0x{register:04X}: {code:?}")]
    Exception { register: u16, code: ExceptionCode },

    #[error("Unexpected response reading register 0x{register:04X}: {response}")]
    UnexpectedResponse { register: u16, response: String },

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Bad payload for register 0x{register:04X}: {source}")]
    Codec {
        register: u16,
        #[source]
        source: CodecError,
    },
}

pub type Result<T> = std::result::Result<T, MeterError>;
