pub mod codec;
pub mod command;
pub mod conv;
pub mod response;

#[cfg(test)]
pub mod fake;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtoError {
    #[error("I/O error: {:?}", _0)]
    Io(#[from] std::io::Error),

    #[error("Serial I/O error: {:?}", _0)]
    Serial(#[from] tokio_serial::Error),

    #[error("Unknown {field} code: {code:?}")]
    UnknownCode { field: &'static str, code: String },
    #[error("Malformed instrument data: {}", _0)]
    Malformed(String),
    #[error("Invalid choice {value:?} for {property}")]
    InvalidChoice {
        property: &'static str,
        value: String,
    },

    #[error("Device did not respond in time")]
    Timeout,
    #[error("Connection was closed")]
    Abort,
}

pub type Result<T> = std::result::Result<T, ProtoError>;
