use thiserror::Error;

#[derive(Debug, Error)]
pub enum Bmp180Error {
    // -- bus i/o failure: device absent, NACK, timeout
    #[error("i2c transport error: {0}")]
    Transport(#[from] std::io::Error),
    // -- invalid configuration, fatal at construction
    #[error("invalid configuration: {0}")]
    Config(String),
    // -- corrupt calibration data leading to a zero divisor or a non finite value
    #[error("compensation failed: {0}")]
    Computation(&'static str),
    // -- conversion wait interrupted, the read was abandoned
    #[error("measurement cancelled while waiting for conversion")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Bmp180Error>;
