pub mod bmp180;
pub mod cancel;
pub mod config;
pub mod error;
pub mod i2cio;
pub mod poller;

#[cfg(test)]
pub(crate) mod mock_bus;
