pub mod bmp180_calibration;
pub mod bmp180_compensation;
pub mod bmp180_core;
pub mod bmp180_enums;

pub use bmp180_calibration::CalibData;
pub use bmp180_compensation::{compute_altitude, compute_pressure, compute_temperature, raw_pressure, DEFAULT_SEA_LEVEL_PRESSURE};
pub use bmp180_core::{BMP180, BMP180_DEFAULT_DEVICE_ADDR};
pub use bmp180_enums::*;
