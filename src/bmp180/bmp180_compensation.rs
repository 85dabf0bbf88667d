//! Datasheet compensation of raw BMP180 readings.
//!
//! The formulas follow the datasheet integer algorithm but carry floating
//! point intermediates, only `B3` is truncated to an integer before shifting.

use crate::error::{Bmp180Error, Result};

use super::bmp180_calibration::CalibData;
use super::bmp180_enums::Bmp180OversamplingMode;

pub const DEFAULT_SEA_LEVEL_PRESSURE: f64 = 101325.0;

const TWO_POW_2: f64 = 4.0;
const TWO_POW_4: f64 = 16.0;
const TWO_POW_8: f64 = 256.0;
const TWO_POW_11: f64 = 2048.0;
const TWO_POW_12: f64 = 4096.0;
const TWO_POW_13: f64 = 8192.0;
const TWO_POW_15: f64 = 32768.0;
const TWO_POW_16: f64 = 65536.0;

// -- B3 is a 32 bit quantity in the integer algorithm
const B3_LIMIT: f64 = 2147483648.0;

const ALTITUDE_FACTOR: f64 = 44330.0;
const ALTITUDE_EXPONENT: f64 = 1.0 / 5.255;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    // -- ties to even, like the reference implementation
    (value * factor).round_ties_even() / factor
}

fn finite(value: f64, what: &'static str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Bmp180Error::Computation(what))
    }
}

/// Assembles the uncompensated pressure `UP` from the msb, lsb and xlsb registers.
pub fn raw_pressure(data: [u8; 3], mode: Bmp180OversamplingMode) -> u32 {
    let [msb, lsb, xlsb] = data;
    (((msb as u32) << 16) + ((lsb as u32) << 8) + xlsb as u32) >> mode.pressure_shift()
}

// -- B5 couples temperature into the pressure compensation
fn compute_b5(temperature_raw: u16, calib: &CalibData) -> Result<f64> {
    let x1 = ((temperature_raw as i64 - calib.ac6 as i64) * calib.ac5 as i64) as f64 / TWO_POW_15;
    let divisor = x1 + calib.md as f64;
    if divisor == 0.0 {
        return Err(Bmp180Error::Computation("temperature divisor X1 + MD is zero"));
    }
    let x2 = (calib.mc as f64 * TWO_POW_11) / divisor;
    finite(x1 + x2, "B5 is not finite")
}

/// Temperature in °C, rounded to one decimal.
pub fn compute_temperature(temperature_raw: u16, calib: &CalibData) -> Result<f64> {
    let b5 = compute_b5(temperature_raw, calib)?;
    let temperature = ((b5 + 8.0) / TWO_POW_4) / 10.0;
    Ok(round_to(temperature, 1))
}

/// Pressure in Pa, rounded to an integer value.
///
/// `temperature_raw` must come from a conversion taken right before the
/// pressure conversion that produced `pressure_data`.
pub fn compute_pressure(temperature_raw: u16, pressure_data: [u8; 3], calib: &CalibData,
    mode: Bmp180OversamplingMode) -> Result<f64> {
    let b5 = compute_b5(temperature_raw, calib)?;
    let up = raw_pressure(pressure_data, mode) as f64;
    let oss = mode.value();

    let b6 = b5 - 4000.0;
    let b6_sq = b6 * b6 / TWO_POW_12;
    let x1 = (calib.b2 as f64 * b6_sq) / TWO_POW_11;
    let x2 = calib.ac2 as f64 * b6 / TWO_POW_11;
    let x3 = x1 + x2;
    // -- truncate before the shift
    let b3_base = calib.ac1 as f64 * 4.0 + x3;
    if !(b3_base.is_finite() && b3_base.abs() < B3_LIMIT) {
        return Err(Bmp180Error::Computation("B3 out of range"));
    }
    let b3_base = b3_base.trunc() as i64;
    let b3 = ((b3_base << oss) + 2) as f64 / 4.0;
    let x1 = calib.ac3 as f64 * b6 / TWO_POW_13;
    let x2 = (calib.b1 as f64 * b6_sq) / TWO_POW_16;
    let x3 = ((x1 + x2) + 2.0) / TWO_POW_2;
    let b4 = calib.ac4 as f64 * (x3 + 32768.0) / TWO_POW_15;
    if b4 == 0.0 {
        return Err(Bmp180Error::Computation("pressure divisor B4 is zero"));
    }
    let b7 = (up - b3) * (50000u32 >> oss) as f64;
    let pressure = if b7 < 2147483648.0 {
        (b7 * 2.0) / b4
    } else {
        (b7 / b4) * 2.0
    };
    let x1 = (pressure / TWO_POW_8).powi(2);
    let x1 = (x1 * 3038.0) / TWO_POW_16;
    let x2 = (-7357.0 * pressure) / TWO_POW_16;
    let pressure = pressure + (x1 + x2 + 3791.0) / TWO_POW_4;
    finite(round_to(pressure, 0), "pressure is not finite")
}

/// Altitude in m above the given sea level pressure, rounded to one decimal.
pub fn compute_altitude(pressure: f64, sea_level_pressure: f64) -> Result<f64> {
    if sea_level_pressure == 0.0 {
        return Err(Bmp180Error::Computation("sea level pressure is zero"));
    }
    let altitude = ALTITUDE_FACTOR * (1.0 - (pressure / sea_level_pressure).powf(ALTITUDE_EXPONENT));
    finite(round_to(altitude, 1), "altitude is not finite")
}
