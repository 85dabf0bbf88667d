#[allow(unused_imports)]
use log::{debug, info};

use crate::error::Result;
use crate::i2cio::{self, RegisterBus};

// -- calibration registers, two bytes each, msb first
const BMP180_REG_CAL_AC1: u8 = 0xaa;
const BMP180_REG_CAL_AC2: u8 = 0xac;
const BMP180_REG_CAL_AC3: u8 = 0xae;
const BMP180_REG_CAL_AC4: u8 = 0xb0;
const BMP180_REG_CAL_AC5: u8 = 0xb2;
const BMP180_REG_CAL_AC6: u8 = 0xb4;
const BMP180_REG_CAL_B1: u8 = 0xb6;
const BMP180_REG_CAL_B2: u8 = 0xb8;
const BMP180_REG_CAL_MB: u8 = 0xba;
const BMP180_REG_CAL_MC: u8 = 0xbc;
const BMP180_REG_CAL_MD: u8 = 0xbe;

/// Factory calibration coefficients stored in the sensor's EEPROM.
///
/// Read once per device session and never modified afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibData {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

impl CalibData {
    pub fn read<B: RegisterBus>(bus: &mut B, device_addr: u16) -> Result<CalibData> {
        let calib_data = CalibData {
            ac1: i2cio::read_i16(bus, device_addr, BMP180_REG_CAL_AC1)?,
            ac2: i2cio::read_i16(bus, device_addr, BMP180_REG_CAL_AC2)?,
            ac3: i2cio::read_i16(bus, device_addr, BMP180_REG_CAL_AC3)?,
            ac4: i2cio::read_u16(bus, device_addr, BMP180_REG_CAL_AC4)?,
            ac5: i2cio::read_u16(bus, device_addr, BMP180_REG_CAL_AC5)?,
            ac6: i2cio::read_u16(bus, device_addr, BMP180_REG_CAL_AC6)?,
            b1: i2cio::read_i16(bus, device_addr, BMP180_REG_CAL_B1)?,
            b2: i2cio::read_i16(bus, device_addr, BMP180_REG_CAL_B2)?,
            mb: i2cio::read_i16(bus, device_addr, BMP180_REG_CAL_MB)?,
            mc: i2cio::read_i16(bus, device_addr, BMP180_REG_CAL_MC)?,
            md: i2cio::read_i16(bus, device_addr, BMP180_REG_CAL_MD)?,
        };
        debug!("Got calibration data: {calib_data:#?}");
        Ok(calib_data)
    }
}
