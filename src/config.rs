use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::bmp180::{Bmp180MeasurementKind, Bmp180OversamplingMode, BMP180_DEFAULT_DEVICE_ADDR, DEFAULT_SEA_LEVEL_PRESSURE};
use crate::error::{Bmp180Error, Result};
use crate::i2cio;

pub const DEFAULT_NAME: &str = "I2C Sensor";
pub const DEFAULT_I2C_BUS_NUM: u32 = 1;
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 30;

fn parse_device_addr(value: &str) -> std::result::Result<u16, String> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse::<u16>(),
    };
    match parsed {
        Ok(addr) if addr <= 0x7f => Ok(addr),
        Ok(addr) => Err(format!("address {addr:#x} is not a 7 bit i2c address")),
        Err(err) => Err(format!("invalid address '{value}': {err}")),
    }
}

/// Command line and environment options, a `.env` file is honoured when
/// loaded by the caller before parsing.
#[derive(Parser, Debug)]
#[command(about = "Polls a BMP180 barometric sensor over i2c")]
pub struct Args {
    // -- prefix of the reported sensor names
    #[arg(long, env = "BMP180_NAME", default_value = DEFAULT_NAME)]
    pub name: String,
    // -- 7 bit device address, decimal or 0x prefixed hex
    #[arg(long, env = "BMP180_I2C_ADDRESS", default_value = "0x77", value_parser = parse_device_addr)]
    pub i2c_address: u16,
    // -- bus number N of /dev/i2c-N
    #[arg(long, env = "BMP180_I2C_BUS_NUM", default_value_t = DEFAULT_I2C_BUS_NUM)]
    pub i2c_bus_num: u32,
    // -- oversampling mode 0 to 3
    #[arg(long, env = "BMP180_MODE", default_value_t = 2, allow_negative_numbers = true)]
    pub mode: i64,
    // -- any of temperature, pressure, altitude
    #[arg(long, env = "BMP180_MONITORED_CONDITIONS", value_delimiter = ',', required = true)]
    pub monitored_conditions: Vec<Bmp180MeasurementKind>,
    // -- seconds between two polls
    #[arg(long, env = "BMP180_SCAN_INTERVAL", default_value_t = DEFAULT_SCAN_INTERVAL_SECS)]
    pub scan_interval: u64,
    // -- reference pressure in Pa for the altitude
    #[arg(long, env = "BMP180_SEA_LEVEL_PRESSURE", default_value_t = DEFAULT_SEA_LEVEL_PRESSURE)]
    pub sea_level_pressure: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SensorConfig {
    pub name: String,
    pub device_addr: u16,
    pub bus_num: u32,
    pub mode: Bmp180OversamplingMode,
    pub monitored_conditions: Vec<Bmp180MeasurementKind>,
    pub scan_interval: Duration,
    pub sea_level_pressure: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            name: DEFAULT_NAME.to_string(),
            device_addr: BMP180_DEFAULT_DEVICE_ADDR,
            bus_num: DEFAULT_I2C_BUS_NUM,
            mode: Bmp180OversamplingMode::default(),
            monitored_conditions: vec![
                Bmp180MeasurementKind::Temperature,
                Bmp180MeasurementKind::Pressure,
                Bmp180MeasurementKind::Altitude,
            ],
            scan_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
            sea_level_pressure: DEFAULT_SEA_LEVEL_PRESSURE,
        }
    }
}

impl SensorConfig {
    pub fn bus_path(&self) -> PathBuf {
        i2cio::bus_path(self.bus_num)
    }
}

impl TryFrom<Args> for SensorConfig {
    type Error = Bmp180Error;

    fn try_from(args: Args) -> Result<Self> {
        let mode = Bmp180OversamplingMode::try_from(args.mode)?;
        if args.monitored_conditions.is_empty() {
            return Err(Bmp180Error::Config("no monitored conditions given".to_string()));
        }
        if args.scan_interval == 0 {
            return Err(Bmp180Error::Config("scan interval must be at least one second".to_string()));
        }
        if !(args.sea_level_pressure.is_finite() && args.sea_level_pressure > 0.0) {
            return Err(Bmp180Error::Config(format!("invalid sea level pressure {}", args.sea_level_pressure)));
        }
        // -- one entry per kind, keep the order given
        let mut monitored_conditions = Vec::new();
        for kind in args.monitored_conditions {
            if !monitored_conditions.contains(&kind) {
                monitored_conditions.push(kind);
            }
        }
        Ok(SensorConfig {
            name: args.name,
            device_addr: args.i2c_address,
            bus_num: args.i2c_bus_num,
            mode,
            monitored_conditions,
            scan_interval: Duration::from_secs(args.scan_interval),
            sea_level_pressure: args.sea_level_pressure,
        })
    }
}
