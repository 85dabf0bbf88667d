use std::fmt;
use std::str::FromStr;

use crate::error::Bmp180Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bmp180OversamplingMode {
    UltraLowPower,
    Standard,
    HighRes,
    UltraHighRes,
}

impl Default for Bmp180OversamplingMode {
    fn default() -> Self {
        Self::HighRes
    }
}

impl Bmp180OversamplingMode {
    const OSS_ULTRA_LOW_POWER: u8 = 0;
    const OSS_STANDARD: u8 = 1;
    const OSS_HIGH_RES: u8 = 2;
    const OSS_ULTRA_HIGH_RES: u8 = 3;

    pub fn value(&self) -> u8 {
        match *self {
            Self::UltraLowPower => Self::OSS_ULTRA_LOW_POWER,
            Self::Standard => Self::OSS_STANDARD,
            Self::HighRes => Self::OSS_HIGH_RES,
            Self::UltraHighRes => Self::OSS_ULTRA_HIGH_RES,
        }
    }

    // -- right shift applied to the 24 bit pressure register value
    pub fn pressure_shift(&self) -> u8 {
        8 - self.value()
    }

    // -- datasheet maximum conversion time, acquisition waits longer than this
    pub fn max_conversion_time_ms(&self) -> f64 {
        match *self {
            Self::UltraLowPower => 4.5,
            Self::Standard => 7.5,
            Self::HighRes => 13.5,
            Self::UltraHighRes => 25.5,
        }
    }
}

impl TryFrom<i64> for Bmp180OversamplingMode {
    type Error = Bmp180Error;

    fn try_from(mode: i64) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(Self::UltraLowPower),
            1 => Ok(Self::Standard),
            2 => Ok(Self::HighRes),
            3 => Ok(Self::UltraHighRes),
            _ => Err(Bmp180Error::Config(format!(
                "Unexpected mode value {mode}, set mode to one of 0 (ultra low power), 1 (standard), 2 (high res) or 3 (ultra high res)"
            ))),
        }
    }
}

impl fmt::Display for Bmp180OversamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::UltraLowPower => write!(f, "UltraLowPower/{}", self.value()),
            Self::Standard => write!(f, "Standard/{}", self.value()),
            Self::HighRes => write!(f, "HighRes/{}", self.value()),
            Self::UltraHighRes => write!(f, "UltraHighRes/{}", self.value()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bmp180MeasurementKind {
    Temperature,
    Pressure,
    Altitude,
}

impl Bmp180MeasurementKind {
    pub fn key(&self) -> &'static str {
        match *self {
            Self::Temperature => "temperature",
            Self::Pressure => "pressure",
            Self::Altitude => "altitude",
        }
    }

    pub fn label(&self) -> &'static str {
        match *self {
            Self::Temperature => "Temperature",
            Self::Pressure => "Pressure",
            Self::Altitude => "Altitude",
        }
    }

    pub fn unit(&self) -> &'static str {
        match *self {
            Self::Temperature => "°C",
            Self::Pressure => "Pa",
            Self::Altitude => "m",
        }
    }

    pub fn icon(&self) -> &'static str {
        match *self {
            Self::Temperature => "mdi:thermometer",
            Self::Pressure => "mdi:gauge",
            Self::Altitude => "mdi:image-filter-hdr",
        }
    }
}

impl FromStr for Bmp180MeasurementKind {
    type Err = Bmp180Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temperature" => Ok(Self::Temperature),
            "pressure" => Ok(Self::Pressure),
            "altitude" => Ok(Self::Altitude),
            other => Err(Bmp180Error::Config(format!(
                "Unknown monitored condition '{other}', expected temperature, pressure or altitude"
            ))),
        }
    }
}

impl fmt::Display for Bmp180MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
