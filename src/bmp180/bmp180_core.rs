#[allow(unused_imports)]
use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::error::{Bmp180Error, Result};
use crate::i2cio::{self, RegisterBus};

use super::bmp180_calibration::CalibData;
use super::bmp180_compensation;
use super::bmp180_enums::*;

pub const BMP180_DEFAULT_DEVICE_ADDR: u16 = 0x77;

// -- length of multi-byte registers
const BMP180_LEN_PRESSURE_DATA: usize = 3;

// -- registers
const BMP180_REG_CONTROL: u8 = 0xf4;
const BMP180_REG_DATA: u8 = 0xf6;

// -- commands
const BMP180_CMD_MEASURE_TEMPERATURE: u8 = 0x2e;
const BMP180_CMD_MEASURE_PRESSURE: u8 = 0x34;
const BMP180_CMD_OSS_SHIFT_LEFT: u8 = 6;

// -- flat wait after triggering a conversion, well above the 4.5 to 25.5 ms
// -- the datasheet specifies per mode
const BMP180_CONVERSION_DELAY_MS: u64 = 50;
const BMP180_TEMPERATURE_CONVERSION_TIME_MS: f64 = 4.5;

/// One BMP180 device session.
///
/// Calibration data is read once in the constructor. All register access
/// goes through an internal mutex that is held for a whole trigger, wait and
/// read sequence, so a session can be shared between threads.
pub struct BMP180<B: RegisterBus> {
    // -- i2c bus, locked for every register sequence
    bus: Mutex<B>,
    // -- 7 bit device address
    device_addr: u16,
    // -- pressure oversampling
    mode: Bmp180OversamplingMode,
    // -- calibration data
    calib_data: CalibData,
    // -- interrupts conversion waits
    cancel: CancelToken,
    conversion_delay: Duration,
}

impl<B: RegisterBus> BMP180<B> {

    pub fn new(mut bus: B, device_addr: u16, mode: Bmp180OversamplingMode) -> Result<BMP180<B>> {
        info!("Initializing BMP180 at {device_addr:#04x}, mode {mode}");
        // -- calibration is always re-read, never cached across sessions
        let calib_data = CalibData::read(&mut bus, device_addr)?;
        Ok(BMP180 {
            bus: Mutex::new(bus),
            device_addr,
            mode,
            calib_data,
            cancel: CancelToken::new(),
            conversion_delay: Duration::from_millis(BMP180_CONVERSION_DELAY_MS),
        })
    }

    /// Same as `new`, validating a numeric oversampling mode before touching the bus.
    pub fn with_mode_value(bus: B, device_addr: u16, mode: i64) -> Result<BMP180<B>> {
        let mode = Bmp180OversamplingMode::try_from(mode)?;
        Self::new(bus, device_addr, mode)
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_conversion_delay(mut self, conversion_delay: Duration) -> Self {
        self.conversion_delay = conversion_delay;
        self
    }

    pub fn get_device_addr(&self) -> u16 {
        self.device_addr
    }

    pub fn get_mode(&self) -> Bmp180OversamplingMode {
        self.mode
    }

    pub fn get_calib_data(&self) -> &CalibData {
        &self.calib_data
    }

    fn lock_bus(&self) -> MutexGuard<'_, B> {
        self.bus.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start_conversion(&self, bus: &mut B, command: u8, max_conversion_time_ms: f64) -> Result<()> {
        debug!("Setting register BMP180_REG_CONTROL {BMP180_REG_CONTROL:#x} to value {command:#04x}");
        i2cio::write_byte(bus, self.device_addr, BMP180_REG_CONTROL, command)?;
        debug!("Waiting {:?} for conversion, datasheet maximum {max_conversion_time_ms} ms", self.conversion_delay);
        // -- the conversion runs on regardless, a cancelled wait only abandons the read
        if self.cancel.wait(self.conversion_delay) {
            warn!("Conversion {command:#04x} cancelled, abandoning read");
            return Err(Bmp180Error::Cancelled);
        }
        Ok(())
    }

    fn read_raw_temperature_locked(&self, bus: &mut B) -> Result<u16> {
        self.start_conversion(bus, BMP180_CMD_MEASURE_TEMPERATURE, BMP180_TEMPERATURE_CONVERSION_TIME_MS)?;
        let temperature_raw = i2cio::read_u16(bus, self.device_addr, BMP180_REG_DATA)?;
        debug!("Got raw temperature: {temperature_raw}");
        Ok(temperature_raw)
    }

    fn read_raw_pressure_locked(&self, bus: &mut B) -> Result<[u8; BMP180_LEN_PRESSURE_DATA]> {
        let command = BMP180_CMD_MEASURE_PRESSURE + (self.mode.value() << BMP180_CMD_OSS_SHIFT_LEFT);
        self.start_conversion(bus, command, self.mode.max_conversion_time_ms())?;
        let pressure_data = i2cio::read_bytes(bus, self.device_addr, BMP180_REG_DATA)?;
        debug!("Got raw pressure bytes: {pressure_data:02x?}");
        Ok(pressure_data)
    }

    /// Triggers a temperature conversion and returns the uncompensated value `UT`.
    pub fn read_raw_temperature(&self) -> Result<u16> {
        let mut bus = self.lock_bus();
        self.read_raw_temperature_locked(&mut bus)
    }

    /// Triggers a pressure conversion and returns the msb, lsb and xlsb bytes.
    pub fn read_raw_pressure(&self) -> Result<[u8; BMP180_LEN_PRESSURE_DATA]> {
        let mut bus = self.lock_bus();
        self.read_raw_pressure_locked(&mut bus)
    }

    pub fn get_temperature(&self) -> Result<f64> {
        let temperature_raw = self.read_raw_temperature()?;
        let temperature = bmp180_compensation::compute_temperature(temperature_raw, &self.calib_data)?;
        debug!("Got temperature: {temperature} °C");
        Ok(temperature)
    }

    /// Pressure in Pa. A fresh temperature conversion is taken first under
    /// the same bus lock since pressure compensation depends on it.
    pub fn get_pressure(&self) -> Result<f64> {
        let (temperature_raw, pressure_data) = {
            let mut bus = self.lock_bus();
            let temperature_raw = self.read_raw_temperature_locked(&mut bus)?;
            let pressure_data = self.read_raw_pressure_locked(&mut bus)?;
            (temperature_raw, pressure_data)
        };
        let pressure = bmp180_compensation::compute_pressure(temperature_raw, pressure_data, &self.calib_data, self.mode)?;
        debug!("Got pressure: {pressure} Pa");
        Ok(pressure)
    }

    pub fn get_altitude(&self, sea_level_pressure: f64) -> Result<f64> {
        let pressure = self.get_pressure()?;
        let altitude = bmp180_compensation::compute_altitude(pressure, sea_level_pressure)?;
        debug!("Got altitude: {altitude} m");
        Ok(altitude)
    }

    pub fn measure(&self, kind: Bmp180MeasurementKind, sea_level_pressure: f64) -> Result<f64> {
        match kind {
            Bmp180MeasurementKind::Temperature => self.get_temperature(),
            Bmp180MeasurementKind::Pressure => self.get_pressure(),
            Bmp180MeasurementKind::Altitude => self.get_altitude(sea_level_pressure),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::bmp180::bmp180_calibration::tests::{datasheet_calib, load_datasheet_calib};
    use crate::bmp180::DEFAULT_SEA_LEVEL_PRESSURE;
    use crate::mock_bus::MockBus;
    use std::sync::Arc;
    use std::thread;

    const ADDR: u16 = BMP180_DEFAULT_DEVICE_ADDR;

    // -- sensor with the datasheet calibration answering UT 27898 and UP 23843 at mode 0
    pub(crate) fn datasheet_bus() -> MockBus {
        let bus = MockBus::new();
        load_datasheet_calib(&bus, ADDR);
        bus.on_write(ADDR, BMP180_REG_CONTROL, 0x2e, BMP180_REG_DATA, &[0x6c, 0xfa]);
        for oss in 0..4u8 {
            bus.on_write(ADDR, BMP180_REG_CONTROL, 0x34 + (oss << 6), BMP180_REG_DATA, &[0x5d, 0x23, 0x00]);
        }
        bus
    }

    pub(crate) fn datasheet_device(bus: MockBus, mode: Bmp180OversamplingMode) -> BMP180<MockBus> {
        BMP180::new(bus, ADDR, mode).unwrap().with_conversion_delay(Duration::from_millis(1))
    }

    #[test]
    fn reads_calibration_on_construction() {
        let device = datasheet_device(datasheet_bus(), Bmp180OversamplingMode::UltraLowPower);
        assert_eq!(*device.get_calib_data(), datasheet_calib());
        assert_eq!(device.get_device_addr(), 0x77);
    }

    #[test]
    fn invalid_mode_rejected_before_bus_access() {
        let bus = datasheet_bus();
        for mode in [4, -1] {
            let result = BMP180::with_mode_value(bus.clone(), ADDR, mode);
            assert!(matches!(result, Err(Bmp180Error::Config(_))));
        }
        assert_eq!(bus.reads(), 0);
        let device = BMP180::with_mode_value(bus, ADDR, 3).unwrap();
        assert_eq!(device.get_mode(), Bmp180OversamplingMode::UltraHighRes);
    }

    #[test]
    fn absent_device_fails_construction() {
        let bus = datasheet_bus();
        let result = BMP180::new(bus, 0x76, Bmp180OversamplingMode::Standard);
        assert!(matches!(result, Err(Bmp180Error::Transport(_))));
    }

    #[test]
    fn raw_temperature_triggers_conversion() {
        let bus = datasheet_bus();
        let device = datasheet_device(bus.clone(), Bmp180OversamplingMode::UltraLowPower);
        assert_eq!(device.read_raw_temperature().unwrap(), 27898);
        assert_eq!(bus.writes(), vec![(ADDR, 0xf4, 0x2e)]);
    }

    #[test]
    fn raw_pressure_control_byte_includes_mode() {
        let bus = datasheet_bus();
        let device = datasheet_device(bus.clone(), Bmp180OversamplingMode::UltraHighRes);
        assert_eq!(device.read_raw_pressure().unwrap(), [0x5d, 0x23, 0x00]);
        assert_eq!(bus.writes(), vec![(ADDR, 0xf4, 0xf4)]);
    }

    #[test]
    fn datasheet_measurements() {
        let bus = datasheet_bus();
        let device = datasheet_device(bus.clone(), Bmp180OversamplingMode::UltraLowPower);
        assert_eq!(device.get_temperature().unwrap(), 15.0);
        assert_eq!(device.get_pressure().unwrap(), 69961.0);
        assert_eq!(device.get_altitude(DEFAULT_SEA_LEVEL_PRESSURE).unwrap(), 3017.0);
    }

    #[test]
    fn pressure_retriggers_temperature_each_time() {
        let bus = datasheet_bus();
        let device = datasheet_device(bus.clone(), Bmp180OversamplingMode::Standard);
        let first = device.get_pressure().unwrap();
        let second = device.get_pressure().unwrap();
        assert_eq!(first, second);
        let commands: Vec<u8> = bus.writes().iter().map(|(_, _, value)| *value).collect();
        assert_eq!(commands, vec![0x2e, 0x74, 0x2e, 0x74]);
    }

    #[test]
    fn transport_failure_keeps_calibration() {
        let bus = datasheet_bus();
        let device = datasheet_device(bus.clone(), Bmp180OversamplingMode::UltraLowPower);
        bus.fail_reads(true);
        assert!(matches!(device.read_raw_temperature(), Err(Bmp180Error::Transport(_))));
        assert!(matches!(device.get_pressure(), Err(Bmp180Error::Transport(_))));
        assert_eq!(*device.get_calib_data(), datasheet_calib());
        bus.fail_reads(false);
        assert_eq!(device.get_temperature().unwrap(), 15.0);
    }

    #[test]
    fn write_failure_is_transport_error() {
        let bus = datasheet_bus();
        let device = datasheet_device(bus.clone(), Bmp180OversamplingMode::UltraLowPower);
        bus.fail_writes(true);
        assert!(matches!(device.get_temperature(), Err(Bmp180Error::Transport(_))));
    }

    #[test]
    fn cancelled_wait_abandons_read() {
        let bus = datasheet_bus();
        let cancel = CancelToken::new();
        let device = BMP180::new(bus.clone(), ADDR, Bmp180OversamplingMode::UltraLowPower)
            .unwrap()
            .with_cancel_token(cancel.clone());
        let reads_before = bus.reads();
        cancel.cancel();
        assert!(matches!(device.get_temperature(), Err(Bmp180Error::Cancelled)));
        assert_eq!(bus.writes().len(), 1);
        assert_eq!(bus.reads(), reads_before);
    }

    #[test]
    fn measures_again_after_cancelled_poll() {
        let bus = datasheet_bus();
        let cancel = CancelToken::new();
        let device = datasheet_device(bus.clone(), Bmp180OversamplingMode::UltraLowPower)
            .with_cancel_token(cancel.clone());
        cancel.cancel();
        assert!(matches!(device.get_pressure(), Err(Bmp180Error::Cancelled)));
        cancel.reset();
        assert_eq!(device.get_pressure().unwrap(), 69961.0);
        let commands: Vec<u8> = bus.writes().iter().map(|(_, _, value)| *value).collect();
        assert_eq!(commands, vec![0x2e, 0x2e, 0x34]);
    }

    #[test]
    fn concurrent_callers_are_serialized() {
        let bus = datasheet_bus();
        let device = Arc::new(datasheet_device(bus, Bmp180OversamplingMode::UltraLowPower));
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let device = Arc::clone(&device);
                thread::spawn(move || {
                    if n % 2 == 0 {
                        device.get_pressure().unwrap()
                    } else {
                        device.get_temperature().unwrap()
                    }
                })
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            let value = handle.join().unwrap();
            let expected = if n % 2 == 0 { 69961.0 } else { 15.0 };
            assert_eq!(value, expected);
        }
    }
}
