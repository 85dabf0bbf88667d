#[allow(unused_imports)]
use log::{debug, error, info, warn};

use crate::bmp180::{Bmp180MeasurementKind, BMP180};
use crate::config::SensorConfig;
use crate::error::Bmp180Error;
use crate::i2cio::RegisterBus;

/// Last known state of one monitored condition.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorState {
    pub kind: Bmp180MeasurementKind,
    pub name: String,
    pub value: Option<f64>,
    // -- false when the most recent read failed, value then holds the previous reading
    pub available: bool,
}

impl SensorState {
    fn new(device_name: &str, kind: Bmp180MeasurementKind) -> Self {
        SensorState {
            kind,
            name: format!("{device_name} - {}", kind.label()),
            value: None,
            available: false,
        }
    }

    pub fn unit(&self) -> &'static str {
        self.kind.unit()
    }

    pub fn icon(&self) -> &'static str {
        self.kind.icon()
    }
}

/// Periodically reads every monitored condition of one BMP180.
pub struct Bmp180Poller<B: RegisterBus> {
    device: BMP180<B>,
    sea_level_pressure: f64,
    states: Vec<SensorState>,
}

impl<B: RegisterBus> Bmp180Poller<B> {
    pub fn new(device: BMP180<B>, config: &SensorConfig) -> Self {
        let states = config.monitored_conditions.iter()
            .map(|kind| SensorState::new(&config.name, *kind))
            .collect();
        Bmp180Poller {
            device,
            sea_level_pressure: config.sea_level_pressure,
            states,
        }
    }

    pub fn states(&self) -> &[SensorState] {
        &self.states
    }

    /// Reads each monitored condition once. Failures are logged and leave the
    /// previous value in place, a cancellation stops the remaining reads.
    pub fn poll(&mut self) -> &[SensorState] {
        for state in self.states.iter_mut() {
            match self.device.measure(state.kind, self.sea_level_pressure) {
                Ok(value) => {
                    debug!("{}: {value} {}", state.name, state.unit());
                    state.value = Some(value);
                    state.available = true;
                }
                Err(Bmp180Error::Cancelled) => {
                    info!("Polling cancelled");
                    break;
                }
                Err(err) => {
                    error!("ERROR - Failed to retrieve BMP180 {} data: {err}", state.kind);
                    state.available = false;
                }
            }
        }
        &self.states
    }
}
