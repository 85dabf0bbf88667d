use chrono::Local;
use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use bmp180_i2c::bmp180::BMP180;
use bmp180_i2c::cancel::CancelToken;
use bmp180_i2c::config::{Args, SensorConfig};
use bmp180_i2c::i2cio::LinuxI2cBus;
use bmp180_i2c::poller::Bmp180Poller;

const EXIT_CODE_SET_CTR_C_HNDLR_FAILED: u8 = 0x02;
const EXIT_CODE_INVALID_CONFIG: u8 = 0x03;
const EXIT_CODE_OPEN_BUS_FAILED: u8 = 0x04;
const EXIT_CODE_BMP180_INIT_FAILED: u8 = 0x71;

fn main() -> ExitCode {

    // -- read .env file
    dotenv::dotenv().ok();
    // -- setup logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let now = Local::now();
    info!("Starting up: {now}");

    let args = Args::parse();
    let config = match SensorConfig::try_from(args) {
        Ok(config) => config,
        Err(err) => {
            error!("ERROR - {err}");
            return ExitCode::from(EXIT_CODE_INVALID_CONFIG);
        }
    };
    let bus_path = config.bus_path();
    info!("Using i2c bus device {}", bus_path.display());

    // -- Ctrl-C interrupts a running conversion wait as well as the scan interval
    let cancel = CancelToken::new();
    let cancel_handler = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, terminating...");
        cancel_handler.cancel();
    }) {
        error!("ERROR - Failed to set Ctrl-C handler: {err}");
        return ExitCode::from(EXIT_CODE_SET_CTR_C_HNDLR_FAILED);
    }

    let bus = match LinuxI2cBus::open(&bus_path) {
        Ok(bus) => bus,
        Err(err) => {
            error!("ERROR - Failed to open i2c bus {}: {err}", bus_path.display());
            return ExitCode::from(EXIT_CODE_OPEN_BUS_FAILED);
        }
    };
    let bmp180 = match BMP180::new(bus, config.device_addr, config.mode) {
        Ok(bmp180) => bmp180.with_cancel_token(cancel.clone()),
        Err(err) => {
            error!("ERROR - Failed to initialize BMP180: {err}");
            return ExitCode::from(EXIT_CODE_BMP180_INIT_FAILED);
        }
    };

    let mut poller = Bmp180Poller::new(bmp180, &config);
    loop {
        for state in poller.poll() {
            match state.value {
                Some(value) if state.available => info!("{}: {value} {}", state.name, state.unit()),
                Some(value) => info!("{}: {value} {} (stale)", state.name, state.unit()),
                None => info!("{}: unknown", state.name),
            }
        }
        // -- delay next reading
        if cancel.wait(config.scan_interval) {
            break;
        }
    }
    info!("Stopped");
    ExitCode::SUCCESS
}
