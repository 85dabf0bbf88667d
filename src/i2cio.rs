use i2c_linux::I2c;
#[allow(unused_imports)]
use log::{debug, trace};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Byte level register access to devices on a two-wire bus.
///
/// Every call names the 7-bit device address so one bus handle can serve
/// several devices. Implementations are not required to be thread safe, the
/// device session serializes access.
pub trait RegisterBus {
    fn read_byte(&mut self, address: u16, register: u8) -> Result<u8, std::io::Error>;
    fn write_byte(&mut self, address: u16, register: u8, value: u8) -> Result<(), std::io::Error>;
}

pub fn bus_path(bus_num: u32) -> PathBuf {
    PathBuf::from(format!("/dev/i2c-{bus_num}"))
}

/// Linux i2c-dev backed bus.
pub struct LinuxI2cBus {
    // -- i2c bus
    i2c: I2c<File>,
    // -- slave address currently selected on the file handle
    slave_addr: Option<u16>,
}

impl LinuxI2cBus {
    pub fn open(bus_path: &Path) -> Result<Self, std::io::Error> {
        let i2c = I2c::from_path(bus_path)?;
        debug!("Opened i2c bus {}", bus_path.display());
        Ok(LinuxI2cBus { i2c, slave_addr: None })
    }

    fn select(&mut self, address: u16) -> Result<(), std::io::Error> {
        if self.slave_addr != Some(address) {
            self.i2c.smbus_set_slave_address(address, false)?;
            self.slave_addr = Some(address);
        }
        Ok(())
    }
}

impl RegisterBus for LinuxI2cBus {
    fn read_byte(&mut self, address: u16, register: u8) -> Result<u8, std::io::Error> {
        self.select(address)?;
        self.i2c.smbus_read_byte_data(register)
    }

    fn write_byte(&mut self, address: u16, register: u8, value: u8) -> Result<(), std::io::Error> {
        self.select(address)?;
        self.i2c.smbus_write_byte_data(register, value)
    }
}

pub fn concat_bytes(msb: u8, lsb: u8) -> u16 {
    ((msb as u16) << 8) | (lsb as u16)
}

// -- adjust the high byte before combining, same as a 16-bit two's complement
pub fn concat_bytes_signed(msb: u8, lsb: u8) -> i16 {
    let mut msb = msb as i32;
    if msb > 127 {
        msb -= 256;
    }
    ((msb << 8) + lsb as i32) as i16
}

// -- register `offset` bytes after `register`, must stay inside the 8 bit register space
fn register_at(register: u8, offset: usize) -> Result<u8, std::io::Error> {
    u8::try_from(offset).ok()
        .and_then(|offset| register.checked_add(offset))
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput,
            format!("register {register:#04x} + {offset} is beyond 0xff")))
}

pub fn read_u16<B: RegisterBus>(bus: &mut B, address: u16, register: u8) -> Result<u16, std::io::Error> {
    let msb = bus.read_byte(address, register)?;
    let lsb = bus.read_byte(address, register_at(register, 1)?)?;
    trace!("Read {register:#04x}: msb {msb:#04x}, lsb {lsb:#04x}");
    Ok(concat_bytes(msb, lsb))
}

pub fn read_i16<B: RegisterBus>(bus: &mut B, address: u16, register: u8) -> Result<i16, std::io::Error> {
    let msb = bus.read_byte(address, register)?;
    let lsb = bus.read_byte(address, register_at(register, 1)?)?;
    trace!("Read {register:#04x}: msb {msb:#04x}, lsb {lsb:#04x}");
    Ok(concat_bytes_signed(msb, lsb))
}

pub fn write_byte<B: RegisterBus>(bus: &mut B, address: u16, register: u8, data: u8) -> Result<(), std::io::Error> {
    trace!("Write {register:#04x}: {data:#04x}");
    bus.write_byte(address, register, data)
}

pub fn read_bytes<B: RegisterBus, const LEN: usize>(bus: &mut B, address: u16, register: u8) -> Result<[u8; LEN], std::io::Error> {
    let mut data = [0u8; LEN];
    for (offset, byte) in data.iter_mut().enumerate() {
        *byte = bus.read_byte(address, register_at(register, offset)?)?;
    }
    Ok(data)
}
