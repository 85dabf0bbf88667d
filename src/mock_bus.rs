use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::i2cio::RegisterBus;

#[derive(Default)]
struct State {
    registers: HashMap<(u16, u8), u8>,
    // -- (address, register, value) written -> (register, bytes) loaded
    conversions: HashMap<(u16, u8, u8), (u8, Vec<u8>)>,
    writes: Vec<(u16, u8, u8)>,
    reads: usize,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory register map standing in for a device on the bus. Clones share
/// state so a test can keep a handle after moving the bus into a device.
#[derive(Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<State>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, address: u16, register: u8, bytes: &[u8]) {
        let mut state = self.state.lock().unwrap();
        for (offset, byte) in bytes.iter().enumerate() {
            state.registers.insert((address, register + offset as u8), *byte);
        }
    }

    /// Writing `value` to `register` loads `bytes` at `data_register`.
    pub fn on_write(&self, address: u16, register: u8, value: u8, data_register: u8, bytes: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.conversions.insert((address, register, value), (data_register, bytes.to_vec()));
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    pub fn writes(&self) -> Vec<(u16, u8, u8)> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }
}

impl RegisterBus for MockBus {
    fn read_byte(&mut self, address: u16, register: u8) -> Result<u8, std::io::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out"));
        }
        state.reads += 1;
        state.registers.get(&(address, register)).copied()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, format!("no device at {address:#04x}")))
    }

    fn write_byte(&mut self, address: u16, register: u8, value: u8) -> Result<(), std::io::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "write not acknowledged"));
        }
        state.writes.push((address, register, value));
        state.registers.insert((address, register), value);
        let conversion = state.conversions.get(&(address, register, value)).cloned();
        if let Some((data_register, bytes)) = conversion {
            for (offset, byte) in bytes.iter().enumerate() {
                state.registers.insert((address, data_register + offset as u8), *byte);
            }
        }
        Ok(())
    }
}
