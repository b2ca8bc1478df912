//! Simulated I2C bus with LM75 parts attached

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress};
use heapless::Vec;
use log::trace;

use lm75_core::registers::{self, DEVICE_ID, Register};

/// Most parts one simulated bus can carry (the LM75 address range).
pub const MAX_CHIPS: usize = 8;

/// One simulated sensor.
#[derive(Debug, Clone)]
pub struct SimulatedLm75 {
    address: SevenBitAddress,
    registers: [u16; 8],
    pointer: u8,
    /// Ambient temperature in native half-degree steps.
    ambient: i32,
}

impl SimulatedLm75 {
    pub fn new(address: SevenBitAddress, ambient: i32) -> Self {
        let mut chip = Self {
            address,
            registers: [0; 8],
            pointer: 0,
            ambient,
        };
        chip.registers[Register::DeviceIdentity.address() as usize] = DEVICE_ID;
        chip.convert();
        chip
    }

    /// A part at `address` whose identity register does not match.
    pub fn foreign(address: SevenBitAddress, identity: u16) -> Self {
        let mut chip = Self::new(address, 0);
        chip.registers[Register::DeviceIdentity.address() as usize] = identity;
        chip
    }

    pub fn set_ambient(&mut self, ambient: i32) {
        self.ambient = ambient;
        self.convert();
    }

    /// Latches a new conversion, with the calibration offset applied.
    fn convert(&mut self) {
        let offset = registers::decode_calibration(self.register(Register::CalibrationOffset));
        let code = self.ambient.saturating_add(offset).clamp(-256, 255);
        self.registers[Register::Temperature.address() as usize] =
            registers::TEMPERATURE_FIELD.encode(code);
    }

    fn register(&self, register: Register) -> u16 {
        self.registers[register.address() as usize]
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ErrorKind> {
        let Some((&pointer, data)) = bytes.split_first() else {
            return Ok(());
        };
        if pointer as usize >= self.registers.len() {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
        }
        self.pointer = pointer;

        if let [msb, lsb, ..] = *data {
            // Temperature and identity are read-only.
            if pointer != Register::Temperature.address()
                && pointer != Register::DeviceIdentity.address()
            {
                self.registers[pointer as usize] = u16::from_be_bytes([msb, lsb]);
                if pointer == Register::CalibrationOffset.address() {
                    self.convert();
                }
            }
        }
        Ok(())
    }

    fn read(&self, buf: &mut [u8]) {
        let word = self.registers[self.pointer as usize].to_be_bytes();
        for (byte, value) in buf.iter_mut().zip(word.iter().cycle()) {
            *byte = *value;
        }
    }
}

/// A bus master with simulated parts on it.
#[derive(Debug, Default)]
pub struct SimBus {
    chips: Vec<SimulatedLm75, MAX_CHIPS>,
    transfers: usize,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a part. Returns it back when the bus is full or the address is taken.
    pub fn attach(&mut self, chip: SimulatedLm75) -> Result<(), SimulatedLm75> {
        if self.chip(chip.address).is_some() {
            return Err(chip);
        }
        self.chips.push(chip)
    }

    pub fn chip(&self, address: SevenBitAddress) -> Option<&SimulatedLm75> {
        self.chips.iter().find(|chip| chip.address == address)
    }

    pub fn chip_mut(&mut self, address: SevenBitAddress) -> Option<&mut SimulatedLm75> {
        self.chips.iter_mut().find(|chip| chip.address == address)
    }

    /// Transactions carried so far.
    pub fn transfers(&self) -> usize {
        self.transfers
    }
}

impl ErrorType for SimBus {
    type Error = ErrorKind;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.transfers += 1;
        let chip = self
            .chip_mut(address)
            .ok_or(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))?;

        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    trace!("sim {:#04x}: write {:02x?}", address, bytes);
                    chip.write(bytes)?;
                }
                Operation::Read(buf) => {
                    chip.read(buf);
                    trace!("sim {:#04x}: read {:02x?}", address, buf);
                }
            }
        }
        Ok(())
    }
}
