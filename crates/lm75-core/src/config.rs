use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::bus::I2cWordBus;

/// Base bus address; the A2..A0 pins select one of eight above it.
pub const BASE_ADDRESS: SevenBitAddress = 0x48;

/// Where an LM75 sits on its bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub address: SevenBitAddress,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: BASE_ADDRESS,
        }
    }
}

impl Config {
    /// Address selected by the strapping of the A2, A1 and A0 pins.
    pub const fn from_address_pins(a2: bool, a1: bool, a0: bool) -> Self {
        Self {
            address: BASE_ADDRESS | (a2 as u8) << 2 | (a1 as u8) << 1 | a0 as u8,
        }
    }

    /// Word bus talking to this sensor over `i2c`.
    pub const fn bus<I: I2c>(&self, i2c: I) -> I2cWordBus<I> {
        I2cWordBus::new(i2c, self.address)
    }
}
