//! Word-oriented bus transport
//!
//! The driver only ever moves single 16-bit words to and from numbered
//! registers. [`WordBus`] captures exactly that, following SMBus word-data
//! conventions, so any transport (a plain I2C master, an SMBus controller,
//! a test fake) can sit underneath.

use core::fmt::Debug;

use embedded_hal::i2c::{I2c, SevenBitAddress};
use log::trace;

/// Transfer capabilities advertised by a bus adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Functionality(u32);

impl Functionality {
    pub const NONE: Self = Self(0);
    pub const SMBUS_BYTE_DATA: Self = Self(1 << 0);
    /// Word reads and writes addressed by a command byte.
    pub const SMBUS_WORD_DATA: Self = Self(1 << 1);
    pub const I2C: Self = Self(1 << 2);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A bus that can move 16-bit words to and from device registers.
pub trait WordBus {
    type Error: Debug;

    /// Capabilities of the underlying adapter.
    fn functionality(&self) -> Functionality;

    /// Reads a word, least-significant byte first on the wire.
    fn read_word_data(&mut self, command: u8) -> Result<u16, Self::Error>;

    /// Writes a word, least-significant byte first on the wire.
    fn write_word_data(&mut self, command: u8, word: u16) -> Result<(), Self::Error>;

    /// Reads a word sent most-significant byte first.
    fn read_word_swapped(&mut self, command: u8) -> Result<u16, Self::Error> {
        self.read_word_data(command).map(u16::swap_bytes)
    }

    /// Writes a word most-significant byte first.
    fn write_word_swapped(&mut self, command: u8, word: u16) -> Result<(), Self::Error> {
        self.write_word_data(command, word.swap_bytes())
    }
}

impl<B: WordBus + ?Sized> WordBus for &mut B {
    type Error = B::Error;

    fn functionality(&self) -> Functionality {
        (**self).functionality()
    }

    fn read_word_data(&mut self, command: u8) -> Result<u16, Self::Error> {
        (**self).read_word_data(command)
    }

    fn write_word_data(&mut self, command: u8, word: u16) -> Result<(), Self::Error> {
        (**self).write_word_data(command, word)
    }
}

/// [`WordBus`] over an `embedded-hal` I2C master talking to one device.
pub struct I2cWordBus<I> {
    i2c: I,
    address: SevenBitAddress,
}

impl<I: I2c> I2cWordBus<I> {
    pub const fn new(i2c: I, address: SevenBitAddress) -> Self {
        Self { i2c, address }
    }

    pub const fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Gives the I2C master back.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> WordBus for I2cWordBus<I> {
    type Error = I::Error;

    fn functionality(&self) -> Functionality {
        // A plain I2C master can frame any SMBus transfer.
        Functionality::I2C
            .union(Functionality::SMBUS_BYTE_DATA)
            .union(Functionality::SMBUS_WORD_DATA)
    }

    fn read_word_data(&mut self, command: u8) -> Result<u16, Self::Error> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(self.address, &[command], &mut buf)?;
        trace!("i2c {:#04x}: read {:#04x} -> {:02x?}", self.address, command, buf);
        Ok(u16::from_le_bytes(buf))
    }

    fn write_word_data(&mut self, command: u8, word: u16) -> Result<(), Self::Error> {
        let [lo, hi] = word.to_le_bytes();
        trace!("i2c {:#04x}: write {:#04x} <- [{:02x}, {:02x}]", self.address, command, lo, hi);
        self.i2c.write(self.address, &[command, lo, hi])
    }
}
