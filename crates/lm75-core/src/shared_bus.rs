//! I2C bus sharing
//!
//! Several sensors usually hang off one I2C master. Each bound driver owns
//! its bus handle, so every sensor gets a [`SharedI2cDevice`] pointing at the
//! same mutex-protected master.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

/// The mutex a shared I2C master lives in.
pub type SharedI2cBus<T> = Mutex<CriticalSectionRawMutex, RefCell<T>>;

/// I2C device handle on a bus shared through a critical-section mutex.
///
/// Every transfer runs with the bus locked, so transfers from different
/// handles never interleave.
///
/// # Example
///
/// ```
/// use core::cell::RefCell;
/// use embassy_sync::blocking_mutex::Mutex;
/// use lm75_core::SharedI2cDevice;
/// use lm75_core::shared_bus::SharedI2cBus;
///
/// # fn demo<I: embedded_hal::i2c::I2c>(i2c: I) {
/// let bus: SharedI2cBus<I> = Mutex::new(RefCell::new(i2c));
///
/// let sensor_a = SharedI2cDevice::new(&bus);
/// let sensor_b = SharedI2cDevice::new(&bus);
/// # }
/// ```
pub struct SharedI2cDevice<'a, T> {
    bus: &'a SharedI2cBus<T>,
}

impl<'a, T> SharedI2cDevice<'a, T> {
    /// Create a new `SharedI2cDevice`.
    #[inline]
    pub const fn new(bus: &'a SharedI2cBus<T>) -> Self {
        Self { bus }
    }
}

impl<T> ErrorType for SharedI2cDevice<'_, T>
where
    T: ErrorType,
{
    type Error = T::Error;
}

impl<T> I2c for SharedI2cDevice<'_, T>
where
    T: I2c,
{
    #[inline]
    fn read(&mut self, address: SevenBitAddress, read: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.lock(|bus| bus.borrow_mut().read(address, read))
    }

    #[inline]
    fn write(&mut self, address: SevenBitAddress, write: &[u8]) -> Result<(), Self::Error> {
        self.bus.lock(|bus| bus.borrow_mut().write(address, write))
    }

    #[inline]
    fn write_read(
        &mut self,
        address: SevenBitAddress,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus
            .lock(|bus| bus.borrow_mut().write_read(address, write, read))
    }

    #[inline]
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.bus
            .lock(|bus| bus.borrow_mut().transaction(address, operations))
    }
}
