//! Binding an LM75 to the host framework

use log::{debug, info};

use crate::bus::{Functionality, WordBus};
use crate::channel::DEVICE;
use crate::device::Lm75;
use crate::error::Error;
use crate::framework::HostFramework;
use crate::identify::identify;

/// Binds the sensor behind `bus` and registers it with `host`.
///
/// The sequence stops at the first failing step and its error is returned.
/// Storage reserved from the host is held in a slot until registration takes
/// it over, so a failure after allocation leaves nothing behind.
pub fn probe<B, F>(mut bus: B, host: &mut F) -> Result<F::Handle, Error<B::Error, F::Error>>
where
    B: WordBus,
    F: HostFramework<Lm75<B>>,
{
    if !bus.functionality().contains(Functionality::SMBUS_WORD_DATA) {
        return Err(Error::UnsupportedTransport);
    }

    identify(&mut bus).map_err(Error::widen::<F::Error>)?;
    debug!("LM75 identified");

    let Some(slot) = host.allocate() else {
        return Err(Error::OutOfMemory);
    };
    let device = Lm75::new(bus);

    match host.register(slot, &DEVICE, device) {
        Ok(handle) => {
            info!("{}: bound", DEVICE.name);
            Ok(handle)
        }
        Err(e) => Err(Error::Registration(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::rc::Rc;

    use crate::bus::I2cWordBus;
    use crate::framework::{ChannelInterface, DeviceDescriptor, InfoKind, Value};

    const ADDR: u8 = 0x48;

    type MockLm75 = Lm75<I2cWordBus<I2cMock>>;

    /// Releases its reservation when dropped.
    struct Slot(Rc<Cell<usize>>);

    impl Drop for Slot {
        fn drop(&mut self) {
            self.0.set(self.0.get() - 1);
        }
    }

    #[derive(Debug, PartialEq)]
    struct Rejected;

    struct TestHost {
        capacity: usize,
        reserved: Rc<Cell<usize>>,
        reject: bool,
        devices: Vec<(&'static DeviceDescriptor, MockLm75)>,
    }

    impl TestHost {
        fn new(capacity: usize) -> Self {
            Self {
                capacity,
                reserved: Rc::new(Cell::new(0)),
                reject: false,
                devices: Vec::new(),
            }
        }
    }

    impl HostFramework<MockLm75> for TestHost {
        type Slot = Slot;
        type Handle = usize;
        type Error = Rejected;

        fn allocate(&mut self) -> Option<Slot> {
            if self.devices.len() + self.reserved.get() >= self.capacity {
                return None;
            }
            self.reserved.set(self.reserved.get() + 1);
            Some(Slot(self.reserved.clone()))
        }

        fn register(
            &mut self,
            slot: Slot,
            descriptor: &'static DeviceDescriptor,
            device: MockLm75,
        ) -> Result<usize, Rejected> {
            if self.reject {
                return Err(Rejected);
            }
            self.devices.push((descriptor, device));
            drop(slot);
            Ok(self.devices.len() - 1)
        }
    }

    /// A bus that can only move bytes.
    struct ByteOnlyBus;

    impl WordBus for ByteOnlyBus {
        type Error = ErrorKind;

        fn functionality(&self) -> Functionality {
            Functionality::SMBUS_BYTE_DATA
        }

        fn read_word_data(&mut self, _command: u8) -> Result<u16, ErrorKind> {
            panic!("word read on a byte-only bus");
        }

        fn write_word_data(&mut self, _command: u8, _word: u16) -> Result<(), ErrorKind> {
            panic!("word write on a byte-only bus");
        }
    }

    impl HostFramework<Lm75<ByteOnlyBus>> for TestHost {
        type Slot = Slot;
        type Handle = usize;
        type Error = Rejected;

        fn allocate(&mut self) -> Option<Slot> {
            panic!("allocation before capability check");
        }

        fn register(
            &mut self,
            _slot: Slot,
            _descriptor: &'static DeviceDescriptor,
            _device: Lm75<ByteOnlyBus>,
        ) -> Result<usize, Rejected> {
            panic!("registration before capability check");
        }
    }

    fn identity_ok() -> I2cTransaction {
        I2cTransaction::write_read(ADDR, vec![0x07], vec![0x00, 0x07])
    }

    #[test]
    fn test_probe_binds() {
        let mut i2c = I2cMock::new(&[
            identity_ok(),
            I2cTransaction::write_read(ADDR, vec![0x00], vec![0x32, 0x00]),
        ]);
        let mut host = TestHost::new(1);

        let handle = probe(I2cWordBus::new(i2c.clone(), ADDR), &mut host).unwrap();
        assert_eq!(handle, 0);
        assert_eq!(host.reserved.get(), 0);

        let (descriptor, device) = &mut host.devices[handle];
        assert_eq!(descriptor.name, "lm75");
        assert_eq!(device.cached_calibbias(), 0);
        assert_eq!(device.read(InfoKind::Raw), Ok(Value::Int(100)));

        i2c.done();
    }

    #[test]
    fn test_probe_unsupported_transport() {
        let mut host = TestHost::new(1);
        assert_eq!(probe(ByteOnlyBus, &mut host), Err(Error::UnsupportedTransport));
    }

    #[test]
    fn test_probe_device_mismatch() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(
            ADDR,
            vec![0x07],
            vec![0x00, 0xFF],
        )]);
        let mut host = TestHost::new(1);

        assert_eq!(
            probe(I2cWordBus::new(i2c.clone(), ADDR), &mut host),
            Err(Error::DeviceMismatch { found: 0xFF })
        );
        assert!(host.devices.is_empty());

        i2c.done();
    }

    #[test]
    fn test_probe_transport_error() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(
            ADDR,
            vec![0x07],
            vec![0x00, 0x00],
        )
        .with_error(ErrorKind::ArbitrationLoss)]);
        let mut host = TestHost::new(1);

        assert_eq!(
            probe(I2cWordBus::new(i2c.clone(), ADDR), &mut host),
            Err(Error::Transport(ErrorKind::ArbitrationLoss))
        );

        i2c.done();
    }

    #[test]
    fn test_probe_out_of_memory() {
        let mut i2c = I2cMock::new(&[identity_ok()]);
        let mut host = TestHost::new(0);

        assert_eq!(
            probe(I2cWordBus::new(i2c.clone(), ADDR), &mut host),
            Err(Error::OutOfMemory)
        );

        i2c.done();
    }

    #[test]
    fn test_probe_registration_failure_releases_slot() {
        let mut i2c = I2cMock::new(&[identity_ok(), identity_ok()]);
        let mut host = TestHost::new(1);
        host.reject = true;

        assert_eq!(
            probe(I2cWordBus::new(i2c.clone(), ADDR), &mut host),
            Err(Error::Registration(Rejected))
        );
        assert_eq!(host.reserved.get(), 0);
        assert!(host.devices.is_empty());

        // The released slot is available to the next attempt.
        host.reject = false;
        assert_eq!(probe(I2cWordBus::new(i2c.clone(), ADDR), &mut host), Ok(0));

        i2c.done();
    }
}
