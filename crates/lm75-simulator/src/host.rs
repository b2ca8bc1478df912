//! Minimal host measurement framework
//!
//! A fixed-capacity device table. Drivers bind into it through
//! [`HostFramework`], and the simulator then reads and writes attributes by
//! handle, the way a user would through the host's attribute files.

use core::cell::Cell;
use std::rc::Rc;

use heapless::Vec;
use log::{debug, info};
use thiserror_no_std::Error;

use lm75_core::framework::{ChannelInterface, DeviceDescriptor, HostFramework, InfoKind, Value};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("device table is full")]
    Full,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError<E: core::fmt::Debug> {
    #[error("no device bound as {0:?}")]
    NoSuchDevice(DeviceHandle),
    #[error("device error: {0:?}")]
    Device(E),
}

/// Index of a bound device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceHandle(usize);

impl DeviceHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Storage reserved for one device. Dropping it gives the capacity back.
#[derive(Debug)]
pub struct Slot {
    reserved: Rc<Cell<usize>>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.reserved.set(self.reserved.get() - 1);
    }
}

struct Bound<D> {
    descriptor: &'static DeviceDescriptor,
    device: D,
}

/// Device table holding at most `N` bound devices.
pub struct Registry<D, const N: usize> {
    devices: Vec<Option<Bound<D>>, N>,
    reserved: Rc<Cell<usize>>,
}

impl<D, const N: usize> Default for Registry<D, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, const N: usize> Registry<D, N> {
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            reserved: Rc::new(Cell::new(0)),
        }
    }

    /// Number of devices currently bound.
    pub fn len(&self) -> usize {
        self.devices.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots handed out but not yet registered.
    pub fn reserved(&self) -> usize {
        self.reserved.get()
    }

    pub fn descriptor(&self, handle: DeviceHandle) -> Option<&'static DeviceDescriptor> {
        self.bound(handle).map(|bound| bound.descriptor)
    }

    /// Attribute names the device publishes, e.g. `in_temp_raw`.
    pub fn attributes(&self, handle: DeviceHandle) -> std::vec::Vec<String> {
        let Some(descriptor) = self.descriptor(handle) else {
            return std::vec::Vec::new();
        };
        descriptor
            .channels
            .iter()
            .flat_map(|channel| channel.info_mask_separate.iter())
            .map(|kind| format!("in_temp_{}", kind.attribute()))
            .collect()
    }

    /// Takes a device out of the table, ending its binding.
    pub fn unbind(&mut self, handle: DeviceHandle) -> Option<D> {
        let bound = self.devices.get_mut(handle.0)?.take()?;
        info!("{}: unbound from slot {}", bound.descriptor.name, handle.0);
        Some(bound.device)
    }

    fn bound(&self, handle: DeviceHandle) -> Option<&Bound<D>> {
        self.devices.get(handle.0)?.as_ref()
    }

    fn bound_mut(&mut self, handle: DeviceHandle) -> Option<&mut Bound<D>> {
        self.devices.get_mut(handle.0)?.as_mut()
    }
}

impl<D: ChannelInterface, const N: usize> Registry<D, N>
where
    D::Error: core::fmt::Debug,
{
    pub fn read(&mut self, handle: DeviceHandle, kind: InfoKind) -> Result<Value, HostError<D::Error>> {
        let Some(bound) = self.bound_mut(handle) else {
            return Err(HostError::NoSuchDevice(handle));
        };
        bound.device.read(kind).map_err(HostError::Device)
    }

    pub fn write(
        &mut self,
        handle: DeviceHandle,
        kind: InfoKind,
        value: Value,
    ) -> Result<(), HostError<D::Error>> {
        let Some(bound) = self.bound_mut(handle) else {
            return Err(HostError::NoSuchDevice(handle));
        };
        bound.device.write(kind, value).map_err(HostError::Device)
    }
}

impl<D, const N: usize> HostFramework<D> for Registry<D, N> {
    type Slot = Slot;
    type Handle = DeviceHandle;
    type Error = RegistryError;

    fn allocate(&mut self) -> Option<Slot> {
        if self.len() + self.reserved.get() >= N {
            debug!("registry: no free slot");
            return None;
        }
        self.reserved.set(self.reserved.get() + 1);
        Some(Slot {
            reserved: self.reserved.clone(),
        })
    }

    fn register(
        &mut self,
        slot: Slot,
        descriptor: &'static DeviceDescriptor,
        device: D,
    ) -> Result<DeviceHandle, RegistryError> {
        let bound = Bound { descriptor, device };
        let index = match self.devices.iter().position(Option::is_none) {
            Some(index) => {
                self.devices[index] = Some(bound);
                index
            }
            None => {
                self.devices
                    .push(Some(bound))
                    .map_err(|_| RegistryError::Full)?;
                self.devices.len() - 1
            }
        };
        drop(slot);

        info!("{}: registered in slot {}", descriptor.name, index);
        Ok(DeviceHandle(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    use embassy_sync::blocking_mutex::Mutex;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use lm75_core::shared_bus::SharedI2cBus;
    use lm75_core::{Config, Error, I2cWordBus, Lm75, SharedI2cDevice, probe};

    use crate::chip::{SimBus, SimulatedLm75};

    type SimLm75<'a> = Lm75<I2cWordBus<SharedI2cDevice<'a, SimBus>>>;

    fn sim_bus(chips: impl IntoIterator<Item = SimulatedLm75>) -> SharedI2cBus<SimBus> {
        let mut sim = SimBus::new();
        for chip in chips {
            sim.attach(chip).unwrap();
        }
        Mutex::new(RefCell::new(sim))
    }

    fn transfers(bus: &SharedI2cBus<SimBus>) -> usize {
        bus.lock(|sim| sim.borrow().transfers())
    }

    #[test]
    fn test_bind_read_write_unbind() {
        let bus = sim_bus([SimulatedLm75::new(0x48, 50)]);
        let mut registry: Registry<SimLm75<'_>, 2> = Registry::new();

        let handle = probe(Config::default().bus(SharedI2cDevice::new(&bus)), &mut registry).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.attributes(handle),
            ["in_temp_raw", "in_temp_scale", "in_temp_calibbias"]
        );

        assert_eq!(registry.read(handle, InfoKind::Raw), Ok(Value::Int(50)));
        assert_eq!(
            registry.read(handle, InfoKind::Scale).map(|v| v.to_string()),
            Ok("0.012500".to_string())
        );

        registry.write(handle, InfoKind::CalibBias, Value::Int(-6)).unwrap();
        assert_eq!(registry.read(handle, InfoKind::CalibBias), Ok(Value::Int(-6)));
        assert_eq!(registry.read(handle, InfoKind::Raw), Ok(Value::Int(44)));

        assert_eq!(
            registry.read(handle, InfoKind::Processed),
            Err(HostError::Device(Error::InvalidRequest(InfoKind::Processed)))
        );

        let device = registry.unbind(handle).unwrap();
        assert_eq!(device.cached_calibbias(), -6);
        assert!(registry.is_empty());
        assert_eq!(
            registry.read(handle, InfoKind::Raw),
            Err(HostError::NoSuchDevice(handle))
        );
    }

    #[test]
    fn test_repeated_calibbias_write_is_one_transfer() {
        let bus = sim_bus([SimulatedLm75::new(0x48, 0)]);
        let mut registry: Registry<SimLm75<'_>, 1> = Registry::new();
        let handle = probe(Config::default().bus(SharedI2cDevice::new(&bus)), &mut registry).unwrap();

        let before = transfers(&bus);
        registry.write(handle, InfoKind::CalibBias, Value::Int(3)).unwrap();
        registry.write(handle, InfoKind::CalibBias, Value::Int(3)).unwrap();
        assert_eq!(transfers(&bus) - before, 1);

        let before = transfers(&bus);
        assert!(registry.read(handle, InfoKind::SamplingFrequency).is_err());
        assert!(registry.write(handle, InfoKind::Offset, Value::Int(1)).is_err());
        assert_eq!(transfers(&bus), before);
    }

    #[test]
    fn test_full_registry_is_out_of_memory() {
        let bus = sim_bus([SimulatedLm75::new(0x48, 0), SimulatedLm75::new(0x49, 0)]);
        let mut registry: Registry<SimLm75<'_>, 1> = Registry::new();

        probe(Config::default().bus(SharedI2cDevice::new(&bus)), &mut registry).unwrap();
        let second = Config::from_address_pins(false, false, true);
        assert_eq!(
            probe(second.bus(SharedI2cDevice::new(&bus)), &mut registry),
            Err(Error::OutOfMemory)
        );
        assert_eq!(registry.reserved(), 0);
    }

    #[test]
    fn test_unbind_frees_slot_for_next_bind() {
        let bus = sim_bus([SimulatedLm75::new(0x48, 0), SimulatedLm75::new(0x49, 0)]);
        let mut registry: Registry<SimLm75<'_>, 1> = Registry::new();

        let first = probe(Config::default().bus(SharedI2cDevice::new(&bus)), &mut registry).unwrap();
        registry.unbind(first).unwrap();

        let second = Config::from_address_pins(false, false, true);
        let handle = probe(second.bus(SharedI2cDevice::new(&bus)), &mut registry).unwrap();
        assert_eq!(handle.index(), 0);
    }

    #[test]
    fn test_binding_failures_leave_table_empty() {
        let bus = sim_bus([SimulatedLm75::foreign(0x4A, 0x00FF)]);
        let mut registry: Registry<SimLm75<'_>, 2> = Registry::new();

        assert_eq!(
            probe(I2cWordBus::new(SharedI2cDevice::new(&bus), 0x4A), &mut registry),
            Err(Error::DeviceMismatch { found: 0x00FF })
        );
        assert_eq!(
            probe(I2cWordBus::new(SharedI2cDevice::new(&bus), 0x4B), &mut registry),
            Err(Error::Transport(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)))
        );
        assert!(registry.is_empty());
        assert_eq!(registry.reserved(), 0);
    }
}
