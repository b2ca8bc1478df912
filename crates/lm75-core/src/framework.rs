//! Contract with the host measurement framework
//!
//! The host discovers devices, binds a driver to each, and afterwards routes
//! every attribute read or write to the bound driver through
//! [`ChannelInterface`]. This module holds the types both sides agree on;
//! the host's own lifecycle machinery lives on the other side of
//! [`HostFramework`].

use core::fmt;

/// What a host is asking a channel for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InfoKind {
    /// Unconverted reading in the sensor's native code.
    Raw = 0,
    /// Reading already converted to the channel's unit.
    Processed = 1,
    /// Multiplier from raw code to the channel's unit.
    Scale = 2,
    Offset = 3,
    /// Signed offset the device adds to each conversion.
    CalibBias = 4,
    CalibScale = 5,
    SamplingFrequency = 6,
    HardwareGain = 7,
}

impl InfoKind {
    pub const ALL: [InfoKind; 8] = [
        InfoKind::Raw,
        InfoKind::Processed,
        InfoKind::Scale,
        InfoKind::Offset,
        InfoKind::CalibBias,
        InfoKind::CalibScale,
        InfoKind::SamplingFrequency,
        InfoKind::HardwareGain,
    ];

    /// Attribute suffix a host would publish the kind under.
    pub const fn attribute(self) -> &'static str {
        match self {
            InfoKind::Raw => "raw",
            InfoKind::Processed => "input",
            InfoKind::Scale => "scale",
            InfoKind::Offset => "offset",
            InfoKind::CalibBias => "calibbias",
            InfoKind::CalibScale => "calibscale",
            InfoKind::SamplingFrequency => "sampling_frequency",
            InfoKind::HardwareGain => "hardwaregain",
        }
    }
}

/// Set of [`InfoKind`]s, buildable in `const` context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InfoMask(u16);

impl InfoMask {
    pub const EMPTY: Self = Self(0);

    pub const fn with(self, kind: InfoKind) -> Self {
        Self(self.0 | 1 << kind as u8)
    }

    pub const fn contains(self, kind: InfoKind) -> bool {
        self.0 & (1 << kind as u8) != 0
    }

    pub fn iter(self) -> impl Iterator<Item = InfoKind> {
        InfoKind::ALL.into_iter().filter(move |kind| self.contains(*kind))
    }
}

/// Physical quantity measured by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelType {
    Temperature,
}

/// Static description of one measurement channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSpec {
    pub channel_type: ChannelType,
    /// Kinds this channel answers for on its own.
    pub info_mask_separate: InfoMask,
}

/// A value exchanged with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    /// `integer + micro / 1_000_000`. A negative value below one in magnitude
    /// carries its sign in `micro`.
    IntPlusMicro { integer: i32, micro: i32 },
}

impl Value {
    /// Integer part of the value.
    pub const fn integer(self) -> i32 {
        match self {
            Value::Int(value) => value,
            Value::IntPlusMicro { integer, .. } => integer,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Value::Int(value) => write!(f, "{value}"),
            Value::IntPlusMicro { integer, micro } if micro < 0 => {
                write!(f, "-{}.{:06}", integer.unsigned_abs(), micro.unsigned_abs())
            }
            Value::IntPlusMicro { integer, micro } => write!(f, "{integer}.{micro:06}"),
        }
    }
}

/// Entry points the host calls on a bound device.
pub trait ChannelInterface {
    type Error;

    fn read(&mut self, kind: InfoKind) -> Result<Value, Self::Error>;

    fn write(&mut self, kind: InfoKind, value: Value) -> Result<(), Self::Error>;
}

/// How the host may drive a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modes {
    /// On-demand reads only, no buffering or triggers.
    Direct,
}

/// Everything the host needs to publish a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub name: &'static str,
    pub modes: Modes,
    pub channels: &'static [ChannelSpec],
}

/// The host side of binding.
///
/// Storage for a device instance is reserved with [`allocate`](Self::allocate)
/// and lives exactly as long as the returned slot: dropping a slot that never
/// reached [`register`](Self::register) releases it.
pub trait HostFramework<D> {
    /// Storage reserved for one device instance.
    type Slot;
    /// Identifies a registered device in later host calls.
    type Handle;
    type Error: fmt::Debug;

    /// Reserves storage for a device, `None` when the host is out of memory.
    fn allocate(&mut self) -> Option<Self::Slot>;

    /// Publishes `device` under `descriptor`, consuming the slot.
    fn register(
        &mut self,
        slot: Self::Slot,
        descriptor: &'static DeviceDescriptor,
        device: D,
    ) -> Result<Self::Handle, Self::Error>;
}
