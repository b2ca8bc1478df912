//! Channel declaration and per-kind operation table

use crate::framework::{ChannelSpec, ChannelType, DeviceDescriptor, InfoKind, InfoMask, Modes, Value};
use crate::registers::{self, Register};

/// Kinds the temperature channel answers for.
pub const SUPPORTED: InfoMask = InfoMask::EMPTY
    .with(InfoKind::Raw)
    .with(InfoKind::CalibBias)
    .with(InfoKind::Scale);

pub const CHANNELS: [ChannelSpec; 1] = [ChannelSpec {
    channel_type: ChannelType::Temperature,
    info_mask_separate: SUPPORTED,
}];

/// Descriptor handed to the host at registration.
pub static DEVICE: DeviceDescriptor = DeviceDescriptor {
    name: "lm75",
    modes: Modes::Direct,
    channels: &CHANNELS,
};

/// How a read of one kind is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOp {
    /// One word read of the register, decoded with its field.
    Register(Register),
    /// A constant, no bus access.
    Fixed(Value),
}

/// How a write of one kind is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Clamp, then one word write of the calibration offset register.
    CalibrationOffset,
}

impl ReadOp {
    pub const fn for_kind(kind: InfoKind) -> Option<Self> {
        match kind {
            InfoKind::Raw => Some(ReadOp::Register(Register::Temperature)),
            InfoKind::CalibBias => Some(ReadOp::Register(Register::CalibrationOffset)),
            InfoKind::Scale => {
                let (integer, micro) = registers::scale_fraction();
                Some(ReadOp::Fixed(Value::IntPlusMicro { integer, micro }))
            }
            _ => None,
        }
    }
}

impl WriteOp {
    pub const fn for_kind(kind: InfoKind) -> Option<Self> {
        match kind {
            InfoKind::CalibBias => Some(WriteOp::CalibrationOffset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_declaration() {
        for kind in InfoKind::ALL {
            let readable = ReadOp::for_kind(kind).is_some();
            assert_eq!(readable, SUPPORTED.contains(kind), "{kind:?}");
        }
        assert!(!SUPPORTED.contains(InfoKind::Processed));
    }

    #[test]
    fn test_only_scale_is_busless() {
        assert_eq!(
            ReadOp::for_kind(InfoKind::Raw),
            Some(ReadOp::Register(Register::Temperature))
        );
        assert_eq!(
            ReadOp::for_kind(InfoKind::CalibBias),
            Some(ReadOp::Register(Register::CalibrationOffset))
        );
        assert_eq!(
            ReadOp::for_kind(InfoKind::Scale),
            Some(ReadOp::Fixed(Value::IntPlusMicro { integer: 0, micro: 12_500 }))
        );
    }

    #[test]
    fn test_only_calibbias_is_writable() {
        for kind in InfoKind::ALL {
            assert_eq!(WriteOp::for_kind(kind).is_some(), kind == InfoKind::CalibBias);
        }
    }

    #[test]
    fn test_descriptor() {
        assert_eq!(DEVICE.name, "lm75");
        assert_eq!(DEVICE.channels.len(), 1);
        assert_eq!(DEVICE.channels[0].channel_type, ChannelType::Temperature);
    }
}
