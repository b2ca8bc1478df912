//! Register map and codec
//!
//! Pure conversions between the 16-bit words carried on the bus and the
//! signed quantities the driver reports. Nothing in here touches the bus.

/// Register addresses of the LM75.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// Measured temperature, read-only.
    Temperature = 0x0,
    Configuration = 0x1,
    HysteresisThreshold = 0x2,
    /// Calibration offset added by the device to every conversion.
    CalibrationOffset = 0x3,
    /// Identity register, read-only.
    DeviceIdentity = 0x7,
}

impl Register {
    /// Bus command byte selecting this register.
    pub const fn address(self) -> u8 {
        self as u8
    }

    /// Signed field carried by the register, if the driver decodes it.
    pub const fn field(self) -> Option<Field> {
        match self {
            Register::Temperature => Some(TEMPERATURE_FIELD),
            Register::CalibrationOffset => Some(CALIBRATION_FIELD),
            _ => None,
        }
    }
}

/// Value the identity register must hold.
pub const DEVICE_ID: u16 = 0x7;

/// Resolution in tens of microdegrees per LSB.
pub const RESOLUTION_10UC: i32 = 125;

/// Tens of microdegrees per ten millidegrees.
pub const MICRODEGREE_PER_10MILLIDEGREE: i32 = 10_000;

/// Range of the calibration bias the driver will program.
pub const CALIBBIAS_MIN: i32 = -256;
pub const CALIBBIAS_MAX: i32 = 255;

/// A left-justified two's-complement field inside a register word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Bit position of the field's least-significant bit.
    pub shift: u8,
    /// Field width in bits, sign bit included.
    pub width: u8,
}

/// 9-bit temperature code in bits [15:7].
pub const TEMPERATURE_FIELD: Field = Field { shift: 7, width: 9 };

/// 10-bit calibration offset in bits [15:6].
pub const CALIBRATION_FIELD: Field = Field { shift: 6, width: 10 };

impl Field {
    const fn mask(self) -> u16 {
        (1 << self.width) - 1
    }

    /// Extracts the field and sign-extends it from its top bit.
    pub const fn decode(self, raw: u16) -> i32 {
        sign_extend((raw >> self.shift) & self.mask(), self.width - 1)
    }

    /// Places `value` into the field, truncating it to the field width.
    pub const fn encode(self, value: i32) -> u16 {
        ((value as u16) & self.mask()) << self.shift
    }
}

/// Widens `value` to `i32`, treating bit `index` as the sign bit.
pub const fn sign_extend(value: u16, index: u8) -> i32 {
    let unused = 31 - index as u32;
    ((value as i32) << unused) >> unused
}

/// Decodes the temperature register into the sensor's native code.
pub const fn decode_temperature(raw: u16) -> i32 {
    TEMPERATURE_FIELD.decode(raw)
}

/// Decodes the calibration offset register.
pub const fn decode_calibration(raw: u16) -> i32 {
    CALIBRATION_FIELD.decode(raw)
}

/// Encodes a calibration bias for the calibration offset register.
pub const fn encode_calibration(bias: i32) -> u16 {
    CALIBRATION_FIELD.encode(bias)
}

/// Scale as `(integer, micro)` millidegrees per LSB.
pub const fn scale_fraction() -> (i32, i32) {
    (
        RESOLUTION_10UC / MICRODEGREE_PER_10MILLIDEGREE,
        (RESOLUTION_10UC % MICRODEGREE_PER_10MILLIDEGREE) * 100,
    )
}

/// Clamps a requested calibration bias into the programmable range.
pub const fn clamp_calibration(value: i32) -> i32 {
    if value < CALIBBIAS_MIN {
        CALIBBIAS_MIN
    } else if value > CALIBBIAS_MAX {
        CALIBBIAS_MAX
    } else {
        value
    }
}
