//! Bound sensor state and its channel interface

use log::{debug, warn};

use crate::bus::WordBus;
use crate::channel::{ReadOp, WriteOp};
use crate::error::Error;
use crate::framework::{ChannelInterface, InfoKind, Value};
use crate::registers::{self, Register};

/// One bound LM75.
///
/// Owns the bus handle for as long as the device stays bound and caches the
/// calibration bias it last wrote successfully. Reads always go to the part,
/// but a write equal to the cache is skipped, so a part that lost its offset
/// (after a power cycle, say) is only reprogrammed by a different value.
pub struct Lm75<B> {
    bus: B,
    /// Always within [`registers::CALIBBIAS_MIN`]..=[`registers::CALIBBIAS_MAX`].
    calibbias: i16,
}

impl<B: WordBus> Lm75<B> {
    /// Wraps an already identified device.
    pub const fn new(bus: B) -> Self {
        Self { bus, calibbias: 0 }
    }

    /// Calibration bias last written successfully.
    pub const fn cached_calibbias(&self) -> i32 {
        self.calibbias as i32
    }

    /// Gives the bus handle back.
    pub fn release(self) -> B {
        self.bus
    }

    fn read_register(&mut self, register: Register) -> Result<u16, Error<B::Error>> {
        // Every LM75 register is transmitted most-significant byte first.
        self.bus
            .read_word_swapped(register.address())
            .map_err(Error::Transport)
    }

    fn write_calibbias(&mut self, requested: i32) -> Result<(), Error<B::Error>> {
        let bias = registers::clamp_calibration(requested);
        if bias == self.cached_calibbias() {
            debug!("LM75: calibbias already {}, skipping write", bias);
            return Ok(());
        }

        self.bus
            .write_word_swapped(
                Register::CalibrationOffset.address(),
                registers::encode_calibration(bias),
            )
            .map_err(Error::<B::Error>::Transport)?;

        // Clamped into i16 range above.
        self.calibbias = bias as i16;
        debug!("LM75: calibbias set to {}", bias);
        Ok(())
    }
}

impl<B: WordBus> ChannelInterface for Lm75<B> {
    type Error = Error<B::Error>;

    fn read(&mut self, kind: InfoKind) -> Result<Value, Self::Error> {
        match ReadOp::for_kind(kind) {
            Some(ReadOp::Register(register)) => {
                let Some(field) = register.field() else {
                    return Err(Error::InvalidRequest(kind));
                };
                let raw = self.read_register(register)?;
                Ok(Value::Int(field.decode(raw)))
            }
            Some(ReadOp::Fixed(value)) => Ok(value),
            None => {
                warn!("LM75: read of unsupported {:?}", kind);
                Err(Error::InvalidRequest(kind))
            }
        }
    }

    fn write(&mut self, kind: InfoKind, value: Value) -> Result<(), Self::Error> {
        match WriteOp::for_kind(kind) {
            Some(WriteOp::CalibrationOffset) => self.write_calibbias(value.integer()),
            None => {
                warn!("LM75: write of unsupported {:?}", kind);
                Err(Error::InvalidRequest(kind))
            }
        }
    }
}
