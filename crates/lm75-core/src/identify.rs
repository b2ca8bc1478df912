use log::error;

use crate::bus::WordBus;
use crate::error::Error;
use crate::registers::{DEVICE_ID, Register};

/// Checks that an LM75 answers on `bus`.
///
/// Reads the identity register once and compares it with [`DEVICE_ID`].
pub fn identify<B: WordBus>(bus: &mut B) -> Result<(), Error<B::Error>> {
    let found = bus
        .read_word_swapped(Register::DeviceIdentity.address())
        .map_err(Error::<B::Error>::Transport)?;

    if found != DEVICE_ID {
        error!("LM75 not found (identity {:#06x})", found);
        return Err(Error::DeviceMismatch { found });
    }
    Ok(())
}
