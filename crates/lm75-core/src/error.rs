//! Driver error type

use core::convert::Infallible;
use core::fmt::Debug;

use thiserror_no_std::Error;

use crate::framework::InfoKind;

/// Errors surfaced by the driver.
///
/// `E` is the bus transport error and is carried through untouched. `R` is the
/// host framework's registration error; it only appears while binding, so the
/// channel operations use the default [`Infallible`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E: Debug, R: Debug = Infallible> {
    #[error("bus transaction failed: {0:?}")]
    Transport(E),
    #[error("LM75 not found (identity register reads {found:#06x})")]
    DeviceMismatch { found: u16 },
    #[error("bus adapter lacks SMBus word transfers")]
    UnsupportedTransport,
    #[error("no storage left for another device instance")]
    OutOfMemory,
    #[error("unsupported information kind {0:?}")]
    InvalidRequest(InfoKind),
    #[error("host framework rejected the device: {0:?}")]
    Registration(R),
}

impl<E: Debug> Error<E> {
    /// Re-types a channel error for a context that can also fail on registration.
    pub fn widen<R: Debug>(self) -> Error<E, R> {
        match self {
            Error::Transport(e) => Error::Transport(e),
            Error::DeviceMismatch { found } => Error::DeviceMismatch { found },
            Error::UnsupportedTransport => Error::UnsupportedTransport,
            Error::OutOfMemory => Error::OutOfMemory,
            Error::InvalidRequest(kind) => Error::InvalidRequest(kind),
            Error::Registration(never) => match never {},
        }
    }
}
