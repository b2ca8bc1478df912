//! Hardware-independent driver for the LM75 digital temperature sensor
//!
//! The sensor sits on a register-addressed, word-oriented two-wire bus and
//! exposes one temperature channel to a host measurement framework. The host
//! asks for an [`InfoKind`] (raw value, calibration bias or scale) and the
//! driver answers with the smallest bus exchange that can satisfy it.
//!
//! ```text
//!  probe() ──> identify() ──> HostFramework::allocate() ──> register()
//!                                                              │
//!  host ──read(kind)/write(kind, value)──> Lm75 ──> WordBus ───┘
//! ```
//!
//! It is `#![no_std]` so it builds for embedded targets and for desktop hosts
//! (the simulator and tests).

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod channel;
pub mod config;
pub mod device;
pub mod error;
pub mod framework;
pub mod identify;
pub mod matching;
pub mod probe;
pub mod registers;
pub mod shared_bus;

pub use bus::{Functionality, I2cWordBus, WordBus};
pub use channel::{CHANNELS, DEVICE};
pub use config::Config;
pub use device::Lm75;
pub use error::Error;
pub use framework::{ChannelInterface, HostFramework, InfoKind, Value};
pub use identify::identify;
pub use probe::probe;
pub use shared_bus::SharedI2cDevice;
