//! Desktop simulator for the lm75-core driver.
//!
//! Attaches simulated LM75 parts (and some foreign parts) to one shared I2C
//! bus, probes every address into a small host device table, then drives
//! the bound sensors through their attributes the way a user would.
//!
//! # Environment
//!
//! | Variable                       | Meaning                                  |
//! |--------------------------------|------------------------------------------|
//! | `LM75_SIM_SENSORS`             | Addresses with an LM75, e.g. `0x48,0x49` |
//! | `LM75_SIM_FOREIGN`             | Addresses with a part that is not one    |
//! | `LM75_SIM_TEMPERATURE_HALF_C`  | Ambient temperature in 0.5 °C steps      |
//! | `LM75_SIM_CALIBBIAS`           | Bias written to every bound sensor       |
//! | `RUST_LOG`                     | Log filter (default `info`)              |
//!
//! A `.env` file in the working directory is read first. Temperatures
//! outside the part's range (-256..=255) are rejected.

mod chip;
mod config;
mod host;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use log::{error, info, warn};

use lm75_core::matching::DRIVER;
use lm75_core::shared_bus::SharedI2cBus;
use lm75_core::{I2cWordBus, InfoKind, Lm75, SharedI2cDevice, Value, probe};

use chip::{MAX_CHIPS, SimBus, SimulatedLm75};
use config::SimConfig;
use host::{DeviceHandle, Registry};

type SimLm75<'a> = Lm75<I2cWordBus<SharedI2cDevice<'a, SimBus>>>;

/// Identity register content of the foreign parts.
const FOREIGN_IDENTITY: u16 = 0x00FF;

// ---------------------------------------------------------------------------
// Bus setup
// ---------------------------------------------------------------------------

fn build_bus(config: &SimConfig) -> SimBus {
    let mut sim = SimBus::new();
    let sensors = config
        .sensors
        .iter()
        .map(|&address| SimulatedLm75::new(address, config.temperature));
    let foreign = config
        .foreign
        .iter()
        .map(|&address| SimulatedLm75::foreign(address, FOREIGN_IDENTITY));

    for chip in sensors.chain(foreign) {
        if let Err(chip) = sim.attach(chip) {
            warn!("sim: could not attach part {:?}", chip);
        }
    }
    sim
}

// ---------------------------------------------------------------------------
// Attribute access
// ---------------------------------------------------------------------------

fn show(registry: &mut Registry<SimLm75<'_>, MAX_CHIPS>, handle: DeviceHandle) {
    for kind in [InfoKind::Raw, InfoKind::Scale, InfoKind::CalibBias] {
        match registry.read(handle, kind) {
            Ok(value) => info!("  in_temp_{} = {}", kind.attribute(), value),
            Err(e) => error!("  in_temp_{}: {}", kind.attribute(), e),
        }
    }
}

fn transfers(bus: &SharedI2cBus<SimBus>) -> usize {
    bus.lock(|sim| sim.borrow().transfers())
}

fn main() {
    let dotenv = config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = dotenv {
        warn!("Ignoring .env: {}", e);
    }

    let config = match SimConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid simulator settings: {}", e);
            return;
        }
    };
    info!("Starting lm75 simulator: {:?}", config);

    for compatible in ["ti,lm75", "ti,tmp102"] {
        info!(
            "driver {} handles `{}`: {}",
            DRIVER.name,
            compatible,
            DRIVER.match_compatible(compatible).is_some()
        );
    }

    let bus: SharedI2cBus<SimBus> = Mutex::new(RefCell::new(build_bus(&config)));
    let mut registry: Registry<SimLm75<'_>, MAX_CHIPS> = Registry::new();

    // -----------------------------------------------------------------------
    // Bind
    // -----------------------------------------------------------------------

    let mut handles = Vec::new();
    for &address in config.sensors.iter().chain(config.foreign.iter()) {
        let word_bus = I2cWordBus::new(SharedI2cDevice::new(&bus), address);
        match probe(word_bus, &mut registry) {
            Ok(handle) => handles.push(handle),
            Err(e) => warn!("probe {:#04x} failed: {}", address, e),
        }
    }
    info!("{} of {} parts bound", registry.len(), config.sensors.len() + config.foreign.len());

    // -----------------------------------------------------------------------
    // Exercise
    // -----------------------------------------------------------------------

    for &handle in &handles {
        info!("device {}: {:?}", handle.index(), registry.attributes(handle));
        show(&mut registry, handle);

        let before = transfers(&bus);
        for _ in 0..2 {
            if let Err(e) = registry.write(handle, InfoKind::CalibBias, Value::Int(config.calibbias)) {
                error!("  calibbias write failed: {}", e);
            }
        }
        info!(
            "  two identical calibbias writes took {} bus transfer(s)",
            transfers(&bus) - before
        );
        show(&mut registry, handle);
    }

    // Warm every sensor by 10 °C and read again.
    bus.lock(|sim| {
        let mut sim = sim.borrow_mut();
        for &address in &config.sensors {
            if let Some(chip) = sim.chip_mut(address) {
                chip.set_ambient(config.temperature.saturating_add(20));
            }
        }
    });
    for &handle in &handles {
        match registry.read(handle, InfoKind::Raw) {
            Ok(value) => info!("device {}: in_temp_raw = {} after warming", handle.index(), value),
            Err(e) => error!("device {}: {}", handle.index(), e),
        }
    }

    // -----------------------------------------------------------------------
    // Unbind
    // -----------------------------------------------------------------------

    for handle in handles {
        if let Some(device) = registry.unbind(handle) {
            let bias = device.cached_calibbias();
            let word_bus = device.release();
            info!("released {:#04x} (calibbias {})", word_bus.address(), bias);
        }
    }
    info!(
        "Simulator finished, {} bus transfers, table empty: {}, slots reserved: {}",
        transfers(&bus),
        registry.is_empty(),
        registry.reserved()
    );
}
