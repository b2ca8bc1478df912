//! Simulator settings, read from the environment (and `.env` if present)

use std::path::PathBuf;

use embedded_hal::i2c::SevenBitAddress;
use thiserror_no_std::Error;

pub const SENSORS_VAR: &str = "LM75_SIM_SENSORS";
pub const FOREIGN_VAR: &str = "LM75_SIM_FOREIGN";
pub const TEMPERATURE_VAR: &str = "LM75_SIM_TEMPERATURE_HALF_C";
pub const CALIBBIAS_VAR: &str = "LM75_SIM_CALIBBIAS";

/// Temperature codes the part can report, in half degrees.
pub const TEMPERATURE_MIN: i32 = -256;
pub const TEMPERATURE_MAX: i32 = 255;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: `{value}` is not a 7-bit bus address")]
    Address { var: &'static str, value: String },
    #[error("{var}: `{value}` is not an integer")]
    Number { var: &'static str, value: String },
    #[error("{var}: {value} is outside {min}..={max}")]
    Range {
        var: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },
}

/// Loads `.env` into the process environment. A missing file is fine.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    ignore_missing(dotenvy::dotenv())
}

fn ignore_missing(result: Result<PathBuf, dotenvy::Error>) -> Result<(), dotenvy::Error> {
    match result {
        Err(e) if !e.not_found() => Err(e),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Addresses with a genuine LM75 attached.
    pub sensors: Vec<SevenBitAddress>,
    /// Addresses with some other part that fails identification.
    pub foreign: Vec<SevenBitAddress>,
    /// Ambient temperature in half degrees.
    pub temperature: i32,
    /// Calibration bias the simulator programs into every bound sensor.
    pub calibbias: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sensors: vec![0x48, 0x49],
            foreign: vec![0x4A],
            temperature: 50,
            calibbias: -4,
        }
    }
}

impl SimConfig {
    /// Reads the settings from the process environment. Call [`load_dotenv`] first.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the settings from `lookup`, falling back to defaults for unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(SENSORS_VAR) {
            config.sensors = parse_addresses(SENSORS_VAR, &value)?;
        }
        if let Some(value) = lookup(FOREIGN_VAR) {
            config.foreign = parse_addresses(FOREIGN_VAR, &value)?;
        }
        if let Some(value) = lookup(TEMPERATURE_VAR) {
            let temperature = parse_number(TEMPERATURE_VAR, &value)?;
            if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&temperature) {
                return Err(ConfigError::Range {
                    var: TEMPERATURE_VAR,
                    value: temperature,
                    min: TEMPERATURE_MIN,
                    max: TEMPERATURE_MAX,
                });
            }
            config.temperature = temperature;
        }
        if let Some(value) = lookup(CALIBBIAS_VAR) {
            config.calibbias = parse_number(CALIBBIAS_VAR, &value)?;
        }
        Ok(config)
    }
}

fn parse_addresses(var: &'static str, value: &str) -> Result<Vec<SevenBitAddress>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let parsed = match item.strip_prefix("0x").or_else(|| item.strip_prefix("0X")) {
                Some(hex) => u8::from_str_radix(hex, 16),
                None => item.parse(),
            };
            parsed
                .ok()
                .filter(|address| *address <= 0x7F)
                .ok_or_else(|| ConfigError::Address {
                    var,
                    value: item.to_string(),
                })
        })
        .collect()
}

fn parse_number(var: &'static str, value: &str) -> Result<i32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Number {
        var,
        value: value.to_string(),
    })
}
