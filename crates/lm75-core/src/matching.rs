//! Device matching tables
//!
//! Lookup keys a host uses to decide that this driver handles a discovered
//! device. The driver never reads them itself.

/// Entry of a firmware device-tree match table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfDeviceId {
    pub compatible: &'static str,
}

/// Entry of a bus device-id table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cDeviceId {
    pub name: &'static str,
    pub driver_data: usize,
}

/// What a host needs to offer devices to this driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverDescriptor {
    pub name: &'static str,
    pub of_match_table: &'static [OfDeviceId],
    pub id_table: &'static [I2cDeviceId],
}

pub static OF_MATCH: [OfDeviceId; 1] = [OfDeviceId {
    compatible: "ti,lm75",
}];

pub static I2C_IDS: [I2cDeviceId; 1] = [I2cDeviceId {
    name: "lm75",
    driver_data: 0,
}];

pub static DRIVER: DriverDescriptor = DriverDescriptor {
    name: "lm75",
    of_match_table: &OF_MATCH,
    id_table: &I2C_IDS,
};

impl DriverDescriptor {
    /// Entry matching a firmware `compatible` string.
    pub fn match_compatible(&self, compatible: &str) -> Option<&'static OfDeviceId> {
        self.of_match_table
            .iter()
            .find(|id| id.compatible == compatible)
    }

    /// Entry matching a bus device name.
    pub fn match_id(&self, name: &str) -> Option<&'static I2cDeviceId> {
        self.id_table.iter().find(|id| id.name == name)
    }
}
