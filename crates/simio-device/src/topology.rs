//! Built-in topologies and their channel-role address space.
//!
//! Resolution is pure: mapping a device name to a topology, and a topology
//! to its wiring layout, has no side effects. Construction and registration
//! are the only steps that allocate anything.

use std::fmt;

use serde::{Deserialize, Serialize};
use simio_blocks::BlockLayout;

use crate::error::DeviceError;

/// Channels each reflect sub-device exposes.
pub const DEFAULT_SIM_CHANNELS: usize = 10;

/// Named wiring schemes a registry can build on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Loop-back wiring: each out-simulation sub-device is mirrored into a
    /// paired in-simulation sub-device through the blocks' pass-through
    /// tick.
    Reflect,
}

impl Topology {
    /// Resolve a device name to a built-in topology, if any.
    pub fn resolve(name: &str) -> Option<Self> {
        match name {
            "reflect" => Some(Self::Reflect),
            _ => None,
        }
    }

    /// The name a registry recognizes for this topology.
    pub fn name(self) -> &'static str {
        match self {
            Self::Reflect => "reflect",
        }
    }

    /// Wiring layout for the topology's two blocks.
    pub fn layout(self) -> TopologyLayout {
        match self {
            // One out-simulation and one in-simulation sub-device per
            // block, all lanes exposed.
            Self::Reflect => TopologyLayout {
                logic: BlockLayout::uniform(DEFAULT_SIM_CHANNELS, 2),
                scalable: BlockLayout::uniform(DEFAULT_SIM_CHANNELS, 2),
            },
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Channel wiring for one device: one logic and one scalable block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyLayout {
    /// Logic (bool) block layout.
    pub logic: BlockLayout,
    /// Scalable (f64) block layout.
    pub scalable: BlockLayout,
}

/// Digital channel roles within the reflect topology.
///
/// Raw ids are small positive integers; anything outside the table maps to
/// [`DeviceError::UnknownSubDevice`] through `TryFrom<i32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum DigitalRole {
    /// Drive side of the simulated digital outputs; a write here becomes
    /// the simulated output value.
    OutSimOut = 1,
    /// Read-back side of the simulated digital outputs.
    OutSimIn = 2,
    /// Read side of the simulated digital inputs.
    InSimIn = 3,
    /// Drive side of the simulated digital inputs.
    InSimOut = 4,
}

impl DigitalRole {
    /// Raw id used by integer-addressed callers.
    pub fn id(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for DigitalRole {
    type Error = DeviceError;

    fn try_from(role: i32) -> Result<Self, Self::Error> {
        match role {
            1 => Ok(Self::OutSimOut),
            2 => Ok(Self::OutSimIn),
            3 => Ok(Self::InSimIn),
            4 => Ok(Self::InSimOut),
            _ => Err(DeviceError::UnknownSubDevice { role }),
        }
    }
}

/// Analog channel roles within the reflect topology.
///
/// Same shape as [`DigitalRole`], resolved against the scalable block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum AnalogRole {
    /// Drive side of the simulated analog outputs.
    OutSimOut = 1,
    /// Read-back side of the simulated analog outputs.
    OutSimIn = 2,
    /// Read side of the simulated analog inputs.
    InSimIn = 3,
    /// Drive side of the simulated analog inputs.
    InSimOut = 4,
}

impl AnalogRole {
    /// Raw id used by integer-addressed callers.
    pub fn id(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for AnalogRole {
    type Error = DeviceError;

    fn try_from(role: i32) -> Result<Self, Self::Error> {
        match role {
            1 => Ok(Self::OutSimOut),
            2 => Ok(Self::OutSimIn),
            3 => Ok(Self::InSimIn),
            4 => Ok(Self::InSimOut),
            _ => Err(DeviceError::UnknownSubDevice { role }),
        }
    }
}
