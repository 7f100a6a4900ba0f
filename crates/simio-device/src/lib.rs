//! Simulated I/O devices for control applications.
//!
//! simio stands in for digital and analog I/O hardware during development
//! and testing. A device's output channels are wired straight back to
//! paired input channels, so code that reads and writes "hardware"
//! observes consistent, self-generated values with nothing attached.
//!
//! # Architecture
//!
//! - A [`DeviceRegistry`] maps names to live devices and enforces one open
//!   device per name
//! - A [`Device`] owns one logic and one scalable block plus the
//!   background worker that ticks them at a fixed cadence
//! - Channel routing resolves (role, channel) addresses to the endpoint
//!   that makes the loop-back work: drive roles land on input-facing
//!   endpoints, read roles on output-facing ones
//!
//! Channel storage and the pass-through blocks live in `simio-blocks`.

pub mod device;
pub mod error;
pub mod registry;
pub mod topology;

// Internal modules
mod worker;

pub use device::{Device, DeviceHandle};
pub use error::{DeviceError, DeviceResult};
pub use registry::DeviceRegistry;
pub use topology::{
    AnalogRole, DEFAULT_SIM_CHANNELS, DigitalRole, Topology, TopologyLayout,
};
pub use worker::TICK_PERIOD;
