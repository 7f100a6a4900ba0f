//! Error types for the simulated-device layer.

use simio_blocks::BlockError;

/// Device error type covering registry ownership, topology resolution,
/// channel routing, and worker startup. Every variant is fatal to the
/// requesting operation; nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("device '{name}' is already open, claim it from the registry instead")]
    DuplicateDevice { name: String },

    #[error("simulated feature '{name}' is not supported")]
    UnsupportedTopology { name: String },

    #[error("channel lookup failed: device '{name}' has no routable topology")]
    UnsupportedDevice { name: String },

    #[error("channel lookup failed: no such sub-device (role {role})")]
    UnknownSubDevice { role: i32 },

    #[error("failed to spawn tick worker for device '{name}'")]
    WorkerSpawn {
        name: String,
        source: std::io::Error,
    },

    #[error("block error: {0}")]
    Block(#[from] BlockError),
}

/// Result type for device and registry operations.
pub type DeviceResult<T> = Result<T, DeviceError>;
