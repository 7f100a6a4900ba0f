//! Process-level registry of open simulated devices.
//!
//! The registry is an explicit object with an application-managed
//! lifecycle: create one at startup, share it by reference, drop it at
//! shutdown. Lookup, build, and insert happen under one lock so two
//! concurrent opens of the same name always converge on a single device.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::device::{Device, DeviceHandle};
use crate::error::{DeviceError, DeviceResult};
use crate::topology::Topology;

/// Mapping from device name to the single live device under that name.
pub struct DeviceRegistry {
    devices: Mutex<HashMap<String, DeviceHandle>>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(HashMap::new()),
        }
    }

    /// Return the open device named `name`, building it first when the
    /// name matches a built-in topology.
    ///
    /// Unknown names fail with `UnsupportedTopology`.
    pub fn open_or_build(&self, name: &str) -> DeviceResult<DeviceHandle> {
        let mut devices = self.devices.lock().unwrap();
        if let Some(handle) = devices.get(name) {
            return Ok(handle.clone());
        }

        let topology =
            Topology::resolve(name).ok_or_else(|| DeviceError::UnsupportedTopology {
                name: name.to_string(),
            })?;
        let handle = DeviceHandle::new(Device::for_topology(name, topology)?);
        devices.insert(name.to_string(), handle.clone());
        tracing::debug!(name, %topology, "built simulated device");
        Ok(handle)
    }

    /// Register an externally-constructed device under its own name.
    ///
    /// Fails with `DuplicateDevice` when the name is in use; the rejected
    /// device is dropped, which stops its tick worker.
    pub fn register(&self, device: Device) -> DeviceResult<DeviceHandle> {
        let mut devices = self.devices.lock().unwrap();
        if devices.contains_key(device.name()) {
            return Err(DeviceError::DuplicateDevice {
                name: device.name().to_string(),
            });
        }
        let handle = DeviceHandle::new(device);
        devices.insert(handle.name().to_string(), handle.clone());
        tracing::debug!(name = handle.name(), "registered simulated device");
        Ok(handle)
    }

    /// Unregister `handle` and release it.
    ///
    /// The entry is only removed when `handle` is the currently registered
    /// instance for its name; closing a stale or foreign handle leaves the
    /// map untouched. The device itself stops once its last handle drops.
    pub fn close(&self, handle: DeviceHandle) {
        let mut devices = self.devices.lock().unwrap();
        let is_current = devices
            .get(handle.name())
            .is_some_and(|current| DeviceHandle::ptr_eq(current, &handle));
        if is_current {
            devices.remove(handle.name());
            tracing::debug!(name = handle.name(), "closed simulated device");
        } else {
            tracing::warn!(
                name = handle.name(),
                "close on a device that is not registered"
            );
        }
    }

    /// Names of the currently open devices, sorted.
    pub fn names(&self) -> Vec<String> {
        let devices = self.devices.lock().unwrap();
        let mut names: Vec<String> = devices.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
