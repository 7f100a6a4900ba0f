//! Simulated devices: block wiring, channel routing, and lifecycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use simio_blocks::{Endpoint, LogicBlock, ScalableBlock, Tick};

use crate::error::{DeviceError, DeviceResult};
use crate::topology::{AnalogRole, DigitalRole, Topology, TopologyLayout};
use crate::worker::{TICK_PERIOD, TickWorker};

/// Shared handle to an open device.
pub type DeviceHandle = Arc<Device>;

/// Reflect sub-device slots within each block.
const OUT_SIM: usize = 0;
const IN_SIM: usize = 1;

/// One simulated device: a logic block, a scalable block, and the worker
/// that ticks them.
///
/// Construction starts the tick worker; dropping the last handle stops and
/// joins it.
#[derive(Debug)]
pub struct Device {
    name: String,
    topology: Option<Topology>,
    // Declared before the blocks so drop joins the loop first.
    worker: TickWorker,
    logic: Arc<LogicBlock>,
    scalable: Arc<ScalableBlock>,
}

impl Device {
    /// Build a device wired for a built-in topology.
    pub fn for_topology(name: impl Into<String>, topology: Topology) -> DeviceResult<Self> {
        Self::build(name.into(), Some(topology), topology.layout())
    }

    /// Build a custom-wired device.
    ///
    /// Channel routing only covers built-in topologies, so role lookups on
    /// the result fail with `UnsupportedDevice`; endpoints have to be
    /// addressed through the blocks directly.
    pub fn with_layout(name: impl Into<String>, layout: TopologyLayout) -> DeviceResult<Self> {
        Self::build(name.into(), None, layout)
    }

    fn build(
        name: String,
        topology: Option<Topology>,
        layout: TopologyLayout,
    ) -> DeviceResult<Self> {
        let logic = Arc::new(LogicBlock::new(layout.logic)?);
        let scalable = Arc::new(ScalableBlock::new(layout.scalable)?);

        // The logic block ticks before the scalable block, in attach order.
        let blocks: Vec<Arc<dyn Tick>> = vec![logic.clone(), scalable.clone()];
        let worker = TickWorker::spawn(&name, blocks, TICK_PERIOD)?;

        Ok(Self {
            name,
            topology,
            worker,
            logic,
            scalable,
        })
    }

    /// Device name; for registry-built devices this is the topology name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Built-in topology the device was wired for, if any.
    pub fn topology(&self) -> Option<Topology> {
        self.topology
    }

    /// Completed tick passes since the device was built.
    pub fn ticks(&self) -> u64 {
        self.worker.ticks()
    }

    /// Block until at least `count` more tick passes complete, or `timeout`
    /// elapses. Returns `true` once the ticks are observed.
    pub fn wait_for_ticks(&self, count: u64, timeout: Duration) -> bool {
        let target = self.ticks() + count;
        let deadline = Instant::now() + timeout;
        while self.ticks() < target {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_micros(100));
        }
        true
    }

    /// Resolve a digital role and channel to its endpoint.
    ///
    /// The reflect table hands back the input-facing endpoint for drive
    /// roles and the output-facing endpoint for read roles, so a value
    /// written through a drive role is read back through the paired read
    /// role one tick later.
    pub fn logic_channel(&self, role: DigitalRole, channel: usize) -> DeviceResult<Endpoint<bool>> {
        self.require_routable()?;
        self.route_logic(role, channel)
    }

    /// Resolve an analog role and channel to its endpoint.
    pub fn real_channel(&self, role: AnalogRole, channel: usize) -> DeviceResult<Endpoint<f64>> {
        self.require_routable()?;
        self.route_real(role, channel)
    }

    /// Integer-addressed form of [`Self::logic_channel`].
    ///
    /// The routable check runs before the id is decoded, so an unroutable
    /// device reports itself rather than the unknown id.
    pub fn logic_channel_by_id(&self, role: i32, channel: usize) -> DeviceResult<Endpoint<bool>> {
        self.require_routable()?;
        self.route_logic(DigitalRole::try_from(role)?, channel)
    }

    /// Integer-addressed form of [`Self::real_channel`].
    pub fn real_channel_by_id(&self, role: i32, channel: usize) -> DeviceResult<Endpoint<f64>> {
        self.require_routable()?;
        self.route_real(AnalogRole::try_from(role)?, channel)
    }

    fn route_logic(&self, role: DigitalRole, channel: usize) -> DeviceResult<Endpoint<bool>> {
        let endpoint = match role {
            DigitalRole::OutSimOut => self.logic.input_endpoint(OUT_SIM, channel)?,
            DigitalRole::OutSimIn => self.logic.output_endpoint(OUT_SIM, channel)?,
            DigitalRole::InSimIn => self.logic.output_endpoint(IN_SIM, channel)?,
            DigitalRole::InSimOut => self.logic.input_endpoint(IN_SIM, channel)?,
        };
        Ok(endpoint)
    }

    fn route_real(&self, role: AnalogRole, channel: usize) -> DeviceResult<Endpoint<f64>> {
        let endpoint = match role {
            AnalogRole::OutSimOut => self.scalable.input_endpoint(OUT_SIM, channel)?,
            AnalogRole::OutSimIn => self.scalable.output_endpoint(OUT_SIM, channel)?,
            AnalogRole::InSimIn => self.scalable.output_endpoint(IN_SIM, channel)?,
            AnalogRole::InSimOut => self.scalable.input_endpoint(IN_SIM, channel)?,
        };
        Ok(endpoint)
    }

    fn require_routable(&self) -> DeviceResult<()> {
        match self.topology {
            Some(Topology::Reflect) => Ok(()),
            None => Err(DeviceError::UnsupportedDevice {
                name: self.name.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simio_blocks::{BlockError, BlockLayout};

    const WAIT: Duration = Duration::from_millis(500);

    fn reflect_device() -> Device {
        Device::for_topology("reflect", Topology::Reflect).unwrap()
    }

    #[test]
    fn topology_device_reports_its_wiring() {
        let device = reflect_device();
        assert_eq!(device.name(), "reflect");
        assert_eq!(device.topology(), Some(Topology::Reflect));
    }

    #[test]
    fn debug_output_names_the_device() {
        let device = reflect_device();
        let dump = format!("{device:?}");
        assert!(dump.contains("reflect"));
    }

    #[test]
    fn all_roles_route_on_a_reflect_device() {
        let device = reflect_device();
        for role in [
            DigitalRole::OutSimOut,
            DigitalRole::OutSimIn,
            DigitalRole::InSimIn,
            DigitalRole::InSimOut,
        ] {
            device.logic_channel(role, 0).unwrap();
            device.logic_channel(role, 9).unwrap();
        }
        for role in [
            AnalogRole::OutSimOut,
            AnalogRole::OutSimIn,
            AnalogRole::InSimIn,
            AnalogRole::InSimOut,
        ] {
            device.real_channel(role, 0).unwrap();
            device.real_channel(role, 9).unwrap();
        }
    }

    #[test]
    fn channel_past_the_lane_count_is_out_of_bounds() {
        let device = reflect_device();
        let err = device.logic_channel(DigitalRole::OutSimOut, 10).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::Block(BlockError::IndexOob { index: 10, len: 10, .. })
        ));
    }

    #[test]
    fn drive_and_read_roles_share_a_lane_pair() {
        let device = reflect_device();
        let drive = device.logic_channel(DigitalRole::OutSimOut, 2).unwrap();
        let again = device.logic_channel(DigitalRole::OutSimOut, 2).unwrap();
        let read = device.logic_channel(DigitalRole::OutSimIn, 2).unwrap();
        assert!(drive.same_slot(&again));
        assert!(!drive.same_slot(&read));
    }

    #[test]
    fn digital_drive_reads_back_after_a_tick() {
        let device = reflect_device();
        let drive = device.logic_channel(DigitalRole::OutSimOut, 5).unwrap();
        let read = device.logic_channel(DigitalRole::OutSimIn, 5).unwrap();

        drive.set(true);
        assert!(read.wait_for(true, WAIT), "loop-back never propagated");
    }

    #[test]
    fn raw_ids_route_like_the_enums() {
        let device = reflect_device();
        for id in 1..=4 {
            device.logic_channel_by_id(id, 0).unwrap();
            device.real_channel_by_id(id, 0).unwrap();
        }
        let drive = device.logic_channel_by_id(DigitalRole::OutSimOut.id(), 1).unwrap();
        assert!(drive.same_slot(&device.logic_channel(DigitalRole::OutSimOut, 1).unwrap()));
    }

    #[test]
    fn out_of_table_raw_ids_are_unknown_sub_devices() {
        let device = reflect_device();
        for bad in [0, -1, 5] {
            assert!(matches!(
                device.logic_channel_by_id(bad, 0),
                Err(DeviceError::UnknownSubDevice { role }) if role == bad
            ));
            assert!(matches!(
                device.real_channel_by_id(bad, 0),
                Err(DeviceError::UnknownSubDevice { role }) if role == bad
            ));
        }
    }

    #[test]
    fn custom_layout_device_has_no_routing() {
        let layout = TopologyLayout {
            logic: BlockLayout::uniform(4, 2),
            scalable: BlockLayout::uniform(4, 2),
        };
        let device = Device::with_layout("rig", layout).unwrap();
        assert_eq!(device.topology(), None);

        let err = device.logic_channel(DigitalRole::OutSimOut, 0).unwrap_err();
        assert!(matches!(err, DeviceError::UnsupportedDevice { name } if name == "rig"));
        let err = device.real_channel_by_id(7, 0).unwrap_err();
        assert!(matches!(err, DeviceError::UnsupportedDevice { name } if name == "rig"));
    }

    #[test]
    fn ticks_advance_while_the_device_lives() {
        let device = reflect_device();
        assert!(device.wait_for_ticks(3, WAIT));
        assert!(device.ticks() >= 3);
    }

    #[test]
    fn waiting_for_zero_ticks_is_immediate() {
        let device = reflect_device();
        assert!(device.wait_for_ticks(0, Duration::ZERO));
    }
}
