//! Simulation blocks: groups of sub-devices holding paired channel lanes.
//!
//! A block is configured with a channel capacity and a per-sub-device
//! channel count. Each sub-device channel is an (input, output) endpoint
//! pair; ticking the block copies every input value to its paired output,
//! which is the pass-through contract the loop-back wiring above this
//! crate builds on.

use serde::{Deserialize, Serialize};

use crate::endpoint::{Endpoint, SampleValue};
use crate::error::{BlockError, BlockResult};

/// Layout of one simulation block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockLayout {
    /// Channel lanes the block provides to each sub-device.
    pub channel_count: usize,
    /// Channels each sub-device exposes, in attach order.
    pub sub_device_channels: Vec<usize>,
}

impl BlockLayout {
    /// Layout where every sub-device exposes the full channel count.
    pub fn uniform(channel_count: usize, sub_devices: usize) -> Self {
        Self {
            channel_count,
            sub_device_channels: vec![channel_count; sub_devices],
        }
    }

    /// Check the layout invariants.
    pub fn validate(&self) -> BlockResult<()> {
        if self.channel_count == 0 {
            return Err(BlockError::InvalidArg {
                what: "channel_count must be positive",
            });
        }
        if self
            .sub_device_channels
            .iter()
            .any(|&n| n > self.channel_count)
        {
            return Err(BlockError::InvalidArg {
                what: "sub-device exposes more channels than the block provides",
            });
        }
        Ok(())
    }
}

/// Advance simulated state by one step.
///
/// The device scheduler drives every attached block through this trait once
/// per tick. A failing tick is fatal to the owning device's scheduler.
pub trait Tick: Send + Sync {
    /// Advance one step; at minimum, copy each input endpoint's value to
    /// its paired output endpoint.
    fn tick(&self) -> BlockResult<()>;
}

/// One sub-device: paired input/output lanes for its channels.
#[derive(Debug)]
struct SubDevice<T: SampleValue> {
    inputs: Vec<Endpoint<T>>,
    outputs: Vec<Endpoint<T>>,
}

impl<T: SampleValue> SubDevice<T> {
    fn new(channels: usize) -> Self {
        Self {
            inputs: (0..channels).map(|_| Endpoint::default()).collect(),
            outputs: (0..channels).map(|_| Endpoint::default()).collect(),
        }
    }
}

/// Simulation block generic over the carried value type.
#[derive(Debug)]
pub struct SimBlock<T: SampleValue> {
    layout: BlockLayout,
    sub_devices: Vec<SubDevice<T>>,
}

/// Block carrying boolean (digital) channels.
pub type LogicBlock = SimBlock<bool>;

/// Block carrying floating-point (analog) channels.
pub type ScalableBlock = SimBlock<f64>;

impl<T: SampleValue> SimBlock<T> {
    /// Build a block from a layout, validating it first.
    pub fn new(layout: BlockLayout) -> BlockResult<Self> {
        layout.validate()?;
        let sub_devices = layout
            .sub_device_channels
            .iter()
            .map(|&n| SubDevice::new(n))
            .collect();
        Ok(Self {
            layout,
            sub_devices,
        })
    }

    /// The layout the block was built from.
    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    /// Number of attached sub-devices.
    pub fn sub_device_count(&self) -> usize {
        self.sub_devices.len()
    }

    /// Input-facing endpoint for `(sub_device, channel)`.
    pub fn input_endpoint(&self, sub_device: usize, channel: usize) -> BlockResult<Endpoint<T>> {
        let sd = self.sub_device(sub_device)?;
        Ok(Self::lane(&sd.inputs, channel)?.clone())
    }

    /// Output-facing endpoint for `(sub_device, channel)`.
    pub fn output_endpoint(&self, sub_device: usize, channel: usize) -> BlockResult<Endpoint<T>> {
        let sd = self.sub_device(sub_device)?;
        Ok(Self::lane(&sd.outputs, channel)?.clone())
    }

    fn sub_device(&self, index: usize) -> BlockResult<&SubDevice<T>> {
        self.sub_devices.get(index).ok_or(BlockError::IndexOob {
            what: "sub-device",
            index,
            len: self.sub_devices.len(),
        })
    }

    fn lane<'a>(lanes: &'a [Endpoint<T>], index: usize) -> BlockResult<&'a Endpoint<T>> {
        lanes.get(index).ok_or(BlockError::IndexOob {
            what: "channel",
            index,
            len: lanes.len(),
        })
    }
}

impl<T: SampleValue> Tick for SimBlock<T> {
    fn tick(&self) -> BlockResult<()> {
        for sd in &self.sub_devices {
            for (input, output) in sd.inputs.iter().zip(&sd.outputs) {
                output.set(input.get());
            }
        }
        Ok(())
    }
}
