//! Background tick scheduler: one worker thread per device.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use simio_blocks::Tick;

use crate::error::{DeviceError, DeviceResult};

/// Pause between tick passes. The cadence is fixed, not a tuning knob.
pub const TICK_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a device's background tick thread.
///
/// Dropping the worker requests a stop and joins the thread, so everything
/// the loop borrows outlives the loop.
#[derive(Debug)]
pub(crate) struct TickWorker {
    device: String,
    stop: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl TickWorker {
    /// Spawn the loop over `blocks`, ticking them in order once per period.
    pub(crate) fn spawn(
        device: &str,
        blocks: Vec<Arc<dyn Tick>>,
        period: Duration,
    ) -> DeviceResult<Self> {
        let device = device.to_string();
        let stop = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU64::new(0));

        let handle = thread::Builder::new()
            .name(format!("simio-{device}"))
            .spawn({
                let stop = Arc::clone(&stop);
                let ticks = Arc::clone(&ticks);
                let device = device.clone();
                move || run_loop(&device, &blocks, &stop, &ticks, period)
            })
            .map_err(|source| DeviceError::WorkerSpawn {
                name: device.clone(),
                source,
            })?;

        Ok(Self {
            device,
            stop,
            ticks,
            handle: Some(handle),
        })
    }

    /// Completed tick passes since the worker started.
    pub(crate) fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Drop for TickWorker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!(device = %self.device, "tick worker thread panicked");
            }
        }
    }
}

fn run_loop(
    device: &str,
    blocks: &[Arc<dyn Tick>],
    stop: &AtomicBool,
    ticks: &AtomicU64,
    period: Duration,
) {
    tracing::debug!(device, "tick worker started");
    while !stop.load(Ordering::Relaxed) {
        for block in blocks {
            if let Err(error) = block.tick() {
                tracing::error!(device, %error, "tick failed, stopping worker");
                return;
            }
        }
        ticks.fetch_add(1, Ordering::Relaxed);
        thread::sleep(period);
    }
    tracing::debug!(device, "tick worker stopped");
}
