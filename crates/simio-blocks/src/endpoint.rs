//! Channel endpoints: the smallest addressable simulated signal slots.
//!
//! An endpoint holds one value (`bool` for logic lanes, `f64` for scalable
//! lanes) behind an atomic cell, so the owning block's tick thread and any
//! number of client handles can read and write it without locking. Only
//! per-value atomicity is promised; nothing orders one endpoint against
//! another.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Poll interval used by [`Endpoint::wait_for`].
const WAIT_POLL: Duration = Duration::from_micros(100);

/// Value types an endpoint can carry.
///
/// Implemented for `bool` (logic channels) and `f64` (scalable channels).
/// The associated cell is the lock-free storage behind a shared endpoint.
pub trait SampleValue: Copy + Default + PartialEq + Send + Sync + 'static {
    /// Shared storage cell for this value type.
    type Cell: Send + Sync;

    /// Create a cell holding `value`.
    fn new_cell(value: Self) -> Self::Cell;

    /// Read the cell.
    fn load(cell: &Self::Cell) -> Self;

    /// Overwrite the cell.
    fn store(cell: &Self::Cell, value: Self);
}

impl SampleValue for bool {
    type Cell = AtomicBool;

    fn new_cell(value: Self) -> Self::Cell {
        AtomicBool::new(value)
    }

    fn load(cell: &Self::Cell) -> Self {
        cell.load(Ordering::Relaxed)
    }

    fn store(cell: &Self::Cell, value: Self) {
        cell.store(value, Ordering::Relaxed);
    }
}

impl SampleValue for f64 {
    // Stored as raw bits. NaN payloads survive the round trip, but
    // `wait_for(NAN)` can never match because NaN != NaN.
    type Cell = AtomicU64;

    fn new_cell(value: Self) -> Self::Cell {
        AtomicU64::new(value.to_bits())
    }

    fn load(cell: &Self::Cell) -> Self {
        f64::from_bits(cell.load(Ordering::Relaxed))
    }

    fn store(cell: &Self::Cell, value: Self) {
        cell.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Handle to one simulated signal slot.
///
/// Cloning is cheap; every clone addresses the same underlying cell the
/// owning block reads and writes during its tick.
pub struct Endpoint<T: SampleValue> {
    cell: Arc<T::Cell>,
}

impl<T: SampleValue> Endpoint<T> {
    /// Create a detached endpoint holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            cell: Arc::new(T::new_cell(initial)),
        }
    }

    /// Read the current value.
    pub fn get(&self) -> T {
        T::load(&self.cell)
    }

    /// Overwrite the value.
    pub fn set(&self, value: T) {
        T::store(&self.cell, value);
    }

    /// Block until the endpoint holds `expected`, or `timeout` elapses.
    ///
    /// Polls at a granularity well below the device tick period. Returns
    /// `true` once the value is observed.
    pub fn wait_for(&self, expected: T, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.get() == expected {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(WAIT_POLL);
        }
    }

    /// Whether `other` addresses the same underlying cell.
    pub fn same_slot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: SampleValue> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: SampleValue> Default for Endpoint<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: SampleValue + fmt::Debug> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint").field("value", &self.get()).finish()
    }
}
