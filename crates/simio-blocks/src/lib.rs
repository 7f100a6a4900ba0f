//! Channel endpoints and pass-through simulation blocks.
//!
//! This crate is the signal-storage half of the simulated-I/O stack: it
//! owns the channel value cells and the blocks that advance them, while
//! `simio-device` owns naming, topology routing, and scheduling.
//!
//! # Architecture
//!
//! - [`Endpoint`] is the smallest addressable signal slot: one `bool` or
//!   one `f64`, shared between the owning block and any client that looked
//!   the endpoint up
//! - [`SimBlock`] groups endpoint lanes into sub-devices; every sub-device
//!   channel is an (input, output) endpoint pair
//! - A [`Tick`] copies each pair's input value to its output value, which
//!   is all the loop-back wiring above this crate relies on

pub mod block;
pub mod endpoint;
pub mod error;

pub use block::{BlockLayout, LogicBlock, ScalableBlock, SimBlock, Tick};
pub use endpoint::{Endpoint, SampleValue};
pub use error::{BlockError, BlockResult};
