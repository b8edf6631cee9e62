//! Scheduler module for sluice: ports, pipelines and output capture.
//!
//! This module provides:
//! - **Ports**: unused, OS pipe or value channel endpoints
//! - **Pipeline execution**: launch every stage concurrently, wired through
//!   junctions, then collect one exit value per stage
//! - **Output capture**: collect an operation's emitted values
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      run_pipeline                            │
//! │  ┌─────────┐ junction ┌─────────┐ junction ┌─────────┐       │
//! │  │ stage 0 │─────────▶│ stage 1 │─────────▶│ stage 2 │       │
//! │  └────┬────┘          └────┬────┘          └────┬────┘       │
//! │       │ StageHandle        │ StageHandle        │            │
//! │       └────────────────────┴────────────────────┴──▶ exits   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod capture;
mod pipeline;
mod port;
mod stage;
mod value_channel;

pub use capture::{capture_output, output_capture};
pub use pipeline::{pipeline, run_pipeline};
pub use port::{ChanPort, FdPort, Junction, Port, PortError};
pub use stage::{stage_channel, StageHandle, StatusSender};
pub use value_channel::{value_channel, ChannelClosed, ValueReceiver, ValueSender};
