//! Background Tasks Module
//!
//! Contains background tasks that run periodically during gateway operation.
//!
//! # Tasks
//! - Stale sweep: optional removal of stale cache entries

mod sweep;

pub use sweep::spawn_sweep_task;
