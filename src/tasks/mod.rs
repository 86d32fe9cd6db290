//! Background Tasks Module
//!
//! # Tasks
//! - Sweep: removes expired and corrupted cache entries at a fixed interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
