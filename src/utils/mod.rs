//! Utility functions and types

pub mod data_loader;
pub mod stats;

pub use data_loader::{frame_to_csv_bytes, DataLoader, DataSaver, FileInfo};

use std::time::Instant;

/// Wall-clock timer for pipeline steps
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}

impl Timer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
