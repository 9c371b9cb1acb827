//! Hardware providers
//!
//! - `hwmon` - Linux hwmon chips (CPU, GPU, storage, SuperIO, fan controllers)
//! - `memory` - System memory from /proc/meminfo

pub mod hwmon;
pub mod memory;

pub use hwmon::{HwmonProvider, HwmonSource};
pub use memory::{MemoryProvider, MemorySource};
