pub mod core;
pub mod fixtures;
pub mod memory;
