pub mod config;
pub mod device;
pub mod simulate;
