pub mod config;
pub mod error;
pub mod rentcap;
pub mod telemetry;
