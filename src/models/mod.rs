//! Data models and structures for the network speed tester

pub mod config;
pub mod metrics;
pub mod server;

pub use config::TestConfig;
pub use metrics::{MeasurementSample, TestResults};
pub use server::{IPInfo, ServerInfo};
