pub mod config;
pub mod identity;
pub mod service;
pub mod telemetry;
