// src/cfg/mod.rs

pub mod config;
pub mod modes;

pub use config::{load_config, HarnessConfig};
pub use modes::{AuthMode, CallbackConvention};
