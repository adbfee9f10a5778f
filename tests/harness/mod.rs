// tests/harness/mod.rs
//
// Shared support for the integration tests: sample controllers,
// fixture configs and logging setup.

pub mod controllers;
pub mod fixtures;

pub use controllers::*;
pub use fixtures::fixture_config;

/// Route `log` output through env_logger; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .parse_default_env()
        .is_test(true)
        .try_init();
}
