// tests/harness/fixtures.rs
//
// Loader for the YAML harness configs under tests/fixtures/configs.

use std::path::PathBuf;

use controller_harness::{load_config, HarnessConfig};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("configs")
        .join(name)
}

pub fn fixture_config(name: &str) -> HarnessConfig {
    let path = fixture_path(name);
    load_config(&path).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", path.display(), e))
}
