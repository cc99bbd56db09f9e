//! Process-environment configuration source.
//!
//! Read-only. Per-request overrides are layered on top with
//! [`LayeredSource`](chatbridge_core::provider::credential::LayeredSource)
//! rather than written into the environment.

use chatbridge_core::provider::credential::ConfigSource;

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl ProcessEnv {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigSource for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(val) => Some(val),
            Err(std::env::VarError::NotPresent) => None,
            // Present but not valid Unicode: treat as unset.
            Err(std::env::VarError::NotUnicode(_)) => None,
        }
    }
}
