//! Credential resolution against a configuration source.
//!
//! Credentials are looked up by the key named in a provider's spec. Sources
//! are read-only; per-request keys are layered over the process environment
//! instead of being written into it, so concurrent conversations never see
//! each other's credentials.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use chatbridge_types::error::BridgeError;
use chatbridge_types::provider::{ProviderSpec, ProviderStatus};

use super::registry::ProviderRegistry;

/// Keys shorter than this are reported as suspicious by [`provider_status`].
const MIN_PLAUSIBLE_KEY_LEN: usize = 10;

/// Read-only key/value lookup for credentials and endpoint settings.
pub trait ConfigSource: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// An in-memory source, typically built from per-request API keys.
#[derive(Default, Clone)]
pub struct StaticSource {
    values: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under a configuration key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Map caller-supplied `provider id -> api key` pairs onto credential keys.
    ///
    /// Blank values, unknown providers, and providers without a credential key
    /// are skipped.
    pub fn from_api_keys(registry: &ProviderRegistry, api_keys: &HashMap<String, String>) -> Self {
        let mut values = HashMap::new();
        for (provider, key) in api_keys {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            match registry.get_spec(provider) {
                Ok(spec) => {
                    if let Some(env_key) = spec.credential_key {
                        debug!(provider = %spec.id, credential_key = env_key, "using request-scoped credential");
                        values.insert(env_key.to_string(), key.to_string());
                    }
                }
                Err(_) => {
                    warn!(provider = %provider, "ignoring credential for unknown provider");
                }
            }
        }
        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for StaticSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print values: they are credentials.
        f.debug_struct("StaticSource")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ConfigSource for StaticSource {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Consults `overrides` first and falls back to `base`.
pub struct LayeredSource<'a> {
    overrides: &'a dyn ConfigSource,
    base: &'a dyn ConfigSource,
}

impl<'a> LayeredSource<'a> {
    pub fn new(overrides: &'a dyn ConfigSource, base: &'a dyn ConfigSource) -> Self {
        Self { overrides, base }
    }
}

impl ConfigSource for LayeredSource<'_> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.overrides
            .lookup(key)
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.base.lookup(key))
    }
}

/// Resolve the credential a provider needs before any agent is built.
///
/// Returns `Ok(None)` for providers that need no credential. The value is
/// trimmed; a missing or blank value is a [`BridgeError::MissingCredential`].
pub fn ensure_credential(
    spec: &ProviderSpec,
    source: &dyn ConfigSource,
) -> Result<Option<SecretString>, BridgeError> {
    if !spec.needs_credential {
        return Ok(None);
    }
    let Some(key) = spec.credential_key else {
        return Err(BridgeError::MisconfiguredProvider {
            label: spec.label.to_string(),
        });
    };
    match source.lookup(key) {
        Some(value) if !value.trim().is_empty() => {
            Ok(Some(SecretString::from(value.trim().to_string())))
        }
        _ => Err(BridgeError::MissingCredential {
            label: spec.label.to_string(),
            key: key.to_string(),
        }),
    }
}

/// Credential-only readiness check. Makes no network calls.
pub fn provider_status(spec: &ProviderSpec, source: &dyn ConfigSource) -> ProviderStatus {
    let mut status = ProviderStatus {
        label: spec.label.to_string(),
        connected: false,
        error: None,
    };

    if !spec.needs_credential {
        status.error = Some("Cannot verify - service may not be running".to_string());
        return status;
    }

    match ensure_credential(spec, source) {
        Ok(Some(secret)) if secret.expose_secret().len() >= MIN_PLAUSIBLE_KEY_LEN => {
            status.connected = true;
        }
        Ok(_) => {
            let key = spec.credential_key.unwrap_or("credential");
            status.error = Some(format!("{key} appears invalid"));
        }
        Err(err) => {
            status.error = Some(err.to_string());
        }
    }
    status
}
