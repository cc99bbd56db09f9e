//! Read-only persona library loaded from `roles.json`.
//!
//! The file holds a `persona_library` object keyed by persona id. A missing
//! or malformed file yields an empty library; individual malformed entries
//! are skipped.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use chatbridge_core::conversation::orchestrator::SideRequest;

/// Default file name, looked up in the working directory.
pub const DEFAULT_ROLES_FILE: &str = "roles.json";

const PREVIEW_CHARS: usize = 100;

/// A named bundle of provider, model, prompt, and temperature defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Persona {
    pub name: String,
    pub provider: String,
    pub system_prompt: String,
    pub temperature: f64,
    pub model: Option<String>,
    pub guidelines: Vec<String>,
}

/// Listing entry for `GET /api/personas`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub system_preview: String,
}

#[derive(Debug, Deserialize)]
struct RawPersona {
    name: Option<String>,
    #[serde(default = "default_provider")]
    provider: String,
    #[serde(default)]
    system: String,
    #[serde(default = "default_temperature")]
    temperature: f64,
    model: Option<String>,
    #[serde(default)]
    guidelines: Vec<String>,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

#[derive(Debug, Deserialize)]
struct RolesFile {
    #[serde(default)]
    persona_library: BTreeMap<String, Value>,
}

impl Persona {
    /// The side settings this persona dictates; they replace the caller's.
    ///
    /// A blank provider or a zero temperature defers to `request`.
    pub fn side_request(&self, request: &SideRequest) -> SideRequest {
        let provider = if self.provider.trim().is_empty() {
            request.provider.clone()
        } else {
            self.provider.clone()
        };
        let temperature = if self.temperature == 0.0 {
            request.temperature
        } else {
            self.temperature
        };
        SideRequest {
            provider,
            model: self.model.clone(),
            temperature,
            system_prompt: Some(self.system_prompt.clone()).filter(|s| !s.trim().is_empty()),
            persona: Some(self.name.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PersonaLibrary {
    personas: BTreeMap<String, Persona>,
}

impl PersonaLibrary {
    /// Load `roles.json` from `path`.
    pub async fn load(path: &Path) -> Self {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("{} not found, starting with empty persona library", path.display());
                return Self::default();
            }
            Err(err) => {
                tracing::warn!("Failed to read {}: {err}", path.display());
                return Self::default();
            }
        };
        Self::from_json(&content)
    }

    /// Parse the contents of a roles file.
    pub fn from_json(content: &str) -> Self {
        let roles: RolesFile = match serde_json::from_str(content) {
            Ok(roles) => roles,
            Err(err) => {
                tracing::error!(
                    line = err.line(),
                    column = err.column(),
                    "JSON syntax error in roles file: {err}"
                );
                return Self::default();
            }
        };

        let mut personas = BTreeMap::new();
        for (key, value) in roles.persona_library {
            match serde_json::from_value::<RawPersona>(value) {
                Ok(raw) => {
                    personas.insert(
                        key.clone(),
                        Persona {
                            name: raw.name.unwrap_or_else(|| key.clone()),
                            provider: raw.provider,
                            system_prompt: raw.system,
                            temperature: raw.temperature,
                            model: raw.model,
                            guidelines: raw.guidelines,
                        },
                    );
                }
                Err(err) => tracing::warn!(persona = %key, "Failed to load persona: {err}"),
            }
        }

        tracing::info!(count = personas.len(), "loaded personas");
        Self { personas }
    }

    pub fn get(&self, key: &str) -> Option<&Persona> {
        self.personas.get(key)
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn summaries(&self) -> Vec<PersonaSummary> {
        self.personas
            .iter()
            .map(|(id, persona)| PersonaSummary {
                id: id.clone(),
                name: persona.name.clone(),
                description: "AI persona available with any provider".to_string(),
                system_preview: preview(&persona.system_prompt),
            })
            .collect()
    }

    /// Apply a named persona to a side, if one is requested and known.
    pub fn resolve_side(&self, persona_key: Option<&str>, request: SideRequest) -> SideRequest {
        let Some(key) = persona_key.map(str::trim).filter(|k| !k.is_empty()) else {
            return request;
        };
        match self.get(key) {
            Some(persona) => persona.side_request(&request),
            None => {
                tracing::warn!(persona = %key, "unknown persona requested, using request settings");
                request
            }
        }
    }
}

fn preview(system_prompt: &str) -> String {
    if system_prompt.chars().count() > PREVIEW_CHARS {
        let head: String = system_prompt.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        system_prompt.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ROLES: &str = r#"{
        "persona_library": {
            "scientist": {
                "name": "Scientist",
                "provider": "anthropic",
                "system": "You reason from evidence.",
                "temperature": 0.3,
                "model": "claude-3-5-haiku-latest",
                "guidelines": ["cite sources"]
            },
            "bare": {
                "system": "Minimal."
            },
            "broken": {
                "temperature": "very hot"
            }
        }
    }"#;

    #[test]
    fn parses_entries_and_skips_malformed() {
        let library = PersonaLibrary::from_json(ROLES);
        assert_eq!(library.len(), 2);
        assert!(library.get("broken").is_none());

        let scientist = library.get("scientist").unwrap();
        assert_eq!(scientist.provider, "anthropic");
        assert_eq!(scientist.guidelines, vec!["cite sources"]);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let library = PersonaLibrary::from_json(ROLES);
        let bare = library.get("bare").unwrap();
        assert_eq!(bare.name, "bare");
        assert_eq!(bare.provider, "openai");
        assert_eq!(bare.temperature, 0.7);
        assert!(bare.model.is_none());
    }

    #[test]
    fn malformed_json_is_empty_library() {
        assert!(PersonaLibrary::from_json("{ nope").is_empty());
    }

    #[test]
    fn summary_preview_is_truncated() {
        let long = "x".repeat(150);
        let json = format!(r#"{{"persona_library":{{"long":{{"system":"{long}"}}}}}}"#);
        let summaries = PersonaLibrary::from_json(&json).summaries();
        assert_eq!(summaries[0].system_preview, format!("{}...", "x".repeat(100)));
        assert_eq!(summaries[0].description, "AI persona available with any provider");

        let short = PersonaLibrary::from_json(ROLES).summaries();
        let bare = short.iter().find(|s| s.id == "bare").unwrap();
        assert_eq!(bare.system_preview, "Minimal.");
    }

    #[test]
    fn persona_overrides_request_fields() {
        let library = PersonaLibrary::from_json(ROLES);
        let request = SideRequest {
            provider: "ollama".into(),
            model: Some("llama3".into()),
            temperature: 1.2,
            system_prompt: Some("ignored".into()),
            persona: None,
        };
        let resolved = library.resolve_side(Some("scientist"), request);
        assert_eq!(resolved.provider, "anthropic");
        assert_eq!(resolved.model.as_deref(), Some("claude-3-5-haiku-latest"));
        assert_eq!(resolved.temperature, 0.3);
        assert_eq!(resolved.system_prompt.as_deref(), Some("You reason from evidence."));
        assert_eq!(resolved.persona.as_deref(), Some("Scientist"));
    }

    #[test]
    fn zero_temperature_and_blank_provider_defer_to_request() {
        let library = PersonaLibrary::from_json(
            r#"{"persona_library": {"cold": {"provider": " ", "system": "Be exact.", "temperature": 0.0}}}"#,
        );
        let request = SideRequest {
            provider: "deepseek".into(),
            temperature: 0.9,
            ..Default::default()
        };
        let resolved = library.resolve_side(Some("cold"), request);
        assert_eq!(resolved.temperature, 0.9);
        assert_eq!(resolved.provider, "deepseek");
        assert_eq!(resolved.system_prompt.as_deref(), Some("Be exact."));
        assert_eq!(resolved.persona.as_deref(), Some("cold"));
    }

    #[test]
    fn unknown_or_absent_persona_keeps_request() {
        let library = PersonaLibrary::from_json(ROLES);
        let request = SideRequest {
            provider: "ollama".into(),
            temperature: 0.9,
            ..Default::default()
        };
        assert_eq!(library.resolve_side(None, request.clone()).provider, "ollama");
        assert_eq!(library.resolve_side(Some("ghost"), request).temperature, 0.9);
    }

    #[tokio::test]
    async fn load_reads_file_and_tolerates_absence() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("roles.json");
        assert!(PersonaLibrary::load(&path).await.is_empty());

        tokio::fs::write(&path, ROLES).await.unwrap();
        assert_eq!(PersonaLibrary::load(&path).await.len(), 2);
    }
}
