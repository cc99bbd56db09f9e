//! Application state wiring the services together.
//!
//! AppState holds the concrete instances used by both the CLI and the REST
//! API: one orchestrator over a process-scoped store, one agent factory, and
//! the read-only persona library.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chatbridge_core::conversation::orchestrator::ConversationOrchestrator;
use chatbridge_core::conversation::store::ConversationStore;
use chatbridge_core::provider::credential::ConfigSource;
use chatbridge_core::provider::registry::ProviderRegistry;
use chatbridge_infra::config::{config_path, load_config};
use chatbridge_infra::env::ProcessEnv;
use chatbridge_infra::factory::AgentFactory;
use chatbridge_infra::persona::{DEFAULT_ROLES_FILE, PersonaLibrary};
use chatbridge_types::config::BridgeConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BridgeConfig>,
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub factory: Arc<AgentFactory>,
    pub personas: Arc<PersonaLibrary>,
    /// Base configuration source; per-request keys are layered over it.
    pub env: Arc<dyn ConfigSource>,
}

impl AppState {
    /// Load `chatbridge.toml` and `roles.json`, then wire services against
    /// the process environment.
    pub async fn init(config: Option<&Path>) -> Self {
        let config = load_config(&config_path(config)).await;
        let personas = PersonaLibrary::load(Path::new(DEFAULT_ROLES_FILE)).await;
        Self::from_parts(config, personas, Arc::new(ProcessEnv::new()))
    }

    pub fn from_parts(
        config: BridgeConfig,
        personas: PersonaLibrary,
        env: Arc<dyn ConfigSource>,
    ) -> Self {
        let registry = ProviderRegistry::builtin();
        let factory = AgentFactory::new(&config, env.as_ref());
        let orchestrator = ConversationOrchestrator::new(
            registry,
            Arc::new(ConversationStore::new()),
            Duration::from_millis(config.conversation.turn_delay_ms),
        );

        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            factory: Arc::new(factory),
            personas: Arc::new(personas),
            env,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        self.orchestrator.registry()
    }
}
