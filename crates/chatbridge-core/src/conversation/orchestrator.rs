//! ConversationOrchestrator -- creates conversations and drives their turns.
//!
//! A conversation alternates strictly A then B. Each turn builds a context
//! from the trailing memory window, asks the side's agent for a reply,
//! appends it, and notifies the observer. The first agent failure aborts
//! the conversation; an observer disconnect completes it.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use chatbridge_types::conversation::{
    BridgeMessage, ConversationEvent, ConversationId, ConversationSettings, ConversationStatus,
    Side,
};
use chatbridge_types::error::{BridgeError, ConversationError};
use chatbridge_types::provider::AgentConfig;

use crate::agent::box_agent::BoxChatAgent;
use crate::provider::credential::ConfigSource;
use crate::provider::registry::ProviderRegistry;

use super::observer::ConversationObserver;
use super::state::{AgentPair, Conversation};
use super::store::ConversationStore;

/// Builds a concrete agent for one side from its resolved configuration.
///
/// Implemented by the infrastructure layer, which owns the network adapters.
pub trait AgentBuilder: Send + Sync {
    fn build_agent(
        &self,
        side: Side,
        config: &AgentConfig,
        credentials: &dyn ConfigSource,
    ) -> Result<BoxChatAgent, BridgeError>;
}

/// Caller-supplied settings for one side, before defaults are applied.
#[derive(Debug, Clone, Default)]
pub struct SideRequest {
    pub provider: String,
    pub model: Option<String>,
    pub temperature: f64,
    pub system_prompt: Option<String>,
    pub persona: Option<String>,
}

/// Everything needed to create a conversation.
#[derive(Debug, Clone)]
pub struct ConversationRequest {
    pub agent_a: SideRequest,
    pub agent_b: SideRequest,
    pub starter_message: String,
    pub settings: ConversationSettings,
}

/// How a driven conversation ended.
enum Outcome {
    Finished,
    Disconnected,
    Failed,
}

pub struct ConversationOrchestrator {
    registry: ProviderRegistry,
    store: Arc<ConversationStore>,
    turn_delay: Duration,
}

impl ConversationOrchestrator {
    pub fn new(registry: ProviderRegistry, store: Arc<ConversationStore>, turn_delay: Duration) -> Self {
        Self {
            registry,
            store,
            turn_delay,
        }
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Apply provider defaults to a side request.
    pub fn resolve_side(&self, request: &SideRequest) -> Result<AgentConfig, BridgeError> {
        let spec = self.registry.get_spec(&request.provider)?;
        Ok(AgentConfig {
            provider: spec.id,
            model: spec.resolve_model(request.model.as_deref()),
            temperature: request.temperature,
            system_prompt: spec.resolve_system_prompt(request.system_prompt.as_deref()),
            persona: request
                .persona
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        })
    }

    /// Resolve both sides, build both agents, and register the conversation.
    ///
    /// All-or-nothing: if either side fails, nothing is stored.
    pub fn create_conversation(
        &self,
        request: ConversationRequest,
        builder: &dyn AgentBuilder,
        credentials: &dyn ConfigSource,
    ) -> Result<Arc<Conversation>, BridgeError> {
        let config_a = self.resolve_side(&request.agent_a)?;
        let config_b = self.resolve_side(&request.agent_b)?;

        let agent_a = builder.build_agent(Side::A, &config_a, credentials)?;
        let agent_b = builder.build_agent(Side::B, &config_b, credentials)?;

        let conversation = self.store.insert(Conversation::new(
            request.starter_message,
            request.settings,
            config_a,
            config_b,
            AgentPair {
                a: agent_a,
                b: agent_b,
            },
        ));

        info!(
            conversation_id = %conversation.id(),
            provider_a = %conversation.agent_config(Side::A).provider,
            model_a = %conversation.agent_config(Side::A).model,
            provider_b = %conversation.agent_config(Side::B).provider,
            model_b = %conversation.agent_config(Side::B).model,
            max_rounds = request.settings.max_rounds,
            "conversation created"
        );
        Ok(conversation)
    }

    /// Attach an observer and drive the conversation to a terminal state.
    ///
    /// Attachment failures are reported to the observer as an error event
    /// and returned. A conversation already driven by another observer has
    /// its history replayed before the error.
    pub async fn run<O: ConversationObserver>(
        &self,
        id: &ConversationId,
        observer: &mut O,
        cancel: CancellationToken,
    ) -> Result<ConversationStatus, ConversationError> {
        let Some(conversation) = self.store.get(id) else {
            let err = ConversationError::NotFound;
            let _ = observer.send(ConversationEvent::Error(err.to_string())).await;
            return Err(err);
        };

        let agents = match conversation.claim().await {
            Ok(agents) => agents,
            Err(err) => {
                if err == ConversationError::AlreadyStreaming {
                    for message in conversation.messages().await {
                        if observer.send(ConversationEvent::Message(message)).await.is_err() {
                            return Err(err);
                        }
                    }
                }
                let _ = observer.send(ConversationEvent::Error(err.to_string())).await;
                return Err(err);
            }
        };

        info!(conversation_id = %id, "conversation started");
        let status = match self.drive(&conversation, &agents, observer, &cancel).await {
            Outcome::Finished => {
                let _ = observer.send(ConversationEvent::ConversationEnd).await;
                ConversationStatus::Completed
            }
            Outcome::Disconnected => {
                info!(conversation_id = %id, "observer disconnected, stopping conversation");
                ConversationStatus::Completed
            }
            Outcome::Failed => ConversationStatus::Aborted,
        };
        conversation.finish(status).await;
        let rounds = conversation.rounds_completed().await;
        info!(conversation_id = %id, status = %status, rounds, "conversation finished");
        Ok(status)
    }

    async fn drive<O: ConversationObserver>(
        &self,
        conversation: &Conversation,
        agents: &AgentPair,
        observer: &mut O,
        cancel: &CancellationToken,
    ) -> Outcome {
        for message in conversation.messages().await {
            if observer.send(ConversationEvent::Message(message)).await.is_err() {
                return Outcome::Disconnected;
            }
        }

        let settings = conversation.settings();
        while conversation.rounds_completed().await < settings.max_rounds {
            for side in [Side::A, Side::B] {
                if cancel.is_cancelled() {
                    return Outcome::Disconnected;
                }

                let agent = agents.get(side);
                let context = conversation.context().await;
                let span = info_span!(
                    "gen_ai.generate_reply",
                    conversation.id = %conversation.id(),
                    conversation.side = %side,
                    gen_ai.provider.name = agent.provider().as_str(),
                    gen_ai.request.model = %agent.model(),
                    gen_ai.request.temperature = conversation.agent_config(side).temperature,
                );

                let reply = match agent
                    .generate_reply(&context, settings.memory_window)
                    .instrument(span)
                    .await
                {
                    Ok(reply) => reply,
                    Err(err) => {
                        warn!(
                            conversation_id = %conversation.id(),
                            side = %side,
                            error = %err,
                            "agent failed, aborting conversation"
                        );
                        let _ = observer.send(ConversationEvent::Error(err.to_string())).await;
                        let _ = observer.send(ConversationEvent::ConversationEnd).await;
                        return Outcome::Failed;
                    }
                };

                let persona = conversation.agent_config(side).persona.clone();
                let message = BridgeMessage::agent(side, reply, persona);
                conversation.append(message.clone()).await;
                debug!(conversation_id = %conversation.id(), side = %side, "turn appended");

                if observer.send(ConversationEvent::Message(message)).await.is_err() {
                    return Outcome::Disconnected;
                }

                tokio::select! {
                    _ = tokio::time::sleep(self.turn_delay) => {}
                    _ = cancel.cancelled() => return Outcome::Disconnected,
                }
            }
            conversation.complete_round().await;
        }
        Outcome::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use chatbridge_types::conversation::Sender;
    use chatbridge_types::error::ProviderError;
    use chatbridge_types::provider::ProviderKind;

    use crate::agent::chat_agent::ChatAgent;
    use crate::conversation::observer::ObserverClosed;
    use crate::provider::credential::StaticSource;

    /// Replies from a script; records every context it was given.
    struct ScriptedAgent {
        label: &'static str,
        script: Mutex<VecDeque<Result<String, ProviderError>>>,
        contexts: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedAgent {
        fn new(label: &'static str, script: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                label,
                script: Mutex::new(script.into()),
                contexts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Never runs out: reply `n` is `"{label}{n}"`.
        fn counting(label: &'static str) -> Self {
            let script = (1..=50).map(|n| Ok(format!("{label}{n}"))).collect();
            Self::new(label, script)
        }
    }

    impl ChatAgent for ScriptedAgent {
        fn provider(&self) -> ProviderKind {
            ProviderKind::Ollama
        }

        fn model(&self) -> &str {
            self.label
        }

        async fn generate_reply(&self, context: &str, _window: usize) -> Result<String, ProviderError> {
            self.contexts.lock().unwrap().push(context.to_string());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::empty_response("script exhausted")))
        }
    }

    /// Hands out pre-built agents in order; fails when told to.
    struct FakeBuilder {
        agents: Mutex<VecDeque<BoxChatAgent>>,
        fail_side: Option<Side>,
    }

    impl FakeBuilder {
        fn new(a: ScriptedAgent, b: ScriptedAgent) -> Self {
            Self {
                agents: Mutex::new(VecDeque::from([BoxChatAgent::new(a), BoxChatAgent::new(b)])),
                fail_side: None,
            }
        }
    }

    impl AgentBuilder for FakeBuilder {
        fn build_agent(
            &self,
            side: Side,
            _config: &AgentConfig,
            _credentials: &dyn ConfigSource,
        ) -> Result<BoxChatAgent, BridgeError> {
            if self.fail_side == Some(side) {
                return Err(BridgeError::MissingCredential {
                    label: "Anthropic".into(),
                    key: "ANTHROPIC_API_KEY".into(),
                });
            }
            self.agents
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BridgeError::Internal("no agent left".into()))
        }
    }

    /// Records events; reports a disconnect after `accept` sends.
    struct RecordingObserver {
        events: Vec<ConversationEvent>,
        accept: usize,
    }

    impl RecordingObserver {
        fn new() -> Self {
            Self::accepting(usize::MAX)
        }

        fn accepting(accept: usize) -> Self {
            Self {
                events: Vec::new(),
                accept,
            }
        }

        fn messages(&self) -> Vec<&BridgeMessage> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    ConversationEvent::Message(m) => Some(m),
                    _ => None,
                })
                .collect()
        }

        fn errors(&self) -> Vec<&str> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    ConversationEvent::Error(msg) => Some(msg.as_str()),
                    _ => None,
                })
                .collect()
        }

        fn ends(&self) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, ConversationEvent::ConversationEnd))
                .count()
        }
    }

    impl ConversationObserver for RecordingObserver {
        async fn send(&mut self, event: ConversationEvent) -> Result<(), ObserverClosed> {
            if self.events.len() >= self.accept {
                return Err(ObserverClosed);
            }
            self.events.push(event);
            Ok(())
        }
    }

    fn orchestrator() -> ConversationOrchestrator {
        ConversationOrchestrator::new(
            ProviderRegistry::builtin(),
            Arc::new(ConversationStore::new()),
            Duration::ZERO,
        )
    }

    fn request(max_rounds: u32, memory_window: usize) -> ConversationRequest {
        ConversationRequest {
            agent_a: SideRequest {
                provider: "ollama".into(),
                temperature: 0.7,
                persona: Some("Scientist".into()),
                ..Default::default()
            },
            agent_b: SideRequest {
                provider: "lmstudio".into(),
                model: Some("qwen".into()),
                temperature: 0.2,
                ..Default::default()
            },
            starter_message: "hello".into(),
            settings: ConversationSettings {
                max_rounds,
                memory_window,
            },
        }
    }

    fn create(
        orch: &ConversationOrchestrator,
        req: ConversationRequest,
        a: ScriptedAgent,
        b: ScriptedAgent,
    ) -> Arc<Conversation> {
        orch.create_conversation(req, &FakeBuilder::new(a, b), &StaticSource::new())
            .unwrap()
    }

    #[test]
    fn resolve_side_applies_defaults() {
        let orch = orchestrator();
        let config = orch
            .resolve_side(&SideRequest {
                provider: "OpenAI".into(),
                model: Some("  ".into()),
                temperature: 1.5,
                system_prompt: None,
                persona: Some("   ".into()),
            })
            .unwrap();
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 1.5);
        assert_eq!(config.system_prompt, "You are a helpful assistant.");
        assert!(config.persona.is_none());
    }

    #[test]
    fn unknown_provider_rejects_creation() {
        let orch = orchestrator();
        let mut req = request(1, 8);
        req.agent_b.provider = "skynet".into();
        let builder = FakeBuilder::new(ScriptedAgent::counting("a"), ScriptedAgent::counting("b"));
        let err = orch
            .create_conversation(req, &builder, &StaticSource::new())
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnknownProvider(_)));
        assert!(orch.store().is_empty());
    }

    #[test]
    fn creation_is_all_or_nothing() {
        let orch = orchestrator();
        let mut builder =
            FakeBuilder::new(ScriptedAgent::counting("a"), ScriptedAgent::counting("b"));
        builder.fail_side = Some(Side::B);
        let err = orch
            .create_conversation(request(1, 8), &builder, &StaticSource::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing Anthropic credentials. Set ANTHROPIC_API_KEY.");
        assert!(orch.store().is_empty());
    }

    #[tokio::test]
    async fn new_conversation_holds_only_the_starter() {
        let orch = orchestrator();
        let conv = create(&orch, request(1, 8), ScriptedAgent::counting("a"), ScriptedAgent::counting("b"));
        let snapshot = conv.snapshot().await;
        assert_eq!(snapshot.status, ConversationStatus::Created);
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].sender, Sender::User);
        assert_eq!(snapshot.messages[0].content, "hello");
        assert_eq!(snapshot.agent_b.model, "qwen");
    }

    #[tokio::test]
    async fn single_round_produces_a_then_b() {
        let orch = orchestrator();
        let conv = create(
            &orch,
            request(1, 8),
            ScriptedAgent::new("a", vec![Ok("hi".into())]),
            ScriptedAgent::new("b", vec![Ok("hey".into())]),
        );
        let mut observer = RecordingObserver::new();
        let status = orch
            .run(&conv.id(), &mut observer, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(status, ConversationStatus::Completed);
        let messages = conv.messages().await;
        let summary: Vec<_> = messages.iter().map(|m| (m.sender, m.content.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (Sender::User, "hello"),
                (Sender::AgentA, "hi"),
                (Sender::AgentB, "hey")
            ]
        );
        assert_eq!(observer.messages().len(), 3);
        assert_eq!(observer.ends(), 1);
        assert!(matches!(observer.events.last(), Some(ConversationEvent::ConversationEnd)));
        assert_eq!(conv.status().await, ConversationStatus::Completed);
        assert_eq!(conv.rounds_completed().await, 1);
    }

    #[tokio::test]
    async fn round_limit_counts_full_pairs() {
        let orch = orchestrator();
        let conv = create(&orch, request(3, 8), ScriptedAgent::counting("a"), ScriptedAgent::counting("b"));
        let mut observer = RecordingObserver::new();
        orch.run(&conv.id(), &mut observer, CancellationToken::new())
            .await
            .unwrap();

        let messages = conv.messages().await;
        assert_eq!(messages.len(), 1 + 2 * 3);
        for (i, message) in messages.iter().enumerate().skip(1) {
            let expected = if i % 2 == 1 { Sender::AgentA } else { Sender::AgentB };
            assert_eq!(message.sender, expected);
        }
    }

    #[tokio::test]
    async fn persona_label_is_attached_to_side_messages() {
        let orch = orchestrator();
        let conv = create(&orch, request(1, 8), ScriptedAgent::counting("a"), ScriptedAgent::counting("b"));
        let mut observer = RecordingObserver::new();
        orch.run(&conv.id(), &mut observer, CancellationToken::new())
            .await
            .unwrap();
        let messages = conv.messages().await;
        assert_eq!(messages[1].persona.as_deref(), Some("Scientist"));
        assert!(messages[2].persona.is_none());
    }

    #[tokio::test]
    async fn context_uses_trailing_window() {
        let orch = orchestrator();
        let a = ScriptedAgent::counting("a");
        let b = ScriptedAgent::counting("b");
        let contexts_a = Arc::clone(&a.contexts);
        let contexts_b = Arc::clone(&b.contexts);
        let conv = create(&orch, request(2, 2), a, b);
        let mut observer = RecordingObserver::new();
        orch.run(&conv.id(), &mut observer, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(*contexts_a.lock().unwrap(), vec!["hello", "a1 b1"]);
        assert_eq!(*contexts_b.lock().unwrap(), vec!["hello a1", "b1 a2"]);
    }

    #[tokio::test]
    async fn first_failure_aborts_without_agent_messages() {
        let orch = orchestrator();
        let conv = create(
            &orch,
            request(5, 8),
            ScriptedAgent::new("a", vec![Err(ProviderError::http_status(401, "bad key"))]),
            ScriptedAgent::counting("b"),
        );
        let mut observer = RecordingObserver::new();
        let status = orch
            .run(&conv.id(), &mut observer, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(status, ConversationStatus::Aborted);
        assert_eq!(observer.errors(), vec!["bad key"]);
        assert_eq!(observer.ends(), 1);
        assert!(matches!(observer.events.last(), Some(ConversationEvent::ConversationEnd)));
        assert_eq!(conv.messages().await.len(), 1);
        assert_eq!(conv.status().await, ConversationStatus::Aborted);
    }

    #[tokio::test]
    async fn side_b_failure_keeps_side_a_reply() {
        let orch = orchestrator();
        let conv = create(
            &orch,
            request(5, 8),
            ScriptedAgent::counting("a"),
            ScriptedAgent::new("b", vec![Err(ProviderError::empty_response("empty"))]),
        );
        let mut observer = RecordingObserver::new();
        orch.run(&conv.id(), &mut observer, CancellationToken::new())
            .await
            .unwrap();

        let senders: Vec<_> = conv.messages().await.iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::AgentA]);
        assert_eq!(observer.errors(), vec!["empty"]);
        assert_eq!(conv.rounds_completed().await, 0);
    }

    #[tokio::test]
    async fn observer_disconnect_stops_further_turns() {
        let orch = orchestrator();
        let a = ScriptedAgent::counting("a");
        let b = ScriptedAgent::counting("b");
        let contexts_b = Arc::clone(&b.contexts);
        let conv = create(&orch, request(10, 8), a, b);
        // Accepts the replayed starter, then the socket is gone.
        let mut observer = RecordingObserver::accepting(1);
        let status = orch
            .run(&conv.id(), &mut observer, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(status, ConversationStatus::Completed);
        assert!(contexts_b.lock().unwrap().is_empty());
        assert_eq!(conv.messages().await.len(), 2);
        assert_eq!(observer.ends(), 0);
    }

    #[tokio::test]
    async fn cancellation_stops_before_next_turn() {
        let orch = orchestrator();
        let conv = create(&orch, request(10, 8), ScriptedAgent::counting("a"), ScriptedAgent::counting("b"));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut observer = RecordingObserver::new();
        let status = orch.run(&conv.id(), &mut observer, cancel).await.unwrap();

        assert_eq!(status, ConversationStatus::Completed);
        assert_eq!(conv.messages().await.len(), 1);
        assert_eq!(observer.messages().len(), 1);
    }

    #[tokio::test]
    async fn unknown_conversation_reports_not_found() {
        let orch = orchestrator();
        let mut observer = RecordingObserver::new();
        let err = orch
            .run(&uuid::Uuid::now_v7(), &mut observer, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, ConversationError::NotFound);
        assert_eq!(observer.errors(), vec!["Conversation not found"]);
    }

    #[tokio::test]
    async fn finished_conversation_is_inactive() {
        let orch = orchestrator();
        let conv = create(&orch, request(1, 8), ScriptedAgent::counting("a"), ScriptedAgent::counting("b"));
        orch.run(&conv.id(), &mut RecordingObserver::new(), CancellationToken::new())
            .await
            .unwrap();

        let mut late = RecordingObserver::new();
        let err = orch
            .run(&conv.id(), &mut late, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, ConversationError::Inactive);
        assert_eq!(late.errors(), vec!["Conversation is inactive"]);
        assert!(late.messages().is_empty());
    }

    #[tokio::test]
    async fn second_observer_gets_history_then_error() {
        let orch = orchestrator();
        let conv = create(&orch, request(1, 8), ScriptedAgent::counting("a"), ScriptedAgent::counting("b"));
        // Simulate an observer that is still driving.
        let _agents = conv.claim().await.unwrap();

        let mut second = RecordingObserver::new();
        let err = orch
            .run(&conv.id(), &mut second, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, ConversationError::AlreadyStreaming);
        assert_eq!(second.messages().len(), 1);
        assert_eq!(second.errors(), vec!["Conversation is already streaming"]);
        assert_eq!(conv.status().await, ConversationStatus::Running);
    }

    #[tokio::test]
    async fn concurrent_conversations_are_isolated() {
        let orch = orchestrator();
        let first = create(&orch, request(2, 8), ScriptedAgent::counting("x"), ScriptedAgent::counting("y"));
        let second = create(
            &orch,
            request(2, 8),
            ScriptedAgent::new("p", vec![Err(ProviderError::transport("timeout"))]),
            ScriptedAgent::counting("q"),
        );

        let (first_id, second_id) = (first.id(), second.id());
        let mut first_observer = RecordingObserver::new();
        let mut second_observer = RecordingObserver::new();
        let (r1, r2) = tokio::join!(
            orch.run(&first_id, &mut first_observer, CancellationToken::new()),
            orch.run(&second_id, &mut second_observer, CancellationToken::new()),
        );
        assert_eq!(r1.unwrap(), ConversationStatus::Completed);
        assert_eq!(r2.unwrap(), ConversationStatus::Aborted);
        assert_eq!(first.messages().await.len(), 5);
        assert!(first.messages().await.iter().all(|m| !m.content.starts_with('p')));
        assert_eq!(second.messages().await.len(), 1);
    }
}
