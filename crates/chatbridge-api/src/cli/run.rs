//! `chatbridge run`: drive a conversation headlessly with a terminal observer.

use anyhow::Result;
use clap::Args;
use console::style;
use tokio_util::sync::CancellationToken;

use chatbridge_core::conversation::observer::{ConversationObserver, ObserverClosed};
use chatbridge_core::conversation::orchestrator::{ConversationRequest, SideRequest};
use chatbridge_types::conversation::{
    BridgeMessage, ConversationEvent, ConversationSettings, Sender, Side,
};

use crate::state::AppState;

#[derive(Args)]
pub struct RunArgs {
    /// Opening message handed to agent A.
    pub starter: String,

    /// Provider for agent A (e.g. openai, anthropic, ollama).
    #[arg(long)]
    pub provider_a: String,

    /// Provider for agent B.
    #[arg(long)]
    pub provider_b: String,

    #[arg(long)]
    pub model_a: Option<String>,

    #[arg(long)]
    pub model_b: Option<String>,

    #[arg(long, default_value = "0.7")]
    pub temperature_a: f64,

    #[arg(long, default_value = "0.7")]
    pub temperature_b: f64,

    /// Persona key from roles.json for agent A; overrides the side settings.
    #[arg(long)]
    pub persona_a: Option<String>,

    #[arg(long)]
    pub persona_b: Option<String>,

    /// Number of A-then-B rounds (defaults to the config value).
    #[arg(long)]
    pub max_rounds: Option<u32>,

    /// Trailing messages included in each turn's context.
    #[arg(long)]
    pub mem_rounds: Option<usize>,
}

/// Prints events as they arrive; never disconnects.
pub struct TerminalObserver {
    json: bool,
}

impl TerminalObserver {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn print_message(message: &BridgeMessage) {
        let who = match message.sender {
            Sender::User => style("USER".to_string()).cyan().bold(),
            Sender::AgentA => style(agent_heading("AGENT A", message)).green().bold(),
            Sender::AgentB => style(agent_heading("AGENT B", message)).magenta().bold(),
        };
        println!();
        println!(
            "  {} {}",
            who,
            style(message.timestamp.format("%H:%M:%S").to_string()).dim()
        );
        for line in message.content.lines() {
            println!("  {line}");
        }
    }
}

fn agent_heading(seat: &str, message: &BridgeMessage) -> String {
    match &message.persona {
        Some(persona) => format!("{seat} ({persona})"),
        None => seat.to_string(),
    }
}

impl ConversationObserver for TerminalObserver {
    async fn send(&mut self, event: ConversationEvent) -> Result<(), ObserverClosed> {
        if self.json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(err) => tracing::warn!("Failed to serialize ConversationEvent: {err}"),
            }
            return Ok(());
        }

        match &event {
            ConversationEvent::Message(message) => Self::print_message(message),
            ConversationEvent::Error(detail) => {
                println!();
                println!("  {} {}", style("✗").red().bold(), style(detail).red());
            }
            ConversationEvent::ConversationEnd => {
                println!();
                println!("  {}", style("Conversation finished.").dim());
            }
        }
        Ok(())
    }
}

pub async fn run_conversation(state: &AppState, args: RunArgs, json: bool) -> Result<()> {
    if args.starter.trim().is_empty() {
        anyhow::bail!("starter message must not be empty");
    }

    let defaults = &state.config.conversation;
    let agent_a = state.personas.resolve_side(
        args.persona_a.as_deref(),
        SideRequest {
            provider: args.provider_a,
            model: args.model_a,
            temperature: args.temperature_a,
            system_prompt: None,
            persona: None,
        },
    );
    let agent_b = state.personas.resolve_side(
        args.persona_b.as_deref(),
        SideRequest {
            provider: args.provider_b,
            model: args.model_b,
            temperature: args.temperature_b,
            system_prompt: None,
            persona: None,
        },
    );

    let conversation = state.orchestrator.create_conversation(
        ConversationRequest {
            agent_a,
            agent_b,
            starter_message: args.starter,
            settings: ConversationSettings {
                max_rounds: args.max_rounds.unwrap_or(defaults.default_max_rounds),
                memory_window: args.mem_rounds.unwrap_or(defaults.default_memory_window),
            },
        },
        state.factory.as_ref(),
        state.env.as_ref(),
    )?;

    if !json {
        let a = conversation.agent_config(Side::A);
        let b = conversation.agent_config(Side::B);
        println!();
        println!(
            "  {} {} ({}) {} {} ({})",
            style("Bridging").bold(),
            style(a.provider).green(),
            a.model,
            style("<->").dim(),
            style(b.provider).magenta(),
            b.model
        );
        println!("  {}", style("Press Ctrl+C to stop").dim());
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut observer = TerminalObserver::new(json);
    let status = state
        .orchestrator
        .run(&conversation.id(), &mut observer, cancel)
        .await?;
    tracing::info!(conversation_id = %conversation.id(), %status, "conversation ended");
    Ok(())
}
