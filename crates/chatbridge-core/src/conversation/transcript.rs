//! Markdown transcript export.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use chatbridge_types::conversation::Sender;

use super::state::ConversationSnapshot;

/// Render a conversation as a Markdown document.
pub fn render_markdown(snapshot: &ConversationSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Chat Bridge Transcript\n");
    let _ = writeln!(out, "**Session ID:** {}", snapshot.id);
    let _ = writeln!(out, "**Started:** {}", snapshot.created_at.to_rfc3339());
    let _ = writeln!(out, "**Starter Message:** {}", snapshot.starter_message);
    let _ = writeln!(
        out,
        "**Provider A:** {} ({})",
        snapshot.agent_a.provider, snapshot.agent_a.model
    );
    let _ = writeln!(
        out,
        "**Provider B:** {} ({})",
        snapshot.agent_b.provider, snapshot.agent_b.model
    );
    let _ = writeln!(out, "**Temperature A:** {}", snapshot.agent_a.temperature);
    let _ = writeln!(out, "**Temperature B:** {}", snapshot.agent_b.temperature);
    let _ = writeln!(out, "**Max Rounds:** {}\n", snapshot.settings.max_rounds);
    let _ = writeln!(out, "---\n");
    let _ = writeln!(out, "## Conversation\n");

    for (i, message) in snapshot.messages.iter().enumerate() {
        let _ = writeln!(
            out,
            "**Round {}** - {} ({})\n",
            i + 1,
            sender_heading(message.sender),
            message.timestamp.to_rfc3339()
        );
        let _ = writeln!(out, "{}\n", message.content);
        let _ = writeln!(out, "---\n");
    }
    out
}

/// Suggested download name, e.g. `transcript_<id>_20250101_120000.md`.
pub fn transcript_filename(snapshot: &ConversationSnapshot, now: DateTime<Utc>) -> String {
    format!("transcript_{}_{}.md", snapshot.id, now.format("%Y%m%d_%H%M%S"))
}

fn sender_heading(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "USER",
        Sender::AgentA => "AGENT A",
        Sender::AgentB => "AGENT B",
    }
}
