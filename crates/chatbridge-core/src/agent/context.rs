//! Context-window construction for agent turns.

use chatbridge_types::conversation::BridgeMessage;

/// Join the contents of the last `window` messages with single spaces.
///
/// Sender labels are not included. A window of zero places no bound on the
/// history.
pub fn build_context(messages: &[BridgeMessage], window: usize) -> String {
    let start = if window == 0 {
        0
    } else {
        messages.len().saturating_sub(window)
    };
    messages[start..]
        .iter()
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
