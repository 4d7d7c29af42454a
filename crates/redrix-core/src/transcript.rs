use chrono::Utc;

use redrix_model::{ChatMessage, Role};

/// Render the full history as a plain-text transcript for download.
pub fn render_transcript(messages: &[ChatMessage]) -> String {
    let mut out = format!(
        "AI Assistant Chat Transcript\nGenerated: {}\nTotal Messages: {}\n\n{}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        messages.len(),
        "=".repeat(50),
    );

    for msg in messages {
        let who = match (msg.role, msg.model.as_deref()) {
            (Role::User, _) => "You".to_string(),
            (Role::Assistant, Some(model)) => format!("AI ({model})"),
            (Role::Assistant, None) => "AI".to_string(),
        };
        out.push_str(&format!(
            "[{}] {}:\n{}\n\n",
            msg.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            who,
            msg.content,
        ));
    }

    out
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
