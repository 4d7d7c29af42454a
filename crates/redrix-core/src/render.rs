use std::sync::Mutex;

use redrix_model::{ImageAttachment, Role};

/// The surface the session renders into.  DOM, TUI, plain stdout — the
/// session does not care; it only pushes messages and a typing flag.
pub trait RenderSurface: Send + Sync {
    fn render_message(
        &self,
        role: Role,
        content: &str,
        model: Option<&str>,
        images: &[ImageAttachment],
    );

    fn render_typing(&self, show: bool);
}

/// Surface that discards everything.
#[derive(Default)]
pub struct NullRender;

impl RenderSurface for NullRender {
    fn render_message(&self, _: Role, _: &str, _: Option<&str>, _: &[ImageAttachment]) {}
    fn render_typing(&self, _: bool) {}
}

/// One captured render call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    pub role: Role,
    pub content: String,
    pub model: Option<String>,
    pub image_count: usize,
}

/// Surface that records every call, for assertions in tests.
#[derive(Default)]
pub struct RecordingRender {
    pub messages: Mutex<Vec<RenderedMessage>>,
    pub typing: Mutex<Vec<bool>>,
}

impl RenderSurface for RecordingRender {
    fn render_message(
        &self,
        role: Role,
        content: &str,
        model: Option<&str>,
        images: &[ImageAttachment],
    ) {
        self.messages.lock().unwrap().push(RenderedMessage {
            role,
            content: content.to_string(),
            model: model.map(str::to_string),
            image_count: images.len(),
        });
    }

    fn render_typing(&self, show: bool) {
        self.typing.lock().unwrap().push(show);
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
