//! Conversation session orchestration.
//!
//! One [`ChatSession`] owns the in-memory transcript, the active model, and
//! the single-flight send cycle: persist the user turn, call the completion
//! backend with a pre-send history snapshot, persist the reply, and surface
//! failures as visible transcript entries.  Collaborators (store, backend,
//! render surface) are injected at construction.

mod error;
mod render;
mod session;
mod transcript;

pub use error::SessionError;
pub use render::{NullRender, RecordingRender, RenderSurface, RenderedMessage};
pub use session::{ChatSession, SendOutcome};
pub use transcript::render_transcript;
