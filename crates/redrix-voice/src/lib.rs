//! Voice input/output adapter seam.
//!
//! The core never talks to a speech engine directly: the host platform
//! provides an implementation of [`VoiceAdapter`] and observes state changes
//! through typed [`VoiceEvent`]s instead of ad-hoc UI events.

mod adapter;
mod null;

pub use adapter::{SpeakOptions, VoiceAdapter, VoiceError, VoiceEvent, VoiceObserver};
pub use null::NullVoice;
