// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use thiserror::Error;

/// Why a voice operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    #[error("speech is not supported on this platform")]
    NotSupported,

    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("no speech detected")]
    NoSpeech,

    #[error("voice error: {0}")]
    Other(String),
}

/// State-change notification emitted by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    ListeningStarted,
    ListeningEnded,
    Transcript(String),
    Error(String),
}

/// Observer for [`VoiceEvent`]s.  Hosts register one to drive their UI
/// (e.g. a recording indicator) without polling.
pub trait VoiceObserver: Send + Sync {
    fn on_event(&self, event: VoiceEvent);
}

impl<F> VoiceObserver for F
where
    F: Fn(VoiceEvent) + Send + Sync,
{
    fn on_event(&self, event: VoiceEvent) {
        self(event)
    }
}

/// Synthesis options.
#[derive(Debug, Clone, Default)]
pub struct SpeakOptions {
    /// Playback rate multiplier; `None` uses the engine default.
    pub rate: Option<f32>,
    /// Preferred voice name; `None` lets the engine choose.
    pub voice: Option<String>,
}

/// Speech-to-text and text-to-speech, exposed as awaitable operations.
#[async_trait]
pub trait VoiceAdapter: Send + Sync {
    /// Register an observer for state changes.  Implementations emit
    /// `ListeningStarted`/`ListeningEnded` around each listen cycle and
    /// `Transcript`/`Error` as results arrive.
    fn subscribe(&self, observer: Box<dyn VoiceObserver>);

    /// Listen for one utterance and resolve with its transcript.
    async fn start_listening(&self) -> Result<String, VoiceError>;

    /// Abort an in-progress listen.
    fn stop_listening(&self);

    /// Speak the given text to completion.
    async fn speak(&self, text: &str, options: SpeakOptions) -> Result<(), VoiceError>;

    /// Abort in-progress synthesis.
    fn stop_speaking(&self);

    fn is_listening(&self) -> bool;

    fn recognition_supported(&self) -> bool;

    fn synthesis_supported(&self) -> bool;
}
