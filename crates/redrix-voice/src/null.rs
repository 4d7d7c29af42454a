use async_trait::async_trait;
use tracing::debug;

use crate::{SpeakOptions, VoiceAdapter, VoiceError, VoiceObserver};

/// Adapter for hosts without a speech engine.  Capability queries report
/// false and every operation fails with [`VoiceError::NotSupported`].
#[derive(Default)]
pub struct NullVoice;

#[async_trait]
impl VoiceAdapter for NullVoice {
    fn subscribe(&self, _observer: Box<dyn VoiceObserver>) {}

    async fn start_listening(&self) -> Result<String, VoiceError> {
        debug!("voice input requested but no speech engine is wired in");
        Err(VoiceError::NotSupported)
    }

    fn stop_listening(&self) {}

    async fn speak(&self, _text: &str, _options: SpeakOptions) -> Result<(), VoiceError> {
        Err(VoiceError::NotSupported)
    }

    fn stop_speaking(&self) {}

    fn is_listening(&self) -> bool {
        false
    }

    fn recognition_supported(&self) -> bool {
        false
    }

    fn synthesis_supported(&self) -> bool {
        false
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{VoiceEvent, VoiceObserver};

    #[tokio::test]
    async fn null_voice_rejects_listening() {
        let v = NullVoice;
        assert_eq!(v.start_listening().await.unwrap_err(), VoiceError::NotSupported);
    }

    #[tokio::test]
    async fn null_voice_rejects_speaking() {
        let v = NullVoice;
        let err = v.speak("hello", SpeakOptions::default()).await.unwrap_err();
        assert_eq!(err, VoiceError::NotSupported);
    }

    #[test]
    fn null_voice_reports_no_capabilities() {
        let v = NullVoice;
        assert!(!v.recognition_supported());
        assert!(!v.synthesis_supported());
        assert!(!v.is_listening());
    }

    #[test]
    fn null_voice_stop_calls_are_noops() {
        let v = NullVoice;
        v.stop_listening();
        v.stop_speaking();
        assert!(!v.is_listening());
    }

    #[test]
    fn closures_implement_the_observer_trait() {
        use std::sync::Mutex;
        let seen: Mutex<Vec<VoiceEvent>> = Mutex::new(Vec::new());
        let observer = |e: VoiceEvent| seen.lock().unwrap().push(e);
        observer.on_event(VoiceEvent::ListeningStarted);
        observer.on_event(VoiceEvent::Transcript("hi".into()));
        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], VoiceEvent::Transcript("hi".into()));
    }
}
