// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    catalog::ModelCatalogEntry, ChatMessage, CompletionBackend, CompletionError, CompletionReply,
    ImageAttachment,
};

/// Deterministic mock backend for tests.  Echoes the prompt back as the
/// assistant response.
#[derive(Default)]
pub struct EchoBackend;

#[async_trait]
impl CompletionBackend for EchoBackend {
    async fn complete(
        &self,
        prompt: &str,
        _history: &[ChatMessage],
        _images: &[ImageAttachment],
        model: &ModelCatalogEntry,
    ) -> Result<CompletionReply, CompletionError> {
        Ok(CompletionReply {
            content: format!("ECHO: {prompt}"),
            model: model.id.clone(),
            usage: None,
        })
    }
}

/// What a scripted backend saw on its most recent call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub history: Vec<ChatMessage>,
    pub image_count: usize,
    pub model_id: String,
}

/// A pre-scripted backend.  Each `complete` call pops the next result from
/// the front of the queue and records what was sent, so tests can specify
/// exact replies or failures and inspect the outgoing request.
pub struct ScriptedBackend {
    scripts: Mutex<Vec<Result<CompletionReply, CompletionError>>>,
    calls: AtomicUsize,
    pub last_call: Mutex<Option<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new(scripts: Vec<Result<CompletionReply, CompletionError>>) -> Self {
        Self {
            scripts: Mutex::new(scripts),
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// Convenience: backend that always returns the given text.
    pub fn always_text(reply: impl Into<String>) -> Self {
        let content = reply.into();
        Self::new(vec![Ok(CompletionReply {
            content,
            model: "scripted-model".into(),
            usage: None,
        })])
    }

    /// Convenience: backend whose first call fails with the given error.
    pub fn failing(err: CompletionError) -> Self {
        Self::new(vec![Err(err)])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        prompt: &str,
        history: &[ChatMessage],
        images: &[ImageAttachment],
        model: &ModelCatalogEntry,
    ) -> Result<CompletionReply, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_call.lock().unwrap() = Some(RecordedCall {
            prompt: prompt.to_string(),
            history: history.to_vec(),
            image_count: images.len(),
            model_id: model.id.clone(),
        });

        let mut scripts = self.scripts.lock().unwrap();
        if scripts.is_empty() {
            // Default fallback when all scripts are consumed
            return Ok(CompletionReply {
                content: "[no more scripts]".into(),
                model: model.id.clone(),
                usage: None,
            });
        }
        scripts.remove(0)
    }
}

/// A backend whose `complete` blocks until released.  Used to hold one send
/// in flight while a test issues a second one.
pub struct GatedBackend {
    reply: String,
    gate: tokio::sync::Semaphore,
    calls: AtomicUsize,
}

impl GatedBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            gate: tokio::sync::Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Allow one pending `complete` call to finish.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for GatedBackend {
    async fn complete(
        &self,
        _prompt: &str,
        _history: &[ChatMessage],
        _images: &[ImageAttachment],
        model: &ModelCatalogEntry,
    ) -> Result<CompletionReply, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _permit = self.gate.acquire().await.expect("gate closed");
        Ok(CompletionReply {
            content: self.reply.clone(),
            model: model.id.clone(),
            usage: None,
        })
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[tokio::test]
    async fn echo_backend_echoes_prompt() {
        let b = EchoBackend;
        let reply = b
            .complete("hi there", &[], &[], &catalog::default_model())
            .await
            .unwrap();
        assert_eq!(reply.content, "ECHO: hi there");
    }

    #[tokio::test]
    async fn scripted_backend_pops_in_order() {
        let b = ScriptedBackend::new(vec![
            Ok(CompletionReply {
                content: "first".into(),
                model: "m".into(),
                usage: None,
            }),
            Ok(CompletionReply {
                content: "second".into(),
                model: "m".into(),
                usage: None,
            }),
        ]);
        let m = catalog::default_model();
        assert_eq!(b.complete("a", &[], &[], &m).await.unwrap().content, "first");
        assert_eq!(
            b.complete("b", &[], &[], &m).await.unwrap().content,
            "second"
        );
        assert_eq!(b.call_count(), 2);
    }

    #[tokio::test]
    async fn scripted_backend_records_last_call() {
        let b = ScriptedBackend::always_text("ok");
        let history = vec![ChatMessage::user("old", None)];
        let m = catalog::default_model();
        b.complete("new prompt", &history, &[], &m).await.unwrap();

        let call = b.last_call.lock().unwrap().clone().unwrap();
        assert_eq!(call.prompt, "new prompt");
        assert_eq!(call.history.len(), 1);
        assert_eq!(call.image_count, 0);
        assert_eq!(call.model_id, m.id);
    }

    #[tokio::test]
    async fn scripted_backend_fallback_after_exhaustion() {
        let b = ScriptedBackend::new(vec![]);
        let reply = b
            .complete("x", &[], &[], &catalog::default_model())
            .await
            .unwrap();
        assert!(reply.content.contains("no more scripts"));
    }

    #[tokio::test]
    async fn gated_backend_blocks_until_released() {
        use std::sync::Arc;
        let b = Arc::new(GatedBackend::new("done"));
        let m = catalog::default_model();

        let b2 = Arc::clone(&b);
        let m2 = m.clone();
        let task = tokio::spawn(async move { b2.complete("x", &[], &[], &m2).await });

        // Wait for the call to register, then confirm it has not completed.
        while b.call_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());

        b.release();
        let reply = task.await.unwrap().unwrap();
        assert_eq!(reply.content, "done");
    }
}
