// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use redrix_model::{
    catalog, ChatMessage, CompletionBackend, ImageAttachment, ModelCatalogEntry, Role,
};
use redrix_store::StoreCoordinator;

use crate::{RenderSurface, SessionError};

/// Content recorded for a user turn that carries only images.
const IMAGES_PLACEHOLDER: &str = "[Images uploaded]";
/// Prompt sent to the model when the user typed nothing alongside images.
const DESCRIBE_IMAGES_PROMPT: &str = "Please describe these images.";
/// Model tag attached to error entries in the transcript.
const SYSTEM_MODEL_TAG: &str = "system";

/// How a `send` call was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The full cycle ran and both turns are in the transcript.
    Sent,
    /// The completion failed; the error is visible in the render surface and
    /// the in-memory transcript is unchanged.
    Failed,
    /// Empty input with no attachments — nothing to do.
    Ignored,
    /// Another send is still in flight; this call was a no-op.
    Busy,
}

struct SessionState {
    transcript: Vec<ChatMessage>,
    current_model: ModelCatalogEntry,
    /// Manual selection remembered across an image-driven auto-switch.
    remembered_model: Option<String>,
    images: Vec<ImageAttachment>,
}

/// One conversation: transcript, model selection, and the send cycle.
pub struct ChatSession {
    store: StoreCoordinator,
    backend: Arc<dyn CompletionBackend>,
    surface: Arc<dyn RenderSurface>,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on every exit path of a send cycle.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ChatSession {
    pub fn new(
        store: StoreCoordinator,
        backend: Arc<dyn CompletionBackend>,
        surface: Arc<dyn RenderSurface>,
    ) -> Self {
        Self {
            store,
            backend,
            surface,
            state: Mutex::new(SessionState {
                transcript: Vec::new(),
                current_model: catalog::default_model(),
                remembered_model: None,
                images: Vec::new(),
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &StoreCoordinator {
        &self.store
    }

    // ── Model selection ──────────────────────────────────────────────────────

    pub fn current_model(&self) -> ModelCatalogEntry {
        self.state.lock().unwrap().current_model.clone()
    }

    /// Whether the active model is the result of an image-driven auto-switch.
    pub fn auto_switched(&self) -> bool {
        self.state.lock().unwrap().remembered_model.is_some()
    }

    /// Manually select a model.  Always clears the remembered prior model.
    pub fn select_model(&self, id: &str) -> Result<ModelCatalogEntry, SessionError> {
        let entry = catalog::lookup(id).ok_or_else(|| SessionError::UnknownModel(id.into()))?;
        let mut st = self.state.lock().unwrap();
        info!(model = %entry.id, "model selected");
        st.current_model = entry.clone();
        st.remembered_model = None;
        Ok(entry)
    }

    // ── Attachments ──────────────────────────────────────────────────────────

    pub fn attach_image(&self, image: ImageAttachment) {
        let mut st = self.state.lock().unwrap();
        st.images.push(image);
        Self::auto_switch(&mut st);
    }

    /// Remove one attachment by index.  Returns false when out of range.
    pub fn remove_image(&self, index: usize) -> bool {
        let mut st = self.state.lock().unwrap();
        if index >= st.images.len() {
            return false;
        }
        st.images.remove(index);
        Self::auto_switch(&mut st);
        true
    }

    pub fn clear_images(&self) {
        let mut st = self.state.lock().unwrap();
        st.images.clear();
        Self::auto_switch(&mut st);
    }

    pub fn images(&self) -> Vec<ImageAttachment> {
        self.state.lock().unwrap().images.clone()
    }

    /// Recompute the active model from the attachment state.
    ///
    /// Images present + text-only model → remember the current selection
    /// (only when the slot is empty, so repeated attachments stay idempotent)
    /// and switch to the first vision model.  No images + a remembered
    /// selection → restore it and clear the slot.
    fn auto_switch(st: &mut SessionState) {
        if !st.images.is_empty() {
            if st.current_model.supports_images {
                return;
            }
            let Some(vision) = catalog::first_vision_model() else {
                return;
            };
            if st.remembered_model.is_none() {
                st.remembered_model = Some(st.current_model.id.clone());
            }
            info!(from = %st.current_model.id, to = %vision.id, "auto-switching to vision model");
            st.current_model = vision;
        } else if let Some(prior) = st.remembered_model.take() {
            if let Some(entry) = catalog::lookup(&prior) {
                info!(model = %entry.id, "restoring model after image removal");
                st.current_model = entry;
            }
        }
    }

    // ── Transcript ───────────────────────────────────────────────────────────

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.state.lock().unwrap().transcript.clone()
    }

    /// Populate the in-memory transcript from the store and re-render it.
    pub async fn load_history(&self, limit: usize) -> Result<usize, SessionError> {
        let history = self.store.fetch_history(limit).await?;
        for msg in &history {
            self.surface
                .render_message(msg.role, &msg.content, msg.model.as_deref(), &[]);
        }
        let count = history.len();
        self.state.lock().unwrap().transcript = history;
        Ok(count)
    }

    /// Clear the persisted history and the in-memory transcript.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.store.clear_all().await?;
        self.state.lock().unwrap().transcript.clear();
        Ok(())
    }

    /// Render the full persisted history as a downloadable transcript.
    pub async fn export_transcript(&self) -> Result<String, SessionError> {
        let history = self.store.fetch_all_for_export().await?;
        Ok(crate::render_transcript(&history))
    }

    // ── Send cycle ───────────────────────────────────────────────────────────

    /// Run one send cycle: persist the user turn, call the backend with the
    /// pre-send history snapshot, persist the reply on success.  A completion
    /// failure becomes a visible transcript entry; only a local storage
    /// failure is an `Err`.
    pub async fn send(&self, text: &str) -> Result<SendOutcome, SessionError> {
        let text = text.trim();

        let (images, model, history) = {
            let st = self.state.lock().unwrap();
            if text.is_empty() && st.images.is_empty() {
                return Ok(SendOutcome::Ignored);
            }
            (
                st.images.clone(),
                st.current_model.clone(),
                st.transcript.clone(),
            )
        };

        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("send already in flight, ignoring");
            return Ok(SendOutcome::Busy);
        }
        let _guard = FlightGuard(&self.in_flight);

        let user_content = if text.is_empty() {
            IMAGES_PLACEHOLDER.to_string()
        } else {
            text.to_string()
        };
        self.surface
            .render_message(Role::User, &user_content, None, &images);
        let user_msg = self
            .store
            .save(Role::User, &user_content, Some(model.id.clone()))
            .await?;

        self.surface.render_typing(true);
        let prompt = if text.is_empty() {
            DESCRIBE_IMAGES_PROMPT
        } else {
            text
        };
        let result = self.backend.complete(prompt, &history, &images, &model).await;
        self.surface.render_typing(false);

        match result {
            Ok(reply) => {
                self.surface.render_message(
                    Role::Assistant,
                    &reply.content,
                    Some(&reply.model),
                    &[],
                );
                let assistant_msg = self
                    .store
                    .save(Role::Assistant, &reply.content, Some(reply.model.clone()))
                    .await?;

                let mut st = self.state.lock().unwrap();
                st.transcript.push(user_msg);
                st.transcript.push(assistant_msg);
                st.images.clear();
                Self::auto_switch(&mut st);
                Ok(SendOutcome::Sent)
            }
            Err(e) => {
                warn!(error = %e, "completion failed");
                self.surface.render_message(
                    Role::Assistant,
                    &format!("Error: {e}"),
                    Some(SYSTEM_MODEL_TAG),
                    &[],
                );
                Ok(SendOutcome::Failed)
            }
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
