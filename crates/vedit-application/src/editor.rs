//! Edit orchestration.
//!
//! `ImageEditor` owns the edit history of the open image, the pending
//! instruction text and the last user-visible error, and drives one
//! refine-then-edit round trip at a time against a [`RemoteEditClient`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use vedit_core::{
    EditHistory, HistoryEntry, InlineImage, OUTPUT_MIME_TYPE, RemoteEditClient, Result,
    VeditError, parse_data_url,
};

use crate::request_gate::RequestGate;

const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Why a generate call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyInstruction,
    NoImage,
    Busy,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInstruction => write!(f, "Type or say an instruction first."),
            Self::NoImage => write!(f, "Open an image first."),
            Self::Busy => write!(f, "An edit is already in progress."),
        }
    }
}

/// Result of one [`ImageEditor::generate`] call.
#[derive(Debug, Clone)]
pub enum GenerateOutcome {
    /// A new entry was recorded and is now current.
    Completed(HistoryEntry),
    /// The edit failed; `message` is also kept as the editor's error.
    Failed { message: String },
    /// Nothing was sent.
    Ignored(IgnoreReason),
}

/// Everything a front end needs to render the editor.
#[derive(Debug, Clone, Serialize)]
pub struct EditorSnapshot {
    pub entries: Vec<HistoryEntry>,
    pub current_index: Option<usize>,
    pub instruction: String,
    pub busy: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct EditorState {
    history: Option<EditHistory>,
    instruction: String,
    error: Option<String>,
}

/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct ImageEditor {
    client: Arc<dyn RemoteEditClient>,
    state: Arc<RwLock<EditorState>>,
    gate: Arc<RequestGate>,
}

impl ImageEditor {
    pub fn new(client: Arc<dyn RemoteEditClient>) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(EditorState::default())),
            gate: Arc::new(RequestGate::new()),
        }
    }

    /// Starts a new history from `image_url`, replacing any open image.
    ///
    /// Rejected while an edit is outstanding.
    pub async fn open_image(&self, image_url: impl Into<String>) -> Result<()> {
        let Some(_ticket) = self.gate.try_begin() else {
            return Err(VeditError::validation(
                "Wait for the current edit to finish before opening another image.",
            ));
        };

        let mut state = self.state.write().await;
        state.history = Some(EditHistory::seed(image_url));
        state.instruction.clear();
        state.error = None;
        info!("opened image");
        Ok(())
    }

    /// Replaces the pending instruction with typed text.
    pub async fn set_instruction(&self, text: impl Into<String>) {
        self.state.write().await.instruction = text.into();
    }

    /// Replaces the pending instruction with a voice transcript.
    ///
    /// Never starts a request, even if none is outstanding.
    pub async fn apply_transcript(&self, transcript: impl Into<String>) {
        let transcript = transcript.into();
        debug!(chars = transcript.len(), busy = self.is_busy(), "voice transcript received");
        self.state.write().await.instruction = transcript;
    }

    pub async fn instruction(&self) -> String {
        self.state.read().await.instruction.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn dismiss_error(&self) {
        self.state.write().await.error = None;
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub async fn current_entry(&self) -> Option<HistoryEntry> {
        let state = self.state.read().await;
        state.history.as_ref().map(|history| history.current().clone())
    }

    /// Moves the current position to `index`.
    pub async fn select_entry(&self, index: usize) -> Result<HistoryEntry> {
        let mut state = self.state.write().await;
        let history = state
            .history
            .as_mut()
            .ok_or_else(|| VeditError::validation(IgnoreReason::NoImage.to_string()))?;
        history.select_entry(index).cloned()
    }

    /// Moves one entry towards the original.
    pub async fn step_back(&self) -> Result<HistoryEntry> {
        self.step(
            EditHistory::can_step_back,
            |index| index - 1,
            "Already at the original image.",
        )
        .await
    }

    /// Moves one entry towards the latest edit.
    pub async fn step_forward(&self) -> Result<HistoryEntry> {
        self.step(
            EditHistory::can_step_forward,
            |index| index + 1,
            "Already at the latest edit.",
        )
        .await
    }

    async fn step(
        &self,
        can_step: fn(&EditHistory) -> bool,
        target: fn(usize) -> usize,
        at_end: &str,
    ) -> Result<HistoryEntry> {
        let mut state = self.state.write().await;
        let history = state
            .history
            .as_mut()
            .ok_or_else(|| VeditError::validation(IgnoreReason::NoImage.to_string()))?;
        if !can_step(history) {
            return Err(VeditError::validation(at_end));
        }
        let index = target(history.current_index());
        history.select_entry(index).cloned()
    }

    pub async fn snapshot(&self) -> EditorSnapshot {
        let state = self.state.read().await;
        EditorSnapshot {
            entries: state
                .history
                .as_ref()
                .map(|history| history.entries().to_vec())
                .unwrap_or_default(),
            current_index: state.history.as_ref().map(EditHistory::current_index),
            instruction: state.instruction.clone(),
            busy: self.gate.is_busy(),
            error: state.error.clone(),
        }
    }

    /// Runs one refine-then-edit round trip for the pending instruction.
    ///
    /// The result is appended after the entry that was current when the call
    /// started. Failures never escape: they are stored as the editor's error
    /// and reported through [`GenerateOutcome::Failed`].
    pub async fn generate(&self) -> GenerateOutcome {
        let Some(_ticket) = self.gate.try_begin() else {
            return GenerateOutcome::Ignored(IgnoreReason::Busy);
        };

        let (instruction, base_index, image_url) = {
            let mut state = self.state.write().await;
            let instruction = state.instruction.trim().to_string();
            if instruction.is_empty() {
                return GenerateOutcome::Ignored(IgnoreReason::EmptyInstruction);
            }
            let Some(history) = state.history.as_ref() else {
                return GenerateOutcome::Ignored(IgnoreReason::NoImage);
            };
            let base_index = history.current_index();
            let image_url = history.current().image_url().to_string();
            state.error = None;
            (instruction, base_index, image_url)
        };

        debug!(%instruction, base_index, "starting edit");
        let refined = self.refine_or_fallback(&instruction).await;

        let result = match self.request_edit(&image_url, &refined).await {
            Ok(data) => {
                let new_url = InlineImage::new(OUTPUT_MIME_TYPE, data).to_data_url();
                let mut state = self.state.write().await;
                Self::commit(&mut state, base_index, &instruction, new_url)
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(entry) => {
                info!(entry_id = %entry.id(), "edit completed");
                GenerateOutcome::Completed(entry)
            }
            Err(err) => {
                let message = match err.to_string() {
                    message if message.trim().is_empty() => FALLBACK_ERROR_MESSAGE.to_string(),
                    message => message,
                };
                error!(error = %message, "edit failed");
                self.state.write().await.error = Some(message.clone());
                GenerateOutcome::Failed { message }
            }
        }
    }

    async fn refine_or_fallback(&self, instruction: &str) -> String {
        match self.client.refine(instruction).await {
            Ok(refined) if !refined.trim().is_empty() => {
                let refined = refined.trim().to_string();
                debug!(%refined, "instruction refined");
                refined
            }
            Ok(_) => {
                warn!("refinement returned nothing, using original instruction");
                instruction.to_string()
            }
            Err(err) => {
                warn!(error = %err, "refinement failed, using original instruction");
                instruction.to_string()
            }
        }
    }

    async fn request_edit(&self, image_url: &str, instruction: &str) -> Result<String> {
        let image = parse_data_url(image_url)?;
        self.client.edit(&image, instruction).await
    }

    fn commit(
        state: &mut EditorState,
        base_index: usize,
        instruction: &str,
        image_url: String,
    ) -> Result<HistoryEntry> {
        let history = state
            .history
            .as_mut()
            .ok_or_else(|| VeditError::internal("image closed during edit"))?;
        history.select_entry(base_index)?;
        let entry = history.record_edit(instruction, image_url).clone();
        state.instruction.clear();
        Ok(entry)
    }
}
