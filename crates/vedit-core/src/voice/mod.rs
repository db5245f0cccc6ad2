//! Voice capture contract.
//!
//! Speech recognition itself happens outside this crate. A capture backend
//! only reports whether it can listen at all, whether it is listening right
//! now, and hands back at most one transcript per activation.

use async_trait::async_trait;

use crate::error::{Result, VeditError};

#[async_trait]
pub trait VoiceCapture: Send + Sync {
    /// Whether this environment can capture speech at all.
    fn is_supported(&self) -> bool;

    /// Whether an activation is currently in progress.
    fn is_listening(&self) -> bool;

    /// Runs one activation.
    ///
    /// Returns `Ok(None)` when nothing was recognized. Starting a second
    /// activation while one is running is an error.
    async fn listen(&self) -> Result<Option<String>>;
}

/// Capture backend for environments without speech support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedVoiceCapture;

#[async_trait]
impl VoiceCapture for UnsupportedVoiceCapture {
    fn is_supported(&self) -> bool {
        false
    }

    fn is_listening(&self) -> bool {
        false
    }

    async fn listen(&self) -> Result<Option<String>> {
        Err(VeditError::voice(
            "Voice recognition is not supported in this environment.",
        ))
    }
}
