//! Voice capture backed by an external speech-to-text program.
//!
//! The configured command is spawned once per activation; whatever it prints
//! on stdout (trimmed) is the transcript.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};
use vedit_core::config::VoiceConfig;
use vedit_core::{Result, UnsupportedVoiceCapture, VeditError, VoiceCapture};

pub struct CommandVoiceCapture {
    program: String,
    args: Vec<String>,
    listening: AtomicBool,
}

impl CommandVoiceCapture {
    /// Returns `None` when `command` is empty.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            listening: AtomicBool::new(false),
        })
    }
}

/// Resets the listening flag when an activation ends, however it ends.
struct ListeningGuard<'a>(&'a AtomicBool);

impl Drop for ListeningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[async_trait]
impl VoiceCapture for CommandVoiceCapture {
    fn is_supported(&self) -> bool {
        true
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    async fn listen(&self) -> Result<Option<String>> {
        if self
            .listening
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(VeditError::voice("Already listening"));
        }
        let _guard = ListeningGuard(&self.listening);

        debug!(program = %self.program, "starting voice capture");
        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                VeditError::voice(format!("Failed to run '{}': {err}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "voice capture command failed");
            return Err(VeditError::voice(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(chars = transcript.len(), "voice capture finished");
        Ok((!transcript.is_empty()).then_some(transcript))
    }
}

/// Builds the capture backend described by the configuration.
pub fn voice_capture_from_config(config: &VoiceConfig) -> Arc<dyn VoiceCapture> {
    match CommandVoiceCapture::new(&config.command) {
        Some(capture) => Arc::new(capture),
        None => Arc::new(UnsupportedVoiceCapture),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn command(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_command_is_unsupported() {
        assert!(CommandVoiceCapture::new(&[]).is_none());
        let capture = voice_capture_from_config(&VoiceConfig::default());
        assert!(!capture.is_supported());

        let capture = voice_capture_from_config(&VoiceConfig {
            command: command(&["echo"]),
        });
        assert!(capture.is_supported());
    }

    #[tokio::test]
    async fn test_stdout_becomes_transcript() {
        let capture = CommandVoiceCapture::new(&command(&["echo", "remove the background"])).unwrap();
        let transcript = capture.listen().await.unwrap();
        assert_eq!(transcript.as_deref(), Some("remove the background"));
        assert!(!capture.is_listening());
    }

    #[tokio::test]
    async fn test_silence_yields_no_transcript() {
        let capture = CommandVoiceCapture::new(&command(&["true"])).unwrap();
        assert_eq!(capture.listen().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failing_command_is_voice_error() {
        let capture = CommandVoiceCapture::new(&command(&["sh", "-c", "echo nope >&2; exit 3"])).unwrap();
        let err = capture.listen().await.unwrap_err();
        assert!(matches!(err, VeditError::Voice(_)));
        assert!(err.to_string().contains("nope"));
        assert!(!capture.is_listening());
    }

    #[tokio::test]
    async fn test_second_activation_is_rejected_while_listening() {
        let capture = Arc::new(
            CommandVoiceCapture::new(&command(&["sh", "-c", "sleep 0.5; echo hello"])).unwrap(),
        );

        let first = tokio::spawn({
            let capture = Arc::clone(&capture);
            async move { capture.listen().await }
        });

        while !capture.is_listening() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(matches!(capture.listen().await, Err(VeditError::Voice(_))));

        let transcript = first.await.unwrap().unwrap();
        assert_eq!(transcript.as_deref(), Some("hello"));
        assert!(!capture.is_listening());
    }

    #[tokio::test]
    async fn test_cancelled_listen_resets_listening() {
        let capture = Arc::new(CommandVoiceCapture::new(&command(&["sleep", "30"])).unwrap());

        let pending = tokio::spawn({
            let capture = Arc::clone(&capture);
            async move { capture.listen().await }
        });
        while !capture.is_listening() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert!(!capture.is_listening());
    }
}
