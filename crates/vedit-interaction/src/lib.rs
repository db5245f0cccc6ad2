pub mod gemini_api_client;
pub mod prompts;
pub mod voice_capture;

pub use gemini_api_client::GeminiApiClient;
pub use voice_capture::{CommandVoiceCapture, voice_capture_from_config};
