pub mod engine;
pub mod player;
pub mod rate;
pub mod voices;

pub use engine::{Engine, EngineKind, SpeechCommand, detect_engine};
pub use player::{PlaybackState, Player};
pub use rate::Rate;
pub use voices::{Voice, list_voices, resolve_voice};

/// What to say and how to say it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub rate: Rate,
    pub voice: Option<String>,
}

impl SpeechRequest {
    pub fn command_for(&self, engine: &Engine) -> SpeechCommand {
        engine.speak_command(&self.text, self.rate, self.voice.as_deref())
    }
}
