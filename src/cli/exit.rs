/// Command outcome determining exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command completed (exit 0).
    Success,
    /// Playback stopped early, or nothing to show (exit 1).
    Partial,
    /// Refusal or CLI error (exit 2).
    Refusal,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Partial => 1,
            Outcome::Refusal => 2,
        }
    }
}
