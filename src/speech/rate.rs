use std::fmt;
use std::str::FromStr;

/// Speaking rate as a multiplier of the engine's normal speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate(f64);

impl Rate {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 3.0;
    pub const NORMAL: Rate = Rate(1.0);
    pub const PRESETS: [f64; 4] = [1.0, 1.2, 1.5, 2.0];

    /// Words per minute at 1.0x.
    pub const BASE_WPM: f64 = 200.0;

    pub fn new(multiplier: f64) -> Result<Self, String> {
        if !multiplier.is_finite() || !(Self::MIN..=Self::MAX).contains(&multiplier) {
            return Err(format!(
                "rate {multiplier} out of range: expected {} to {} (presets: 1.0, 1.2, 1.5, 2.0)",
                Self::MIN,
                Self::MAX
            ));
        }
        Ok(Self(multiplier))
    }

    pub fn multiplier(self) -> f64 {
        self.0
    }

    /// Rate in words per minute for engines that take an absolute speed.
    pub fn words_per_minute(self) -> u32 {
        (Self::BASE_WPM * self.0).round() as u32
    }

    /// Relative rate on the speech-dispatcher scale (-100..=100, 0 is normal).
    pub fn speech_dispatcher(self) -> i32 {
        (((self.0 - 1.0) * 100.0).round() as i32).clamp(-100, 100)
    }

    /// Relative rate on the SAPI scale (-10..=10, 0 is normal).
    pub fn sapi(self) -> i32 {
        (((self.0 - 1.0) * 10.0).round() as i32).clamp(-10, 10)
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl FromStr for Rate {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim().trim_end_matches(['x', 'X']);
        let multiplier: f64 = trimmed
            .parse()
            .map_err(|error| format!("invalid rate '{value}': {error}"))?;
        Rate::new(multiplier)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x", self.0)
    }
}
