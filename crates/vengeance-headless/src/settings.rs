use vengeance_core::entity::GameMode;

/// Frame driver settings, read from `VENGEANCE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessSettings {
    pub mode: GameMode,
    /// Frames per second; each frame advances the engine by `1000 / fps` ms.
    pub fps: u32,
    /// Stop after this much simulated time. `None` runs until game over.
    pub max_seconds: Option<f32>,
    /// Let the built-in autopilot drive every participating player.
    pub autopilot: bool,
}

impl Default for HeadlessSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::SinglePlayer,
            fps: 60,
            max_seconds: None,
            autopilot: true,
        }
    }
}

impl HeadlessSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Invalid values are logged and
    /// leave the default in place.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(val) = lookup("VENGEANCE_MODE") {
            match val.trim().to_ascii_lowercase().as_str() {
                "1p" | "single" => settings.mode = GameMode::SinglePlayer,
                "2p" | "two" => settings.mode = GameMode::TwoPlayer,
                other => tracing::warn!("Unknown VENGEANCE_MODE {other:?}, using 1p"),
            }
        }
        if let Some(val) = lookup("VENGEANCE_FPS") {
            match val.trim().parse::<u32>() {
                Ok(n) if (1..=1000).contains(&n) => settings.fps = n,
                _ => tracing::warn!("Invalid VENGEANCE_FPS {val:?}, using {}", settings.fps),
            }
        }
        if let Some(val) = lookup("VENGEANCE_MAX_SECONDS") {
            match val.trim().parse::<f32>() {
                Ok(n) if n.is_finite() && n > 0.0 => settings.max_seconds = Some(n),
                _ => tracing::warn!("Invalid VENGEANCE_MAX_SECONDS {val:?}, running to game over"),
            }
        }
        if let Some(val) = lookup("VENGEANCE_AUTOPILOT") {
            match val.trim() {
                "1" | "true" | "on" => settings.autopilot = true,
                "0" | "false" | "off" => settings.autopilot = false,
                _ => tracing::warn!("Invalid VENGEANCE_AUTOPILOT {val:?}, leaving it on"),
            }
        }

        settings
    }

    /// Simulated milliseconds per frame.
    pub fn frame_ms(&self) -> f32 {
        1000.0 / self.fps as f32
    }

    /// Frame budget implied by `max_seconds`.
    pub fn max_frames(&self) -> Option<u64> {
        self.max_seconds
            .map(|secs| (secs * self.fps as f32).ceil() as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let settings = HeadlessSettings::from_lookup(|_| None);
        assert_eq!(settings, HeadlessSettings::default());
        assert_eq!(settings.max_frames(), None);
    }

    #[test]
    fn reads_all_keys() {
        let settings = HeadlessSettings::from_lookup(lookup(&[
            ("VENGEANCE_MODE", "2P"),
            ("VENGEANCE_FPS", "100"),
            ("VENGEANCE_MAX_SECONDS", "2.5"),
            ("VENGEANCE_AUTOPILOT", "off"),
        ]));
        assert_eq!(settings.mode, GameMode::TwoPlayer);
        assert_eq!(settings.fps, 100);
        assert_eq!(settings.max_seconds, Some(2.5));
        assert!(!settings.autopilot);
        assert_eq!(settings.frame_ms(), 10.0);
        assert_eq!(settings.max_frames(), Some(250));
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let settings = HeadlessSettings::from_lookup(lookup(&[
            ("VENGEANCE_MODE", "3p"),
            ("VENGEANCE_FPS", "0"),
            ("VENGEANCE_MAX_SECONDS", "-1"),
            ("VENGEANCE_AUTOPILOT", "maybe"),
        ]));
        assert_eq!(settings, HeadlessSettings::default());
    }
}
