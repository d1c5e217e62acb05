//! Audio state structure and management

/// Background ambience volumes, 0.0 to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbienceLevels {
    /// Volume while the host page is visible
    pub visible: f32,
    /// Volume while the host page is hidden or backgrounded
    pub hidden: f32,
}

impl Default for AmbienceLevels {
    fn default() -> Self {
        Self {
            visible: 0.6,
            hidden: 0.0,
        }
    }
}

/// Mute and visibility flags driving chime and ambience output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioState {
    /// Silences both chimes and ambience
    pub muted: bool,
    /// Whether the host currently shows the timer
    pub visible: bool,
}

impl AudioState {
    /// Create a visible audio state
    pub fn new(muted: bool) -> Self {
        Self {
            muted,
            visible: true,
        }
    }

    /// Whether a due bell should actually be played
    pub fn chime_allowed(&self) -> bool {
        !self.muted
    }

    /// Ambience volume for the current flags. Silent unless the timer runs
    pub fn background_volume(&self, running: bool, levels: &AmbienceLevels) -> f32 {
        if !running || self.muted {
            0.0
        } else if self.visible {
            levels.visible
        } else {
            levels.hidden
        }
    }
}

impl Default for AudioState {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambience_follows_running_mute_and_visibility() {
        let levels = AmbienceLevels {
            visible: 0.8,
            hidden: 0.2,
        };
        let mut audio = AudioState::default();

        assert_eq!(audio.background_volume(false, &levels), 0.0);
        assert_eq!(audio.background_volume(true, &levels), 0.8);

        audio.visible = false;
        assert_eq!(audio.background_volume(true, &levels), 0.2);

        audio.muted = true;
        assert_eq!(audio.background_volume(true, &levels), 0.0);
        assert!(!audio.chime_allowed());
    }
}
