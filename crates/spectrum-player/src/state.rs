use std::fmt;

use crate::error::PlayerError;

/// Where the player is in its select → fade → swap → play cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// Nothing has been played yet.
    #[default]
    Initial,
    /// Bars and backdrop follow the analyser.
    Playing,
    /// Bars and volume decay while the next album waits for its swap.
    Fadeout,
    /// The last swap could not produce playable media.
    Failed,
}

impl PlaybackState {
    pub const ALL: [PlaybackState; 4] = [Self::Initial, Self::Playing, Self::Fadeout, Self::Failed];

    /// Class name mirrored on `<body>` for page styling.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Playing => "playing",
            Self::Fadeout => "fadeout",
            Self::Failed => "failed",
        }
    }

    pub fn can_transition(self, to: PlaybackState) -> bool {
        use PlaybackState::{Failed, Fadeout, Initial, Playing};
        matches!(
            (self, to),
            (Initial | Fadeout | Failed, Playing)
                | (Playing, Fadeout)
                | (Initial | Playing | Fadeout, Failed)
        )
    }

    /// Validated transition; leaves `self` untouched when the move is illegal.
    pub fn transition(&mut self, to: PlaybackState) -> Result<PlaybackState, PlayerError> {
        if !self.can_transition(to) {
            return Err(PlayerError::IllegalTransition { from: *self, to });
        }
        let from = std::mem::replace(self, to);
        Ok(from)
    }

    /// Whether a click on the picker should be acted on.
    pub fn accepts_selection(self) -> bool {
        self != Self::Fadeout
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_class())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_cycle() {
        let mut s = PlaybackState::Initial;
        assert_eq!(s.transition(PlaybackState::Playing), Ok(PlaybackState::Initial));
        assert_eq!(s.transition(PlaybackState::Fadeout), Ok(PlaybackState::Playing));
        assert_eq!(s.transition(PlaybackState::Playing), Ok(PlaybackState::Fadeout));
        assert_eq!(s, PlaybackState::Playing);
    }

    #[test]
    fn initial_never_fades() {
        let mut s = PlaybackState::Initial;
        let err = s.transition(PlaybackState::Fadeout).unwrap_err();
        assert_eq!(
            err,
            PlayerError::IllegalTransition {
                from: PlaybackState::Initial,
                to: PlaybackState::Fadeout
            }
        );
        assert_eq!(s, PlaybackState::Initial);
    }

    #[test]
    fn failure_reachable_from_every_live_state() {
        for from in [PlaybackState::Initial, PlaybackState::Playing, PlaybackState::Fadeout] {
            assert!(from.can_transition(PlaybackState::Failed), "{from}");
        }
        assert!(PlaybackState::Failed.can_transition(PlaybackState::Playing));
        assert!(!PlaybackState::Failed.can_transition(PlaybackState::Failed));
    }

    #[test]
    fn no_self_transitions() {
        for s in PlaybackState::ALL {
            assert!(!s.can_transition(s), "{s}");
        }
    }

    #[test]
    fn css_classes_are_distinct() {
        let mut names: Vec<_> = PlaybackState::ALL.iter().map(|s| s.css_class()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PlaybackState::ALL.len());
    }
}
