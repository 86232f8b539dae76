use thiserror::Error;

use crate::state::PlaybackState;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlayerError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("illegal transition {from} -> {to}")]
    IllegalTransition { from: PlaybackState, to: PlaybackState },

    #[error("album {index} out of range (have {count})")]
    AlbumOutOfRange { index: usize, count: usize },

    #[error("dom: {0}")]
    Dom(String),

    #[error("audio graph: {0}")]
    Audio(String),

    #[error("album {album} failed to play: {reason}")]
    MediaFailed { album: usize, reason: String },

    #[error("album {album} never became ready")]
    MediaTimeout { album: usize },
}
