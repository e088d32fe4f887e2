//! Errors reported by the mute controller and the track layer beneath it.

use thiserror::Error;

use crate::proto::Channel;

/// Failure of a [`mute`]/[`unmute`] operation.
///
/// [`mute`]: crate::component::Room::mute
/// [`unmute`]: crate::component::Room::unmute
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum MuteError {
    /// The channel has no underlying track (no microphone or camera granted).
    #[error("no {0} track is available")]
    TrackUnavailable(Channel),

    /// The track layer rejected the enable/disable call.
    #[error("failed to apply {channel} state: {reason}")]
    ApplyFailed { channel: Channel, reason: String },

    /// The room session ended before or during the operation.
    #[error("room session is closed")]
    SessionClosed,
}

impl MuteError {
    /// Maps a [`TrackError`] reported for `channel` into a [`MuteError`].
    pub fn from_track(channel: Channel, err: TrackError) -> Self {
        match err {
            TrackError::Unavailable => MuteError::TrackUnavailable(channel),
            TrackError::SessionClosed => MuteError::SessionClosed,
            TrackError::Rejected(reason) => {
                MuteError::ApplyFailed { channel, reason }
            }
        }
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MuteError::ApplyFailed { .. })
    }
}

/// Failure reported by a [`TrackLayer`](crate::track::TrackLayer).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TrackError {
    #[error("track does not exist")]
    Unavailable,

    #[error("track rejected state change: {0}")]
    Rejected(String),

    /// The session owning the track has ended.
    #[error("session has ended")]
    SessionClosed,
}
