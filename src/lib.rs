//! Mute control of the local participant's audio and video in a room.
//!
//! [`Room`] owns the requested and confirmed enabled state of both channels
//! and applies changes through a [`TrackLayer`]. Requests to the same channel
//! are coalesced: the most recent one always determines the final state.

pub mod component;
pub mod config;
pub mod error;
pub mod proto;
pub mod sys;
pub mod track;

pub use self::{
    component::{ChannelState, Phase, Room},
    error::{MuteError, TrackError},
    proto::Channel,
    track::TrackLayer,
};
