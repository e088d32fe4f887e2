use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of local media whose enabled state is controlled.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Audio,
    Video,
}

impl Channel {
    /// Both channels, in the order results are reported.
    pub const ALL: [Channel; 2] = [Channel::Audio, Channel::Video];

    /// Picks the flag belonging to this [`Channel`] out of an
    /// `(audio, video)` pair.
    pub fn select(self, audio: bool, video: bool) -> bool {
        match self {
            Channel::Audio => audio,
            Channel::Video => video,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Audio => f.write_str("audio"),
            Channel::Video => f.write_str("video"),
        }
    }
}

/// Messages sent by the client to the room server.
#[derive(Clone, Debug, Deserialize, Serialize, Hash, Eq, PartialEq)]
#[serde(tag = "command", content = "data")]
pub enum Command {
    MuteRoom { audio: bool, video: bool },
    UnmuteRoom { audio: bool, video: bool },
}

impl Command {
    pub fn affects(&self, channel: Channel) -> bool {
        match *self {
            Command::MuteRoom { audio, video }
            | Command::UnmuteRoom { audio, video } => {
                channel.select(audio, video)
            }
        }
    }
}

/// Messages pushed by the room server to the client.
#[derive(Clone, Debug, Deserialize, Serialize, Hash, Eq, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum Event {
    RoomMuted { audio: bool, video: bool },
    RoomUnmuted { audio: bool, video: bool },
}

impl Event {
    pub fn affects(&self, channel: Channel) -> bool {
        match *self {
            Event::RoomMuted { audio, video }
            | Event::RoomUnmuted { audio, video } => {
                channel.select(audio, video)
            }
        }
    }
}
