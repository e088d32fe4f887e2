mod media;
mod room;

pub use self::{
    media::{ChannelState, Phase, Sender},
    room::Room,
};
