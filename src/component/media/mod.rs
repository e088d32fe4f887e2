mod sender;

pub use self::sender::{ChannelState, Phase, Sender};
