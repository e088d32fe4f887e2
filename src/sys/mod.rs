mod local_tracks;
mod media_stream_track;

pub use self::{
    local_tracks::LocalTracks, media_stream_track::MediaStreamTrack,
};
