use futures::{
    future::{self, LocalBoxFuture},
    StreamExt as _,
};
use futures_signals::signal::{Mutable, SignalExt as _};
use tracing::info;

use crate::{
    config::Config, error::TrackError, proto::Channel, sys::MediaStreamTrack,
    track::TrackLayer,
};

/// [`TrackLayer`] over the local microphone and camera tracks.
pub struct LocalTracks {
    audio: Option<MediaStreamTrack>,
    video: Option<MediaStreamTrack>,
    session_ended: Mutable<bool>,
}

impl LocalTracks {
    pub fn new(
        audio: Option<MediaStreamTrack>,
        video: Option<MediaStreamTrack>,
    ) -> Self {
        Self {
            audio,
            video,
            session_ended: Mutable::new(false),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let track = |kind, available: bool| {
            if available {
                Some(MediaStreamTrack::new(kind, config.track_latency))
            } else {
                None
            }
        };
        Self::new(
            track(Channel::Audio, config.audio_available),
            track(Channel::Video, config.video_available),
        )
    }

    pub fn track(&self, channel: Channel) -> Option<&MediaStreamTrack> {
        match channel {
            Channel::Audio => self.audio.as_ref(),
            Channel::Video => self.video.as_ref(),
        }
    }

    /// Ends the session, notifying [`TrackLayer::on_session_closed`]
    /// listeners.
    pub fn end_session(&self) {
        if !self.session_ended.replace(true) {
            info!("session ended");
        }
    }
}

impl TrackLayer for LocalTracks {
    fn set_channel_enabled(
        &self,
        channel: Channel,
        enabled: bool,
    ) -> LocalBoxFuture<'static, Result<(), TrackError>> {
        if self.session_ended.get() {
            return Box::pin(future::err(TrackError::SessionClosed));
        }
        match self.track(channel).cloned() {
            None => Box::pin(future::err(TrackError::Unavailable)),
            Some(track) => {
                let session_ended = self.session_ended.clone();
                Box::pin(async move {
                    track.set_enabled(enabled).await;
                    // Confirmations arriving after the end are not reported.
                    if session_ended.get() {
                        Err(TrackError::SessionClosed)
                    } else {
                        Ok(())
                    }
                })
            }
        }
    }

    fn is_channel_available(&self, channel: Channel) -> bool {
        self.track(channel).is_some()
    }

    fn on_session_closed(&self) -> LocalBoxFuture<'static, ()> {
        let mut ended = Box::pin(
            self.session_ended
                .signal()
                .to_stream()
                .filter(|ended| future::ready(*ended)),
        );
        Box::pin(async move {
            let _ = ended.next().await;
        })
    }
}
