use futures::future::LocalBoxFuture;

use crate::{error::TrackError, proto::Channel};

/// Platform layer owning the actual local media tracks.
///
/// [`Room`](crate::component::Room) never calls [`set_channel_enabled`] twice
/// concurrently for the same [`Channel`], so implementations don't need to be
/// reentrant per channel.
///
/// [`set_channel_enabled`]: TrackLayer::set_channel_enabled
pub trait TrackLayer {
    /// Enables or disables the track of the provided [`Channel`], resolving
    /// once the change is confirmed.
    fn set_channel_enabled(
        &self,
        channel: Channel,
        enabled: bool,
    ) -> LocalBoxFuture<'static, Result<(), TrackError>>;

    /// Whether a track exists for the provided [`Channel`].
    fn is_channel_available(&self, channel: Channel) -> bool;

    /// Resolves when the underlying session ends.
    fn on_session_closed(&self) -> LocalBoxFuture<'static, ()>;
}
