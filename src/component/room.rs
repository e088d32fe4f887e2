use std::{
    cell::{Cell, RefCell},
    future::Future,
    rc::Rc,
};

use futures::{
    future::{self, LocalBoxFuture},
    Stream,
};
use tokio::task::{spawn_local, JoinHandle};
use tracing::{debug, info, info_span, warn, Instrument as _};

use crate::{
    component::{ChannelState, Phase, Sender},
    error::MuteError,
    proto::{Channel, Command, Event},
    track::TrackLayer,
};

/// Mute controller of the local participant in one room session.
///
/// Must be created inside a [`tokio::task::LocalSet`], since per-channel
/// senders run as local tasks.
pub struct Room {
    audio: Rc<Sender>,
    video: Rc<Sender>,
    track: Rc<dyn TrackLayer>,
    closed: Cell<bool>,
    on_session_closed: RefCell<Option<JoinHandle<()>>>,
}

impl Room {
    /// Creates a [`Room`] whose tracks start enabled.
    pub fn new(track: Rc<dyn TrackLayer>) -> Rc<Self> {
        Self::with_state(track, true, true)
    }

    /// Creates a [`Room`] with the provided initial enabled state of the
    /// audio and video tracks.
    pub fn with_state(
        track: Rc<dyn TrackLayer>,
        audio_enabled: bool,
        video_enabled: bool,
    ) -> Rc<Self> {
        let this = Rc::new(Self {
            audio: Sender::new(Channel::Audio, audio_enabled),
            video: Sender::new(Channel::Video, video_enabled),
            track: Rc::clone(&track),
            closed: Cell::new(false),
            on_session_closed: RefCell::default(),
        });

        Rc::clone(&this.audio).spawn_tasks(Rc::clone(&track));
        Rc::clone(&this.video).spawn_tasks(Rc::clone(&track));
        this.spawn_on_session_closed();
        debug!(audio_enabled, video_enabled, "room created");

        this
    }

    /// Spawns listener for the end of the underlying session.
    fn spawn_on_session_closed(self: &Rc<Self>) {
        let session_closed = self.track.on_session_closed();
        let room = Rc::downgrade(self);
        let task = spawn_local(async move {
            session_closed.await;
            if let Some(room) = room.upgrade() {
                info!("session closed by track layer");
                room.close();
            }
        });
        *self.on_session_closed.borrow_mut() = Some(task);
    }

    /// Disables every channel whose flag is `true`, leaving the others as
    /// they are.
    pub fn mute(
        &self,
        audio: bool,
        video: bool,
    ) -> impl Future<Output = Result<(), MuteError>> + 'static {
        self.update(audio, video, false)
            .instrument(info_span!("mute", audio, video))
    }

    /// Enables every channel whose flag is `true`, leaving the others as they
    /// are.
    pub fn unmute(
        &self,
        audio: bool,
        video: bool,
    ) -> impl Future<Output = Result<(), MuteError>> + 'static {
        self.update(audio, video, true)
            .instrument(info_span!("unmute", audio, video))
    }

    /// Executes a client [`Command`].
    pub fn execute(
        &self,
        command: Command,
    ) -> LocalBoxFuture<'static, Result<(), MuteError>> {
        match command {
            Command::MuteRoom { audio, video } => {
                Box::pin(self.mute(audio, video))
            }
            Command::UnmuteRoom { audio, video } => {
                Box::pin(self.unmute(audio, video))
            }
        }
    }

    /// Applies a room mute/unmute pushed by the server.
    pub fn handle_event(
        &self,
        event: Event,
    ) -> LocalBoxFuture<'static, Result<(), MuteError>> {
        debug!(?event, "server event");
        match event {
            Event::RoomMuted { audio, video } => {
                Box::pin(self.mute(audio, video))
            }
            Event::RoomUnmuted { audio, video } => {
                Box::pin(self.unmute(audio, video))
            }
        }
    }

    fn update(
        &self,
        audio: bool,
        video: bool,
        enabled: bool,
    ) -> LocalBoxFuture<'static, Result<(), MuteError>> {
        if self.closed.get() {
            return Box::pin(future::err(MuteError::SessionClosed));
        }

        let affected: Vec<Channel> = Channel::ALL
            .iter()
            .copied()
            .filter(|c| c.select(audio, video))
            .collect();

        // Nothing is touched unless every affected channel has a track.
        if let Some(&missing) = affected
            .iter()
            .find(|c| !self.track.is_channel_available(**c))
        {
            warn!(channel = %missing, "track is unavailable");
            return Box::pin(future::err(MuteError::TrackUnavailable(
                missing,
            )));
        }

        let updates = future::join_all(
            affected
                .into_iter()
                .map(|channel| self.sender(channel).set_enabled(enabled)),
        );
        Box::pin(async move {
            // Results are ordered audio first, so the first error wins.
            updates.await.into_iter().collect::<Result<(), _>>()
        })
    }

    fn sender(&self, channel: Channel) -> &Rc<Sender> {
        match channel {
            Channel::Audio => &self.audio,
            Channel::Video => &self.video,
        }
    }

    pub fn state(&self, channel: Channel) -> ChannelState {
        self.sender(channel).state()
    }

    pub fn phase(&self, channel: Channel) -> Phase {
        self.sender(channel).phase()
    }

    /// Stream of confirmed enabled states of the provided [`Channel`].
    pub fn applied_changes(
        &self,
        channel: Channel,
    ) -> impl Stream<Item = bool> {
        self.sender(channel).applied_changes()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Ends this session: pending operations fail with
    /// [`MuteError::SessionClosed`], and so does every later call.
    pub fn close(&self) {
        if self.closed.replace(true) {
            return;
        }
        self.audio.close();
        self.video.close();
        if let Some(task) = self.on_session_closed.borrow_mut().take() {
            task.abort();
        }
        info!("room closed");
    }
}

impl Drop for Room {
    fn drop(&mut self) {
        self.close();
    }
}
