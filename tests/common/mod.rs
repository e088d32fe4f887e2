//! Fake [`TrackLayer`] for driving [`room_mute::Room`] in tests.

#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    future::Future,
    time::Duration,
};

use futures::{
    future::{self, LocalBoxFuture},
    StreamExt as _,
};
use futures_signals::signal::{Mutable, SignalExt as _};
use room_mute::{Channel, TrackError, TrackLayer};
use tokio::{task::LocalSet, time::sleep};

/// Latency of [`FakeTrackLayer`] confirmations.
pub const LATENCY: Duration = Duration::from_millis(100);

/// Records every apply call and confirms it after [`LATENCY`], unless a
/// failure was scheduled for the channel.
pub struct FakeTrackLayer {
    calls: RefCell<Vec<(Channel, bool)>>,
    unavailable: HashSet<Channel>,
    failures: RefCell<HashMap<Channel, TrackError>>,
    session_closed: Mutable<bool>,
}

impl FakeTrackLayer {
    pub fn new() -> Self {
        Self {
            calls: RefCell::default(),
            unavailable: HashSet::new(),
            failures: RefCell::default(),
            session_closed: Mutable::new(false),
        }
    }

    pub fn without(channel: Channel) -> Self {
        let mut this = Self::new();
        this.unavailable.insert(channel);
        this
    }

    /// Makes the next apply call for `channel` fail with `err`.
    pub fn fail_next(&self, channel: Channel, err: TrackError) {
        self.failures.borrow_mut().insert(channel, err);
    }

    pub fn calls(&self) -> Vec<(Channel, bool)> {
        self.calls.borrow().clone()
    }

    pub fn calls_for(&self, channel: Channel) -> Vec<bool> {
        self.calls
            .borrow()
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, enabled)| *enabled)
            .collect()
    }

    pub fn close_session(&self) {
        self.session_closed.set(true);
    }
}

impl TrackLayer for FakeTrackLayer {
    fn set_channel_enabled(
        &self,
        channel: Channel,
        enabled: bool,
    ) -> LocalBoxFuture<'static, Result<(), TrackError>> {
        self.calls.borrow_mut().push((channel, enabled));
        let failure = self.failures.borrow_mut().remove(&channel);
        Box::pin(async move {
            sleep(LATENCY).await;
            match failure {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }

    fn is_channel_available(&self, channel: Channel) -> bool {
        !self.unavailable.contains(&channel)
    }

    fn on_session_closed(&self) -> LocalBoxFuture<'static, ()> {
        let mut closed = Box::pin(
            self.session_closed
                .signal()
                .to_stream()
                .filter(|closed| future::ready(*closed)),
        );
        Box::pin(async move {
            let _ = closed.next().await;
        })
    }
}

/// Runs `f` inside a [`LocalSet`], as `Room` spawns local tasks.
pub async fn local<F: Future>(f: F) -> F::Output {
    LocalSet::new().run_until(f).await
}
