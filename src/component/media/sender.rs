use std::{
    cell::{Cell, RefCell},
    mem,
    rc::Rc,
};

use futures::{
    channel::oneshot,
    future::{self, LocalBoxFuture},
    Stream, StreamExt as _,
};
use futures_signals::signal::{Mutable, SignalExt as _};
use tokio::task::{spawn_local, JoinHandle};
use tracing::{debug, warn};

use crate::{error::MuteError, proto::Channel, track::TrackLayer};

/// Snapshot of a [`Sender`]'s state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChannelState {
    /// `true` if the channel should be enabled (unmuted).
    pub requested: bool,

    /// Last state confirmed by the track layer.
    pub applied: bool,

    /// Whether an apply call is in flight.
    pub pending: bool,
}

/// Phase of the per-channel state machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Nothing in flight or scheduled. `applied` may still differ from
    /// `requested` after a failed apply, until the request is repeated.
    Idle,

    /// Apply of the contained target is in flight or about to be issued.
    Pending(bool),

    /// A newer request with the contained target arrived while an apply was
    /// in flight.
    Reconciling(bool),
}

/// Requested enabled state, versioned so that a completed apply knows which
/// callers it covers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Request {
    enabled: bool,
    generation: u64,
}

struct Waiter {
    generation: u64,
    done: oneshot::Sender<Result<(), MuteError>>,
}

/// Local sender of one media [`Channel`].
///
/// Owns the requested/applied state of its channel and is the only thing
/// calling [`TrackLayer::set_channel_enabled`] for it. Requests are coalesced
/// through a [`Mutable`]: its signal yields only the latest value, so a request
/// superseded before it was applied is never sent to the track layer.
pub struct Sender {
    channel: Channel,
    requested: Mutable<Request>,
    applied: Mutable<bool>,
    in_flight: Cell<Option<Request>>,
    processed: Cell<u64>,
    waiters: RefCell<Vec<Waiter>>,
    closed: Cell<bool>,
    task: RefCell<Option<JoinHandle<()>>>,
}

impl Sender {
    pub fn new(channel: Channel, enabled: bool) -> Rc<Self> {
        Rc::new(Self {
            channel,
            requested: Mutable::new(Request {
                enabled,
                generation: 0,
            }),
            applied: Mutable::new(enabled),
            in_flight: Cell::new(None),
            processed: Cell::new(0),
            waiters: RefCell::default(),
            closed: Cell::new(false),
            task: RefCell::default(),
        })
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn spawn_tasks(self: Rc<Self>, track: Rc<dyn TrackLayer>) {
        let task = spawn_local(Rc::clone(&self).process_requests(track));
        if let Some(previous) = self.task.borrow_mut().replace(task) {
            previous.abort();
        }
    }

    /// Requests this channel to become `enabled`.
    ///
    /// The request is registered immediately; the returned future resolves
    /// once an apply covering it is confirmed or fails.
    pub fn set_enabled(
        &self,
        enabled: bool,
    ) -> LocalBoxFuture<'static, Result<(), MuteError>> {
        if self.closed.get() {
            return Box::pin(future::err(MuteError::SessionClosed));
        }

        let current = self.requested.get();
        let in_flight = self.in_flight.get();
        if current.enabled == enabled
            && in_flight.is_none()
            && self.applied.get() == enabled
        {
            debug!(channel = %self.channel, enabled, "already applied");
            return Box::pin(future::ok(()));
        }

        // The in-flight apply (or the follow-up already scheduled after it)
        // covers an unchanged target. Anything else needs a new generation,
        // including retrying a target whose last apply failed.
        let generation = if current.enabled == enabled && in_flight.is_some()
        {
            current.generation
        } else {
            let next = Request {
                enabled,
                generation: current.generation + 1,
            };
            self.requested.set(next);
            debug!(
                channel = %self.channel,
                enabled,
                generation = next.generation,
                "requested",
            );
            next.generation
        };

        let (done, rx) = oneshot::channel();
        self.waiters.borrow_mut().push(Waiter { generation, done });
        Box::pin(async move {
            rx.await.unwrap_or(Err(MuteError::SessionClosed))
        })
    }

    pub fn state(&self) -> ChannelState {
        ChannelState {
            requested: self.requested.get().enabled,
            applied: self.applied.get(),
            pending: self.in_flight.get().is_some(),
        }
    }

    pub fn phase(&self) -> Phase {
        let requested = self.requested.get();
        match self.in_flight.get() {
            Some(in_flight) if requested.generation > in_flight.generation => {
                Phase::Reconciling(requested.enabled)
            }
            Some(in_flight) => Phase::Pending(in_flight.enabled),
            None if requested.generation > self.processed.get()
                && requested.enabled != self.applied.get() =>
            {
                Phase::Pending(requested.enabled)
            }
            None => Phase::Idle,
        }
    }

    /// Stream of confirmed applied states, starting with the current one.
    pub fn applied_changes(&self) -> impl Stream<Item = bool> {
        self.applied.signal().to_stream()
    }

    /// Stops processing requests and fails every waiting caller with
    /// [`MuteError::SessionClosed`].
    pub fn close(&self) {
        if self.closed.replace(true) {
            return;
        }
        if let Some(task) = self.task.borrow_mut().take() {
            task.abort();
        }
        self.in_flight.set(None);

        let waiters = mem::take(&mut *self.waiters.borrow_mut());
        if !waiters.is_empty() {
            debug!(
                channel = %self.channel,
                count = waiters.len(),
                "failing pending requests on close",
            );
        }
        for waiter in waiters {
            let _ = waiter.done.send(Err(MuteError::SessionClosed));
        }
    }

    async fn process_requests(self: Rc<Self>, track: Rc<dyn TrackLayer>) {
        let mut requests = Box::pin(self.requested.signal().to_stream());
        while let Some(request) = requests.next().await {
            if self.closed.get() {
                break;
            }
            self.processed.set(request.generation);
            if self.applied.get() == request.enabled {
                self.settle(request.generation, &Ok(()));
                continue;
            }

            self.in_flight.set(Some(request));
            debug!(
                channel = %self.channel,
                enabled = request.enabled,
                generation = request.generation,
                "applying",
            );
            let result = track
                .set_channel_enabled(self.channel, request.enabled)
                .await;
            self.in_flight.set(None);
            if self.closed.get() {
                break;
            }

            match result {
                Ok(()) => {
                    self.applied.set(request.enabled);
                    debug!(
                        channel = %self.channel,
                        enabled = request.enabled,
                        "applied",
                    );
                    self.settle(request.generation, &Ok(()));
                }
                Err(err) => {
                    let err = MuteError::from_track(self.channel, err);
                    warn!(
                        channel = %self.channel,
                        enabled = request.enabled,
                        error = %err,
                        "apply failed",
                    );
                    self.settle(request.generation, &Err(err));
                }
            }
        }
    }

    /// Resolves every waiter registered at or before `generation`.
    fn settle(&self, generation: u64, result: &Result<(), MuteError>) {
        let ready = {
            let mut waiters = self.waiters.borrow_mut();
            let (ready, rest): (Vec<_>, Vec<_>) = mem::take(&mut *waiters)
                .into_iter()
                .partition(|w| w.generation <= generation);
            *waiters = rest;
            ready
        };
        for waiter in ready {
            let _ = waiter.done.send(result.clone());
        }
    }
}
