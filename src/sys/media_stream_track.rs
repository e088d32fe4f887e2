use std::{cell::Cell, rc::Rc, time::Duration};

use tokio::time::sleep;
use tracing::debug;

use crate::proto::Channel;

/// Simulated local media track which takes `latency` to switch its enabled
/// state.
#[derive(Clone, Debug)]
pub struct MediaStreamTrack {
    kind: Channel,
    enabled: Rc<Cell<bool>>,
    latency: Duration,
}

impl MediaStreamTrack {
    pub fn new(kind: Channel, latency: Duration) -> Self {
        Self {
            kind,
            enabled: Rc::new(Cell::new(true)),
            latency,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub async fn set_enabled(&self, enabled: bool) {
        sleep(self.latency).await;
        self.enabled.set(enabled);
        debug!(kind = %self.kind, enabled, "track enabled state changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn set_enabled_takes_latency() {
        let track =
            MediaStreamTrack::new(Channel::Audio, Duration::from_millis(500));
        let start = tokio::time::Instant::now();

        track.clone().set_enabled(false).await;

        assert!(!track.is_enabled());
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
