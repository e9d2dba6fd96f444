use std::time::{Duration, Instant};
use crate::client::{ApiError, RemoteStatus};
/// Client-side view of the device link.
///
/// `connected` and `recording` mirror the last successful status poll;
/// `last_frame_at` is observed locally when a frame with samples arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: bool,
    pub recording: bool,
    pub last_frame_at: Option<Instant>,
}
impl ConnectionState {
    pub fn mark_frame(&mut self, now: Instant) {
        self.last_frame_at = Some(now);
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    ConnectedNoData,
    ConnectedStreaming,
}
impl LinkState {
    pub fn is_connected(self) -> bool {
        !matches!(self, LinkState::Disconnected)
    }
    pub fn is_streaming(self) -> bool {
        matches!(self, LinkState::ConnectedStreaming)
    }
}
/// Everything the connection pills and the data dot need.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Indicators {
    pub link: LinkState,
    pub connected: bool,
    pub recording: bool,
}
/// Merges polled remote status with local frame freshness.
#[derive(Debug)]
pub struct ConnectionStateReconciler {
    state: ConnectionState,
    stale_after: Duration,
    failed_polls: u32,
}
impl ConnectionStateReconciler {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            state: ConnectionState::default(),
            stale_after,
            failed_polls: 0,
        }
    }
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }
    pub fn state_mut(&mut self) -> &mut ConnectionState {
        &mut self.state
    }
    /// Consecutive failed polls since the last success.
    pub fn failed_polls(&self) -> u32 {
        self.failed_polls
    }
    pub fn has_data(&self, now: Instant) -> bool {
        self.state
            .last_frame_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.stale_after)
    }
    pub fn link_state(&self, now: Instant) -> LinkState {
        match (self.state.connected, self.has_data(now)) {
            (false, _) => LinkState::Disconnected,
            (true, false) => LinkState::ConnectedNoData,
            (true, true) => LinkState::ConnectedStreaming,
        }
    }
    pub fn indicators(&self, now: Instant) -> Indicators {
        Indicators {
            link: self.link_state(now),
            connected: self.state.connected,
            recording: self.state.recording,
        }
    }
    pub fn apply_status(&mut self, status: &RemoteStatus, now: Instant) -> Indicators {
        self.failed_polls = 0;
        self.state.connected = status.connected;
        self.state.recording = status.recording;
        self.indicators(now)
    }
    /// Folds in a poll result. A failed poll keeps the last known
    /// `connected`/`recording` and hands the error back.
    pub fn apply_poll(
        &mut self,
        result: Result<RemoteStatus, ApiError>,
        now: Instant,
    ) -> Result<Indicators, ApiError> {
        match result {
            Ok(status) => Ok(self.apply_status(&status, now)),
            Err(e) => {
                self.failed_polls = self.failed_polls.saturating_add(1);
                Err(e)
            }
        }
    }
    /// A fresh connect: nothing seen on this session yet.
    pub fn on_connect(&mut self) {
        self.state.last_frame_at = None;
    }
}
