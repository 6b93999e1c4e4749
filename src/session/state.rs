use tokio::task::JoinHandle;

use super::progress::LayerProgress;
use crate::protocol::ProgressStart;

/// Connection lifecycle state
///
/// Transitions: Connecting -> Open on handshake, Open -> Closed on any drop,
/// Closed -> Connecting after the reconnect delay. There is no terminal
/// state; the session retries indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Page-wide mutable client state, one instance per process run
#[derive(Debug)]
pub struct Session {
    pub connection_state: ConnectionState,
    /// Whether the user may start a new analysis
    pub submit_enabled: bool,
    /// Set on the first appended log line; the greeting handler consults it
    pub log_has_content: bool,
    /// Layer count of the current analysis, for the layer-position label
    pub total_layers: u32,
    /// Progress of the currently-reporting layer, if any
    pub progress: Option<LayerProgress>,
    /// Active waiting-bar countdown task, aborted when superseded
    waiting: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            connection_state: ConnectionState::Connecting,
            submit_enabled: false,
            log_has_content: false,
            total_layers: 0,
            progress: None,
            waiting: None,
        }
    }

    /// Reset progress context for a new layer; returns the layer label
    pub fn start_layer(&mut self, start: ProgressStart) -> String {
        let label = self.layer_label(start.layer);
        self.progress = Some(LayerProgress::new(start));
        label
    }

    /// Apply one progress update; returns the new display state, or `None`
    /// for updates arriving while no layer is in progress
    pub fn apply_progress(&mut self, units: f64) -> Option<(u8, String)> {
        let progress = self.progress.as_mut()?;
        progress.apply(units);
        let layer = progress.layer();
        let percent = progress.percent();
        Some((percent, self.layer_label(layer)))
    }

    /// Clear progress context once a layer's render bundle has arrived
    pub fn clear_progress(&mut self) {
        self.progress = None;
    }

    /// Layer-position label against the configured total layer count.
    ///
    /// The total is only known after a local submission; a layer index past
    /// it (or an analysis started elsewhere) widens the denominator.
    pub fn layer_label(&self, layer: u32) -> String {
        format!("Layer {}/{}", layer, self.total_layers.max(layer))
    }

    /// Replace the active waiting-bar countdown, aborting any predecessor
    pub fn begin_waiting(&mut self, handle: JoinHandle<()>) {
        if let Some(previous) = self.waiting.replace(handle) {
            previous.abort();
        }
    }

    /// Abort the active waiting-bar countdown, if any.
    /// Returns whether a countdown was actually running.
    pub fn stop_waiting(&mut self) -> bool {
        match self.waiting.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
