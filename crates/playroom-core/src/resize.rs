//! Editor pane resizing
//!
//! Drag gestures arrive as a stream of [`ResizeEvent`]s. Deltas from one
//! burst are summed and applied when the burst settles, and the pane's last
//! reported height is written to the preference store once per burst.

use crate::debounce::Debouncer;
use crate::store::{PreferenceStore, save_editor_size};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Smallest height the editor pane can be dragged to
pub const MIN_EDITOR_HEIGHT: f64 = 40.0;

/// One resize notification from the pane widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEvent {
    /// Change since the previous event
    pub delta_height: f64,
    /// Height the pane currently reports
    pub offset_height: f64,
}

#[derive(Debug)]
struct PaneState {
    height: f64,
    burst_delta: f64,
}

/// Debounced height tracking with persistence
///
/// Cloning shares state, so a clone can be moved into each event task.
#[derive(Clone)]
pub struct ResizeController {
    state: Arc<Mutex<PaneState>>,
    debouncer: Debouncer<f64>,
    store: Arc<dyn PreferenceStore>,
}

impl ResizeController {
    pub fn new(store: Arc<dyn PreferenceStore>, height: f64, window: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(PaneState {
                height: clamp_height(height),
                burst_delta: 0.0,
            })),
            debouncer: Debouncer::new(window),
            store,
        }
    }

    pub fn height(&self) -> f64 {
        self.state.lock().height
    }

    /// Replace the height outright, e.g. with a persisted one
    pub fn set_height(&self, height: f64) {
        self.state.lock().height = clamp_height(height);
    }

    /// Feed one event; resolves to the new height for the call that ends a
    /// burst and to `None` for the calls it superseded
    ///
    /// Store failures are logged; the height is still applied.
    pub async fn on_resize(&self, event: ResizeEvent) -> Option<f64> {
        self.state.lock().burst_delta += event.delta_height;

        let offset_height = self.debouncer.call(event.offset_height).await?;

        let height = {
            let mut state = self.state.lock();
            let delta = std::mem::take(&mut state.burst_delta);
            state.height = clamp_height(state.height + delta);
            state.height
        };
        debug!("Editor height settled at {height}px");

        if let Err(e) = save_editor_size(self.store.as_ref(), offset_height).await {
            warn!("Failed to persist editor height: {}", e);
        }
        Some(height)
    }

    /// Drop an unsettled burst
    pub fn cancel(&self) {
        self.debouncer.cancel();
        self.state.lock().burst_delta = 0.0;
    }
}

fn clamp_height(height: f64) -> f64 {
    if height.is_finite() {
        height.max(MIN_EDITOR_HEIGHT)
    } else {
        MIN_EDITOR_HEIGHT
    }
}
