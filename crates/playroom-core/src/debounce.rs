//! Trailing debounce for rate-limiting side effects
//!
//! Every call records its value and waits out the quiet window. Only the call
//! that is still the most recent when its window ends receives the value;
//! earlier calls in the burst resolve to `None`.
//!
//! ```rust,ignore
//! let debouncer = Debouncer::new(DEBOUNCE_WINDOW);
//! if let Some(code) = debouncer.call(code).await {
//!     playroom.update_code(code);
//! }
//! ```

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Quiet period used for code changes and resize events
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

struct Pending<T> {
    generation: u64,
    latest: Option<T>,
}

/// Collects the latest value of a burst and releases it once things settle
///
/// Cloning shares the pending state, so clones debounce together.
pub struct Debouncer<T> {
    window: Duration,
    pending: Arc<Mutex<Pending<T>>>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            window: self.window,
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Arc::new(Mutex::new(Pending {
                generation: 0,
                latest: None,
            })),
        }
    }

    /// The quiet window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Submit a value; resolves to it if no newer call arrives in the window
    pub async fn call(&self, value: T) -> Option<T> {
        let generation = {
            let mut pending = self.pending.lock();
            pending.generation += 1;
            pending.latest = Some(value);
            pending.generation
        };

        tokio::time::sleep(self.window).await;

        let mut pending = self.pending.lock();
        if pending.generation == generation {
            pending.latest.take()
        } else {
            None
        }
    }

    /// Drop any value still waiting for its window
    pub fn cancel(&self) {
        let mut pending = self.pending.lock();
        pending.generation += 1;
        pending.latest = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_single_call_fires() {
        let debouncer = Debouncer::default();
        assert_eq!(debouncer.call(7).await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once_with_latest() {
        let debouncer = Debouncer::new(Duration::from_millis(200));
        let (a, b, c) = tokio::join!(
            debouncer.call("a"),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                debouncer.call("b").await
            },
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                debouncer.call("c").await
            },
        );
        assert_eq!((a, b, c), (None, None, Some("c")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_windows_fire_separately() {
        let debouncer = Debouncer::new(Duration::from_millis(200));
        assert_eq!(debouncer.call(1).await, Some(1));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(debouncer.call(2).await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(200));
        let (fired, ()) = tokio::join!(debouncer.call(1), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            debouncer.cancel();
        });
        assert_eq!(fired, None);
    }
}
