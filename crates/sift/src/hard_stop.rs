//! Cooperative cancellation for search runs.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type StopListener = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct StopState {
    stopped: AtomicBool,
    listeners: Mutex<Vec<StopListener>>,
}

/// Shared flag asking every chunk of a search to stop.
///
/// Clones share the same state. Workers poll [`HardStopFlag::is_stopped`]
/// between files, so a stop takes effect once the current file is done;
/// a stopped chunk resolves with empty results.
///
/// # Example
///
/// ```
/// use sift::create_hard_stop_flag;
///
/// let flag = create_hard_stop_flag();
/// let observer = flag.clone();
/// flag.stop_search();
/// assert!(observer.is_stopped());
/// ```
#[derive(Clone, Default)]
pub struct HardStopFlag {
    state: Arc<StopState>,
}

impl HardStopFlag {
    /// Creates a flag that has not been raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag and notifies listeners.
    ///
    /// Listeners run once, on the first call only.
    pub fn stop_search(&self) {
        if self.state.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let listeners = std::mem::take(&mut *self.lock_listeners());
        for listener in &listeners {
            listener();
        }
    }

    /// Returns whether a stop was requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::SeqCst)
    }

    /// Registers a callback invoked when the flag is raised.
    ///
    /// Registering on an already raised flag does nothing.
    pub fn add_stop_listener(&self, listener: impl Fn() + Send + Sync + 'static) {
        if self.is_stopped() {
            return;
        }
        self.lock_listeners().push(Box::new(listener));
    }

    /// Drops every registered listener.
    pub fn destroy(&self) {
        self.lock_listeners().clear();
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<StopListener>> {
        // A panicking listener must not disable cancellation for everyone else.
        self.state
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for HardStopFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HardStopFlag")
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

/// Creates a fresh [`HardStopFlag`].
#[must_use]
pub fn create_hard_stop_flag() -> HardStopFlag {
    HardStopFlag::new()
}
