//! Sign-in redirect after authentication failures
//!
//! The client does not know how the front end navigates, so it asks a
//! [`Navigator`] to go to the sign-in page. Redirects are delayed so an
//! error message can be shown first, and at most one is pending at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Front-end navigation hook
pub trait Navigator: Send + Sync {
    /// Navigate to `path`
    fn redirect(&self, path: &str);
}

/// Navigator that only logs; used by headless front ends
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, path: &str) {
        info!(path = %path, "Session ended, sign in again");
    }
}

/// Schedules a single delayed redirect to the sign-in page
#[derive(Clone)]
pub struct RedirectScheduler {
    navigator: Arc<dyn Navigator>,
    pending: Arc<AtomicBool>,
    delay: Duration,
    path: String,
}

impl std::fmt::Debug for RedirectScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectScheduler")
            .field("delay", &self.delay)
            .field("path", &self.path)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl RedirectScheduler {
    /// Create a scheduler redirecting to `path` after `delay`
    pub fn new(navigator: Arc<dyn Navigator>, path: impl Into<String>, delay: Duration) -> Self {
        Self {
            navigator,
            pending: Arc::new(AtomicBool::new(false)),
            delay,
            path: path.into(),
        }
    }

    /// Whether a redirect is waiting to fire
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Schedule the redirect; returns `false` if one is already pending
    pub fn schedule(&self) -> bool {
        if self
            .pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Sign-in redirect already pending");
            return false;
        }

        let navigator = Arc::clone(&self.navigator);
        let pending = Arc::clone(&self.pending);
        let path = self.path.clone();
        let delay = self.delay;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    navigator.redirect(&path);
                    pending.store(false, Ordering::SeqCst);
                });
            }
            Err(_) => {
                navigator.redirect(&path);
                pending.store(false, Ordering::SeqCst);
            }
        }

        true
    }
}
