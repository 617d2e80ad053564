//! Run cancellation.
//!
//! A [`CancelToken`] is shared by every worker of a run. Workers stop taking
//! new repositories once it trips, and in-flight `git` processes are killed
//! at their next poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Set from the SIGINT handler.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    follows_interrupt: bool,
}

impl CancelToken {
    /// A token that only trips when [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also trips on Ctrl-C.
    ///
    /// Installs a SIGINT handler on unix. Elsewhere this behaves like
    /// [`new`](Self::new).
    pub fn with_interrupt() -> Self {
        install_interrupt_handler();
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            follows_interrupt: true,
        }
    }

    /// Trip the token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether the run should stop.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || (self.follows_interrupt && INTERRUPTED.load(Ordering::SeqCst))
    }
}

#[cfg(unix)]
extern "C" fn on_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

#[cfg(unix)]
fn install_interrupt_handler() {
    let handler = on_interrupt as extern "C" fn(libc::c_int);
    // SAFETY: the handler only performs an atomic store, which is
    // async-signal-safe.
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
fn install_interrupt_handler() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_token_is_not_cancelled() {
        assert!(!CancelToken::new().is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();

        clone.cancel();

        assert!(token.is_cancelled());
    }

    #[test]
    fn plain_token_ignores_interrupt_flag() {
        let token = CancelToken::new();
        assert!(!token.follows_interrupt);
        assert!(!token.is_cancelled());
    }
}
