//! Scoped suppression of fontconfig's stderr chatter.
//!
//! fontconfig has no switch for its non-fatal warnings (missing optional
//! config files and the like), it writes them straight to file descriptor 2.
//! [`QuietStderr`] points that descriptor at the null device for as long as
//! the guard lives. The redirection is process-wide, so only one guard may
//! exist at a time: acquiring one blocks until the previous guard is gone.

use std::sync::{Mutex, MutexGuard, PoisonError};

static STDERR_LOCK: Mutex<()> = Mutex::new(());

pub(crate) struct QuietStderr {
    #[cfg(unix)]
    saved_fd: Option<libc::c_int>,
    _lock: MutexGuard<'static, ()>,
}

impl QuietStderr {
    pub(crate) fn acquire() -> Self {
        // A panic while redirected still restored stderr in `drop`
        let lock = STDERR_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        Self {
            #[cfg(unix)]
            saved_fd: unsafe { redirect_stderr() },
            _lock: lock,
        }
    }

    /// Acquires a guard only if `enabled`, so callers can keep one code path.
    pub(crate) fn acquire_if(enabled: bool) -> Option<Self> {
        enabled.then(Self::acquire)
    }
}

impl Drop for QuietStderr {
    fn drop(&mut self) {
        // Runs before `_lock` is released
        #[cfg(unix)]
        {
            if let Some(saved_fd) = self.saved_fd.take() {
                unsafe {
                    libc::dup2(saved_fd, libc::STDERR_FILENO);
                    libc::close(saved_fd);
                }
            }
        }
    }
}

/// Returns a duplicate of the original stderr descriptor, or `None` if the
/// redirection could not be set up (stderr is then left untouched).
#[cfg(unix)]
unsafe fn redirect_stderr() -> Option<libc::c_int> {
    let saved_fd = libc::dup(libc::STDERR_FILENO);
    if saved_fd < 0 {
        return None;
    }

    let null_fd = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
    if null_fd < 0 {
        libc::close(saved_fd);
        return None;
    }

    let redirected = libc::dup2(null_fd, libc::STDERR_FILENO) >= 0;
    libc::close(null_fd);

    if redirected {
        Some(saved_fd)
    } else {
        libc::close(saved_fd);
        None
    }
}
