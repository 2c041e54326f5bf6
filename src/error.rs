//! Error types for the update-delay monitor
//!
//! The error taxonomy separates failures by blast radius:
//!
//! - [`InitError`] - fatal, raised once at startup when the high-resolution
//!   timer cannot be created; the process cannot run without it
//! - [`CaptureError`] - recoverable, contained within a single tick; the
//!   driving loop skips the tick and retries on the next one
//! - [`WaitError`] - recoverable, a rare failure to arm the tick timer;
//!   logged and retried
//!
//! A target window that cannot currently be found is *not* an error: the
//! locator returns `None` and the loop keeps retrying every tick.

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Per-tick capture failure
///
/// Every variant is recoverable: the tick's diff/report step is skipped and
/// the loop continues. [`CaptureError::StaleWindowHandle`] is an expected
/// transient state (typically a screen saver or lock screen) and must not be
/// logged as a fault; all other variants are surfaced via the diagnostic
/// channel regardless of verbosity.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    /// The shared screen surface could not be acquired
    #[error("shared screen surface unavailable (os error {code})")]
    ScreenSurfaceUnavailable {
        /// OS error code from the failed acquisition
        code: u32,
    },

    /// An off-screen buffer of the requested size could not be allocated
    #[error("failed to allocate a {width}x{height} off-screen buffer")]
    BufferAllocation {
        /// Requested buffer width in pixels
        width: u32,
        /// Requested buffer height in pixels
        height: u32,
    },

    /// The pixel transfer from the screen to the off-screen buffer failed
    #[error("pixel transfer from the screen failed (os error {code})")]
    PixelTransfer {
        /// OS error code from the failed transfer
        code: u32,
    },

    /// The target handle became invalid mid-capture
    ///
    /// Typically caused by a screen saver or lock screen; expected and
    /// silent.
    #[error("target window handle is stale (screen saver or lock screen?)")]
    StaleWindowHandle,

    /// No capture backend exists for this platform
    #[error("no capture backend is available on this platform")]
    BackendUnavailable,

    /// I/O error while writing output
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Io(err.to_string())
    }
}

impl CaptureError {
    /// Whether this failure is expected and should be skipped silently
    ///
    /// A stale window handle during a lock screen is normal operation, not
    /// noise worth reporting.
    pub fn is_expected_transient(&self) -> bool {
        matches!(self, CaptureError::StaleWindowHandle)
    }
}

/// Fatal startup failure
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// The high-resolution waitable timer could not be created
    #[error("high-resolution timer could not be created (os error {code})")]
    TimerCreation {
        /// OS error code from timer creation
        code: u32,
    },
}

/// Failure to arm the tick timer for one wait
///
/// Recoverable: the loop reports it diagnostically and attempts the next
/// tick.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to arm the tick timer (os error {code})")]
pub struct WaitError {
    /// OS error code from arming the timer
    pub code: u32,
}
