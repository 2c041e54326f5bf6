//! Precision tick timing
//!
//! [`PrecisionWaiter`] drives the fixed-cadence polling loop. It tracks an
//! absolute deadline for the next tick and always advances that deadline by
//! the configured period, so sleep overshoot on one tick is recovered on the
//! next and drift does not accumulate across thousands of ticks the way a
//! chain of relative sleeps would.
//!
//! On Windows the wait itself is backed by a high-resolution waitable timer;
//! creating that timer can fail, which is fatal ([`InitError`]). Arming it
//! for a single wait can also fail in rare cases, which is recoverable: the
//! caller logs it and tries the next tick. On other platforms the wait is a
//! plain monotonic-clock sleep, which cannot fail to arm.

use std::time::{Duration, Instant};

use crate::error::{InitError, WaitError};

/// Nominal polling period of the tracking loop
pub const TICK_PERIOD: Duration = Duration::from_millis(20);

/// Absolute-deadline waiter for the polling loop
#[derive(Debug)]
pub struct PrecisionWaiter {
    period: Duration,
    next_deadline: Instant,
    #[cfg(target_os = "windows")]
    timer: os::WaitableTimer,
}

impl PrecisionWaiter {
    /// Creates a waiter that ticks once per `period`
    ///
    /// The first deadline is one period from now. Fails with
    /// [`InitError::TimerCreation`] if the underlying timer object cannot be
    /// created; the process cannot run without it.
    pub fn new(period: Duration) -> Result<Self, InitError> {
        Ok(Self {
            period,
            next_deadline: Instant::now() + period,
            #[cfg(target_os = "windows")]
            timer: os::WaitableTimer::new()?,
        })
    }

    /// Blocks until the next tick deadline
    ///
    /// The following deadline is scheduled one period after the current one,
    /// not one period after wakeup, so cadence stays locked to the start
    /// time. If the loop body overran and the deadline is already more than
    /// a period in the past, the schedule is rebased to now + period instead
    /// of emitting a burst of catch-up ticks.
    pub fn wait_until_next_tick(&mut self) -> Result<(), WaitError> {
        let deadline = self.next_deadline;
        let result = self.sleep_until(deadline);

        let now = Instant::now();
        let scheduled = deadline + self.period;
        self.next_deadline = if scheduled > now { scheduled } else { now + self.period };

        result
    }

    /// Blocks for approximately `ms` milliseconds
    ///
    /// One-shot wait against the same high-resolution primitive; does not
    /// affect the tick schedule.
    pub fn wait_millis(&mut self, ms: u64) -> Result<(), WaitError> {
        self.sleep_until(Instant::now() + Duration::from_millis(ms))
    }

    /// Configured tick period
    pub fn period(&self) -> Duration {
        self.period
    }

    #[cfg(target_os = "windows")]
    fn sleep_until(&mut self, deadline: Instant) -> Result<(), WaitError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(());
        }
        self.timer.wait_for(remaining)
    }

    #[cfg(not(target_os = "windows"))]
    fn sleep_until(&mut self, deadline: Instant) -> Result<(), WaitError> {
        // thread::sleep can wake early on some platforms; loop until the
        // monotonic clock actually reaches the deadline.
        loop {
            let now = Instant::now();
            let Some(remaining) = deadline.checked_duration_since(now) else {
                return Ok(());
            };
            std::thread::sleep(remaining);
        }
    }
}

#[cfg(target_os = "windows")]
mod os {
    use std::time::Duration;

    use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, HANDLE, WAIT_OBJECT_0};
    use windows_sys::Win32::System::Threading::{
        CREATE_WAITABLE_TIMER_HIGH_RESOLUTION, CreateWaitableTimerExW, INFINITE, SetWaitableTimer,
        TIMER_ALL_ACCESS, WaitForSingleObject,
    };

    use crate::error::{InitError, WaitError};

    /// Owned Win32 waitable timer handle, closed on drop
    #[derive(Debug)]
    pub(super) struct WaitableTimer {
        handle: HANDLE,
    }

    // The handle is only ever used from the loop thread, but owning it is
    // thread-safe.
    unsafe impl Send for WaitableTimer {}

    impl WaitableTimer {
        pub(super) fn new() -> Result<Self, InitError> {
            // SAFETY: null attributes and name are documented as valid;
            // the returned handle is owned by this struct.
            let handle = unsafe {
                CreateWaitableTimerExW(
                    std::ptr::null(),
                    std::ptr::null(),
                    CREATE_WAITABLE_TIMER_HIGH_RESOLUTION,
                    TIMER_ALL_ACCESS,
                )
            };

            // High-resolution timers need Windows 10 1803+; retry without
            // the flag before giving up.
            let handle = if handle.is_null() {
                tracing::debug!("high-resolution timer unavailable, falling back to standard");
                unsafe {
                    CreateWaitableTimerExW(std::ptr::null(), std::ptr::null(), 0, TIMER_ALL_ACCESS)
                }
            } else {
                handle
            };

            if handle.is_null() {
                let code = unsafe { GetLastError() };
                return Err(InitError::TimerCreation { code });
            }

            Ok(Self { handle })
        }

        /// Arms the timer for a relative wait and blocks until it fires
        pub(super) fn wait_for(&self, duration: Duration) -> Result<(), WaitError> {
            // Negative due time = relative, in 100ns units.
            let due = -(duration.as_nanos() as i64 / 100).max(1);

            // SAFETY: self.handle is a valid timer handle for the lifetime
            // of this struct; no completion routine is registered.
            let armed = unsafe {
                SetWaitableTimer(self.handle, &due, 0, None, std::ptr::null(), 0)
            };
            if armed == 0 {
                let code = unsafe { GetLastError() };
                return Err(WaitError { code });
            }

            // SAFETY: waiting on an armed timer handle we own.
            let waited = unsafe { WaitForSingleObject(self.handle, INFINITE) };
            if waited != WAIT_OBJECT_0 {
                let code = unsafe { GetLastError() };
                return Err(WaitError { code });
            }

            Ok(())
        }
    }

    impl Drop for WaitableTimer {
        fn drop(&mut self) {
            // SAFETY: handle was created by CreateWaitableTimerExW and is
            // closed exactly once.
            unsafe {
                CloseHandle(self.handle);
            }
        }
    }
}
