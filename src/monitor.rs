//! Tracking and enumeration drivers
//!
//! [`run_tracking`] is the tool's main mode: a fixed-cadence loop that
//! re-resolves the target window every tick, captures its screen region,
//! diffs it against the retained frame, and reports the elapsed time when
//! something changed. [`run_enumerate`] is the discovery mode that prints a
//! table of eligible windows and exits.
//!
//! The loop is deliberately single-threaded and synchronous. One capture
//! completes well within one 20ms tick, and overlapping captures would only
//! blur the measurement the tool exists to make.

use std::io::Write;
use std::time::Instant;

use crate::backend::{DesktopBackend, TargetSpec, resolve};
use crate::diff::FrameDiffer;
use crate::error::{CaptureResult, InitError};
use crate::report::ChangeReporter;
use crate::timing::{PrecisionWaiter, TICK_PERIOD};

/// Settings for one tracking run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// What to track
    pub target: TargetSpec,
    /// Capture the full window bounds instead of just the client area
    pub whole_window: bool,
    /// Polling period
    pub period: std::time::Duration,
}

impl RunConfig {
    /// Builds a config with the standard 20ms cadence
    pub fn new(target: TargetSpec) -> Self {
        Self {
            target,
            whole_window: false,
            period: TICK_PERIOD,
        }
    }
}

/// What one tick of the tracking loop did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No window currently matches the target
    NoTarget,
    /// Captured and compared; nothing changed
    Unchanged,
    /// Captured and compared; a change was reported
    Changed,
    /// Enumeration or capture failed; the tick was skipped
    Skipped,
}

/// Per-run tracking state: the retained frame and the change reporter
#[derive(Debug)]
pub struct Tracker<W: Write> {
    differ: FrameDiffer,
    reporter: ChangeReporter<W>,
}

impl<W: Write> Tracker<W> {
    /// Creates a tracker whose first reported delta is measured from `start`
    pub fn new(start: Instant, out: W) -> Self {
        Self {
            differ: FrameDiffer::new(),
            reporter: ChangeReporter::new(start, out),
        }
    }

    /// Runs one tick: resolve, capture, diff, report
    ///
    /// Every failure is contained here. A missing target and a stale window
    /// handle are both normal states (the app may not be running yet, the
    /// screen may be locked) and retried silently; any other failure is
    /// logged and retried the same way.
    pub fn tick<B: DesktopBackend + ?Sized>(
        &mut self,
        config: &RunConfig,
        backend: &mut B,
    ) -> TickOutcome {
        let windows = match backend.list_visible() {
            Ok(windows) => windows,
            Err(err) => {
                tracing::warn!("window enumeration failed: {err}");
                return TickOutcome::Skipped;
            }
        };

        let Some(window) = resolve(&config.target, &windows) else {
            return TickOutcome::NoTarget;
        };

        let frame = match backend.capture(window, config.whole_window) {
            Ok(frame) => frame,
            Err(err) if err.is_expected_transient() => {
                tracing::trace!("capture skipped: {err}");
                return TickOutcome::Skipped;
            }
            Err(err) => {
                tracing::warn!("capture failed: {err}");
                return TickOutcome::Skipped;
            }
        };

        if !self.differ.observe(frame) {
            return TickOutcome::Unchanged;
        }

        match self.reporter.on_change(Instant::now()) {
            Ok(delta) => {
                tracing::debug!("content changed after {delta}ms");
                #[cfg(target_os = "windows")]
                {
                    let (gdi, user) = crate::backend::windows_backend::gui_resource_counts();
                    tracing::debug!("gdi objects {gdi}, user objects {user}");
                }
                TickOutcome::Changed
            }
            Err(err) => {
                tracing::warn!("failed to write change report: {err}");
                TickOutcome::Skipped
            }
        }
    }

    /// Consumes the tracker and returns the output sink
    pub fn into_writer(self) -> W {
        self.reporter.into_inner()
    }
}

/// Runs the tracking loop until the process is terminated
///
/// Fails only if the tick timer cannot be created at startup. A failure to
/// arm the timer for a single wait is logged and the loop presses on; the
/// cadence for that tick degrades but measurement continues.
pub fn run_tracking<B, W>(config: &RunConfig, backend: &mut B, out: W) -> Result<(), InitError>
where
    B: DesktopBackend + ?Sized,
    W: Write,
{
    let mut waiter = PrecisionWaiter::new(config.period)?;
    let mut tracker = Tracker::new(Instant::now(), out);

    tracing::info!(
        "tracking '{}' every {:?} ({})",
        config.target.raw(),
        config.period,
        if config.whole_window { "whole window" } else { "client area" },
    );

    loop {
        if let Err(err) = waiter.wait_until_next_tick() {
            tracing::warn!("tick wait failed, continuing: {err}");
        }
        tracker.tick(config, backend);
    }
}

/// Prints a table of all eligible windows
///
/// Discovery mode for when no target is given: one row per visible, titled,
/// normal-or-maximized top-level window, with the geometry and ids a user
/// needs to build a target argument.
pub fn run_enumerate<B, W>(backend: &mut B, out: &mut W) -> CaptureResult<()>
where
    B: DesktopBackend + ?Sized,
    W: Write,
{
    let windows = backend.list_visible()?;

    writeln!(out, "   left    top  right bottom       hwnd   pid text")?;
    for window in &windows {
        writeln!(
            out,
            " {:6} {:6} {:6} {:6} {:#10x} {:5} '{}'",
            window.bounds.left,
            window.bounds.top,
            window.bounds.right,
            window.bounds.bottom,
            window.handle,
            window.pid,
            sanitize_title(&window.title),
        )?;
    }
    out.flush()?;

    Ok(())
}

/// Replaces general-punctuation characters in a title with plain spaces
///
/// Some applications decorate their titles with zero-width and directional
/// marks (U+2000..U+206F) that garble console output; they are flattened to
/// spaces for display only, never for matching.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if ('\u{2000}'..='\u{206f}').contains(&c) { ' ' } else { c })
        .collect()
}
