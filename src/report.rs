//! Change reporting
//!
//! [`ChangeReporter`] turns detected frame changes into the tool's output
//! stream: the milliseconds elapsed since the previous change, printed
//! comma-separated and wrapped into groups of ten per line for readability.
//!
//! Only the previous change timestamp is retained; there is no history log.

use std::io::Write;
use std::time::Instant;

/// Number of deltas printed per output line
pub const GROUP_SIZE: u32 = 10;

/// Emits inter-change latencies to an output sink
///
/// Generic over the sink so tests can capture output in a `Vec<u8>` while
/// the binary writes to stdout.
#[derive(Debug)]
pub struct ChangeReporter<W: Write> {
    out: W,
    previous_change: Instant,
    shown_in_group: u32,
}

impl<W: Write> ChangeReporter<W> {
    /// Creates a reporter whose first delta is measured from `start`
    ///
    /// `start` should be the loop's start time so the first reported value
    /// is the latency from startup to the first detected change.
    pub fn new(start: Instant, out: W) -> Self {
        Self {
            out,
            previous_change: start,
            shown_in_group: 0,
        }
    }

    /// Records a detected change at `now` and emits the delta
    ///
    /// Emits `now - previous_change` in milliseconds and makes `now` the new
    /// reference point. Every [`GROUP_SIZE`] values a line break is inserted;
    /// purely cosmetic.
    pub fn on_change(&mut self, now: Instant) -> std::io::Result<u128> {
        let delta = now.duration_since(self.previous_change).as_millis();
        self.previous_change = now;

        if self.shown_in_group != 0 && self.shown_in_group % GROUP_SIZE == 0 {
            self.shown_in_group = 0;
            writeln!(self.out)?;
        }

        write!(self.out, "{delta:>8}, ")?;
        self.out.flush()?;
        self.shown_in_group += 1;

        Ok(delta)
    }

    /// Consumes the reporter and returns the sink
    pub fn into_inner(self) -> W {
        self.out
    }
}
