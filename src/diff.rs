//! Frame differencing
//!
//! [`FrameDiffer`] owns the single retained frame for the life of a run and
//! answers one question per tick: did the newly captured frame differ from
//! the previous one?
//!
//! The comparison is a full elementwise pass over every pixel, O(width x
//! height) per tick. That is deliberate: captures are bounded by window size
//! and arrive only every 20ms, so hashing or incremental diffing would add
//! complexity without buying anything.

use crate::model::CapturedFrame;

/// Retains the last-accepted frame and detects changes against it
///
/// Exactly one retained frame exists at any time. `observe` consumes each
/// new capture and either adopts it (replacing the retained frame) or drops
/// it, so no buffer outlives its usefulness.
#[derive(Debug, Default)]
pub struct FrameDiffer {
    retained: Option<CapturedFrame>,
}

impl FrameDiffer {
    /// Creates a differencer with no baseline yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares a new capture against the retained frame
    ///
    /// Returns `true` when the frame differs from the retained one. The very
    /// first frame becomes the baseline unconditionally and is never itself
    /// reported as a change. A mismatch in width, height, or bit depth is a
    /// change in its own right (a resize repaints the window); otherwise
    /// every pixel is compared, short-circuiting on the first difference.
    ///
    /// On change the new frame replaces the retained one; on no change the
    /// new frame is dropped and the baseline kept.
    pub fn observe(&mut self, frame: CapturedFrame) -> bool {
        let Some(prior) = &self.retained else {
            self.retained = Some(frame);
            return false;
        };

        let metadata_matches = prior.width == frame.width
            && prior.height == frame.height
            && prior.bits_per_pixel == frame.bits_per_pixel;

        // Slice equality short-circuits on the first differing pixel.
        if metadata_matches && prior.pixels == frame.pixels {
            return false;
        }

        self.retained = Some(frame);
        true
    }

    /// The currently retained frame, if a baseline exists
    pub fn retained(&self) -> Option<&CapturedFrame> {
        self.retained.as_ref()
    }
}
