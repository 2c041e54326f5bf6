//! update-delay: measure how often a window's rendered content changes
//!
//! The library behind the `ud` binary. It polls a target window's screen
//! region on a fixed 20ms cadence, diffs each capture against the previous
//! one, and reports the milliseconds elapsed between visible changes.
//!
//! Module map:
//!
//! - [`model`] - window descriptors, captured frames, geometry
//! - [`backend`] - window enumeration and region capture (Win32 GDI on
//!   Windows, a scriptable mock everywhere for tests), plus target matching
//! - [`diff`] - retained-frame change detection
//! - [`timing`] - the absolute-deadline tick waiter
//! - [`report`] - inter-change latency output
//! - [`monitor`] - the tracking loop and the window-listing mode
//! - [`error`] - the fatal/recoverable error taxonomy

pub mod backend;
pub mod diff;
pub mod error;
pub mod model;
pub mod monitor;
pub mod report;
pub mod timing;
