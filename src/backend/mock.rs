//! Mock desktop backend for testing
//!
//! [`MockBackend`] simulates window enumeration and region capture without a
//! real windowing system. Tests script a window list and a queue of capture
//! outcomes (frames or injected errors) and then drive the tracking loop
//! exactly as the real backends would.
//!
//! # Examples
//!
//! ```
//! use update_delay::backend::{MockBackend, RegionCapturer, WindowEnumerator};
//! use update_delay::model::CapturedFrame;
//!
//! let mut backend = MockBackend::new()
//!     .with_window(0x1000, 42, "Calculator")
//!     .with_frame(CapturedFrame::solid(100, 50, 0));
//!
//! let windows = backend.list_visible().unwrap();
//! let frame = backend.capture(&windows[0], false).unwrap();
//! assert_eq!(frame.width, 100);
//! ```

use std::collections::VecDeque;

use crate::error::{CaptureError, CaptureResult};
use crate::model::{CapturedFrame, Rect, ShowState, WindowDescriptor};

/// One scripted capture outcome
#[derive(Debug, Clone)]
enum Scripted {
    Frame(CapturedFrame),
    Error(CaptureError),
}

/// Scriptable in-memory backend
///
/// Captures are served from a FIFO queue; when the queue runs dry the most
/// recently served frame is repeated, which models a window that has simply
/// stopped repainting.
#[derive(Debug, Default)]
pub struct MockBackend {
    windows: Vec<WindowDescriptor>,
    script: VecDeque<Scripted>,
    last_frame: Option<CapturedFrame>,
    list_error: Option<CaptureError>,
    captures: usize,
}

impl MockBackend {
    /// Creates an empty mock with no windows and no scripted captures
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a visible, normal-state window with default bounds
    pub fn with_window(mut self, handle: u64, pid: u32, title: &str) -> Self {
        self.windows.push(WindowDescriptor {
            handle,
            pid,
            title: title.to_string(),
            bounds: Rect::new(0, 0, 800, 600),
            show_state: ShowState::Normal,
        });
        self
    }

    /// Adds a window with explicit geometry and show-state
    pub fn with_window_descriptor(mut self, descriptor: WindowDescriptor) -> Self {
        self.windows.push(descriptor);
        self
    }

    /// Queues a frame to be served by the next unserved capture call
    pub fn with_frame(mut self, frame: CapturedFrame) -> Self {
        self.script.push_back(Scripted::Frame(frame));
        self
    }

    /// Queues an error to be served by the next unserved capture call
    pub fn with_capture_error(mut self, error: CaptureError) -> Self {
        self.script.push_back(Scripted::Error(error));
        self
    }

    /// Makes every `list_visible` call fail with the given error
    pub fn with_list_error(mut self, error: CaptureError) -> Self {
        self.list_error = Some(error);
        self
    }

    /// Replaces the window list mid-run
    pub fn set_windows(&mut self, windows: Vec<WindowDescriptor>) {
        self.windows = windows;
    }

    /// Queues another frame mid-run
    pub fn push_frame(&mut self, frame: CapturedFrame) {
        self.script.push_back(Scripted::Frame(frame));
    }

    /// Queues another capture error mid-run
    pub fn push_capture_error(&mut self, error: CaptureError) {
        self.script.push_back(Scripted::Error(error));
    }

    /// Number of capture calls served so far
    pub fn capture_count(&self) -> usize {
        self.captures
    }
}

impl super::WindowEnumerator for MockBackend {
    fn list_visible(&mut self) -> CaptureResult<Vec<WindowDescriptor>> {
        if let Some(err) = &self.list_error {
            return Err(err.clone());
        }
        Ok(self.windows.clone())
    }
}

impl super::RegionCapturer for MockBackend {
    fn capture(
        &mut self,
        _window: &WindowDescriptor,
        _whole_window: bool,
    ) -> CaptureResult<CapturedFrame> {
        self.captures += 1;

        match self.script.pop_front() {
            Some(Scripted::Frame(frame)) => {
                self.last_frame = Some(frame.clone());
                Ok(frame)
            }
            Some(Scripted::Error(error)) => Err(error),
            None => match &self.last_frame {
                Some(frame) => Ok(frame.clone()),
                None => Err(CaptureError::ScreenSurfaceUnavailable { code: 0 }),
            },
        }
    }
}
