//! Desktop backends: window enumeration and region capture
//!
//! A backend supplies the two platform capabilities the tracking loop needs:
//!
//! - [`WindowEnumerator`] - list the currently visible, titled, top-level
//!   windows in normal or maximized show-state
//! - [`RegionCapturer`] - grab a window's screen region into an owned
//!   [`CapturedFrame`](crate::model::CapturedFrame)
//!
//! Capture reads the shared screen framebuffer, not a per-window off-screen
//! image, so anything overlapping the target region becomes part of the
//! captured pixels. That is intentional: for measurement purposes an
//! obscuring window is part of "the app".
//!
//! [`MockBackend`] is always compiled and backs the unit and integration
//! tests; the Win32 GDI backend is compiled on Windows only.

use crate::error::CaptureResult;
use crate::model::{CapturedFrame, WindowDescriptor};

pub mod matching;
pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows_backend;

pub use matching::{TargetSpec, resolve, wildcard_to_regex};
pub use mock::MockBackend;
#[cfg(target_os = "windows")]
pub use windows_backend::WindowsBackend;

/// Lists visible top-level windows
pub trait WindowEnumerator {
    /// Produces a fresh snapshot of the eligible windows
    ///
    /// Eligible means: visible, top-level, non-empty title, normal or
    /// maximized show-state, and not the console window this tool runs in.
    /// Enumeration order is OS-defined and carries no guarantee beyond
    /// "first match wins" for callers that scan it.
    fn list_visible(&mut self) -> CaptureResult<Vec<WindowDescriptor>>;
}

/// Captures a window's screen region into a pixel buffer
pub trait RegionCapturer {
    /// Grabs the window's region from the shared screen framebuffer
    ///
    /// With `whole_window` set the full window bounds are captured,
    /// including border chrome; otherwise only the client area, translated
    /// into screen coordinates. The returned frame is normalized to
    /// uncompressed 32-bit direct color.
    fn capture(
        &mut self,
        window: &WindowDescriptor,
        whole_window: bool,
    ) -> CaptureResult<CapturedFrame>;
}

/// A full desktop backend: enumeration plus capture
pub trait DesktopBackend: WindowEnumerator + RegionCapturer {}

impl<T: WindowEnumerator + RegionCapturer> DesktopBackend for T {}

/// Creates the capture backend for the current platform
///
/// - **Windows**: Win32 GDI backend with full enumeration and capture
/// - **other platforms**: a structured [`CaptureError::BackendUnavailable`]
pub fn create_default_backend() -> CaptureResult<Box<dyn DesktopBackend>> {
    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(WindowsBackend::new()))
    }

    #[cfg(not(target_os = "windows"))]
    {
        Err(crate::error::CaptureError::BackendUnavailable)
    }
}

/// Switches the process into the physical-pixel coordinate space
///
/// Must be called once at startup, before any geometry query or capture.
/// On Windows this opts the process into per-monitor DPI awareness so every
/// rectangle and blit works in physical pixels regardless of each monitor's
/// scale factor. On other platforms it is a no-op.
pub fn init_physical_pixel_space() {
    #[cfg(target_os = "windows")]
    windows_backend::init_dpi_awareness();
}
