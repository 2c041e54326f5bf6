//! Data models for window tracking and frame capture
//!
//! This module defines the core types passed between the locator, capturer,
//! and differencer:
//!
//! - [`WindowDescriptor`] - transient snapshot of a visible top-level window,
//!   produced fresh on every enumeration pass
//! - [`CapturedFrame`] - an owned, normalized pixel buffer grabbed from the
//!   screen
//! - [`Rect`] / [`ShowState`] - window geometry and placement state
//!
//! All coordinates are physical pixels. Per-monitor DPI scaling is disabled
//! process-wide at startup so geometry is consistent across monitors with
//! different scale factors.

/// Rectangle in physical screen coordinates (left, top, right, bottom)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Creates a rectangle from its four edges
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width in pixels (zero if the rectangle is inverted)
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    /// Height in pixels (zero if the rectangle is inverted)
    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }
}

/// Window placement state as reported by the window manager
///
/// Only `Normal` and `Maximized` windows can be meaningfully captured;
/// minimized or otherwise hidden windows have no on-screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowState {
    /// Restored at its normal position
    Normal,
    /// Maximized to fill its monitor
    Maximized,
    /// Minimized, hidden, or any other placement
    Other,
}

/// Snapshot of a visible top-level window
///
/// Descriptors are transient: they are produced fresh on every enumeration
/// pass and are not stable identities across passes. The driving loop
/// re-resolves its target every tick for exactly this reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDescriptor {
    /// Raw window handle value (HWND on Windows)
    pub handle: u64,
    /// Owning process id
    pub pid: u32,
    /// Window title text
    pub title: String,
    /// Full window bounds in physical screen coordinates
    pub bounds: Rect,
    /// Placement state at enumeration time
    pub show_state: ShowState,
}

impl WindowDescriptor {
    /// Whether this window is a candidate for capture
    ///
    /// Only normal or maximized windows have on-screen content to grab.
    pub fn capturable(&self) -> bool {
        matches!(self.show_state, ShowState::Normal | ShowState::Maximized)
    }
}

/// An owned pixel buffer captured from the screen
///
/// Pixels are stored in uncompressed 32-bit direct-color form (one `u32` per
/// pixel, row-major), already normalized from whatever packed representation
/// the native capture path produced. Two frames with equal metadata are
/// directly comparable element by element.
///
/// Ownership transfers from the capturer to the differencer on every tick;
/// the differencer either retains the frame or drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bit depth of each pixel (32 for direct-color captures)
    pub bits_per_pixel: u16,
    /// Row-major pixel data, `width * height` entries
    pub pixels: Vec<u32>,
}

impl CapturedFrame {
    /// Creates a frame from raw pixel data
    ///
    /// The pixel vector length must be `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize));
        Self {
            width,
            height,
            bits_per_pixel: 32,
            pixels,
        }
    }

    /// Creates a solid-color frame (useful for mock backends and tests)
    pub fn solid(width: u32, height: u32, color: u32) -> Self {
        Self::from_pixels(width, height, vec![color; (width as usize) * (height as usize)])
    }

    /// Number of pixels in the buffer
    pub fn extent(&self) -> usize {
        self.pixels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(10, 20, 110, 70);
        assert_eq!(r.width(), 100);
        assert_eq!(r.height(), 50);
    }

    #[test]
    fn test_rect_negative_origin() {
        // Windows on a monitor to the left have negative coordinates
        let r = Rect::new(-1920, 0, 0, 1080);
        assert_eq!(r.width(), 1920);
        assert_eq!(r.height(), 1080);
    }

    #[test]
    fn test_rect_inverted_is_empty() {
        let r = Rect::new(100, 100, 50, 50);
        assert_eq!(r.width(), 0);
        assert_eq!(r.height(), 0);
    }

    #[test]
    fn test_capturable_states() {
        let mut w = WindowDescriptor {
            handle: 0x1000,
            pid: 42,
            title: "Test".to_string(),
            bounds: Rect::new(0, 0, 100, 100),
            show_state: ShowState::Normal,
        };
        assert!(w.capturable());

        w.show_state = ShowState::Maximized;
        assert!(w.capturable());

        w.show_state = ShowState::Other;
        assert!(!w.capturable());
    }

    #[test]
    fn test_solid_frame() {
        let f = CapturedFrame::solid(100, 50, 0x00ff_00ff);
        assert_eq!(f.width, 100);
        assert_eq!(f.height, 50);
        assert_eq!(f.bits_per_pixel, 32);
        assert_eq!(f.extent(), 5000);
        assert!(f.pixels.iter().all(|&p| p == 0x00ff_00ff));
    }
}
