//! End-to-end tracking scenarios driven through the mock backend
//!
//! These exercise the whole per-tick pipeline (enumerate, resolve, capture,
//! diff, report) the way the binary wires it together, with the mock backend
//! standing in for the Win32 one.

use std::time::Instant;

use update_delay::backend::{MockBackend, TargetSpec};
use update_delay::error::CaptureError;
use update_delay::model::{CapturedFrame, Rect, ShowState, WindowDescriptor};
use update_delay::monitor::{RunConfig, TickOutcome, Tracker, run_enumerate};

fn config(target: &str) -> RunConfig {
    RunConfig::new(TargetSpec::parse(target).unwrap())
}

fn descriptor(handle: u64, pid: u32, title: &str, show_state: ShowState) -> WindowDescriptor {
    WindowDescriptor {
        handle,
        pid,
        title: title.to_string(),
        bounds: Rect::new(100, 100, 900, 700),
        show_state,
    }
}

#[test]
fn baseline_then_changes_then_quiet() {
    let mut backend = MockBackend::new()
        .with_window(0x6bf0, 27632, "Calculator")
        .with_frame(CapturedFrame::solid(16, 16, 0x01))
        .with_frame(CapturedFrame::solid(16, 16, 0x02))
        .with_frame(CapturedFrame::solid(16, 16, 0x03));

    let cfg = config("calc*");
    let mut tracker = Tracker::new(Instant::now(), Vec::new());

    // First capture is the silent baseline.
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Unchanged);
    // Two distinct frames, two reported changes.
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Changed);
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Changed);
    // Script exhausted: the last frame repeats, so the window has gone quiet.
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Unchanged);
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Unchanged);

    let output = String::from_utf8(tracker.into_writer()).unwrap();
    // Exactly two delta fields, each "value, " with an 8-wide value.
    let fields: Vec<&str> = output.split_terminator(", ").collect();
    assert_eq!(fields.len(), 2);
    for field in fields {
        assert_eq!(field.len(), 8);
        assert!(field.trim_start().chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn no_matching_window_produces_no_output() {
    let mut backend = MockBackend::new()
        .with_window(0x10, 100, "Editor")
        .with_frame(CapturedFrame::solid(8, 8, 1));

    let cfg = config("calc*");
    let mut tracker = Tracker::new(Instant::now(), Vec::new());

    for _ in 0..5 {
        assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::NoTarget);
    }
    assert_eq!(backend.capture_count(), 0);
    assert!(tracker.into_writer().is_empty());
}

#[test]
fn target_matched_by_process_id() {
    let mut backend = MockBackend::new()
        .with_window(0x10, 27632, "Some Unrelated Title")
        .with_frame(CapturedFrame::solid(8, 8, 1))
        .with_frame(CapturedFrame::solid(8, 8, 2));

    let cfg = config("27632");
    let mut tracker = Tracker::new(Instant::now(), Vec::new());

    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Unchanged);
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Changed);
}

#[test]
fn target_matched_by_hex_handle() {
    let mut backend = MockBackend::new()
        .with_window(0x6bf0, 99, "Whatever")
        .with_frame(CapturedFrame::solid(8, 8, 1));

    let cfg = config("0x6bf0");
    let mut tracker = Tracker::new(Instant::now(), Vec::new());
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Unchanged);
    assert_eq!(backend.capture_count(), 1);
}

#[test]
fn minimized_window_is_never_selected() {
    let mut backend = MockBackend::new()
        .with_window_descriptor(descriptor(0x10, 100, "Calculator", ShowState::Other))
        .with_frame(CapturedFrame::solid(8, 8, 1));

    let cfg = config("calc*");
    let mut tracker = Tracker::new(Instant::now(), Vec::new());
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::NoTarget);
    assert_eq!(backend.capture_count(), 0);
}

#[test]
fn lock_screen_interlude_preserves_the_baseline() {
    let mut backend = MockBackend::new()
        .with_window(0x10, 100, "Calculator")
        .with_frame(CapturedFrame::solid(8, 8, 7))
        .with_capture_error(CaptureError::StaleWindowHandle)
        .with_capture_error(CaptureError::StaleWindowHandle)
        .with_frame(CapturedFrame::solid(8, 8, 7))
        .with_frame(CapturedFrame::solid(8, 8, 8));

    let cfg = config("calc*");
    let mut tracker = Tracker::new(Instant::now(), Vec::new());

    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Unchanged);
    // The lock screen makes captures fail; ticks are skipped, not reported.
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Skipped);
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Skipped);
    // Unlocked: the unchanged frame diffs clean against the kept baseline.
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Unchanged);
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Changed);
}

#[test]
fn window_resize_counts_as_a_change() {
    let mut backend = MockBackend::new()
        .with_window(0x10, 100, "Calculator")
        .with_frame(CapturedFrame::solid(16, 16, 5))
        .with_frame(CapturedFrame::solid(20, 16, 5));

    let cfg = config("calc*");
    let mut tracker = Tracker::new(Instant::now(), Vec::new());

    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Unchanged);
    assert_eq!(tracker.tick(&cfg, &mut backend), TickOutcome::Changed);
}

#[test]
fn deltas_wrap_every_ten_values() {
    let mut backend = MockBackend::new().with_window(0x10, 100, "Calculator");
    for i in 0..24u32 {
        backend.push_frame(CapturedFrame::solid(8, 8, i));
    }

    let cfg = config("calc*");
    let mut tracker = Tracker::new(Instant::now(), Vec::new());
    for _ in 0..24 {
        tracker.tick(&cfg, &mut backend);
    }

    // 24 frames = baseline + 23 changes = two full lines and a partial.
    let output = String::from_utf8(tracker.into_writer()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].matches(',').count(), 10);
    assert_eq!(lines[1].matches(',').count(), 10);
    assert_eq!(lines[2].matches(',').count(), 3);
}

#[test]
fn enumerate_renders_the_window_table() {
    let mut backend = MockBackend::new()
        .with_window_descriptor(descriptor(0x6bf0, 27632, "Calculator", ShowState::Normal))
        .with_window_descriptor(descriptor(0xbeef, 404, "Editor - draft.txt", ShowState::Maximized));

    let mut out = Vec::new();
    run_enumerate(&mut backend, &mut out).unwrap();
    let output = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "   left    top  right bottom       hwnd   pid text");
    assert!(lines[1].contains("0x6bf0"));
    assert!(lines[1].ends_with("'Calculator'"));
    assert!(lines[2].contains("'Editor - draft.txt'"));
}

#[test]
fn enumerate_with_no_windows_prints_header_only() {
    let mut backend = MockBackend::new();
    let mut out = Vec::new();
    run_enumerate(&mut backend, &mut out).unwrap();

    let output = String::from_utf8(out).unwrap();
    assert_eq!(output.lines().count(), 1);
}
