//! Pointer tracking: raw cursor pixels to a signed unit range.
//!
//! The tracker listens to window cursor events, normalizes pixel
//! coordinates against the current viewport, and publishes the latest
//! sample through a shared [`Signal`]. No history, no debouncing: smoothing
//! is the rotation interpolator's job.

use crate::signal::Signal;
use winit::event::WindowEvent;

/// The most recent normalized pointer position.
///
/// `(0, 0)` is the viewport center; `(-1, -1)` the top-left corner and
/// `(1, 1)` the bottom-right. Values can leave the unit range while the
/// cursor is outside the viewport; downstream consumers bound the resulting
/// rotation, not the sample itself.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    /// The resting sample: pointer at the viewport center.
    pub const CENTER: Self = Self { x: 0.0, y: 0.0 };

    /// Normalizes pixel coordinates: `px / width * 2 - 1` per axis.
    pub fn from_pixels(px: f32, py: f32, width: f32, height: f32) -> Self {
        Self {
            x: px / width * 2.0 - 1.0,
            y: py / height * 2.0 - 1.0,
        }
    }
}

/// Subscribes to cursor movement and republishes normalized samples.
pub struct PointerTracker {
    signal: Signal<PointerSample>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            signal: Signal::new(PointerSample::CENTER),
        }
    }

    /// The shared sample handle viewers read each frame.
    pub fn signal(&self) -> Signal<PointerSample> {
        self.signal.clone()
    }

    /// Feeds a window event through the tracker. Every cursor move
    /// overwrites the published sample synchronously.
    pub fn handle_event(&self, event: &WindowEvent, width: u32, height: u32) {
        if let WindowEvent::CursorMoved { position, .. } = event
            && width > 0
            && height > 0
        {
            self.signal.set(PointerSample::from_pixels(
                position.x as f32,
                position.y as f32,
                width as f32,
                height as f32,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_center_maps_to_zero() {
        let s = PointerSample::from_pixels(400.0, 300.0, 800.0, 600.0);
        assert_eq!(s, PointerSample::CENTER);
    }

    #[test]
    fn viewport_corners_map_to_unit_range() {
        let tl = PointerSample::from_pixels(0.0, 0.0, 800.0, 600.0);
        assert_eq!(tl, PointerSample { x: -1.0, y: -1.0 });

        let br = PointerSample::from_pixels(800.0, 600.0, 800.0, 600.0);
        assert_eq!(br, PointerSample { x: 1.0, y: 1.0 });
    }

    #[test]
    fn out_of_viewport_samples_may_exceed_unit_range() {
        let s = PointerSample::from_pixels(1000.0, -50.0, 800.0, 600.0);
        assert!(s.x > 1.0);
        assert!(s.y < -1.0);
    }

    #[test]
    fn latest_sample_wins() {
        let tracker = PointerTracker::new();
        let signal = tracker.signal();

        signal.set(PointerSample { x: 0.2, y: 0.2 });
        signal.set(PointerSample { x: -0.7, y: 0.1 });
        assert_eq!(signal.get(), PointerSample { x: -0.7, y: 0.1 });
    }
}
