//! View transform for pan/zoom over the plan bitmap.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom level.
pub const MIN_ZOOM: f64 = 0.2;
/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 4.0;
/// Zoom change per toolbar click or wheel notch.
pub const ZOOM_STEP: f64 = 0.1;

/// View transform mapping world (page bitmap) coordinates to the screen.
///
/// `surface_scale` is the ratio of physical to logical pixels on the output
/// surface. Pointer input arrives in logical pixels, so conversions fold the
/// surface scale in before applying the pan/zoom transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Current translation offset (pan), in surface pixels
    pub pan: Vec2,
    /// Current zoom level (1.0 = plan bitmap at native size)
    pub zoom: f64,
    /// Physical-to-logical pixel ratio of the output surface
    pub surface_scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            surface_scale: 1.0,
        }
    }
}

impl ViewTransform {
    /// Create a new view transform at 100% zoom with no pan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts world coordinates to surface coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a pointer position in logical screen pixels to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        let surface = Point::new(
            screen_point.x * self.surface_scale,
            screen_point.y * self.surface_scale,
        );
        self.inverse_transform() * surface
    }

    /// Convert a world point to logical screen pixels.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        let surface = self.transform() * world_point;
        Point::new(surface.x / self.surface_scale, surface.y / self.surface_scale)
    }

    /// Pan by a delta in logical screen pixels.
    pub fn pan_by(&mut self, screen_delta: Vec2) {
        self.pan += screen_delta * self.surface_scale;
    }

    /// Step the zoom by a whole number of notches, clamped to the legal range.
    ///
    /// The pan offset is left untouched, so the world origin stays pinned to
    /// the same surface position while everything scales around it.
    pub fn zoom_by_steps(&mut self, steps: i32) {
        let target = self.zoom + ZOOM_STEP * f64::from(steps);
        self.zoom = target.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.zoom_by_steps(1);
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.zoom_by_steps(-1);
    }

    /// Reset to 100% zoom at the page origin. Surface scale is a property of
    /// the output device and survives the reset.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }
}
