// sdfview/renderer/src/view.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Zoom and pan shared by both off-screen views.

use euclid::default::{Point2D, Size2D, Transform3D, Vector2D};
use euclid::vec2;

pub const MIN_ZOOM: f32 = 1.0;
const ZOOM_STEP: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    zoom: f32,
    offset: Vector2D<f32>,
}

impl Default for ViewState {
    #[inline]
    fn default() -> ViewState {
        ViewState { zoom: MIN_ZOOM, offset: Vector2D::zero() }
    }
}

impl ViewState {
    #[inline]
    pub fn new() -> ViewState {
        ViewState::default()
    }

    #[inline]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    #[inline]
    pub fn offset(&self) -> Vector2D<f32> {
        self.offset
    }

    #[inline]
    pub fn zoom_in(&mut self) {
        self.zoom += ZOOM_STEP;
    }

    #[inline]
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Applies one wheel event. Only the sign of `amount` matters.
    pub fn scroll(&mut self, amount: i32) {
        if amount > 0 {
            self.zoom_in()
        } else if amount < 0 {
            self.zoom_out()
        }
    }

    /// Moves both views by a mouse delta in window pixels.
    ///
    /// Targets are displayed flipped vertically, so a downward drag moves toward +y here.
    #[inline]
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.offset += vec2(dx as f32, dy as f32);
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = ViewState::default();
    }

    /// Places the unit quad at `position` (plus pan), `size` pixels wide at the current zoom.
    pub fn model_transform(&self, position: Point2D<f32>, size: Size2D<f32>)
                           -> Transform3D<f32> {
        let translation = position + self.offset;
        Transform3D::scale(size.width * self.zoom, size.height * self.zoom, 1.0)
            .then(&Transform3D::translation(translation.x, translation.y, 0.0))
    }
}

/// An orthographic box centered at the origin, one unit per pixel.
pub fn projection(viewport: Size2D<i32>) -> Transform3D<f32> {
    let (half_width, half_height) = (viewport.width as f32 * 0.5, viewport.height as f32 * 0.5);
    Transform3D::ortho(-half_width, half_width, -half_height, half_height, -1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::{projection, ViewState, MIN_ZOOM};
    use euclid::{point2, size2};

    #[test]
    fn wheel_steps_zoom_by_one_and_clamp() {
        let mut view = ViewState::new();
        for _ in 0..3 {
            view.scroll(1);
        }
        assert_eq!(view.zoom(), 4.0);
        view.scroll(-120);
        assert_eq!(view.zoom(), 3.0);
        for _ in 0..10 {
            view.scroll(-1);
        }
        assert_eq!(view.zoom(), MIN_ZOOM);
        view.scroll(0);
        assert_eq!(view.zoom(), MIN_ZOOM);
    }

    #[test]
    fn model_scales_then_translates() {
        let mut view = ViewState::new();
        view.zoom_in();
        view.pan(10, -4);
        let model = view.model_transform(point2(1.0, 2.0), size2(50.0, 20.0));
        let corner = model.transform_point2d(point2(0.5, 0.5)).unwrap();
        assert_eq!(corner, point2(0.5 * 100.0 + 11.0, 0.5 * 40.0 - 2.0));
        view.reset();
        assert_eq!(view, ViewState::new());
    }

    #[test]
    fn projection_maps_viewport_edges_to_clip_space() {
        let projection = projection(size2(500, 300));
        let top_right = projection.transform_point2d(point2(250.0, 150.0)).unwrap();
        let bottom_left = projection.transform_point2d(point2(-250.0, -150.0)).unwrap();
        let center = projection.transform_point2d(point2(0.0, 0.0)).unwrap();
        assert!((top_right.x - 1.0).abs() < 1e-5 && (top_right.y - 1.0).abs() < 1e-5);
        assert!((bottom_left.x + 1.0).abs() < 1e-5 && (bottom_left.y + 1.0).abs() < 1e-5);
        assert!(center.x.abs() < 1e-5 && center.y.abs() < 1e-5);
    }

    quickcheck! {
        fn zoom_never_drops_below_one(steps: Vec<i8>) -> bool {
            let mut view = ViewState::new();
            steps.into_iter().all(|step| {
                view.scroll(step as i32);
                view.zoom() >= MIN_ZOOM
            })
        }
    }
}
