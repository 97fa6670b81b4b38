// sdfview/demo/common/src/ui.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Keyboard and mouse controls for the glyph and distance field parameters.

use crate::window::{Event, Keycode};
use sdfview_glyph::GlyphParams;
use sdfview_renderer::SdfParams;

const PIXEL_SIZE_STEP: u32 = 8;
const SPREAD_STEP: f32 = 1.0;
const THRESHOLD_STEP: f32 = 0.01;

/// The parameter model behind the controls.
pub struct Controls {
    glyph: GlyphParams,
    sdf: SdfParams,
}

/// What an event changed, so the caller knows which subsystem to update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UIAction {
    None,
    Quit,
    /// The window needs to be redrawn but nothing else changed.
    Redraw,
    View(ViewAction),
    SdfUniform(SdfUniform),
    RebuildGlyph,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewAction {
    Scroll(i32),
    Pan { dx: i32, dy: i32 },
    Reset,
}

/// A single uniform of the distance field program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SdfUniform {
    ShowRendered,
    Width,
    Edge,
}

impl Controls {
    pub fn new(glyph: GlyphParams, sdf: SdfParams) -> Controls {
        Controls { glyph: glyph.clamped(), sdf }
    }

    #[inline]
    pub fn glyph_params(&self) -> GlyphParams {
        self.glyph
    }

    #[inline]
    pub fn sdf_params(&self) -> &SdfParams {
        &self.sdf
    }

    pub fn handle_event(&mut self, event: &Event) -> UIAction {
        match *event {
            Event::Quit | Event::KeyDown(Keycode::Escape) => UIAction::Quit,
            Event::WindowResized => UIAction::Redraw,
            Event::MouseWheel(0) => UIAction::None,
            Event::MouseWheel(amount) => UIAction::View(ViewAction::Scroll(amount)),
            Event::MouseDragged { dx, dy } => UIAction::View(ViewAction::Pan { dx, dy }),
            Event::KeyDown(Keycode::Space) => {
                self.sdf.show_rendered = !self.sdf.show_rendered;
                UIAction::SdfUniform(SdfUniform::ShowRendered)
            }
            Event::KeyDown(Keycode::Up) => {
                self.set_glyph_index(self.glyph.glyph_index.saturating_add(1))
            }
            Event::KeyDown(Keycode::Down) => {
                self.set_glyph_index(self.glyph.glyph_index.saturating_sub(1))
            }
            Event::KeyDown(Keycode::Alphanumeric(key)) => self.handle_key(key),
        }
    }

    /// The window title, which doubles as the parameter read-out.
    pub fn title(&self) -> String {
        format!("sdfview: glyph {} at {}px, spread {}, width {:.2}, edge {:.2}, {}",
                self.glyph.glyph_index,
                self.glyph.pixel_size,
                self.glyph.spread,
                self.sdf.width,
                self.sdf.edge,
                if self.sdf.show_rendered { "rendered" } else { "distance field" })
    }

    fn handle_key(&mut self, key: u8) -> UIAction {
        match key {
            b'=' => self.set_pixel_size(self.glyph.pixel_size.saturating_add(PIXEL_SIZE_STEP)),
            b'-' => self.set_pixel_size(self.glyph.pixel_size.saturating_sub(PIXEL_SIZE_STEP)),
            b']' => self.set_spread(self.glyph.spread + SPREAD_STEP),
            b'[' => self.set_spread(self.glyph.spread - SPREAD_STEP),
            b'w' => self.set_threshold(SdfUniform::Width, THRESHOLD_STEP),
            b's' => self.set_threshold(SdfUniform::Width, -THRESHOLD_STEP),
            b'e' => self.set_threshold(SdfUniform::Edge, THRESHOLD_STEP),
            b'd' => self.set_threshold(SdfUniform::Edge, -THRESHOLD_STEP),
            b'r' => UIAction::View(ViewAction::Reset),
            _ => UIAction::None,
        }
    }

    fn set_glyph_index(&mut self, glyph_index: i32) -> UIAction {
        self.update_glyph(GlyphParams { glyph_index, ..self.glyph })
    }

    fn set_pixel_size(&mut self, pixel_size: u32) -> UIAction {
        self.update_glyph(GlyphParams { pixel_size, ..self.glyph })
    }

    fn set_spread(&mut self, spread: f32) -> UIAction {
        self.update_glyph(GlyphParams { spread, ..self.glyph })
    }

    // Changes that clamp back to the current value don't rebuild anything.
    fn update_glyph(&mut self, params: GlyphParams) -> UIAction {
        let params = params.clamped();
        if params == self.glyph {
            return UIAction::None;
        }
        self.glyph = params;
        UIAction::RebuildGlyph
    }

    fn set_threshold(&mut self, uniform: SdfUniform, delta: f32) -> UIAction {
        let value = match uniform {
            SdfUniform::Width => &mut self.sdf.width,
            SdfUniform::Edge => &mut self.sdf.edge,
            SdfUniform::ShowRendered => return UIAction::None,
        };
        let new_value = f32::max(*value + delta, 0.0);
        if new_value == *value {
            return UIAction::None;
        }
        *value = new_value;
        UIAction::SdfUniform(uniform)
    }
}

#[cfg(test)]
mod tests {
    use super::{Controls, SdfUniform, UIAction, ViewAction};
    use crate::window::{Event, Keycode};
    use sdfview_glyph::GlyphParams;
    use sdfview_renderer::SdfParams;

    fn controls() -> Controls {
        Controls::new(GlyphParams::default(), SdfParams::default())
    }

    fn key(key: u8) -> Event {
        Event::KeyDown(Keycode::Alphanumeric(key))
    }

    #[test]
    fn glyph_keys_request_rebuilds() {
        let mut controls = controls();
        assert_eq!(controls.handle_event(&Event::KeyDown(Keycode::Up)), UIAction::RebuildGlyph);
        assert_eq!(controls.glyph_params().glyph_index, 1);
        assert_eq!(controls.handle_event(&key(b'=')), UIAction::RebuildGlyph);
        assert_eq!(controls.glyph_params().pixel_size, 133);
        assert_eq!(controls.handle_event(&key(b'[')), UIAction::RebuildGlyph);
        assert_eq!(controls.glyph_params().spread, 9.0);
    }

    #[test]
    fn glyph_index_may_go_negative() {
        let mut controls = controls();
        assert_eq!(controls.handle_event(&Event::KeyDown(Keycode::Down)), UIAction::RebuildGlyph);
        assert_eq!(controls.glyph_params().glyph_index, -1);
    }

    #[test]
    fn clamped_changes_are_ignored() {
        let mut controls = Controls::new(GlyphParams { pixel_size: 512, spread: 1.0,
                                                       ..GlyphParams::default() },
                                         SdfParams::default());
        assert_eq!(controls.handle_event(&key(b'=')), UIAction::None);
        assert_eq!(controls.handle_event(&key(b'[')), UIAction::None);
        assert_eq!(controls.glyph_params().pixel_size, 512);
    }

    #[test]
    fn thresholds_change_one_uniform_and_stay_non_negative() {
        let mut controls = controls();
        assert_eq!(controls.handle_event(&key(b'w')), UIAction::SdfUniform(SdfUniform::Width));
        assert!((controls.sdf_params().width - 0.01).abs() < 1e-6);
        assert_eq!(controls.handle_event(&key(b's')), UIAction::SdfUniform(SdfUniform::Width));
        assert_eq!(controls.handle_event(&key(b's')), UIAction::None);
        assert_eq!(controls.sdf_params().width, 0.0);

        assert_eq!(controls.handle_event(&key(b'd')), UIAction::SdfUniform(SdfUniform::Edge));
        assert!((controls.sdf_params().edge - 0.09).abs() < 1e-6);
    }

    #[test]
    fn space_toggles_rendering() {
        let mut controls = controls();
        let toggle = Event::KeyDown(Keycode::Space);
        assert_eq!(controls.handle_event(&toggle), UIAction::SdfUniform(SdfUniform::ShowRendered));
        assert!(controls.sdf_params().show_rendered);
        assert!(controls.title().ends_with("rendered"));
        controls.handle_event(&toggle);
        assert!(!controls.sdf_params().show_rendered);
        assert!(controls.title().ends_with("distance field"));
    }

    #[test]
    fn mouse_and_view_keys_map_to_view_actions() {
        let mut controls = controls();
        assert_eq!(controls.handle_event(&Event::MouseWheel(-2)),
                   UIAction::View(ViewAction::Scroll(-2)));
        assert_eq!(controls.handle_event(&Event::MouseWheel(0)), UIAction::None);
        assert_eq!(controls.handle_event(&Event::MouseDragged { dx: 3, dy: -4 }),
                   UIAction::View(ViewAction::Pan { dx: 3, dy: -4 }));
        assert_eq!(controls.handle_event(&key(b'r')), UIAction::View(ViewAction::Reset));
        assert_eq!(controls.handle_event(&key(b'x')), UIAction::None);
        assert_eq!(controls.handle_event(&Event::KeyDown(Keycode::Escape)), UIAction::Quit);
        assert_eq!(controls.handle_event(&Event::Quit), UIAction::Quit);
    }

    #[test]
    fn title_shows_parameters() {
        let controls = controls();
        assert_eq!(controls.title(),
                   "sdfview: glyph 0 at 125px, spread 10, width 0.00, edge 0.10, distance field");
    }
}
