// sdfview/glyph/src/mock.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A rasterizer that draws a filled box for every glyph, for tests that have no font.

use crate::error::GlyphError;
use crate::rasterizer::{GlyphBitmap, Rasterizer};

pub struct BoxRasterizer {
    glyph_count: u32,
    empty_glyphs: Vec<u32>,
    pixel_size: u32,
    /// Every pixel size requested, in order.
    pub pixel_sizes: Vec<u32>,
    /// Every glyph index requested, in order, including rejected ones.
    pub rendered: Vec<u32>,
}

impl BoxRasterizer {
    pub fn new(glyph_count: u32) -> BoxRasterizer {
        BoxRasterizer {
            glyph_count,
            empty_glyphs: vec![],
            pixel_size: 0,
            pixel_sizes: vec![],
            rendered: vec![],
        }
    }

    /// Makes `glyph_index` render as a zero-sized bitmap, like a space.
    pub fn with_empty_glyph(mut self, glyph_index: u32) -> BoxRasterizer {
        self.empty_glyphs.push(glyph_index);
        self
    }
}

impl Rasterizer for BoxRasterizer {
    fn set_pixel_size(&mut self, pixel_size: u32) -> Result<(), GlyphError> {
        self.pixel_size = pixel_size;
        self.pixel_sizes.push(pixel_size);
        Ok(())
    }

    // The box is half the pixel size, inset by an eighth of it.
    fn render_glyph(&mut self, glyph_index: u32) -> Result<GlyphBitmap, GlyphError> {
        self.rendered.push(glyph_index);
        if glyph_index >= self.glyph_count {
            return Err(GlyphError::InvalidGlyphIndex(glyph_index as i64));
        }
        if self.empty_glyphs.contains(&glyph_index) {
            return Ok(GlyphBitmap { width: 0, height: 0, pixels: vec![] });
        }

        let side = (self.pixel_size / 2).max(1);
        let margin = self.pixel_size / 8;
        let extent = side + margin * 2;
        let mut pixels = vec![0; (extent * extent) as usize];
        for y in margin..(margin + side) {
            let row = (y * extent) as usize;
            for pixel in &mut pixels[(row + margin as usize)..(row + (margin + side) as usize)] {
                *pixel = 255;
            }
        }
        Ok(GlyphBitmap { width: extent, height: extent, pixels })
    }
}
