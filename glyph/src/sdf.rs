// sdfview/glyph/src/sdf.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Signed distance field generation.

use crate::error::GlyphError;
use crate::rasterizer::GlyphBitmap;
use euclid::default::Size2D;
use euclid::size2;
use sdf_glyph_renderer::BitmapGlyph;

/// A single-channel field of distances to the glyph outline, normalized to [-1, 1] and
/// positive inside. Rows are tightly packed, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct SdfBitmap {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f32>,
}

impl SdfBitmap {
    #[inline]
    pub fn size(&self) -> Size2D<i32> {
        size2(self.width as i32, self.height as i32)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

pub trait SdfGenerator {
    /// Builds a distance field for `bitmap`. `spread` is the distance, in pixels, at which the
    /// field saturates; the output is padded by that much on every side.
    fn generate(&self, bitmap: &GlyphBitmap, spread: f32) -> Result<SdfBitmap, GlyphError>;
}

/// Generates fields with the `sdf_glyph_renderer` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct BitmapSdfGenerator;

impl BitmapSdfGenerator {
    #[inline]
    pub fn new() -> BitmapSdfGenerator {
        BitmapSdfGenerator
    }
}

impl SdfGenerator for BitmapSdfGenerator {
    fn generate(&self, bitmap: &GlyphBitmap, spread: f32) -> Result<SdfBitmap, GlyphError> {
        let radius = spread_to_radius(spread);
        let (width, height) = (bitmap.width as usize, bitmap.height as usize);
        let glyph = BitmapGlyph::from_unbuffered(&bitmap.pixels, width, height, radius)
            .map_err(|err| GlyphError::Sdf(format!("{:?}", err)))?;
        let distances = glyph.render_sdf(radius);

        let (width, height) = (width + radius * 2, height + radius * 2);
        if distances.len() != width * height {
            return Err(GlyphError::Sdf(format!("expected {} distances, got {}",
                                               width * height,
                                               distances.len())));
        }

        Ok(SdfBitmap {
            width: width as u32,
            height: height as u32,
            values: distances.into_iter().map(|distance| normalize(distance, radius)).collect(),
        })
    }
}

#[inline]
pub(crate) fn spread_to_radius(spread: f32) -> usize {
    if spread.is_finite() {
        spread.round().max(1.0) as usize
    } else {
        1
    }
}

// The generator measures positive distances outside the outline.
#[inline]
fn normalize(distance: f64, radius: usize) -> f32 {
    (-distance / radius as f64).max(-1.0).min(1.0) as f32
}
