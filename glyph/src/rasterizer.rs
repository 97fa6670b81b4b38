// sdfview/glyph/src/rasterizer.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Glyph rasterization using FreeType.

use crate::error::GlyphError;
use euclid::default::Size2D;
use euclid::size2;
use freetype::bitmap::PixelMode;
use freetype::face::LoadFlag;
use freetype::{Face, Library};
use std::fs;
use std::path::Path;

/// An 8-bit coverage bitmap with tightly packed rows, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl GlyphBitmap {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn size(&self) -> Size2D<i32> {
        size2(self.width as i32, self.height as i32)
    }
}

pub trait Rasterizer {
    fn set_pixel_size(&mut self, pixel_size: u32) -> Result<(), GlyphError>;
    fn render_glyph(&mut self, glyph_index: u32) -> Result<GlyphBitmap, GlyphError>;
}

/// Renders glyphs of a single face loaded from memory.
///
/// A rasterizer without a face reports `GlyphError::NoFace` for every request, so a missing
/// font leaves the views empty instead of stopping the viewer.
pub struct FreeTypeRasterizer {
    face: Option<LoadedFace>,
}

struct LoadedFace {
    // The face must be done before the library that created it.
    face: Face,
    #[allow(dead_code)]
    library: Library,
}

impl FreeTypeRasterizer {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<FreeTypeRasterizer, GlyphError> {
        let library = Library::init()?;
        let face = library.new_memory_face(bytes, 0)?;
        info!("loaded {} ({} glyphs)",
              face.family_name().unwrap_or_else(|| "unnamed face".to_owned()),
              face.raw().num_glyphs);
        Ok(FreeTypeRasterizer { face: Some(LoadedFace { face, library }) })
    }

    pub fn from_path<P>(path: P) -> Result<FreeTypeRasterizer, GlyphError> where P: AsRef<Path> {
        let bytes = fs::read(path.as_ref())?;
        debug!("read {} bytes from {}", bytes.len(), path.as_ref().display());
        FreeTypeRasterizer::from_bytes(bytes)
    }

    /// A rasterizer with no face at all.
    pub fn without_face() -> FreeTypeRasterizer {
        FreeTypeRasterizer { face: None }
    }

    #[inline]
    pub fn has_face(&self) -> bool {
        self.face.is_some()
    }

    #[inline]
    pub fn glyph_count(&self) -> i64 {
        self.face.as_ref().map_or(0, |loaded| loaded.face.raw().num_glyphs as i64)
    }

    fn face(&self) -> Result<&Face, GlyphError> {
        self.face.as_ref().map(|loaded| &loaded.face).ok_or(GlyphError::NoFace)
    }
}

impl Rasterizer for FreeTypeRasterizer {
    fn set_pixel_size(&mut self, pixel_size: u32) -> Result<(), GlyphError> {
        self.face()?.set_pixel_sizes(pixel_size, 0)?;
        Ok(())
    }

    fn render_glyph(&mut self, glyph_index: u32) -> Result<GlyphBitmap, GlyphError> {
        let face = self.face()?;
        if glyph_index as i64 >= face.raw().num_glyphs as i64 {
            return Err(GlyphError::InvalidGlyphIndex(glyph_index as i64));
        }

        face.load_glyph(glyph_index, LoadFlag::RENDER)?;
        let glyph = face.glyph();
        let bitmap = glyph.bitmap();
        match bitmap.pixel_mode()? {
            PixelMode::Gray => {}
            _ => return Err(GlyphError::UnsupportedPixelMode),
        }

        let (width, height) = (bitmap.width().max(0) as usize, bitmap.rows().max(0) as usize);
        Ok(GlyphBitmap {
            width: width as u32,
            height: height as u32,
            pixels: pack_rows(bitmap.buffer(), width, height, bitmap.pitch()),
        })
    }
}

/// Copies `height` rows of `width` bytes out of a FreeType buffer whose rows are `pitch` bytes
/// apart. A negative pitch means the buffer stores the bottom row first.
pub(crate) fn pack_rows(buffer: &[u8], width: usize, height: usize, pitch: i32) -> Vec<u8> {
    let stride = pitch.abs() as usize;
    let mut pixels = Vec::with_capacity(width * height);
    for row in 0..height {
        let source_row = if pitch < 0 { height - 1 - row } else { row };
        let start = source_row * stride;
        match buffer.get(start..start + width) {
            Some(source) => pixels.extend_from_slice(source),
            None => pixels.resize(pixels.len() + width, 0),
        }
    }
    pixels
}
