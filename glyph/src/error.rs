// sdfview/glyph/src/error.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;

#[derive(Debug)]
pub enum GlyphError {
    /// The font file could not be read.
    Io(io::Error),

    /// FreeType reported an error. Covers library initialization, face loading, sizing, and
    /// glyph loading.
    FreeType(freetype::Error),

    /// The rasterizer has no font face to render from.
    NoFace,

    /// The index is negative or past the last glyph of the face.
    InvalidGlyphIndex(i64),

    /// FreeType rendered the glyph in a pixel mode other than 8-bit gray.
    UnsupportedPixelMode,

    /// The distance field generator rejected the bitmap.
    Sdf(String),
}

impl Display for GlyphError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            GlyphError::Io(ref err) => write!(formatter, "failed to read font: {}", err),
            GlyphError::FreeType(ref err) => write!(formatter, "FreeType error: {}", err),
            GlyphError::NoFace => write!(formatter, "no font face is loaded"),
            GlyphError::InvalidGlyphIndex(index) => {
                write!(formatter, "no glyph at index {}", index)
            }
            GlyphError::UnsupportedPixelMode => {
                write!(formatter, "glyph bitmap is not 8-bit grayscale")
            }
            GlyphError::Sdf(ref message) => {
                write!(formatter, "distance field generation failed: {}", message)
            }
        }
    }
}

impl Error for GlyphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            GlyphError::Io(ref err) => Some(err),
            GlyphError::FreeType(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GlyphError {
    #[inline]
    fn from(err: io::Error) -> GlyphError {
        GlyphError::Io(err)
    }
}

impl From<freetype::Error> for GlyphError {
    #[inline]
    fn from(err: freetype::Error) -> GlyphError {
        GlyphError::FreeType(err)
    }
}
