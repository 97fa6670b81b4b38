// sdfview/glyph/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Turns one glyph of a font into a coverage texture and a signed distance field texture.
//!
//! Rasterization and distance field generation sit behind the `Rasterizer` and `SdfGenerator`
//! traits. FreeType and `sdf_glyph_renderer` provide the production implementations.

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod error;
pub mod pipeline;
pub mod rasterizer;
pub mod sdf;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use crate::error::GlyphError;
pub use crate::pipeline::{GlyphParams, GlyphPipeline};
pub use crate::rasterizer::{FreeTypeRasterizer, GlyphBitmap, Rasterizer};
pub use crate::sdf::{BitmapSdfGenerator, SdfBitmap, SdfGenerator};
