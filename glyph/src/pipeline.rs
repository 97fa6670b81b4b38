// sdfview/glyph/src/pipeline.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rasterizes the current glyph and uploads it alongside its distance field.

use crate::rasterizer::{GlyphBitmap, Rasterizer};
use crate::sdf::{SdfBitmap, SdfGenerator};
use byte_slice_cast::AsByteSlice;
use euclid::size2;
use sdfview_gpu::{Device, TextureDescriptor};
use sdfview_renderer::Texture;

pub const MIN_PIXEL_SIZE: u32 = 8;
pub const MAX_PIXEL_SIZE: u32 = 512;
pub const MIN_SPREAD: f32 = 1.0;
pub const MAX_SPREAD: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphParams {
    pub glyph_index: i32,
    pub pixel_size: u32,
    pub spread: f32,
}

impl Default for GlyphParams {
    #[inline]
    fn default() -> GlyphParams {
        GlyphParams { glyph_index: 0, pixel_size: 125, spread: 10.0 }
    }
}

impl GlyphParams {
    /// Clamps the pixel size and spread into their supported ranges. The glyph index is left
    /// alone so that out-of-range indices can be reported.
    pub fn clamped(self) -> GlyphParams {
        let spread = if self.spread.is_nan() { MIN_SPREAD } else { self.spread };
        GlyphParams {
            glyph_index: self.glyph_index,
            pixel_size: self.pixel_size.max(MIN_PIXEL_SIZE).min(MAX_PIXEL_SIZE),
            spread: spread.max(MIN_SPREAD).min(MAX_SPREAD),
        }
    }
}

/// Owns the glyph's coverage texture and distance field texture.
///
/// Failures while rasterizing or generating the field are logged and leave the affected
/// texture null; they never abort the pipeline.
pub struct GlyphPipeline<D, R, G> where D: Device, R: Rasterizer, G: SdfGenerator {
    // Textures are released before the rasterizer, which releases its face and then its library.
    glyph_texture: Texture<D>,
    sdf_texture: Texture<D>,
    rasterizer: R,
    generator: G,
    params: GlyphParams,
}

impl<D, R, G> GlyphPipeline<D, R, G> where D: Device, R: Rasterizer, G: SdfGenerator {
    pub fn new(device: &D, rasterizer: R, generator: G, params: GlyphParams)
               -> GlyphPipeline<D, R, G> {
        let mut pipeline = GlyphPipeline {
            glyph_texture: Texture::null(TextureDescriptor::coverage(size2(0, 0))),
            sdf_texture: Texture::null(TextureDescriptor::r32f(size2(0, 0))),
            rasterizer,
            generator,
            params: params.clamped(),
        };
        pipeline.rebuild(device);
        pipeline
    }

    /// Rebuilds both textures from scratch for `params`.
    ///
    /// The previous textures are released before the new ones are created, even when nothing
    /// changed.
    pub fn update(&mut self, device: &D, params: GlyphParams) {
        self.params = params.clamped();
        self.rebuild(device);
    }

    #[inline]
    pub fn params(&self) -> GlyphParams {
        self.params
    }

    #[inline]
    pub fn glyph_texture(&self) -> &Texture<D> {
        &self.glyph_texture
    }

    #[inline]
    pub fn sdf_texture(&self) -> &Texture<D> {
        &self.sdf_texture
    }

    #[inline]
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Releases both textures, then the rasterizer.
    pub fn destroy(mut self) {
        self.glyph_texture.destroy();
        self.sdf_texture.destroy();
    }

    fn rebuild(&mut self, device: &D) {
        self.glyph_texture.destroy();
        self.sdf_texture.destroy();

        let (bitmap, sdf) = self.render();
        self.glyph_texture = match bitmap {
            Some(ref bitmap) => {
                Texture::new(device,
                             Some(&bitmap.pixels[..]),
                             TextureDescriptor::coverage(bitmap.size()))
            }
            None => Texture::null(TextureDescriptor::coverage(size2(0, 0))),
        };
        self.sdf_texture = match sdf {
            Some(ref sdf) => {
                Texture::new(device,
                             Some(sdf.values.as_byte_slice()),
                             TextureDescriptor::r32f(sdf.size()))
            }
            None => Texture::null(TextureDescriptor::r32f(size2(0, 0))),
        };

        debug!("glyph {} at {}px: coverage {}x{}, distance field {}x{}",
               self.params.glyph_index,
               self.params.pixel_size,
               self.glyph_texture.width(),
               self.glyph_texture.height(),
               self.sdf_texture.width(),
               self.sdf_texture.height());
    }

    fn render(&mut self) -> (Option<GlyphBitmap>, Option<SdfBitmap>) {
        let params = self.params;
        if params.glyph_index < 0 {
            error!("glyph index {} is negative", params.glyph_index);
            return (None, None);
        }

        if let Err(err) = self.rasterizer.set_pixel_size(params.pixel_size) {
            error!("failed to set pixel size {}: {}", params.pixel_size, err);
            return (None, None);
        }
        let bitmap = match self.rasterizer.render_glyph(params.glyph_index as u32) {
            Ok(bitmap) => bitmap,
            Err(err) => {
                error!("failed to render glyph {}: {}", params.glyph_index, err);
                return (None, None);
            }
        };
        if bitmap.is_empty() {
            warn!("glyph {} has no pixels at {}px", params.glyph_index, params.pixel_size);
            return (None, None);
        }

        let sdf = match self.generator.generate(&bitmap, params.spread) {
            Ok(sdf) => Some(sdf),
            Err(err) => {
                error!("failed to generate distance field for glyph {}: {}",
                       params.glyph_index,
                       err);
                None
            }
        };
        (Some(bitmap), sdf)
    }
}

#[cfg(test)]
mod tests {
    use super::{GlyphParams, GlyphPipeline, MAX_PIXEL_SIZE, MIN_PIXEL_SIZE};
    use crate::mock::BoxRasterizer;
    use crate::rasterizer::Rasterizer;
    use crate::sdf::BitmapSdfGenerator;
    use euclid::size2;
    use sdfview_gpu::mock::{MockDevice, ResourceKind};
    use sdfview_gpu::PixelType;
    use sdfview_renderer::Renderer;

    fn texture_ids<R>(pipeline: &GlyphPipeline<MockDevice, R, BitmapSdfGenerator>) -> (u32, u32)
                      where R: Rasterizer {
        (pipeline.glyph_texture().handle().map(|texture| texture.id()).unwrap(),
         pipeline.sdf_texture().handle().map(|texture| texture.id()).unwrap())
    }

    #[test]
    fn update_replaces_both_textures() {
        let renderer = Renderer::new(MockDevice::new(), size2(500, 500)).unwrap();
        let device = &renderer.device;
        let mut pipeline = GlyphPipeline::new(device,
                                              BoxRasterizer::new(100),
                                              BitmapSdfGenerator,
                                              GlyphParams::default());
        let (old_glyph, old_sdf) = texture_ids(&pipeline);

        pipeline.update(device, GlyphParams { glyph_index: 65, pixel_size: 128, spread: 10.0 });

        let (new_glyph, new_sdf) = texture_ids(&pipeline);
        assert!(![old_glyph, old_sdf].contains(&new_glyph));
        assert!(![old_glyph, old_sdf].contains(&new_sdf));
        assert_ne!(new_glyph, new_sdf);

        let state = device.state();
        assert_eq!(state.release_count(old_glyph), 1);
        assert_eq!(state.release_count(old_sdf), 1);
        assert!(state.is_live(new_glyph) && state.is_live(new_sdf));
        assert!(pipeline.glyph_texture().width() > 0 && pipeline.glyph_texture().height() > 0);
        assert!(pipeline.sdf_texture().width() > pipeline.glyph_texture().width());
        assert_eq!(state.textures[&new_sdf].data_type, PixelType::F32);
        assert_eq!(state.texture_uploads[&new_sdf],
                   pipeline.sdf_texture().descriptor().byte_len());
        assert!(state.errors.is_empty());
    }

    #[test]
    fn identical_params_still_rebuild() {
        let device = MockDevice::new();
        let params = GlyphParams::default();
        let mut pipeline = GlyphPipeline::new(&device,
                                              BoxRasterizer::new(4),
                                              BitmapSdfGenerator,
                                              params);
        let before = texture_ids(&pipeline);
        pipeline.update(&device, params);
        let after = texture_ids(&pipeline);
        assert_ne!(before.0, after.0);
        assert_ne!(before.1, after.1);
        assert_eq!(device.state().live_count(ResourceKind::Texture), 2);
    }

    #[test]
    fn invalid_glyphs_leave_null_textures() {
        let device = MockDevice::new();
        let mut pipeline = GlyphPipeline::new(&device,
                                              BoxRasterizer::new(4),
                                              BitmapSdfGenerator,
                                              GlyphParams { glyph_index: -1,
                                                            ..GlyphParams::default() });
        assert!(pipeline.glyph_texture().is_null() && pipeline.sdf_texture().is_null());
        assert!(pipeline.rasterizer().rendered.is_empty());

        pipeline.update(&device, GlyphParams { glyph_index: 4, ..GlyphParams::default() });
        assert!(pipeline.glyph_texture().is_null() && pipeline.sdf_texture().is_null());
        assert_eq!(pipeline.rasterizer().rendered, vec![4]);

        pipeline.update(&device, GlyphParams { glyph_index: 3, ..GlyphParams::default() });
        assert!(!pipeline.glyph_texture().is_null() && !pipeline.sdf_texture().is_null());
    }

    #[test]
    fn empty_glyphs_leave_null_textures() {
        let device = MockDevice::new();
        let pipeline = GlyphPipeline::new(&device,
                                          BoxRasterizer::new(4).with_empty_glyph(0),
                                          BitmapSdfGenerator,
                                          GlyphParams::default());
        assert!(pipeline.glyph_texture().is_null() && pipeline.sdf_texture().is_null());
        assert!(device.state().live.is_empty());
    }

    #[test]
    fn destroy_releases_each_texture_once() {
        let device = MockDevice::new();
        let pipeline = GlyphPipeline::new(&device,
                                          BoxRasterizer::new(4),
                                          BitmapSdfGenerator,
                                          GlyphParams::default());
        let (glyph, sdf) = texture_ids(&pipeline);
        pipeline.destroy();
        let state = device.state();
        assert_eq!((state.release_count(glyph), state.release_count(sdf)), (1, 1));
        assert!(state.live.is_empty());
    }

    #[test]
    fn params_are_clamped_before_rasterizing() {
        let device = MockDevice::new();
        let mut pipeline = GlyphPipeline::new(&device,
                                              BoxRasterizer::new(4),
                                              BitmapSdfGenerator,
                                              GlyphParams { pixel_size: 1, spread: 0.0,
                                                            ..GlyphParams::default() });
        pipeline.update(&device, GlyphParams { pixel_size: 4096, spread: 500.0,
                                               ..GlyphParams::default() });
        assert_eq!(pipeline.rasterizer().pixel_sizes, vec![MIN_PIXEL_SIZE, MAX_PIXEL_SIZE]);
        assert_eq!(pipeline.params().spread, 100.0);
    }

    quickcheck! {
        fn clamped_params_are_in_range(pixel_size: u32, spread: f32) -> bool {
            let params = GlyphParams { glyph_index: 0, pixel_size, spread }.clamped();
            params.pixel_size >= 8 && params.pixel_size <= 512 &&
                params.spread >= 1.0 && params.spread <= 100.0
        }
    }
}
