// sdfview/renderer/src/texture.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A 2D image living on the device.

use euclid::default::Size2D;
use sdfview_gpu::{Device, TextureDescriptor};

/// Owns at most one device texture.
///
/// A texture built from an invalid request has no handle. Such a "null" texture keeps its
/// requested descriptor for diagnostics but is never bound or sampled.
pub struct Texture<D> where D: Device {
    handle: Option<D::Texture>,
    descriptor: TextureDescriptor,
}

impl<D> Texture<D> where D: Device {
    /// Allocates a texture and uploads `data`, if supplied.
    ///
    /// Non-positive dimensions, or data shorter than the descriptor requires, produce a null
    /// texture and an error log rather than a panic.
    pub fn new(device: &D, data: Option<&[u8]>, descriptor: TextureDescriptor) -> Texture<D> {
        if !descriptor.is_valid() {
            error!("invalid texture size {}x{}", descriptor.size.width, descriptor.size.height);
            return Texture::null(descriptor);
        }
        if let Some(data) = data {
            if data.len() < descriptor.byte_len() {
                error!("texture data holds {} bytes, but a {}x{} {:?} texture needs {}",
                       data.len(),
                       descriptor.size.width,
                       descriptor.size.height,
                       descriptor.internal_format,
                       descriptor.byte_len());
                return Texture::null(descriptor);
            }
        }

        let handle = device.create_texture(&descriptor, data);
        Texture { handle: Some(handle), descriptor }
    }

    #[inline]
    pub fn null(descriptor: TextureDescriptor) -> Texture<D> {
        Texture { handle: None, descriptor }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.handle.is_none()
    }

    #[inline]
    pub fn handle(&self) -> Option<&D::Texture> {
        self.handle.as_ref()
    }

    #[inline]
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn size(&self) -> Size2D<i32> {
        self.descriptor.size
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.descriptor.size.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.descriptor.size.height
    }

    /// Releases the device texture. Later calls do nothing.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            drop(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Texture;
    use euclid::size2;
    use sdfview_gpu::mock::{MockDevice, ResourceKind};
    use sdfview_gpu::TextureDescriptor;

    #[test]
    fn destroying_twice_releases_once() {
        let device = MockDevice::new();
        let mut texture = Texture::new(&device, None, TextureDescriptor::rgba8(size2(8, 4)));
        let id = texture.handle().map(|handle| handle.id()).unwrap();
        texture.destroy();
        texture.destroy();
        assert!(texture.is_null());
        assert_eq!(device.state().release_count(id), 1);
        drop(texture);
        assert_eq!(device.state().release_count(id), 1);
    }

    #[test]
    fn zero_sized_requests_give_null_textures() {
        let device = MockDevice::new();
        let mut texture = Texture::new(&device, None, TextureDescriptor::rgba8(size2(0, 10)));
        assert!(texture.is_null());
        texture.destroy();
        assert_eq!(device.state().live_count(ResourceKind::Texture), 0);
        assert!(device.state().released.is_empty());
    }

    #[test]
    fn short_data_is_rejected() {
        let device = MockDevice::new();
        let data = [0u8; 11];
        let descriptor = TextureDescriptor::coverage(size2(3, 4));
        let texture = Texture::new(&device, Some(&data[..]), descriptor);
        assert!(texture.is_null());
        assert_eq!(device.state().live_count(ResourceKind::Texture), 0);

        let data = [0u8; 12];
        let descriptor = TextureDescriptor::coverage(size2(3, 4));
        let texture = Texture::new(&device, Some(&data[..]), descriptor);
        assert!(!texture.is_null());
        assert!(device.state().errors.is_empty());
    }

    quickcheck! {
        fn valid_requests_report_their_size(width: u16, height: u16) -> bool {
            let (width, height) = (width as i32 % 512 + 1, height as i32 % 512 + 1);
            let device = MockDevice::new();
            let descriptor = TextureDescriptor::r32f(size2(width, height));
            let texture = Texture::new(&device, None, descriptor);
            let recorded = texture.handle()
                                  .and_then(|handle| device.state().textures.get(&handle.id())
                                                                            .cloned());
            texture.width() == width && texture.height() == height &&
                recorded.map(|descriptor| descriptor.size) == Some(size2(width, height))
        }

        fn invalid_requests_never_allocate(width: i16, height: i16) -> bool {
            let (width, height) = (width.min(0) as i32, height as i32);
            let device = MockDevice::new();
            let descriptor = TextureDescriptor::rgba8(size2(width, height));
            let texture = Texture::new(&device, None, descriptor);
            texture.is_null() && device.state().live.is_empty()
        }
    }
}
