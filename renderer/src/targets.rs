// sdfview/renderer/src/targets.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Off-screen framebuffers, one per view.

use crate::error::RendererError;
use crate::texture::Texture;
use euclid::default::Size2D;
use sdfview_gpu::{ColorF, Device, FramebufferStatus, TextureDescriptor};

pub const CLEAR_COLOR: ColorF = ColorF::transparent_black();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetRole {
    /// The rasterized glyph as FreeType produced it.
    Plain,
    /// The distance field, drawn through the SDF program.
    Sdf,
}

impl TargetRole {
    pub const ALL: [TargetRole; 2] = [TargetRole::Plain, TargetRole::Sdf];
}

/// A framebuffer and the texture that is its only color attachment.
pub struct RenderTarget<D> where D: Device {
    // Declared first so the framebuffer is released before its attachment.
    framebuffer: Option<D::Framebuffer>,
    texture: Texture<D>,
}

impl<D> RenderTarget<D> where D: Device {
    fn new(device: &D, role: TargetRole, size: Size2D<i32>)
           -> Result<RenderTarget<D>, RendererError> {
        let texture = Texture::new(device, None, TextureDescriptor::rgba8(size));
        let handle = match texture.handle() {
            Some(handle) => handle,
            None => return Err(RendererError::InvalidViewport(size)),
        };

        let framebuffer = device.create_framebuffer(handle);
        if let FramebufferStatus::Incomplete(status) = device.framebuffer_status(&framebuffer) {
            error!("{:?} render target is incomplete: status 0x{:x}", role, status);
            return Err(RendererError::IncompleteFramebuffer { role, status });
        }

        Ok(RenderTarget { framebuffer: Some(framebuffer), texture })
    }

    #[inline]
    pub fn texture(&self) -> &Texture<D> {
        &self.texture
    }

    #[inline]
    pub fn framebuffer(&self) -> Option<&D::Framebuffer> {
        self.framebuffer.as_ref()
    }

    fn destroy(&mut self) {
        self.framebuffer.take();
        self.texture.destroy();
    }
}

pub struct RenderTargets<D> where D: Device {
    plain: RenderTarget<D>,
    sdf: RenderTarget<D>,
    size: Size2D<i32>,
}

impl<D> RenderTargets<D> where D: Device {
    /// Creates both targets at `size`. Every framebuffer is checked for completeness.
    pub fn new(device: &D, size: Size2D<i32>) -> Result<RenderTargets<D>, RendererError> {
        if size.width <= 0 || size.height <= 0 {
            error!("cannot create render targets of size {}x{}", size.width, size.height);
            return Err(RendererError::InvalidViewport(size));
        }

        let plain = RenderTarget::new(device, TargetRole::Plain, size)?;
        let sdf = RenderTarget::new(device, TargetRole::Sdf, size)?;
        Ok(RenderTargets { plain, sdf, size })
    }

    #[inline]
    pub fn size(&self) -> Size2D<i32> {
        self.size
    }

    #[inline]
    pub fn get(&self, role: TargetRole) -> &RenderTarget<D> {
        match role {
            TargetRole::Plain => &self.plain,
            TargetRole::Sdf => &self.sdf,
        }
    }

    fn get_mut(&mut self, role: TargetRole) -> &mut RenderTarget<D> {
        match role {
            TargetRole::Plain => &mut self.plain,
            TargetRole::Sdf => &mut self.sdf,
        }
    }

    /// Clears the target to `CLEAR_COLOR`, leaving the default framebuffer bound.
    pub fn clear(&self, device: &D, role: TargetRole) {
        let framebuffer = match self.get(role).framebuffer() {
            Some(framebuffer) => framebuffer,
            None => return,
        };
        device.bind_framebuffer(framebuffer);
        device.clear(CLEAR_COLOR);
        device.bind_default_framebuffer();
    }

    /// Binds the target for drawing and returns the size of its color attachment.
    ///
    /// The caller unbinds it with `bind_default_framebuffer()`.
    pub fn bind_for_draw(&self, device: &D, role: TargetRole) -> Size2D<i32> {
        let target = self.get(role);
        if let Some(framebuffer) = target.framebuffer() {
            device.bind_framebuffer(framebuffer);
        }
        target.texture().size()
    }

    pub fn status(&self, device: &D, role: TargetRole) -> FramebufferStatus {
        match self.get(role).framebuffer() {
            Some(framebuffer) => device.framebuffer_status(framebuffer),
            None => FramebufferStatus::Incomplete(0),
        }
    }

    /// Releases every framebuffer, then its texture. Later calls do nothing.
    pub fn destroy(&mut self) {
        for &role in &TargetRole::ALL {
            self.get_mut(role).destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RenderTargets, TargetRole, CLEAR_COLOR};
    use crate::error::RendererError;
    use euclid::size2;
    use sdfview_gpu::mock::{MockDevice, ResourceKind};
    use sdfview_gpu::{Device, FramebufferStatus};

    #[test]
    fn clear_leaves_the_default_framebuffer_bound() {
        let device = MockDevice::new();
        let targets = RenderTargets::new(&device, size2(500, 500)).unwrap();
        targets.clear(&device, TargetRole::Sdf);
        let sdf_framebuffer = targets.get(TargetRole::Sdf).framebuffer().map(|fb| fb.id());
        let state = device.state();
        assert_eq!(state.clears.len(), 1);
        assert_eq!(state.clears[0].framebuffer, sdf_framebuffer);
        assert_eq!(state.clears[0].color, CLEAR_COLOR);
        assert_eq!(state.bound_framebuffer, None);
    }

    #[test]
    fn zero_sized_viewports_are_rejected() {
        let device = MockDevice::new();
        match RenderTargets::new(&device, size2(0, 500)) {
            Err(RendererError::InvalidViewport(size)) => assert_eq!(size, size2(0, 500)),
            _ => panic!("expected an invalid viewport error"),
        }
        assert!(device.state().live.is_empty());
    }

    #[test]
    fn incomplete_framebuffers_abort_creation() {
        let device = MockDevice::new();
        device.state_mut().incomplete_framebuffers = true;
        match RenderTargets::new(&device, size2(64, 64)) {
            Err(RendererError::IncompleteFramebuffer { role: TargetRole::Plain, status }) => {
                assert_ne!(status, 0)
            }
            _ => panic!("expected an incomplete framebuffer error"),
        }
        assert!(device.state().live.is_empty());
    }

    #[test]
    fn destroy_releases_framebuffers_before_textures_once() {
        let device = MockDevice::new();
        let mut targets = RenderTargets::new(&device, size2(32, 16)).unwrap();
        targets.destroy();
        targets.destroy();
        drop(targets);

        let state = device.state();
        let kinds: Vec<ResourceKind> = state.released.iter().map(|&(kind, _)| kind).collect();
        assert_eq!(kinds, vec![
            ResourceKind::Framebuffer,
            ResourceKind::Texture,
            ResourceKind::Framebuffer,
            ResourceKind::Texture,
        ]);
        assert!(state.live.is_empty());
        assert!(state.errors.is_empty());
    }

    quickcheck! {
        fn targets_match_the_viewport(width: u16, height: u16) -> bool {
            let size = size2(width as i32 % 2048 + 1, height as i32 % 2048 + 1);
            let device = MockDevice::new();
            let targets = RenderTargets::new(&device, size).unwrap();
            TargetRole::ALL.iter().all(|&role| {
                targets.clear(&device, role);
                let reported = targets.bind_for_draw(&device, role);
                device.bind_default_framebuffer();
                let texture_size = targets.get(role).texture().size();
                reported == size && texture_size == size &&
                    targets.status(&device, role) == FramebufferStatus::Complete
            })
        }
    }
}
