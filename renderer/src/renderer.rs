// sdfview/renderer/src/renderer.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Draws textured quads into the render targets and composites the targets into the window.

use crate::error::RendererError;
use crate::programs::{Programs, ShaderRole};
use crate::shaders::{self, EDGE_UNIFORM, MODEL_UNIFORM, PROJECTION_UNIFORM};
use crate::shaders::{SHOW_RENDERED_UNIFORM, TEXTURE_UNIFORM, WIDTH_UNIFORM};
use crate::targets::{RenderTargets, TargetRole, CLEAR_COLOR};
use crate::texture::Texture;
use crate::view::{self, ViewState};
use euclid::default::{Point2D, Rect, Size2D, Transform3D};
use euclid::{point2, size2};
use sdfview_gpu::{BufferTarget, BufferUploadMode, Device, Primitive, UniformData};

/// Parameters of the SDF visualization. They live in the SDF program's uniforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SdfParams {
    /// Distance from the outline at which the rendered edge starts.
    pub width: f32,
    /// Width of the smoothstep transition.
    pub edge: f32,
    /// Shows the thresholded glyph instead of the raw distance field.
    pub show_rendered: bool,
}

impl Default for SdfParams {
    #[inline]
    fn default() -> SdfParams {
        SdfParams { width: 0.0, edge: 0.1, show_rendered: false }
    }
}

pub struct Renderer<D> where D: Device {
    programs: Programs<D>,
    targets: RenderTargets<D>,
    quad_vertex_array: D::VertexArray,
    quad_vertex_buffer: D::Buffer,
    view: ViewState,
    projection: Transform3D<f32>,
    viewport_size: Size2D<i32>,
    // Last, so every resource above is released while the device is still alive.
    pub device: D,
}

impl<D> Renderer<D> where D: Device {
    /// Builds the programs, both render targets at `viewport_size`, and the shared quad.
    pub fn new(device: D, viewport_size: Size2D<i32>) -> Result<Renderer<D>, RendererError> {
        let programs = Programs::new(&device)?;
        let targets = RenderTargets::new(&device, viewport_size)?;

        let quad_vertex_buffer = device.create_buffer();
        device.upload_to_buffer(&quad_vertex_buffer,
                                &shaders::QUAD_VERTICES,
                                BufferTarget::Vertex,
                                BufferUploadMode::Static);

        // Both programs share the vertex shader, so one vertex array serves both.
        let quad_vertex_array = device.create_vertex_array();
        let blit_program = programs.get(ShaderRole::Blit);
        let position_attr = device.get_vertex_attr(blit_program, shaders::POSITION_ATTR)
                                  .ok_or(RendererError::MissingVertexAttr(shaders::POSITION_ATTR))?;
        let tex_coord_attr =
            device.get_vertex_attr(blit_program, shaders::TEX_COORD_ATTR)
                  .ok_or(RendererError::MissingVertexAttr(shaders::TEX_COORD_ATTR))?;
        device.configure_vertex_attr(&quad_vertex_array,
                                     &quad_vertex_buffer,
                                     &position_attr,
                                     &shaders::POSITION_ATTR_DESCRIPTOR);
        device.configure_vertex_attr(&quad_vertex_array,
                                     &quad_vertex_buffer,
                                     &tex_coord_attr,
                                     &shaders::TEX_COORD_ATTR_DESCRIPTOR);

        info!("renderer ready with {}x{} render targets",
              viewport_size.width,
              viewport_size.height);

        Ok(Renderer {
            programs,
            targets,
            quad_vertex_array,
            quad_vertex_buffer,
            view: ViewState::new(),
            projection: view::projection(viewport_size),
            viewport_size,
            device,
        })
    }

    #[inline]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    #[inline]
    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    #[inline]
    pub fn programs(&self) -> &Programs<D> {
        &self.programs
    }

    #[inline]
    pub fn targets(&self) -> &RenderTargets<D> {
        &self.targets
    }

    #[inline]
    pub fn viewport_size(&self) -> Size2D<i32> {
        self.viewport_size
    }

    #[inline]
    pub fn projection(&self) -> &Transform3D<f32> {
        &self.projection
    }

    pub fn clear_all(&self) {
        for &role in &TargetRole::ALL {
            self.targets.clear(&self.device, role);
        }
    }

    /// Draws `texture` as a `size`-pixel quad centered on `position` into the given target.
    ///
    /// Null textures are skipped without touching device state. Nothing stays bound afterward.
    pub fn draw(&self,
                texture: &Texture<D>,
                position: Point2D<f32>,
                size: Size2D<f32>,
                shader_role: ShaderRole,
                target_role: TargetRole) {
        let handle = match texture.handle() {
            Some(handle) => handle,
            None => {
                debug!("skipping draw of null texture into {:?} target", target_role);
                return;
            }
        };

        let model = self.view.model_transform(position, size);
        self.use_quad_program(self.programs.get(shader_role), &model, &self.projection);
        let target_size = self.targets.bind_for_draw(&self.device, target_role);
        self.device.set_viewport(Rect::new(point2(0, 0), target_size));
        self.draw_quad(handle);
        self.device.bind_default_framebuffer();
    }

    /// Composites both render targets side by side into the default framebuffer.
    ///
    /// Each target keeps its aspect ratio within its half of the window and is flipped
    /// vertically, because the targets hold glyph rows top-down.
    pub fn present(&self, window_size: Size2D<i32>) {
        if window_size.width <= 0 || window_size.height <= 0 {
            return;
        }

        self.device.bind_default_framebuffer();
        self.device.set_viewport(Rect::new(point2(0, 0), window_size));
        self.device.clear(CLEAR_COLOR);

        let projection = view::projection(window_size);
        let half_width = window_size.width as f32 * 0.5;
        let window_height = window_size.height as f32;
        let roles = [TargetRole::Plain, TargetRole::Sdf];
        for (index, &role) in roles.iter().enumerate() {
            let texture = self.targets.get(role).texture();
            let handle = match texture.handle() {
                Some(handle) => handle,
                None => continue,
            };
            let target_size = texture.size().to_f32();
            let scale = f32::min(half_width / target_size.width,
                                 window_height / target_size.height);
            let center_x = -half_width * 0.5 + half_width * index as f32;
            let model = Transform3D::scale(target_size.width * scale,
                                           -target_size.height * scale,
                                           1.0)
                .then(&Transform3D::translation(center_x, 0.0, 0.0));
            self.use_quad_program(self.programs.get(ShaderRole::Blit), &model, &projection);
            self.draw_quad(handle);
        }
    }

    // Leaves `program` in use for the following `draw_quad`.
    fn use_quad_program(&self,
                        program: &D::Program,
                        model: &Transform3D<f32>,
                        projection: &Transform3D<f32>) {
        self.device.use_program(program);
        let model_uniform = self.device.get_uniform(program, MODEL_UNIFORM);
        let projection_uniform = self.device.get_uniform(program, PROJECTION_UNIFORM);
        let texture_uniform = self.device.get_uniform(program, TEXTURE_UNIFORM);
        self.device.set_uniform(&model_uniform, UniformData::Mat4(model.to_array()));
        self.device.set_uniform(&projection_uniform, UniformData::Mat4(projection.to_array()));
        self.device.set_uniform(&texture_uniform, UniformData::TextureUnit(0));
    }

    fn draw_quad(&self, texture: &D::Texture) {
        self.device.bind_texture(texture, 0);
        self.device.bind_vertex_array(&self.quad_vertex_array);
        self.device.draw_arrays(Primitive::Triangles, shaders::QUAD_VERTEX_COUNT);

        self.device.unbind_texture(0);
        self.device.unuse_program();
        self.device.unbind_vertex_array();
    }

    /// Pushes every SDF visualization parameter.
    pub fn apply_sdf_params(&self, params: &SdfParams) {
        self.set_sdf_width(params.width);
        self.set_sdf_edge(params.edge);
        self.set_show_rendered(params.show_rendered);
    }

    #[inline]
    pub fn set_show_rendered(&self, show_rendered: bool) {
        self.programs.set_uniform(&self.device,
                                  ShaderRole::Sdf,
                                  SHOW_RENDERED_UNIFORM,
                                  UniformData::Int(show_rendered as i32));
    }

    #[inline]
    pub fn set_sdf_width(&self, width: f32) {
        self.programs.set_uniform(&self.device,
                                  ShaderRole::Sdf,
                                  WIDTH_UNIFORM,
                                  UniformData::Float(width));
    }

    #[inline]
    pub fn set_sdf_edge(&self, edge: f32) {
        self.programs.set_uniform(&self.device,
                                  ShaderRole::Sdf,
                                  EDGE_UNIFORM,
                                  UniformData::Float(edge));
    }

    /// The size of the quad that maps one texel to one target pixel at zoom 1.
    #[inline]
    pub fn native_size(texture: &Texture<D>) -> Size2D<f32> {
        size2(texture.width() as f32, texture.height() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::{Renderer, SdfParams};
    use crate::programs::ShaderRole;
    use crate::shaders::{EDGE_UNIFORM, MODEL_UNIFORM, PROJECTION_UNIFORM, SHOW_RENDERED_UNIFORM};
    use crate::shaders::WIDTH_UNIFORM;
    use crate::targets::TargetRole;
    use crate::texture::Texture;
    use euclid::default::Rect;
    use euclid::{point2, size2};
    use sdfview_gpu::mock::{MockDevice, ResourceKind};
    use sdfview_gpu::{Primitive, TextureDescriptor, UniformData};

    fn renderer() -> Renderer<MockDevice> {
        Renderer::new(MockDevice::new(), size2(500, 500)).unwrap()
    }

    #[test]
    fn draw_leaves_nothing_bound() {
        let renderer = renderer();
        let texture = Texture::new(&renderer.device,
                                   Some(&[255; 64 * 32][..]),
                                   TextureDescriptor::coverage(size2(64, 32)));
        renderer.draw(&texture,
                      point2(0.0, 0.0),
                      Renderer::native_size(&texture),
                      ShaderRole::Sdf,
                      TargetRole::Sdf);

        let sdf_program = renderer.programs().get(ShaderRole::Sdf).id();
        let sdf_framebuffer = renderer.targets()
                                      .get(TargetRole::Sdf)
                                      .framebuffer()
                                      .map(|framebuffer| framebuffer.id());
        let state = renderer.device.state();
        assert!(state.nothing_bound());
        assert!(state.errors.is_empty());
        assert_eq!(state.draws.len(), 1);

        let draw = &state.draws[0];
        assert_eq!(draw.program, Some(sdf_program));
        assert_eq!(draw.framebuffer, sdf_framebuffer);
        assert_eq!(draw.textures.get(&0).cloned(), texture.handle().map(|handle| handle.id()));
        assert_eq!(draw.viewport, Some(Rect::new(point2(0, 0), size2(500, 500))));
        assert_eq!((draw.primitive, draw.index_count), (Primitive::Triangles, 6));
    }

    #[test]
    fn uniforms_are_set_before_the_target_is_bound() {
        let renderer = renderer();
        let texture = Texture::new(&renderer.device,
                                   Some(&[255; 8 * 8][..]),
                                   TextureDescriptor::coverage(size2(8, 8)));
        let writes_before = renderer.device.state().uniform_writes.len();
        renderer.draw(&texture,
                      point2(0.0, 0.0),
                      Renderer::native_size(&texture),
                      ShaderRole::Blit,
                      TargetRole::Plain);

        let plain_framebuffer = renderer.targets()
                                        .get(TargetRole::Plain)
                                        .framebuffer()
                                        .map(|framebuffer| framebuffer.id());
        let state = renderer.device.state();
        let writes = &state.uniform_writes[writes_before..];
        let names: Vec<&str> = writes.iter().map(|write| &write.name[..]).collect();
        assert_eq!(&names[..2], &[MODEL_UNIFORM, PROJECTION_UNIFORM]);
        assert!(writes.iter().all(|write| write.framebuffer.is_none()));
        assert_eq!(state.draws[0].framebuffer, plain_framebuffer);
        assert!(plain_framebuffer.is_some());
    }

    #[test]
    fn model_follows_zoom_and_pan() {
        let mut renderer = renderer();
        renderer.view_mut().scroll(1);
        renderer.view_mut().pan(5, 7);
        let texture = Texture::new(&renderer.device, None, TextureDescriptor::r32f(size2(10, 20)));
        renderer.draw(&texture,
                      point2(1.0, 1.0),
                      size2(10.0, 20.0),
                      ShaderRole::Blit,
                      TargetRole::Plain);

        let expected = renderer.view().model_transform(point2(1.0, 1.0), size2(10.0, 20.0));
        let blit_program = renderer.programs().get(ShaderRole::Blit).id();
        let model = renderer.device.state().uniform_value(blit_program, MODEL_UNIFORM);
        assert_eq!(model, Some(UniformData::Mat4(expected.to_array())));
        assert_eq!(expected.to_array()[0], 20.0);
        assert_eq!(expected.to_array()[12], 6.0);
    }

    #[test]
    fn null_textures_are_skipped() {
        let renderer = renderer();
        let writes_before = renderer.device.state().uniform_writes.len();
        let texture = Texture::new(&renderer.device, None, TextureDescriptor::rgba8(size2(0, 0)));
        renderer.draw(&texture, point2(0.0, 0.0), size2(1.0, 1.0), ShaderRole::Blit,
                      TargetRole::Plain);
        let state = renderer.device.state();
        assert!(state.draws.is_empty());
        assert_eq!(state.uniform_writes.len(), writes_before);
        assert_eq!(state.viewport, None);
    }

    #[test]
    fn present_composites_both_targets_into_the_window() {
        let renderer = renderer();
        renderer.clear_all();
        renderer.present(size2(1280, 720));

        let state = renderer.device.state();
        assert_eq!(state.clears.len(), 3);
        assert_eq!(state.draws.len(), 2);
        assert!(state.draws.iter().all(|draw| draw.framebuffer.is_none()));
        assert_eq!(state.draws[0].viewport, Some(Rect::new(point2(0, 0), size2(1280, 720))));
        assert!(state.nothing_bound());
        assert!(state.errors.is_empty());
    }

    #[test]
    fn toggling_the_mode_writes_only_show_rendered() {
        let renderer = renderer();
        renderer.apply_sdf_params(&SdfParams::default());
        let sdf_program = renderer.programs().get(ShaderRole::Sdf).id();
        let writes_before = renderer.device.state().uniform_writes.len();

        renderer.set_show_rendered(true);

        let state = renderer.device.state();
        let new_writes = &state.uniform_writes[writes_before..];
        assert_eq!(new_writes.len(), 1);
        assert_eq!(new_writes[0].program, sdf_program);
        assert_eq!(new_writes[0].name, SHOW_RENDERED_UNIFORM);
        assert_eq!(state.uniform_value(sdf_program, WIDTH_UNIFORM), Some(UniformData::Float(0.0)));
        assert_eq!(state.uniform_value(sdf_program, EDGE_UNIFORM), Some(UniformData::Float(0.1)));
    }

    #[test]
    fn dropping_the_renderer_releases_everything() {
        let device = MockDevice::new();
        let renderer = Renderer::new(device.clone(), size2(8, 8)).unwrap();
        assert_eq!(device.state().live_count(ResourceKind::Framebuffer), 2);
        drop(renderer);
        assert!(device.state().live.is_empty());
        assert!(device.state().errors.is_empty());
    }
}
