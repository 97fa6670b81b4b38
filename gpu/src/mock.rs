// sdfview/gpu/src/mock.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A headless device that records what it is asked to do.
//!
//! Resources are plain integer ids. Dropping a handle records its release, so tests can assert
//! that every object was released exactly once and that no binding outlives a draw.

use crate::{BlendState, BufferTarget, BufferUploadMode, ColorF, Device, FramebufferStatus};
use crate::{Primitive, RectI, ShaderKind, TextureDescriptor, UniformData, VertexAttrDescriptor};
use log::warn;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::mem;
use std::rc::Rc;

const GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT: u32 = 0x8cd6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Buffer,
    Framebuffer,
    Program,
    Shader,
    Texture,
    VertexArray,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UniformWrite {
    pub program: u32,
    pub name: String,
    pub data: UniformData,
    /// The framebuffer bound at the time of the write.
    pub framebuffer: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClearRecord {
    pub framebuffer: Option<u32>,
    pub color: ColorF,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawRecord {
    pub program: Option<u32>,
    pub framebuffer: Option<u32>,
    pub vertex_array: Option<u32>,
    pub textures: BTreeMap<u32, u32>,
    pub viewport: Option<RectI>,
    pub primitive: Primitive,
    pub index_count: u32,
}

#[derive(Default)]
pub struct MockState {
    next_id: u32,
    pub live: BTreeMap<u32, ResourceKind>,
    pub released: Vec<(ResourceKind, u32)>,

    pub textures: BTreeMap<u32, TextureDescriptor>,
    pub texture_uploads: BTreeMap<u32, usize>,
    pub framebuffer_attachments: BTreeMap<u32, u32>,
    pub buffer_uploads: BTreeMap<u32, usize>,
    pub shader_sources: BTreeMap<u32, (ShaderKind, String)>,
    pub program_names: BTreeMap<u32, String>,
    program_vertex_sources: BTreeMap<u32, String>,

    pub bound_program: Option<u32>,
    pub bound_textures: BTreeMap<u32, u32>,
    pub bound_vertex_array: Option<u32>,
    pub bound_framebuffer: Option<u32>,
    pub viewport: Option<RectI>,
    pub blend: Option<BlendState>,

    pub uniform_writes: Vec<UniformWrite>,
    pub clears: Vec<ClearRecord>,
    pub draws: Vec<DrawRecord>,
    /// Misuse detected by the device, e.g. setting a uniform of a program that isn't in use.
    pub errors: Vec<String>,

    /// When set, every link fails with a diagnostic.
    pub fail_link: bool,
    /// When set, every framebuffer reports itself incomplete.
    pub incomplete_framebuffers: bool,
}

impl MockState {
    fn allocate(&mut self, kind: ResourceKind) -> u32 {
        self.next_id += 1;
        self.live.insert(self.next_id, kind);
        self.next_id
    }

    fn push_error(&mut self, message: String) {
        warn!("mock device: {}", message);
        self.errors.push(message);
    }

    fn release(&mut self, kind: ResourceKind, id: u32) {
        if self.live.remove(&id).is_none() {
            self.push_error(format!("{:?} {} released twice", kind, id));
        }
        self.released.push((kind, id));
    }

    #[inline]
    pub fn is_live(&self, id: u32) -> bool {
        self.live.contains_key(&id)
    }

    pub fn release_count(&self, id: u32) -> usize {
        self.released.iter().filter(|&&(_, released_id)| released_id == id).count()
    }

    pub fn live_count(&self, kind: ResourceKind) -> usize {
        self.live.values().filter(|&&live_kind| live_kind == kind).count()
    }

    /// True if no program, texture, vertex array, or framebuffer is bound.
    pub fn nothing_bound(&self) -> bool {
        self.bound_program.is_none() &&
            self.bound_textures.is_empty() &&
            self.bound_vertex_array.is_none() &&
            self.bound_framebuffer.is_none()
    }

    /// The most recent value written to the named uniform of `program`, if any.
    pub fn uniform_value(&self, program: u32, name: &str) -> Option<UniformData> {
        self.uniform_writes
            .iter()
            .rev()
            .find(|write| write.program == program && write.name == name)
            .map(|write| write.data)
    }

    pub fn program_named(&self, name: &str) -> Option<u32> {
        self.program_names
            .iter()
            .find(|&(&id, program_name)| program_name == name && self.is_live(id))
            .map(|(&id, _)| id)
    }
}

#[derive(Clone, Default)]
pub struct MockDevice {
    state: Rc<RefCell<MockState>>,
}

impl MockDevice {
    #[inline]
    pub fn new() -> MockDevice {
        MockDevice::default()
    }

    #[inline]
    pub fn state(&self) -> Ref<MockState> {
        self.state.borrow()
    }

    #[inline]
    pub fn state_mut(&self) -> RefMut<MockState> {
        self.state.borrow_mut()
    }

    fn allocate(&self, kind: ResourceKind) -> MockObject {
        let id = self.state.borrow_mut().allocate(kind);
        MockObject { kind, id, state: self.state.clone() }
    }
}

/// An owning handle to a mock resource.
pub struct MockObject {
    kind: ResourceKind,
    id: u32,
    state: Rc<RefCell<MockState>>,
}

impl MockObject {
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl Drop for MockObject {
    fn drop(&mut self) {
        self.state.borrow_mut().release(self.kind, self.id);
    }
}

#[derive(Clone, Debug)]
pub struct MockUniform {
    pub program: u32,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct MockVertexAttr {
    pub program: u32,
    pub name: String,
}

impl Device for MockDevice {
    type Buffer = MockObject;
    type Framebuffer = MockObject;
    type Program = MockObject;
    type Shader = MockObject;
    type Texture = MockObject;
    type Uniform = MockUniform;
    type VertexArray = MockObject;
    type VertexAttr = MockVertexAttr;

    fn create_texture(&self, descriptor: &TextureDescriptor, data: Option<&[u8]>)
                      -> MockObject {
        let texture = self.allocate(ResourceKind::Texture);
        let mut state = self.state.borrow_mut();
        if !descriptor.is_valid() {
            state.push_error(format!("texture {} created with size {:?}",
                                     texture.id,
                                     descriptor.size));
        }
        state.textures.insert(texture.id, *descriptor);
        if let Some(data) = data {
            if data.len() < descriptor.byte_len() {
                state.push_error(format!("texture {} upload reads past the end of its data",
                                         texture.id));
            }
            state.texture_uploads.insert(texture.id, data.len());
        }
        drop(state);
        texture
    }

    fn create_shader_from_source(&self, name: &str, source: &str, kind: ShaderKind)
                                 -> Result<MockObject, String> {
        if source.contains("#error") || !source.contains("void main") {
            return Err(format!("{}: 0:1(1): error: syntax error, no entry point", name));
        }
        let shader = self.allocate(ResourceKind::Shader);
        self.state.borrow_mut().shader_sources.insert(shader.id, (kind, source.to_owned()));
        Ok(shader)
    }

    fn create_program_from_shaders(&self,
                                   name: &str,
                                   vertex_shader: MockObject,
                                   fragment_shader: MockObject)
                                   -> Result<MockObject, String> {
        let (fail_link, vertex_source) = {
            let state = self.state.borrow();
            let vertex_source = state.shader_sources
                                     .get(&vertex_shader.id)
                                     .map(|(_, source)| source.clone())
                                     .unwrap_or_default();
            (state.fail_link, vertex_source)
        };
        drop(vertex_shader);
        drop(fragment_shader);

        if fail_link {
            return Err(format!("{}: error: linking failed, unresolved varyings", name));
        }

        let program = self.allocate(ResourceKind::Program);
        let mut state = self.state.borrow_mut();
        state.program_names.insert(program.id, name.to_owned());
        state.program_vertex_sources.insert(program.id, vertex_source);
        drop(state);
        Ok(program)
    }

    fn create_vertex_array(&self) -> MockObject {
        self.allocate(ResourceKind::VertexArray)
    }

    fn create_buffer(&self) -> MockObject {
        self.allocate(ResourceKind::Buffer)
    }

    fn create_framebuffer(&self, texture: &MockObject) -> MockObject {
        let framebuffer = self.allocate(ResourceKind::Framebuffer);
        self.state.borrow_mut().framebuffer_attachments.insert(framebuffer.id, texture.id);
        framebuffer
    }

    fn get_vertex_attr(&self, program: &MockObject, name: &str) -> Option<MockVertexAttr> {
        let state = self.state.borrow();
        let source = state.program_vertex_sources.get(&program.id)?;
        if !source.contains(name) {
            return None;
        }
        Some(MockVertexAttr { program: program.id, name: name.to_owned() })
    }

    fn get_uniform(&self, program: &MockObject, name: &str) -> MockUniform {
        MockUniform { program: program.id, name: name.to_owned() }
    }

    fn configure_vertex_attr(&self,
                             vertex_array: &MockObject,
                             buffer: &MockObject,
                             attr: &MockVertexAttr,
                             _: &VertexAttrDescriptor) {
        let mut state = self.state.borrow_mut();
        if !state.is_live(vertex_array.id) {
            state.push_error(format!("attribute {} configured on dead vertex array {}",
                                     attr.name,
                                     vertex_array.id));
        }
        if !state.buffer_uploads.contains_key(&buffer.id) {
            state.push_error(format!("attribute {} sourced from empty buffer", attr.name));
        }
    }

    fn set_uniform(&self, uniform: &MockUniform, data: UniformData) {
        let mut state = self.state.borrow_mut();
        if state.bound_program != Some(uniform.program) {
            state.push_error(format!("uniform {} set while program {} is not in use",
                                     uniform.name,
                                     uniform.program));
            return;
        }
        let framebuffer = state.bound_framebuffer;
        state.uniform_writes.push(UniformWrite {
            program: uniform.program,
            name: uniform.name.clone(),
            data,
            framebuffer,
        });
    }

    fn upload_to_buffer<T>(&self,
                           buffer: &MockObject,
                           data: &[T],
                           _: BufferTarget,
                           _: BufferUploadMode) {
        let len = data.len() * mem::size_of::<T>();
        self.state.borrow_mut().buffer_uploads.insert(buffer.id, len);
    }

    fn framebuffer_status(&self, framebuffer: &MockObject) -> FramebufferStatus {
        let state = self.state.borrow();
        let attached = state.framebuffer_attachments
                            .get(&framebuffer.id)
                            .map_or(false, |texture| state.is_live(*texture));
        if state.incomplete_framebuffers || !attached {
            FramebufferStatus::Incomplete(GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT)
        } else {
            FramebufferStatus::Complete
        }
    }

    fn set_blend_state(&self, blend: BlendState) {
        self.state.borrow_mut().blend = Some(blend);
    }

    fn set_viewport(&self, viewport: RectI) {
        self.state.borrow_mut().viewport = Some(viewport);
    }

    fn clear(&self, color: ColorF) {
        let mut state = self.state.borrow_mut();
        let framebuffer = state.bound_framebuffer;
        state.clears.push(ClearRecord { framebuffer, color });
    }

    fn draw_arrays(&self, primitive: Primitive, index_count: u32) {
        let mut state = self.state.borrow_mut();
        if state.bound_program.is_none() || state.bound_vertex_array.is_none() {
            state.push_error("draw issued without a program and vertex array".to_owned());
        }
        let record = DrawRecord {
            program: state.bound_program,
            framebuffer: state.bound_framebuffer,
            vertex_array: state.bound_vertex_array,
            textures: state.bound_textures.clone(),
            viewport: state.viewport,
            primitive,
            index_count,
        };
        state.draws.push(record);
    }

    fn use_program(&self, program: &MockObject) {
        self.state.borrow_mut().bound_program = Some(program.id);
    }

    fn unuse_program(&self) {
        self.state.borrow_mut().bound_program = None;
    }

    fn bind_vertex_array(&self, vertex_array: &MockObject) {
        self.state.borrow_mut().bound_vertex_array = Some(vertex_array.id);
    }

    fn unbind_vertex_array(&self) {
        self.state.borrow_mut().bound_vertex_array = None;
    }

    fn bind_texture(&self, texture: &MockObject, unit: u32) {
        self.state.borrow_mut().bound_textures.insert(unit, texture.id);
    }

    fn unbind_texture(&self, unit: u32) {
        self.state.borrow_mut().bound_textures.remove(&unit);
    }

    fn bind_framebuffer(&self, framebuffer: &MockObject) {
        self.state.borrow_mut().bound_framebuffer = Some(framebuffer.id);
    }

    fn bind_default_framebuffer(&self) {
        self.state.borrow_mut().bound_framebuffer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{MockDevice, ResourceKind};
    use crate::{Device, ShaderKind, TextureDescriptor};
    use euclid::size2;

    #[test]
    fn dropping_a_handle_releases_it_once() {
        let device = MockDevice::new();
        let texture = device.create_texture(&TextureDescriptor::rgba8(size2(4, 4)), None);
        let id = texture.id();
        assert!(device.state().is_live(id));
        drop(texture);
        assert!(!device.state().is_live(id));
        assert_eq!(device.state().release_count(id), 1);
        assert!(device.state().errors.is_empty());
    }

    #[test]
    fn linking_consumes_shaders() {
        let device = MockDevice::new();
        let vs = device.create_shader_from_source("t", "in vec2 in_pos; void main() {}",
                                                  ShaderKind::Vertex).unwrap();
        let fs = device.create_shader_from_source("t", "void main() {}",
                                                  ShaderKind::Fragment).unwrap();
        let program = device.create_program_from_shaders("t", vs, fs).unwrap();
        assert_eq!(device.state().live_count(ResourceKind::Shader), 0);
        assert!(device.get_vertex_attr(&program, "in_pos").is_some());
        assert!(device.get_vertex_attr(&program, "in_color").is_none());
    }

    #[test]
    fn broken_source_reports_a_log() {
        let device = MockDevice::new();
        let log = device.create_shader_from_source("t", "#error nope", ShaderKind::Fragment)
                        .err()
                        .unwrap();
        assert!(!log.is_empty());
    }
}
