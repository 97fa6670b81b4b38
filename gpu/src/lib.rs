// sdfview/gpu/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Minimal abstractions over GPU device capabilities.
//!
//! Every resource type is an owning handle: dropping it releases the underlying device object.
//! Binding calls mutate global device state, so callers are expected to pair every `bind_*`
//! with the matching `unbind_*` before returning.

use euclid::default::{Rect, Size2D};

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub type RectI = Rect<i32>;
pub type SizeI = Size2D<i32>;

pub trait Device {
    type Buffer;
    type Framebuffer;
    type Program;
    type Shader;
    type Texture;
    type Uniform;
    type VertexArray;
    type VertexAttr;

    /// Allocates a 2D texture. `data` may be `None` to allocate storage without contents.
    ///
    /// Callers are responsible for validating the descriptor; see `TextureDescriptor::is_valid`.
    fn create_texture(&self, descriptor: &TextureDescriptor, data: Option<&[u8]>)
                      -> Self::Texture;
    fn create_shader_from_source(&self, name: &str, source: &str, kind: ShaderKind)
                                 -> Result<Self::Shader, String>;
    /// Links a program. The shader objects are consumed and released once linking finishes,
    /// whether or not it succeeded.
    fn create_program_from_shaders(&self,
                                   name: &str,
                                   vertex_shader: Self::Shader,
                                   fragment_shader: Self::Shader)
                                   -> Result<Self::Program, String>;
    fn create_vertex_array(&self) -> Self::VertexArray;
    fn create_buffer(&self) -> Self::Buffer;
    fn create_framebuffer(&self, texture: &Self::Texture) -> Self::Framebuffer;

    fn get_vertex_attr(&self, program: &Self::Program, name: &str) -> Option<Self::VertexAttr>;
    fn get_uniform(&self, program: &Self::Program, name: &str) -> Self::Uniform;
    fn configure_vertex_attr(&self,
                             vertex_array: &Self::VertexArray,
                             buffer: &Self::Buffer,
                             attr: &Self::VertexAttr,
                             descriptor: &VertexAttrDescriptor);
    /// Sets a uniform of the program currently in use.
    fn set_uniform(&self, uniform: &Self::Uniform, data: UniformData);
    fn upload_to_buffer<T>(&self,
                           buffer: &Self::Buffer,
                           data: &[T],
                           target: BufferTarget,
                           mode: BufferUploadMode);
    fn framebuffer_status(&self, framebuffer: &Self::Framebuffer) -> FramebufferStatus;

    fn set_blend_state(&self, blend: BlendState);
    fn set_viewport(&self, viewport: RectI);
    /// Clears the color buffer of whichever framebuffer is bound.
    fn clear(&self, color: ColorF);
    fn draw_arrays(&self, primitive: Primitive, index_count: u32);

    fn use_program(&self, program: &Self::Program);
    fn unuse_program(&self);
    fn bind_vertex_array(&self, vertex_array: &Self::VertexArray);
    fn unbind_vertex_array(&self);
    fn bind_texture(&self, texture: &Self::Texture, unit: u32);
    fn unbind_texture(&self, unit: u32);
    fn bind_framebuffer(&self, framebuffer: &Self::Framebuffer);
    fn bind_default_framebuffer(&self);
}

/// The storage format of a texture on the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InternalFormat {
    R8,
    R32F,
    RGBA8,
}

/// The channel layout of data uploaded to a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Red,
    RGBA,
}

/// The element type of data uploaded to a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelType {
    U8,
    F32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureDescriptor {
    pub size: SizeI,
    pub internal_format: InternalFormat,
    pub format: PixelFormat,
    pub data_type: PixelType,
    pub filter: TextureFilter,
}

impl TextureDescriptor {
    /// An RGBA8 color attachment with no source data.
    #[inline]
    pub fn rgba8(size: SizeI) -> TextureDescriptor {
        TextureDescriptor {
            size,
            internal_format: InternalFormat::RGBA8,
            format: PixelFormat::RGBA,
            data_type: PixelType::U8,
            filter: TextureFilter::Linear,
        }
    }

    /// 8-bit coverage data expanded into an RGBA slot; the red channel carries the value.
    #[inline]
    pub fn coverage(size: SizeI) -> TextureDescriptor {
        TextureDescriptor {
            size,
            internal_format: InternalFormat::RGBA8,
            format: PixelFormat::Red,
            data_type: PixelType::U8,
            filter: TextureFilter::Linear,
        }
    }

    /// Single-channel 32-bit float data, e.g. a distance field.
    #[inline]
    pub fn r32f(size: SizeI) -> TextureDescriptor {
        TextureDescriptor {
            size,
            internal_format: InternalFormat::R32F,
            format: PixelFormat::Red,
            data_type: PixelType::F32,
            filter: TextureFilter::Linear,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    /// The number of bytes a tightly packed upload of this descriptor reads.
    pub fn byte_len(&self) -> usize {
        if !self.is_valid() {
            return 0;
        }
        let channels = match self.format {
            PixelFormat::Red => 1,
            PixelFormat::RGBA => 4,
        };
        let element_size = match self.data_type {
            PixelType::U8 => 1,
            PixelType::F32 => 4,
        };
        self.size.width as usize * self.size.height as usize * channels * element_size
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformData {
    Float(f32),
    Int(i32),
    Mat4([f32; 16]),
    TextureUnit(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferTarget {
    Vertex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferUploadMode {
    Static,
    Dynamic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendState {
    Off,
}

impl Default for BlendState {
    #[inline]
    fn default() -> BlendState {
        BlendState::Off
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexAttrType {
    F32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexAttrDescriptor {
    pub size: usize,
    pub attr_type: VertexAttrType,
    pub normalized: bool,
    pub stride: usize,
    pub offset: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    /// The raw status code reported by the device.
    Incomplete(u32),
}

impl FramebufferStatus {
    #[inline]
    pub fn is_complete(self) -> bool {
        self == FramebufferStatus::Complete
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorF {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> ColorF {
        ColorF { r, g, b, a }
    }

    #[inline]
    pub const fn transparent_black() -> ColorF {
        ColorF::new(0.0, 0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{InternalFormat, TextureDescriptor};
    use euclid::size2;

    #[test]
    fn byte_len_accounts_for_channels_and_element_size() {
        assert_eq!(TextureDescriptor::coverage(size2(3, 5)).byte_len(), 15);
        assert_eq!(TextureDescriptor::r32f(size2(3, 5)).byte_len(), 60);
        assert_eq!(TextureDescriptor::rgba8(size2(3, 5)).byte_len(), 60);
    }

    #[test]
    fn degenerate_sizes_are_invalid() {
        assert!(!TextureDescriptor::rgba8(size2(0, 5)).is_valid());
        assert!(!TextureDescriptor::rgba8(size2(5, -1)).is_valid());
        assert_eq!(TextureDescriptor::rgba8(size2(-2, -2)).byte_len(), 0);
        assert_eq!(TextureDescriptor::coverage(size2(1, 1)).internal_format,
                   InternalFormat::RGBA8);
    }
}
