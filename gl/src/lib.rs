// sdfview/gl/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An OpenGL 3.3 core implementation of the device abstraction.
//!
//! The caller must have made a context current and loaded the GL entry points with
//! `gl::load_with` before creating a `GLDevice`.

#[macro_use]
extern crate log;

use gl::types::{GLchar, GLenum, GLint, GLsizei, GLsizeiptr, GLuint, GLvoid};
use sdfview_gpu::{BlendState, BufferTarget, BufferUploadMode, ColorF, Device};
use sdfview_gpu::{FramebufferStatus, InternalFormat, PixelFormat, PixelType, Primitive, RectI};
use sdfview_gpu::{ShaderKind, TextureDescriptor, TextureFilter, UniformData};
use sdfview_gpu::{VertexAttrDescriptor, VertexAttrType};
use std::ffi::{CStr, CString};
use std::fmt::{self, Display, Formatter};
use std::mem;
use std::os::raw::c_char;
use std::ptr;

pub struct GLDevice {
    version: GLVersion,
}

impl GLDevice {
    #[inline]
    pub fn new(version: GLVersion) -> GLDevice {
        GLDevice { version }
    }

    #[inline]
    pub fn version(&self) -> GLVersion {
        self.version
    }

    fn set_texture_parameters(&self, filter: TextureFilter) {
        let filter = filter.to_gl_filter() as GLint;
        unsafe {
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter); ck();
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter); ck();
            gl::TexParameteri(gl::TEXTURE_2D,
                              gl::TEXTURE_WRAP_S,
                              gl::CLAMP_TO_EDGE as GLint); ck();
            gl::TexParameteri(gl::TEXTURE_2D,
                              gl::TEXTURE_WRAP_T,
                              gl::CLAMP_TO_EDGE as GLint); ck();
        }
    }
}

impl Device for GLDevice {
    type Buffer = GLBuffer;
    type Framebuffer = GLFramebuffer;
    type Program = GLProgram;
    type Shader = GLShader;
    type Texture = GLTexture;
    type Uniform = GLUniform;
    type VertexArray = GLVertexArray;
    type VertexAttr = GLVertexAttr;

    fn create_texture(&self, descriptor: &TextureDescriptor, data: Option<&[u8]>) -> GLTexture {
        let mut texture = GLTexture { gl_texture: 0, descriptor: *descriptor };
        let data_ptr = match data {
            Some(data) => {
                debug_assert!(data.len() >= descriptor.byte_len());
                data.as_ptr() as *const GLvoid
            }
            None => ptr::null(),
        };
        unsafe {
            gl::GenTextures(1, &mut texture.gl_texture); ck();
            gl::ActiveTexture(gl::TEXTURE0); ck();
            gl::BindTexture(gl::TEXTURE_2D, texture.gl_texture); ck();
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1); ck();
            gl::TexImage2D(gl::TEXTURE_2D,
                           0,
                           descriptor.internal_format.to_gl_internal_format(),
                           descriptor.size.width as GLsizei,
                           descriptor.size.height as GLsizei,
                           0,
                           descriptor.format.to_gl_format(),
                           descriptor.data_type.to_gl_type(),
                           data_ptr); ck();
        }
        self.set_texture_parameters(descriptor.filter);
        self.unbind_texture(0);
        texture
    }

    fn create_shader_from_source(&self, name: &str, source: &str, kind: ShaderKind)
                                 -> Result<GLShader, String> {
        unsafe {
            let gl_shader = gl::CreateShader(kind.to_gl_shader_kind()); ck();
            let shader = GLShader { gl_shader };
            gl::ShaderSource(gl_shader,
                             1,
                             [source.as_ptr() as *const GLchar].as_ptr(),
                             [source.len() as GLint].as_ptr()); ck();
            gl::CompileShader(gl_shader); ck();

            let mut compile_status = 0;
            gl::GetShaderiv(gl_shader, gl::COMPILE_STATUS, &mut compile_status); ck();
            if compile_status != gl::TRUE as GLint {
                let mut info_log_length = 0;
                gl::GetShaderiv(gl_shader, gl::INFO_LOG_LENGTH, &mut info_log_length); ck();
                let mut info_log = vec![0u8; info_log_length.max(0) as usize];
                gl::GetShaderInfoLog(gl_shader,
                                     info_log.len() as GLint,
                                     ptr::null_mut(),
                                     info_log.as_mut_ptr() as *mut GLchar); ck();
                let fallback = format!("{:?} shader '{}' failed to compile", kind, name);
                return Err(info_log_to_string(&info_log, fallback));
            }

            Ok(shader)
        }
    }

    fn create_program_from_shaders(&self,
                                   name: &str,
                                   vertex_shader: GLShader,
                                   fragment_shader: GLShader)
                                   -> Result<GLProgram, String> {
        unsafe {
            let gl_program = gl::CreateProgram(); ck();
            let program = GLProgram { gl_program };
            gl::AttachShader(gl_program, vertex_shader.gl_shader); ck();
            gl::AttachShader(gl_program, fragment_shader.gl_shader); ck();
            gl::LinkProgram(gl_program); ck();
            gl::DetachShader(gl_program, vertex_shader.gl_shader); ck();
            gl::DetachShader(gl_program, fragment_shader.gl_shader); ck();
            drop(vertex_shader);
            drop(fragment_shader);

            let mut link_status = 0;
            gl::GetProgramiv(gl_program, gl::LINK_STATUS, &mut link_status); ck();
            if link_status != gl::TRUE as GLint {
                let mut info_log_length = 0;
                gl::GetProgramiv(gl_program, gl::INFO_LOG_LENGTH, &mut info_log_length); ck();
                let mut info_log = vec![0u8; info_log_length.max(0) as usize];
                gl::GetProgramInfoLog(gl_program,
                                      info_log.len() as GLint,
                                      ptr::null_mut(),
                                      info_log.as_mut_ptr() as *mut GLchar); ck();
                let fallback = format!("program '{}' failed to link", name);
                return Err(info_log_to_string(&info_log, fallback));
            }

            Ok(program)
        }
    }

    fn create_vertex_array(&self) -> GLVertexArray {
        unsafe {
            let mut array = GLVertexArray { gl_vertex_array: 0 };
            gl::GenVertexArrays(1, &mut array.gl_vertex_array); ck();
            array
        }
    }

    fn create_buffer(&self) -> GLBuffer {
        unsafe {
            let mut buffer = GLBuffer { gl_buffer: 0 };
            gl::GenBuffers(1, &mut buffer.gl_buffer); ck();
            buffer
        }
    }

    fn create_framebuffer(&self, texture: &GLTexture) -> GLFramebuffer {
        let mut gl_framebuffer = 0;
        unsafe {
            gl::GenFramebuffers(1, &mut gl_framebuffer); ck();
            gl::BindFramebuffer(gl::FRAMEBUFFER, gl_framebuffer); ck();
            gl::FramebufferTexture2D(gl::FRAMEBUFFER,
                                     gl::COLOR_ATTACHMENT0,
                                     gl::TEXTURE_2D,
                                     texture.gl_texture,
                                     0); ck();
        }
        self.bind_default_framebuffer();
        GLFramebuffer { gl_framebuffer }
    }

    fn get_vertex_attr(&self, program: &GLProgram, name: &str) -> Option<GLVertexAttr> {
        let name = CString::new(name).ok()?;
        let attr = unsafe {
            let attr = gl::GetAttribLocation(program.gl_program, name.as_ptr() as *const GLchar);
            ck();
            attr
        };
        if attr < 0 {
            None
        } else {
            Some(GLVertexAttr { attr: attr as GLuint })
        }
    }

    fn get_uniform(&self, program: &GLProgram, name: &str) -> GLUniform {
        let location = match CString::new(name) {
            Ok(name) => unsafe {
                let location = gl::GetUniformLocation(program.gl_program,
                                                      name.as_ptr() as *const GLchar);
                ck();
                location
            },
            Err(_) => -1,
        };
        GLUniform { location }
    }

    fn configure_vertex_attr(&self,
                             vertex_array: &GLVertexArray,
                             buffer: &GLBuffer,
                             attr: &GLVertexAttr,
                             descriptor: &VertexAttrDescriptor) {
        debug_assert_ne!(descriptor.stride, 0);

        self.bind_vertex_array(vertex_array);
        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, buffer.gl_buffer); ck();
            gl::VertexAttribPointer(attr.attr,
                                    descriptor.size as GLint,
                                    descriptor.attr_type.to_gl_type(),
                                    if descriptor.normalized { gl::TRUE } else { gl::FALSE },
                                    descriptor.stride as GLsizei,
                                    descriptor.offset as *const GLvoid); ck();
            gl::EnableVertexAttribArray(attr.attr); ck();
        }
        self.unbind_vertex_array();
        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, 0); ck();
        }
    }

    fn set_uniform(&self, uniform: &GLUniform, data: UniformData) {
        if uniform.location < 0 {
            return;
        }
        unsafe {
            match data {
                UniformData::Float(value) => {
                    gl::Uniform1f(uniform.location, value); ck();
                }
                UniformData::Int(value) => {
                    gl::Uniform1i(uniform.location, value); ck();
                }
                UniformData::Mat4(matrix) => {
                    gl::UniformMatrix4fv(uniform.location, 1, gl::FALSE, matrix.as_ptr()); ck();
                }
                UniformData::TextureUnit(unit) => {
                    gl::Uniform1i(uniform.location, unit as GLint); ck();
                }
            }
        }
    }

    fn upload_to_buffer<T>(&self,
                           buffer: &GLBuffer,
                           data: &[T],
                           target: BufferTarget,
                           mode: BufferUploadMode) {
        let target = target.to_gl_target();
        unsafe {
            gl::BindBuffer(target, buffer.gl_buffer); ck();
            gl::BufferData(target,
                           (data.len() * mem::size_of::<T>()) as GLsizeiptr,
                           data.as_ptr() as *const GLvoid,
                           mode.to_gl_usage()); ck();
            gl::BindBuffer(target, 0); ck();
        }
    }

    fn framebuffer_status(&self, framebuffer: &GLFramebuffer) -> FramebufferStatus {
        self.bind_framebuffer(framebuffer);
        let status = unsafe {
            let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER); ck();
            status
        };
        self.bind_default_framebuffer();
        if status == gl::FRAMEBUFFER_COMPLETE {
            FramebufferStatus::Complete
        } else {
            FramebufferStatus::Incomplete(status)
        }
    }

    fn set_blend_state(&self, blend: BlendState) {
        match blend {
            BlendState::Off => unsafe {
                gl::Disable(gl::BLEND); ck();
            },
        }
    }

    fn set_viewport(&self, viewport: RectI) {
        unsafe {
            gl::Viewport(viewport.origin.x,
                         viewport.origin.y,
                         viewport.size.width,
                         viewport.size.height); ck();
        }
    }

    fn clear(&self, color: ColorF) {
        unsafe {
            gl::ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE); ck();
            gl::ClearColor(color.r, color.g, color.b, color.a); ck();
            gl::Clear(gl::COLOR_BUFFER_BIT); ck();
        }
    }

    fn draw_arrays(&self, primitive: Primitive, index_count: u32) {
        unsafe {
            gl::DrawArrays(primitive.to_gl_primitive(), 0, index_count as GLsizei); ck();
        }
    }

    fn use_program(&self, program: &GLProgram) {
        unsafe {
            gl::UseProgram(program.gl_program); ck();
        }
    }

    fn unuse_program(&self) {
        unsafe {
            gl::UseProgram(0); ck();
        }
    }

    fn bind_vertex_array(&self, vertex_array: &GLVertexArray) {
        unsafe {
            gl::BindVertexArray(vertex_array.gl_vertex_array); ck();
        }
    }

    fn unbind_vertex_array(&self) {
        unsafe {
            gl::BindVertexArray(0); ck();
        }
    }

    fn bind_texture(&self, texture: &GLTexture, unit: u32) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit); ck();
            gl::BindTexture(gl::TEXTURE_2D, texture.gl_texture); ck();
        }
    }

    fn unbind_texture(&self, unit: u32) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit); ck();
            gl::BindTexture(gl::TEXTURE_2D, 0); ck();
        }
    }

    fn bind_framebuffer(&self, framebuffer: &GLFramebuffer) {
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer.gl_framebuffer); ck();
        }
    }

    fn bind_default_framebuffer(&self) {
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0); ck();
        }
    }
}

pub struct GLBuffer {
    gl_buffer: GLuint,
}

impl Drop for GLBuffer {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &mut self.gl_buffer); ck();
        }
    }
}

pub struct GLFramebuffer {
    gl_framebuffer: GLuint,
}

impl Drop for GLFramebuffer {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteFramebuffers(1, &mut self.gl_framebuffer); ck();
        }
    }
}

pub struct GLProgram {
    gl_program: GLuint,
}

impl Drop for GLProgram {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.gl_program); ck();
        }
    }
}

pub struct GLShader {
    gl_shader: GLuint,
}

impl Drop for GLShader {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteShader(self.gl_shader); ck();
        }
    }
}

pub struct GLTexture {
    gl_texture: GLuint,
    pub descriptor: TextureDescriptor,
}

impl Drop for GLTexture {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteTextures(1, &mut self.gl_texture); ck();
        }
    }
}

#[derive(Debug)]
pub struct GLUniform {
    location: GLint,
}

pub struct GLVertexArray {
    gl_vertex_array: GLuint,
}

impl Drop for GLVertexArray {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &mut self.gl_vertex_array); ck();
        }
    }
}

pub struct GLVertexAttr {
    attr: GLuint,
}

/// The version of the current context, as reported by `GL_VERSION`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GLVersion {
    pub major: u32,
    pub minor: u32,
}

impl GLVersion {
    pub const MINIMUM: GLVersion = GLVersion { major: 3, minor: 3 };

    /// Queries the current context. Returns `None` if the driver's version string is missing or
    /// unrecognized.
    pub fn current() -> Option<GLVersion> {
        unsafe {
            let version = gl::GetString(gl::VERSION);
            ck();
            if version.is_null() {
                return None;
            }
            let version = CStr::from_ptr(version as *const c_char);
            GLVersion::parse(&version.to_string_lossy())
        }
    }

    /// Parses strings like `"4.6.0 NVIDIA 440.82"` or `"OpenGL ES 3.0 Mesa 20.0.8"`.
    pub fn parse(version: &str) -> Option<GLVersion> {
        let number = version.split_whitespace()
                            .find(|word| word.starts_with(|c: char| c.is_ascii_digit()))?;
        let mut components = number.split('.');
        let major = components.next()?.parse().ok()?;
        let minor = components.next()?
                              .chars()
                              .take_while(|c| c.is_ascii_digit())
                              .collect::<String>()
                              .parse()
                              .ok()?;
        Some(GLVersion { major, minor })
    }

    #[inline]
    pub fn is_supported(self) -> bool {
        self >= GLVersion::MINIMUM
    }
}

impl Display for GLVersion {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}.{}", self.major, self.minor)
    }
}

fn info_log_to_string(info_log: &[u8], fallback: String) -> String {
    let end = info_log.iter().position(|&byte| byte == 0).unwrap_or(info_log.len());
    let info_log = String::from_utf8_lossy(&info_log[..end]).trim().to_owned();
    if info_log.is_empty() {
        fallback
    } else {
        info_log
    }
}

trait BufferTargetExt {
    fn to_gl_target(self) -> GLuint;
}

impl BufferTargetExt for BufferTarget {
    fn to_gl_target(self) -> GLuint {
        match self {
            BufferTarget::Vertex => gl::ARRAY_BUFFER,
        }
    }
}

trait BufferUploadModeExt {
    fn to_gl_usage(self) -> GLuint;
}

impl BufferUploadModeExt for BufferUploadMode {
    fn to_gl_usage(self) -> GLuint {
        match self {
            BufferUploadMode::Static => gl::STATIC_DRAW,
            BufferUploadMode::Dynamic => gl::DYNAMIC_DRAW,
        }
    }
}

trait InternalFormatExt {
    fn to_gl_internal_format(self) -> GLint;
}

impl InternalFormatExt for InternalFormat {
    fn to_gl_internal_format(self) -> GLint {
        match self {
            InternalFormat::R8 => gl::R8 as GLint,
            InternalFormat::R32F => gl::R32F as GLint,
            InternalFormat::RGBA8 => gl::RGBA as GLint,
        }
    }
}

trait PixelFormatExt {
    fn to_gl_format(self) -> GLuint;
}

impl PixelFormatExt for PixelFormat {
    fn to_gl_format(self) -> GLuint {
        match self {
            PixelFormat::Red => gl::RED,
            PixelFormat::RGBA => gl::RGBA,
        }
    }
}

trait PixelTypeExt {
    fn to_gl_type(self) -> GLuint;
}

impl PixelTypeExt for PixelType {
    fn to_gl_type(self) -> GLuint {
        match self {
            PixelType::U8 => gl::UNSIGNED_BYTE,
            PixelType::F32 => gl::FLOAT,
        }
    }
}

trait PrimitiveExt {
    fn to_gl_primitive(self) -> GLuint;
}

impl PrimitiveExt for Primitive {
    fn to_gl_primitive(self) -> GLuint {
        match self {
            Primitive::Triangles => gl::TRIANGLES,
        }
    }
}

trait ShaderKindExt {
    fn to_gl_shader_kind(self) -> GLuint;
}

impl ShaderKindExt for ShaderKind {
    fn to_gl_shader_kind(self) -> GLuint {
        match self {
            ShaderKind::Vertex => gl::VERTEX_SHADER,
            ShaderKind::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

trait TextureFilterExt {
    fn to_gl_filter(self) -> GLuint;
}

impl TextureFilterExt for TextureFilter {
    fn to_gl_filter(self) -> GLuint {
        match self {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
        }
    }
}

trait VertexAttrTypeExt {
    fn to_gl_type(self) -> GLuint;
}

impl VertexAttrTypeExt for VertexAttrType {
    fn to_gl_type(self) -> GLuint {
        match self {
            VertexAttrType::F32 => gl::FLOAT,
        }
    }
}

// Error checking

#[cfg(debug_assertions)]
#[track_caller]
fn ck() {
    unsafe {
        // Only the first pending error is reported.
        let err = gl::GetError();
        if err != gl::NO_ERROR {
            error!("GL error: 0x{:x} ({}) at {}",
                   err,
                   gl_error_name(err),
                   std::panic::Location::caller());
        }
    }
}

#[cfg(not(debug_assertions))]
#[inline(always)]
fn ck() {}

#[cfg_attr(not(debug_assertions), allow(dead_code))]
fn gl_error_name(err: GLenum) -> &'static str {
    match err {
        gl::INVALID_ENUM => "INVALID_ENUM",
        gl::INVALID_VALUE => "INVALID_VALUE",
        gl::INVALID_OPERATION => "INVALID_OPERATION",
        gl::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
        gl::OUT_OF_MEMORY => "OUT_OF_MEMORY",
        gl::STACK_UNDERFLOW => "STACK_UNDERFLOW",
        gl::STACK_OVERFLOW => "STACK_OVERFLOW",
        _ => "Unknown",
    }
}
