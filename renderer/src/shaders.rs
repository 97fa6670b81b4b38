// sdfview/renderer/src/shaders.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! GLSL sources, embedded at build time.

use sdfview_gpu::{VertexAttrDescriptor, VertexAttrType};
use std::mem;

pub const QUAD_VERTEX_SHADER: &str = include_str!("../../resources/shaders/gl3/quad.vs.glsl");
pub const BLIT_FRAGMENT_SHADER: &str = include_str!("../../resources/shaders/gl3/blit.fs.glsl");
pub const SDF_FRAGMENT_SHADER: &str = include_str!("../../resources/shaders/gl3/sdf.fs.glsl");

pub const POSITION_ATTR: &str = "in_pos";
pub const TEX_COORD_ATTR: &str = "in_tex_coords";

pub const PROJECTION_UNIFORM: &str = "projection";
pub const MODEL_UNIFORM: &str = "model";
pub const TEXTURE_UNIFORM: &str = "tex";
pub const SHOW_RENDERED_UNIFORM: &str = "show_rendered";
pub const WIDTH_UNIFORM: &str = "width";
pub const EDGE_UNIFORM: &str = "edge";

/// A unit square centered at the origin as two triangles: x, y, u, v per vertex.
pub static QUAD_VERTICES: [f32; 24] = [
    -0.5,  0.5, 0.0, 1.0,
    -0.5, -0.5, 0.0, 0.0,
     0.5, -0.5, 1.0, 0.0,
    -0.5,  0.5, 0.0, 1.0,
     0.5, -0.5, 1.0, 0.0,
     0.5,  0.5, 1.0, 1.0,
];

pub const QUAD_VERTEX_COUNT: u32 = 6;

const QUAD_VERTEX_STRIDE: usize = mem::size_of::<f32>() * 4;

pub const POSITION_ATTR_DESCRIPTOR: VertexAttrDescriptor = VertexAttrDescriptor {
    size: 2,
    attr_type: VertexAttrType::F32,
    normalized: false,
    stride: QUAD_VERTEX_STRIDE,
    offset: 0,
};

pub const TEX_COORD_ATTR_DESCRIPTOR: VertexAttrDescriptor = VertexAttrDescriptor {
    size: 2,
    attr_type: VertexAttrType::F32,
    normalized: false,
    stride: QUAD_VERTEX_STRIDE,
    offset: mem::size_of::<f32>() * 2,
};
