// sdfview/renderer/src/error.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors.

use crate::programs::ShaderRole;
use crate::targets::TargetRole;
use euclid::default::Size2D;
use sdfview_gpu::ShaderKind;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// A fatal error during renderer initialization.
#[derive(Clone, Debug, PartialEq)]
pub enum RendererError {
    /// The requested viewport had a zero or negative dimension.
    InvalidViewport(Size2D<i32>),

    /// A render target's framebuffer was not complete after attaching its texture.
    ///
    /// The status is the raw code the driver returned.
    IncompleteFramebuffer { role: TargetRole, status: u32 },

    /// A shader failed to compile. The log holds the driver's diagnostic.
    ShaderCompile { role: ShaderRole, kind: ShaderKind, log: String },

    /// A program failed to link. The log holds the driver's diagnostic.
    ProgramLink { role: ShaderRole, log: String },

    /// The quad vertex shader doesn't declare an attribute the renderer feeds.
    MissingVertexAttr(&'static str),
}

impl Display for RendererError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            RendererError::InvalidViewport(size) => {
                write!(formatter, "invalid viewport size {}x{}", size.width, size.height)
            }
            RendererError::IncompleteFramebuffer { role, status } => {
                write!(formatter,
                       "{:?} render target framebuffer is incomplete (status 0x{:x})",
                       role,
                       status)
            }
            RendererError::ShaderCompile { role, kind, ref log } => {
                write!(formatter, "{:?} {:?} shader failed to compile: {}", role, kind, log)
            }
            RendererError::ProgramLink { role, ref log } => {
                write!(formatter, "{:?} program failed to link: {}", role, log)
            }
            RendererError::MissingVertexAttr(name) => {
                write!(formatter, "vertex attribute `{}` not found", name)
            }
        }
    }
}

impl Error for RendererError {}
