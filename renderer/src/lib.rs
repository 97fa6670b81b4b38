// sdfview/renderer/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Draws textured quads into two off-screen targets and composites them into the window.

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

pub mod error;
pub mod programs;
pub mod renderer;
pub mod targets;
pub mod texture;
pub mod view;

mod shaders;

pub use crate::error::RendererError;
pub use crate::programs::{Programs, ShaderRole};
pub use crate::renderer::{Renderer, SdfParams};
pub use crate::targets::{RenderTarget, RenderTargets, TargetRole};
pub use crate::texture::Texture;
pub use crate::view::ViewState;
