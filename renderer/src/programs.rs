// sdfview/renderer/src/programs.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The two linked shader programs, keyed by role.

use crate::error::RendererError;
use crate::shaders::{BLIT_FRAGMENT_SHADER, QUAD_VERTEX_SHADER, SDF_FRAGMENT_SHADER};
use sdfview_gpu::{BlendState, Device, ShaderKind, UniformData};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderRole {
    /// Shows a texture's red channel as gray.
    Blit,
    /// Visualizes a signed distance field.
    Sdf,
}

impl ShaderRole {
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            ShaderRole::Blit => "blit",
            ShaderRole::Sdf => "sdf",
        }
    }

    fn fragment_source(self) -> &'static str {
        match self {
            ShaderRole::Blit => BLIT_FRAGMENT_SHADER,
            ShaderRole::Sdf => SDF_FRAGMENT_SHADER,
        }
    }
}

pub struct Programs<D> where D: Device {
    blit: D::Program,
    sdf: D::Program,
}

impl<D> Programs<D> where D: Device {
    /// Compiles and links every role. The first failure aborts with the driver's diagnostic.
    pub fn new(device: &D) -> Result<Programs<D>, RendererError> {
        device.set_blend_state(BlendState::Off);
        let blit = compile_program(device,
                                   ShaderRole::Blit,
                                   QUAD_VERTEX_SHADER,
                                   ShaderRole::Blit.fragment_source())?;
        let sdf = compile_program(device,
                                  ShaderRole::Sdf,
                                  QUAD_VERTEX_SHADER,
                                  ShaderRole::Sdf.fragment_source())?;
        debug!("linked {} and {} programs", ShaderRole::Blit.name(), ShaderRole::Sdf.name());
        Ok(Programs { blit, sdf })
    }

    #[inline]
    pub fn get(&self, role: ShaderRole) -> &D::Program {
        match role {
            ShaderRole::Blit => &self.blit,
            ShaderRole::Sdf => &self.sdf,
        }
    }

    /// Writes a single uniform into the program's own storage.
    ///
    /// The program is in use only for the duration of the call.
    pub fn set_uniform(&self, device: &D, role: ShaderRole, name: &str, data: UniformData) {
        let program = self.get(role);
        device.use_program(program);
        let uniform = device.get_uniform(program, name);
        device.set_uniform(&uniform, data);
        device.unuse_program();
    }
}

pub(crate) fn compile_program<D>(device: &D,
                                 role: ShaderRole,
                                 vertex_source: &str,
                                 fragment_source: &str)
                                 -> Result<D::Program, RendererError>
                                 where D: Device {
    let vertex_shader = compile_shader(device, role, vertex_source, ShaderKind::Vertex)?;
    let fragment_shader = compile_shader(device, role, fragment_source, ShaderKind::Fragment)?;
    device.create_program_from_shaders(role.name(), vertex_shader, fragment_shader)
          .map_err(|log| {
              error!("{} program failed to link:\n{}", role.name(), log);
              RendererError::ProgramLink { role, log }
          })
}

fn compile_shader<D>(device: &D, role: ShaderRole, source: &str, kind: ShaderKind)
                     -> Result<D::Shader, RendererError>
                     where D: Device {
    device.create_shader_from_source(role.name(), source, kind).map_err(|log| {
        error!("{:?} shader of {} program failed to compile:\n{}", kind, role.name(), log);
        RendererError::ShaderCompile { role, kind, log }
    })
}

#[cfg(test)]
mod tests {
    use super::{compile_program, Programs, ShaderRole};
    use crate::error::RendererError;
    use crate::shaders::{BLIT_FRAGMENT_SHADER, QUAD_VERTEX_SHADER, SHOW_RENDERED_UNIFORM};
    use sdfview_gpu::mock::{MockDevice, ResourceKind};
    use sdfview_gpu::{BlendState, ShaderKind, UniformData};

    #[test]
    fn builds_both_roles_and_releases_shaders() {
        let device = MockDevice::new();
        let programs = Programs::new(&device).unwrap();
        let state = device.state();
        assert_eq!(state.live_count(ResourceKind::Program), 2);
        assert_eq!(state.live_count(ResourceKind::Shader), 0);
        assert_eq!(state.blend, Some(BlendState::Off));
        assert_ne!(programs.get(ShaderRole::Blit).id(), programs.get(ShaderRole::Sdf).id());
        assert_eq!(state.program_named("sdf"), Some(programs.get(ShaderRole::Sdf).id()));
    }

    #[test]
    fn broken_fragment_source_yields_no_program() {
        let device = MockDevice::new();
        let result = compile_program(&device,
                                     ShaderRole::Sdf,
                                     QUAD_VERTEX_SHADER,
                                     "#version 330 core\n#error broken\n");
        match result {
            Err(RendererError::ShaderCompile { role, kind, log }) => {
                assert_eq!(role, ShaderRole::Sdf);
                assert_eq!(kind, ShaderKind::Fragment);
                assert!(!log.is_empty());
            }
            _ => panic!("expected a compile error"),
        }
        let state = device.state();
        assert_eq!(state.live_count(ResourceKind::Program), 0);
        assert_eq!(state.live_count(ResourceKind::Shader), 0);
    }

    #[test]
    fn broken_vertex_source_yields_no_program() {
        let device = MockDevice::new();
        let result = compile_program(&device,
                                     ShaderRole::Blit,
                                     "#version 330 core\n#error broken\n",
                                     BLIT_FRAGMENT_SHADER);
        match result {
            Err(RendererError::ShaderCompile { role, kind, log }) => {
                assert_eq!(role, ShaderRole::Blit);
                assert_eq!(kind, ShaderKind::Vertex);
                assert!(!log.is_empty());
            }
            _ => panic!("expected a compile error"),
        }
        let state = device.state();
        assert_eq!(state.live_count(ResourceKind::Program), 0);
        assert_eq!(state.live_count(ResourceKind::Shader), 0);
        assert!(state.program_named("blit").is_none());
    }

    #[test]
    fn link_failure_aborts_initialization() {
        let device = MockDevice::new();
        device.state_mut().fail_link = true;
        match Programs::new(&device) {
            Err(RendererError::ProgramLink { role: ShaderRole::Blit, log }) => {
                assert!(!log.is_empty())
            }
            _ => panic!("expected a link error"),
        }
        assert!(device.state().live.is_empty());

        let result = compile_program(&device,
                                     ShaderRole::Blit,
                                     QUAD_VERTEX_SHADER,
                                     BLIT_FRAGMENT_SHADER);
        assert!(result.is_err());
    }

    #[test]
    fn set_uniform_writes_once_and_unbinds() {
        let device = MockDevice::new();
        let programs = Programs::new(&device).unwrap();
        programs.set_uniform(&device, ShaderRole::Sdf, SHOW_RENDERED_UNIFORM, UniformData::Int(1));
        let state = device.state();
        assert_eq!(state.uniform_writes.len(), 1);
        assert_eq!(state.uniform_value(programs.get(ShaderRole::Sdf).id(), SHOW_RENDERED_UNIFORM),
                   Some(UniformData::Int(1)));
        assert!(state.nothing_bound());
        assert!(state.errors.is_empty());
    }
}
