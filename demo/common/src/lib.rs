// sdfview/demo/common/src/lib.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The sdfview app: shows a glyph next to its signed distance field.

#[macro_use]
extern crate log;

use crate::ui::{Controls, SdfUniform, UIAction, ViewAction};
use crate::window::{Event, Window};
use clap::{App, Arg, ArgMatches};
use euclid::default::Size2D;
use euclid::{point2, size2};
use sdfview_gl::GLVersion;
use sdfview_glyph::{FreeTypeRasterizer, GlyphParams, GlyphPipeline, Rasterizer};
use sdfview_glyph::SdfGenerator;
use sdfview_gpu::Device;
use sdfview_renderer::{Renderer, RendererError, SdfParams, ShaderRole, TargetRole};
use std::error::Error;
use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

pub mod ui;
pub mod window;

pub const DEFAULT_WINDOW_WIDTH: u32 = 1280;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 720;
pub const DEFAULT_VIEWPORT_SIZE: i32 = 500;

/// Fonts tried in order when none is given on the command line.
pub static SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub struct DemoApp<W, D, R, G> where W: Window, D: Device, R: Rasterizer, G: SdfGenerator {
    pub should_exit: bool,
    pub dirty: bool,
    pub options: Options,

    controls: Controls,

    // Device resources are released in declaration order, textures first, and all of them
    // before the window and its GL context.
    pipeline: GlyphPipeline<D, R, G>,
    renderer: Renderer<D>,
    pub window: W,
}

impl<W, D, R, G> DemoApp<W, D, R, G> where W: Window, D: Device, R: Rasterizer, G: SdfGenerator {
    /// Builds the renderer on `device` and renders the initial glyph.
    ///
    /// Shader or framebuffer failures are fatal. Glyph failures only leave the views empty.
    pub fn new(mut window: W, device: D, rasterizer: R, generator: G, options: Options)
               -> Result<DemoApp<W, D, R, G>, DemoError> {
        let renderer = Renderer::new(device, options.viewport_size)?;

        let controls = Controls::new(options.glyph_params(), SdfParams::default());
        renderer.apply_sdf_params(controls.sdf_params());

        let pipeline = GlyphPipeline::new(&renderer.device,
                                          rasterizer,
                                          generator,
                                          controls.glyph_params());
        window.set_title(&controls.title());

        Ok(DemoApp {
            should_exit: false,
            dirty: true,
            options,
            controls,
            pipeline,
            renderer,
            window,
        })
    }

    /// Applies `events`. Glyph changes are rebuilt here, before the next frame reads the
    /// textures they invalidate.
    pub fn prepare_frame(&mut self, events: Vec<Event>) {
        self.dirty = false;

        let mut rebuild_glyph = false;
        let mut title_changed = false;
        for event in events {
            match self.controls.handle_event(&event) {
                UIAction::None => {}
                UIAction::Quit => self.should_exit = true,
                UIAction::Redraw => self.dirty = true,
                UIAction::View(action) => {
                    self.apply_view_action(action);
                    self.dirty = true;
                }
                UIAction::SdfUniform(uniform) => {
                    self.apply_sdf_uniform(uniform);
                    title_changed = true;
                    self.dirty = true;
                }
                UIAction::RebuildGlyph => {
                    rebuild_glyph = true;
                    title_changed = true;
                    self.dirty = true;
                }
            }
        }

        if rebuild_glyph {
            self.pipeline.update(&self.renderer.device, self.controls.glyph_params());
        }
        if title_changed {
            self.window.set_title(&self.controls.title());
        }
    }

    /// Renders both views into their targets and presents them side by side.
    pub fn draw_frame(&mut self) {
        self.renderer.clear_all();

        let sdf_texture = self.pipeline.sdf_texture();
        self.renderer.draw(sdf_texture,
                           point2(0.0, 0.0),
                           Renderer::native_size(sdf_texture),
                           ShaderRole::Sdf,
                           TargetRole::Sdf);

        let glyph_texture = self.pipeline.glyph_texture();
        self.renderer.draw(glyph_texture,
                           point2(0.0, 0.0),
                           Renderer::native_size(glyph_texture),
                           ShaderRole::Blit,
                           TargetRole::Plain);

        self.renderer.present(self.window.size());
        self.window.present();
    }

    #[inline]
    pub fn renderer(&self) -> &Renderer<D> {
        &self.renderer
    }

    #[inline]
    pub fn pipeline(&self) -> &GlyphPipeline<D, R, G> {
        &self.pipeline
    }

    #[inline]
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    fn apply_view_action(&mut self, action: ViewAction) {
        let view = self.renderer.view_mut();
        match action {
            ViewAction::Scroll(amount) => view.scroll(amount),
            ViewAction::Pan { dx, dy } => view.pan(dx, dy),
            ViewAction::Reset => view.reset(),
        }
        debug!("zoom {}, offset {:?}", view.zoom(), view.offset());
    }

    fn apply_sdf_uniform(&self, uniform: SdfUniform) {
        let params = self.controls.sdf_params();
        match uniform {
            SdfUniform::ShowRendered => self.renderer.set_show_rendered(params.show_rendered),
            SdfUniform::Width => self.renderer.set_sdf_width(params.width),
            SdfUniform::Edge => self.renderer.set_sdf_edge(params.edge),
        }
    }
}

/// Fails unless the current context is at least OpenGL 3.3.
pub fn check_gl_version(version: Option<GLVersion>) -> Result<GLVersion, DemoError> {
    match version {
        Some(version) if version.is_supported() => {
            info!("using OpenGL {}", version);
            Ok(version)
        }
        Some(version) => Err(DemoError::UnsupportedGLVersion(Some(version))),
        None => Err(DemoError::UnsupportedGLVersion(None)),
    }
}

/// Loads the font named in `options`, or the first system font that loads.
///
/// Failing that, the rasterizer has no face and the viewer runs with empty views.
pub fn load_rasterizer(options: &Options) -> FreeTypeRasterizer {
    if let Some(ref path) = options.font_path {
        return match FreeTypeRasterizer::from_path(path) {
            Ok(rasterizer) => rasterizer,
            Err(err) => {
                error!("failed to load font {}: {}", path.display(), err);
                FreeTypeRasterizer::without_face()
            }
        };
    }

    for path in SYSTEM_FONT_PATHS.iter().map(Path::new).filter(|path| path.is_file()) {
        match FreeTypeRasterizer::from_path(path) {
            Ok(rasterizer) => {
                info!("using system font {}", path.display());
                return rasterizer;
            }
            Err(err) => warn!("skipping {}: {}", path.display(), err),
        }
    }
    error!("no font given and no system font found; pass a font path");
    FreeTypeRasterizer::without_face()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub font_path: Option<PathBuf>,
    pub glyph_index: i32,
    pub pixel_size: u32,
    pub spread: f32,
    pub viewport_size: Size2D<i32>,
    pub window_size: Size2D<u32>,
}

impl Default for Options {
    fn default() -> Self {
        let glyph = GlyphParams::default();
        Options {
            font_path: None,
            glyph_index: glyph.glyph_index,
            pixel_size: glyph.pixel_size,
            spread: glyph.spread,
            viewport_size: size2(DEFAULT_VIEWPORT_SIZE, DEFAULT_VIEWPORT_SIZE),
            window_size: size2(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT),
        }
    }
}

impl Options {
    /// Reads the process arguments. Exits with usage on malformed input.
    pub fn command_line_overrides(&mut self) {
        let matches = Options::app().get_matches();
        self.apply_matches(&matches);
    }

    pub fn command_line_overrides_from<I, T>(&mut self, args: I)
                                             where I: IntoIterator<Item = T>,
                                                   T: Into<OsString> + Clone {
        let matches = Options::app().get_matches_from(args);
        self.apply_matches(&matches);
    }

    #[inline]
    pub fn glyph_params(&self) -> GlyphParams {
        GlyphParams {
            glyph_index: self.glyph_index,
            pixel_size: self.pixel_size,
            spread: self.spread,
        }
    }

    fn app() -> App<'static, 'static> {
        App::new("sdfview")
            .about("Shows a glyph next to its signed distance field")
            .arg(
                Arg::with_name("glyph")
                    .short("g")
                    .long("glyph")
                    .value_name("INDEX")
                    .takes_value(true)
                    .allow_hyphen_values(true)
                    .validator(is_parseable::<i32>)
                    .help("Index of the glyph in the font"),
            )
            .arg(
                Arg::with_name("size")
                    .short("s")
                    .long("size")
                    .value_name("PIXELS")
                    .takes_value(true)
                    .validator(is_parseable::<u32>)
                    .help("Pixel size to rasterize at (8-512)"),
            )
            .arg(
                Arg::with_name("spread")
                    .long("spread")
                    .value_name("PIXELS")
                    .takes_value(true)
                    .validator(is_parseable::<f32>)
                    .help("Distance field spread (1-100)"),
            )
            .arg(
                Arg::with_name("viewport")
                    .long("viewport")
                    .value_names(&["WIDTH", "HEIGHT"])
                    .takes_value(true)
                    .number_of_values(2)
                    .validator(is_parseable::<u32>)
                    .help("Size of each render target"),
            )
            .arg(Arg::with_name("FONT").help("Path to the font file to load").index(1))
    }

    fn apply_matches(&mut self, matches: &ArgMatches) {
        if let Some(glyph_index) = matches.value_of("glyph").and_then(|value| value.parse().ok()) {
            self.glyph_index = glyph_index;
        }
        if let Some(pixel_size) = matches.value_of("size").and_then(|value| value.parse().ok()) {
            self.pixel_size = pixel_size;
        }
        if let Some(spread) = matches.value_of("spread").and_then(|value| value.parse().ok()) {
            self.spread = spread;
        }
        if let Some(values) = matches.values_of("viewport") {
            let values: Vec<i32> = values.filter_map(|value| value.parse().ok()).collect();
            if let &[width, height] = &values[..] {
                if width > 0 && height > 0 {
                    self.viewport_size = size2(width, height);
                } else {
                    warn!("ignoring empty viewport {}x{}", width, height);
                }
            }
        }
        if let Some(path) = matches.value_of_os("FONT") {
            self.font_path = Some(PathBuf::from(path));
        }
    }
}

fn is_parseable<T>(value: String) -> Result<(), String> where T: std::str::FromStr {
    value.parse::<T>().map(|_| ()).map_err(|_| format!("'{}' is not a valid number", value))
}

#[derive(Debug)]
pub enum DemoError {
    /// The window or its GL context could not be created.
    Window(String),
    /// The context is older than OpenGL 3.3, or its version could not be read.
    UnsupportedGLVersion(Option<GLVersion>),
    Renderer(RendererError),
}

impl Display for DemoError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match *self {
            DemoError::Window(ref message) => write!(formatter, "window error: {}", message),
            DemoError::UnsupportedGLVersion(Some(version)) => {
                write!(formatter,
                       "OpenGL {} is not supported; {} or later is required",
                       version,
                       GLVersion::MINIMUM)
            }
            DemoError::UnsupportedGLVersion(None) => {
                write!(formatter, "could not determine the OpenGL version")
            }
            DemoError::Renderer(ref err) => write!(formatter, "{}", err),
        }
    }
}

impl Error for DemoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            DemoError::Renderer(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<RendererError> for DemoError {
    #[inline]
    fn from(err: RendererError) -> DemoError {
        DemoError::Renderer(err)
    }
}
