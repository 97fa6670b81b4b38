// sdfview/demo/native/src/main.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! sdfview using SDL 2.

#[macro_use]
extern crate log;

use euclid::default::Size2D;
use euclid::size2;
use sdfview_demo::window::{Event, Keycode, Window};
use sdfview_demo::{check_gl_version, load_rasterizer, DemoApp, DemoError, Options};
use sdfview_gl::{GLDevice, GLVersion};
use sdfview_glyph::BitmapSdfGenerator;
use sdl2::event::{Event as SDLEvent, WindowEvent};
use sdl2::keyboard::Keycode as SDLKeycode;
use sdl2::video::{GLContext, GLProfile, Window as SDLWindow};
use sdl2::{EventPump, Sdl, VideoSubsystem};
use std::env;
use std::process;

fn main() {
    color_backtrace::install();
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    // Read command line options.
    let mut options = Options::default();
    options.command_line_overrides();

    if let Err(err) = run(options) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(options: Options) -> Result<(), DemoError> {
    let window = WindowImpl::new(&options)?;
    let version = check_gl_version(GLVersion::current())?;
    let rasterizer = load_rasterizer(&options);

    let mut app = DemoApp::new(window,
                               GLDevice::new(version),
                               rasterizer,
                               BitmapSdfGenerator::new(),
                               options)?;

    while !app.should_exit {
        let mut events = vec![];
        if !app.dirty {
            events.push(app.window.get_event());
        }
        while let Some(event) = app.window.try_get_event() {
            events.push(event);
        }

        app.prepare_frame(events);
        if app.should_exit {
            break;
        }
        app.draw_frame();
    }

    info!("shutting down");
    Ok(())
}

struct WindowImpl {
    // The context is destroyed before the window it was created for.
    #[allow(dead_code)]
    gl_context: GLContext,
    window: SDLWindow,
    event_pump: EventPump,
    #[allow(dead_code)]
    video: VideoSubsystem,
    #[allow(dead_code)]
    sdl: Sdl,
}

impl WindowImpl {
    fn new(options: &Options) -> Result<WindowImpl, DemoError> {
        let sdl = sdl2::init().map_err(DemoError::Window)?;
        let video = sdl.video().map_err(DemoError::Window)?;

        let gl_attributes = video.gl_attr();
        gl_attributes.set_context_profile(GLProfile::Core);
        gl_attributes.set_context_version(3, 3);

        let window_size = options.window_size;
        let window = video.window("sdfview", window_size.width, window_size.height)
                          .opengl()
                          .resizable()
                          .allow_highdpi()
                          .build()
                          .map_err(|err| DemoError::Window(err.to_string()))?;

        let gl_context = window.gl_create_context().map_err(DemoError::Window)?;
        gl::load_with(|name| video.gl_get_proc_address(name) as *const _);
        if let Err(err) = video.gl_set_swap_interval(1) {
            warn!("vsync unavailable: {}", err);
        }

        let event_pump = sdl.event_pump().map_err(DemoError::Window)?;

        Ok(WindowImpl { gl_context, window, event_pump, video, sdl })
    }

    fn get_event(&mut self) -> Event {
        loop {
            let event = self.event_pump.wait_event();
            if let Some(event) = convert_event(event) {
                return event;
            }
        }
    }

    fn try_get_event(&mut self) -> Option<Event> {
        while let Some(event) = self.event_pump.poll_event() {
            if let Some(event) = convert_event(event) {
                return Some(event);
            }
        }
        None
    }
}

impl Window for WindowImpl {
    fn size(&self) -> Size2D<i32> {
        let (width, height) = self.window.drawable_size();
        size2(width as i32, height as i32)
    }

    fn present(&mut self) {
        self.window.gl_swap_window();
    }

    fn set_title(&mut self, title: &str) {
        if let Err(err) = self.window.set_title(title) {
            warn!("failed to set window title: {}", err);
        }
    }
}

fn convert_event(event: SDLEvent) -> Option<Event> {
    match event {
        SDLEvent::Quit { .. } => Some(Event::Quit),
        SDLEvent::Window { win_event: WindowEvent::SizeChanged(..), .. } |
        SDLEvent::Window { win_event: WindowEvent::Exposed, .. } => Some(Event::WindowResized),
        SDLEvent::KeyDown { keycode: Some(keycode), .. } => {
            convert_keycode(keycode).map(Event::KeyDown)
        }
        SDLEvent::MouseWheel { y, .. } if y != 0 => Some(Event::MouseWheel(y)),
        SDLEvent::MouseMotion { mousestate, xrel, yrel, .. } if mousestate.right() => {
            Some(Event::MouseDragged { dx: xrel, dy: yrel })
        }
        _ => None,
    }
}

fn convert_keycode(keycode: SDLKeycode) -> Option<Keycode> {
    let key = match keycode {
        SDLKeycode::Escape => return Some(Keycode::Escape),
        SDLKeycode::Space => return Some(Keycode::Space),
        SDLKeycode::Up => return Some(Keycode::Up),
        SDLKeycode::Down => return Some(Keycode::Down),
        SDLKeycode::Equals | SDLKeycode::KpPlus => b'=',
        SDLKeycode::Minus | SDLKeycode::KpMinus => b'-',
        SDLKeycode::LeftBracket => b'[',
        SDLKeycode::RightBracket => b']',
        SDLKeycode::W => b'w',
        SDLKeycode::S => b's',
        SDLKeycode::E => b'e',
        SDLKeycode::D => b'd',
        SDLKeycode::R => b'r',
        _ => return None,
    };
    Some(Keycode::Alphanumeric(key))
}

#[cfg(test)]
mod tests {
    use super::convert_keycode;
    use sdfview_demo::window::Keycode;
    use sdl2::keyboard::Keycode as SDLKeycode;

    #[test]
    fn parameter_keys_are_mapped() {
        assert_eq!(convert_keycode(SDLKeycode::KpPlus), Some(Keycode::Alphanumeric(b'=')));
        assert_eq!(convert_keycode(SDLKeycode::RightBracket), Some(Keycode::Alphanumeric(b']')));
        assert_eq!(convert_keycode(SDLKeycode::E), Some(Keycode::Alphanumeric(b'e')));
        assert_eq!(convert_keycode(SDLKeycode::Escape), Some(Keycode::Escape));
        assert_eq!(convert_keycode(SDLKeycode::Q), None);
    }
}
