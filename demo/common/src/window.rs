// sdfview/demo/common/src/window.rs
//
// Copyright © 2019 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A minimal windowing layer.

use euclid::default::Size2D;

pub trait Window {
    /// The drawable size in device pixels.
    fn size(&self) -> Size2D<i32>;
    fn present(&mut self);
    fn set_title(&mut self, title: &str);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Quit,
    WindowResized,
    KeyDown(Keycode),
    /// Positive amounts scroll up.
    MouseWheel(i32),
    /// Relative motion while the right mouse button is held.
    MouseDragged { dx: i32, dy: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Keycode {
    /// A printable key, as its unshifted ASCII character.
    Alphanumeric(u8),
    Escape,
    Space,
    Up,
    Down,
}
