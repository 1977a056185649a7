use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use winit::window::Window;

use crate::app::Scene;

use super::Canvas;

/// Presents a fixed-size logical canvas scaled onto the window surface.
pub struct Renderer {
    pixels: Pixels<'static>,
    canvas_width: u32,
    canvas_height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, canvas_width: u32, canvas_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(canvas_width, canvas_height, surface)?;
        Ok(Self {
            pixels,
            canvas_width,
            canvas_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    pub fn render_scene(&mut self, scene: &mut dyn Scene) -> Result<(), Error> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Ok(());
        }
        let frame = self.pixels.frame_mut();
        let mut canvas = Canvas::new(frame, self.canvas_width, self.canvas_height);
        scene.render(&mut canvas);
        self.pixels.render()
    }
}
