use image::RgbaImage;

use super::text::{glyph_advance, glyph_rows};
use super::{GLYPH_HEIGHT, GLYPH_WIDTH};

pub type Rgba8 = [u8; 4];

/// Drawing surface over an RGBA8 frame buffer. Every primitive clips to the
/// frame and is shifted by the current translation; colors with alpha below
/// 255 are blended over the existing pixel.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    translation: (i32, i32),
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
            translation: (0, 0),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_translation(&mut self, x: i32, y: i32) {
        self.translation = (x, y);
    }

    pub fn reset_translation(&mut self) {
        self.translation = (0, 0);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba8> {
        let offset = self.byte_offset(x, y)?;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(color)
    }

    pub fn clear(&mut self, color: Rgba8) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, rect_width: i32, rect_height: i32, color: Rgba8) {
        let x = x + self.translation.0;
        let y = y + self.translation.1;
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = (x + rect_width).min(self.width as i32);
        let end_y = (y + rect_height).min(self.height as i32);
        if end_x <= start_x || end_y <= start_y {
            return;
        }
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.blend_pixel(px, py, color, 1.0);
            }
        }
    }

    pub fn stroke_rect(
        &mut self,
        x: i32,
        y: i32,
        rect_width: i32,
        rect_height: i32,
        thickness: i32,
        color: Rgba8,
    ) {
        if rect_width <= 0 || rect_height <= 0 || thickness <= 0 {
            return;
        }
        let t = thickness.min(rect_width).min(rect_height);
        self.fill_rect(x, y, rect_width, t, color);
        self.fill_rect(x, y + rect_height - t, rect_width, t, color);
        self.fill_rect(x, y + t, t, rect_height - 2 * t, color);
        self.fill_rect(x + rect_width - t, y + t, t, rect_height - 2 * t, color);
    }

    pub fn fill_circle(&mut self, center_x: i32, center_y: i32, radius: i32, color: Rgba8) {
        if radius <= 0 {
            return;
        }
        let cx = center_x + self.translation.0;
        let cy = center_y + self.translation.1;
        let r2 = radius * radius;
        for dy in -radius..=radius {
            let py = cy + dy;
            if py < 0 || py >= self.height as i32 {
                continue;
            }
            for dx in -radius..=radius {
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                let px = cx + dx;
                if px < 0 || px >= self.width as i32 {
                    continue;
                }
                self.blend_pixel(px, py, color, 1.0);
            }
        }
    }

    /// Draws `image` scaled (nearest neighbour) into the `dest_width` x
    /// `dest_height` box at `(x, y)`, multiplying its alpha by `opacity`.
    pub fn draw_image(
        &mut self,
        image: &RgbaImage,
        x: i32,
        y: i32,
        dest_width: i32,
        dest_height: i32,
        opacity: f32,
    ) {
        let (src_width, src_height) = image.dimensions();
        if src_width == 0 || src_height == 0 || dest_width <= 0 || dest_height <= 0 {
            return;
        }
        let opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        if opacity == 0.0 {
            return;
        }

        let left = x + self.translation.0;
        let top = y + self.translation.1;
        let draw_left = left.max(0);
        let draw_top = top.max(0);
        let draw_right = (left + dest_width).min(self.width as i32);
        let draw_bottom = (top + dest_height).min(self.height as i32);
        if draw_left >= draw_right || draw_top >= draw_bottom {
            return;
        }

        let scale_x = src_width as f32 / dest_width as f32;
        let scale_y = src_height as f32 / dest_height as f32;
        for out_y in draw_top..draw_bottom {
            let src_y = (((out_y - top) as f32) * scale_y).floor() as u32;
            let src_y = src_y.min(src_height - 1);
            for out_x in draw_left..draw_right {
                let src_x = (((out_x - left) as f32) * scale_x).floor() as u32;
                let src_x = src_x.min(src_width - 1);
                let color = image.get_pixel(src_x, src_y).0;
                if color[3] == 0 {
                    continue;
                }
                self.blend_pixel(out_x, out_y, color, opacity);
            }
        }
    }

    /// Draws `text` with its top-left corner at `(x, y)` and returns the
    /// drawn width. Characters without a glyph render as blanks.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: i32, color: Rgba8) -> i32 {
        let scale = scale.max(1);
        let mut pen_x = x;
        for ch in text.chars() {
            if let Some(rows) = glyph_rows(ch) {
                self.draw_glyph(pen_x, y, rows, scale, color);
            }
            pen_x += glyph_advance(scale);
        }
        (pen_x - x - scale).max(0)
    }

    fn draw_glyph(
        &mut self,
        x: i32,
        y: i32,
        rows: [u8; GLYPH_HEIGHT as usize],
        scale: i32,
        color: Rgba8,
    ) {
        for (row_index, row_bits) in rows.iter().enumerate() {
            let glyph_y = y + row_index as i32 * scale;
            for col in 0..GLYPH_WIDTH {
                if (row_bits & (1 << (GLYPH_WIDTH - 1 - col))) == 0 {
                    continue;
                }
                self.fill_rect(x + col * scale, glyph_y, scale, scale, color);
            }
        }
    }

    fn byte_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let pixel_offset = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        let byte_offset = pixel_offset.checked_mul(4)?;
        if byte_offset.checked_add(4)? > self.frame.len() {
            return None;
        }
        Some(byte_offset)
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba8, opacity: f32) {
        let Some(offset) = self.byte_offset(x, y) else {
            return;
        };
        let alpha = (color[3] as f32 / 255.0) * opacity;
        let dst = &mut self.frame[offset..offset + 4];
        if alpha >= 1.0 {
            dst.copy_from_slice(&color);
            return;
        }
        for channel in 0..3 {
            let blended = color[channel] as f32 * alpha + dst[channel] as f32 * (1.0 - alpha);
            dst[channel] = blended.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = 255;
    }
}
