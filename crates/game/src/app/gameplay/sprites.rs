use engine::{Rgba, RgbaImage, SpriteAtlas, SpriteKeyError};

const SPRITE_SIZE: u32 = 32;

type Color = [u8; 4];

const BLACK: Color = [0, 0, 0, 255];
const WHITE: Color = [255, 255, 255, 255];
const SKIN: Color = [0xff, 0xcc, 0xaa, 255];
const BROWN: Color = [0x5c, 0x3a, 0x21, 255];
const GOLD: Color = [0xff, 0xd7, 0x00, 255];

/// Keys every level and the renderer may ask for.
pub(crate) const SPRITE_KEYS: [&str; 15] = [
    "hero",
    "madame_spice",
    "wall",
    "npc",
    "key",
    "door",
    "trap",
    "pineapple",
    "weight",
    "balloon",
    "item",
    "boombox",
    "enemy_glitch",
    "enemy_ghost",
    "enemy_gymbro",
];

/// Procedural 32x32 pixel art for every sprite key.
pub(crate) fn build_sprite_atlas() -> Result<SpriteAtlas, SpriteKeyError> {
    let mut atlas = SpriteAtlas::new();
    for key in SPRITE_KEYS {
        atlas.insert(key, paint(key))?;
    }
    Ok(atlas)
}

fn paint(key: &str) -> RgbaImage {
    let mut p = Painter::new();
    match key {
        "hero" => {
            p.rect(10, 18, 12, 14, [0x33, 0x33, 0x33, 255]);
            p.rect(8, 10, 16, 10, [0xff, 0x99, 0x00, 255]);
            p.rect(10, 4, 12, 8, SKIN);
            p.rect(10, 2, 12, 4, BROWN);
            p.rect(12, 6, 2, 2, BLACK);
            p.rect(18, 6, 2, 2, BLACK);
        }
        "madame_spice" => {
            let hair = [0x2a, 0x1d, 0x1d, 255];
            p.rect(8, 4, 16, 16, hair);
            p.rect(6, 6, 4, 18, hair);
            p.rect(22, 6, 4, 18, hair);
            p.rect(10, 6, 12, 10, SKIN);
            p.rect(10, 16, 12, 14, [0xff, 0x00, 0x55, 255]);
            p.rect(12, 18, 8, 8, [0xff, 0x66, 0x99, 255]);
            p.rect(12, 9, 2, 2, BLACK);
            p.rect(18, 9, 2, 2, BLACK);
            p.rect(14, 13, 4, 1, [0xaa, 0x00, 0x00, 255]);
        }
        "wall" => {
            let shade = [0, 0, 0, 51];
            p.rect(0, 0, 32, 32, [0xb0, 0x6c, 0x85, 255]);
            p.rect(0, 0, 32, 2, shade);
            p.rect(0, 16, 32, 2, shade);
        }
        "npc" => {
            p.triangle((16, 4), (28, 28), (4, 28), [0xff, 0xaa, 0x00, 255]);
            p.disc(16, 8, 6, BROWN);
        }
        "key" => {
            p.rect(10, 10, 12, 12, GOLD);
            p.clear(13, 13, 6, 6);
            p.rect(14, 20, 4, 10, GOLD);
        }
        "door" => {
            p.rect(2, 2, 28, 28, BROWN);
            p.outline(1, 1, 30, 30, 2, BLACK);
            p.disc(24, 16, 2, GOLD);
        }
        "trap" => {
            let red = [0xff, 0x00, 0x00, 255];
            p.rect(4, 4, 24, 24, [0x55, 0x00, 0x00, 255]);
            p.rect(15, 8, 3, 11, red);
            p.rect(15, 21, 3, 3, red);
        }
        "pineapple" => {
            let leaf = [0x00, 0xaa, 0x00, 255];
            p.rect(10, 12, 12, 14, GOLD);
            p.triangle((10, 12), (6, 4), (16, 12), leaf);
            p.triangle((22, 12), (26, 4), (16, 12), leaf);
            p.rect(15, 2, 2, 10, leaf);
        }
        "weight" => {
            p.disc(16, 16, 12, [0x33, 0x33, 0x33, 255]);
            p.disc(16, 16, 4, [0x11, 0x11, 0x11, 255]);
            p.rect(9, 24, 14, 2, WHITE);
        }
        "balloon" => {
            p.disc(16, 12, 10, [0xff, 0x77, 0xaa, 255]);
            p.rect(16, 22, 1, 8, WHITE);
        }
        "item" => {
            p.disc(16, 16, 9, WHITE);
            p.disc(16, 16, 7, [0x00, 0xff, 0xff, 255]);
        }
        "boombox" => {
            let speaker = [0x55, 0x55, 0x55, 255];
            p.rect(4, 8, 24, 16, [0x22, 0x22, 0x22, 255]);
            p.disc(10, 16, 4, speaker);
            p.disc(22, 16, 4, speaker);
            p.rect(8, 4, 16, 4, [0x99, 0x99, 0x99, 255]);
        }
        "enemy_glitch" => {
            let green = [0x00, 0xff, 0x00, 255];
            p.glyph(5, 11, &E_ROWS, 2, green);
            p.glyph(13, 11, &R_ROWS, 2, green);
            p.glyph(21, 11, &R_ROWS, 2, green);
            p.rect(2, 8, 12, 1, [0x00, 0xff, 0x00, 120]);
            p.rect(18, 23, 12, 1, [0x00, 0xff, 0x00, 120]);
        }
        "enemy_ghost" => {
            let body = [255, 255, 255, 204];
            p.upper_half_disc(16, 12, 10, body);
            p.rect(6, 12, 21, 12, body);
            p.triangle((6, 24), (16, 24), (6, 28), body);
            p.triangle((16, 24), (27, 24), (27, 28), body);
            p.disc(12, 12, 2, BLACK);
            p.disc(20, 12, 2, BLACK);
        }
        "enemy_gymbro" => {
            p.rect(6, 6, 20, 20, [0xff, 0x00, 0x00, 255]);
            p.rect(2, 8, 4, 12, SKIN);
            p.rect(26, 8, 4, 12, SKIN);
            p.rect(10, 10, 12, 4, BLACK);
        }
        _ => p.rect(0, 0, 32, 32, [0xff, 0x00, 0xff, 255]),
    }
    p.finish()
}

const E_ROWS: [u8; 5] = [0b111, 0b100, 0b111, 0b100, 0b111];
const R_ROWS: [u8; 5] = [0b110, 0b101, 0b110, 0b101, 0b101];

/// Minimal raster painter over a transparent square image. Colors with
/// alpha below 255 blend over what is already painted.
struct Painter {
    image: RgbaImage,
}

impl Painter {
    fn new() -> Self {
        Self {
            image: RgbaImage::new(SPRITE_SIZE, SPRITE_SIZE),
        }
    }

    fn finish(self) -> RgbaImage {
        self.image
    }

    fn put(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= SPRITE_SIZE as i32 || y >= SPRITE_SIZE as i32 {
            return;
        }
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        let src_alpha = color[3] as f32 / 255.0;
        let dst_alpha = pixel[3] as f32 / 255.0;
        let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
        if out_alpha <= 0.0 {
            *pixel = Rgba([0, 0, 0, 0]);
            return;
        }
        let mut out = [0u8; 4];
        for channel in 0..3 {
            let value = (color[channel] as f32 * src_alpha
                + pixel[channel] as f32 * dst_alpha * (1.0 - src_alpha))
                / out_alpha;
            out[channel] = value.round().clamp(0.0, 255.0) as u8;
        }
        out[3] = (out_alpha * 255.0).round() as u8;
        *pixel = Rgba(out);
    }

    fn rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        for py in y..y + height {
            for px in x..x + width {
                self.put(px, py, color);
            }
        }
    }

    fn clear(&mut self, x: i32, y: i32, width: i32, height: i32) {
        for py in y.max(0)..(y + height).min(SPRITE_SIZE as i32) {
            for px in x.max(0)..(x + width).min(SPRITE_SIZE as i32) {
                self.image.put_pixel(px as u32, py as u32, Rgba([0, 0, 0, 0]));
            }
        }
    }

    fn outline(&mut self, x: i32, y: i32, width: i32, height: i32, thickness: i32, color: Color) {
        self.rect(x, y, width, thickness, color);
        self.rect(x, y + height - thickness, width, thickness, color);
        self.rect(x, y + thickness, thickness, height - 2 * thickness, color);
        self.rect(
            x + width - thickness,
            y + thickness,
            thickness,
            height - 2 * thickness,
            color,
        );
    }

    fn disc(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        self.disc_rows(cx, cy, radius, color, false);
    }

    fn upper_half_disc(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        self.disc_rows(cx, cy, radius, color, true);
    }

    fn disc_rows(&mut self, cx: i32, cy: i32, radius: i32, color: Color, upper_only: bool) {
        let r2 = radius * radius;
        let max_dy = if upper_only { -1 } else { radius };
        for dy in -radius..=max_dy {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.put(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Fills pixels whose centers fall inside the triangle.
    fn triangle(&mut self, a: (i32, i32), b: (i32, i32), c: (i32, i32), color: Color) {
        let edge = |p: (f32, f32), q: (i32, i32), r: (i32, i32)| {
            (r.0 - q.0) as f32 * (p.1 - q.1 as f32) - (r.1 - q.1) as f32 * (p.0 - q.0 as f32)
        };
        let min_x = a.0.min(b.0).min(c.0);
        let max_x = a.0.max(b.0).max(c.0);
        let min_y = a.1.min(b.1).min(c.1);
        let max_y = a.1.max(b.1).max(c.1);
        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let center = (px as f32 + 0.5, py as f32 + 0.5);
                let w0 = edge(center, b, c);
                let w1 = edge(center, c, a);
                let w2 = edge(center, a, b);
                let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                    || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                if inside {
                    self.put(px, py, color);
                }
            }
        }
    }

    fn glyph(&mut self, x: i32, y: i32, rows: &[u8; 5], scale: i32, color: Color) {
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..3 {
                if bits & (1 << (2 - col)) != 0 {
                    self.rect(
                        x + col * scale,
                        y + row as i32 * scale,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
    }
}
