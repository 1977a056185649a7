pub mod app;
mod sprites;

pub use app::{
    run_app, text_width, AppError, Canvas, InputAction, InputSnapshot, LoopConfig,
    LoopMetricsSnapshot, Renderer, Rgba8, Scene, SceneCommand, Vec2, GLYPH_HEIGHT, GLYPH_WIDTH,
};
pub use image::{Rgba, RgbaImage};
pub use sprites::{validate_sprite_key, SpriteAtlas, SpriteKeyError, SpriteProvider};
