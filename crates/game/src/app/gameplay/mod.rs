mod catalog;
mod enemies;
mod entity;
mod hud;
mod interaction;
mod levels;
mod movement;
mod render;
mod scene_impl;
mod sprites;
mod state;

#[cfg(test)]
mod tests;

pub(crate) use catalog::build_catalog;
pub(crate) use levels::{validate_catalog, LevelError};
pub(crate) use scene_impl::{QuestScene, SessionSettings};
pub(crate) use sprites::build_sprite_atlas;

const TILE_SIZE: f32 = 48.0;
const TWEEN_STEP: f32 = 0.2;
const DEFAULT_ENEMY_SPEED: f32 = 0.05;
const DEFAULT_PATROL_RANGE: f32 = 3.0;
const DEFAULT_WANDER_ANGLE: f32 = 1.0;
const WANDER_TURN_CHANCE: f32 = 0.05;
const CONTACT_RADIUS: f32 = TILE_SIZE * 0.6;
const FOG_RADIUS: f32 = 250.0;
const STARTING_HEARTS: u32 = 3;
const CHAOS_INTERVAL_MS: f64 = 3000.0;
const GAME_OVER_DELAY_MS: f64 = 500.0;
const CANVAS_WIDTH: f32 = 800.0;
const CANVAS_HEIGHT: f32 = 600.0;
const BALLOON_COUNT: usize = 20;
