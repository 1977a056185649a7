use engine::{Canvas, Rgba8, SpriteProvider, Vec2};

use super::entity::{EntityKind, GridPos};
use super::state::EngineState;
use super::{FOG_RADIUS, TILE_SIZE};

const FOG_COLOR: Rgba8 = [0, 0, 0, 255];
const WALL_FALLBACK: Rgba8 = [0xb0, 0x6c, 0x85, 255];
const OBSTACLE_FALLBACK: Rgba8 = [255, 0, 0, 255];
const EXIT_COLOR: Rgba8 = [0, 255, 0, 255];
const BALLOON_STRING: Rgba8 = [255, 255, 255, 77];
const FAKE_WALL_OPACITY: f32 = 0.5;
const BALLOON_RADIUS: i32 = 8;

/// Top-left of the viewport in map pixels. Follows the player's tile
/// center and clamps to the map; maps smaller than the viewport pin to 0.
pub(crate) fn camera_offset(player: Vec2, map_size: Vec2, viewport: Vec2) -> Vec2 {
    let half_tile = TILE_SIZE / 2.0;
    let clamp_axis = |player: f32, map: f32, view: f32| {
        (player - view / 2.0 + half_tile).min(map - view).max(0.0)
    };
    Vec2::new(
        clamp_axis(player.x, map_size.x, viewport.x),
        clamp_axis(player.y, map_size.y, viewport.y),
    )
}

pub(crate) fn tile_visible(fog_of_war: bool, cell: GridPos, player: Vec2) -> bool {
    !fog_of_war || cell.to_pixels().distance(player) <= FOG_RADIUS
}

/// An entity's own radius always applies; otherwise fog hides everything
/// but the exit beyond the level radius.
pub(crate) fn entity_visible(
    fog_of_war: bool,
    is_exit: bool,
    own_radius: Option<f32>,
    pos: Vec2,
    player: Vec2,
) -> bool {
    let distance = pos.distance(player);
    match own_radius {
        Some(radius) => distance <= radius,
        None if fog_of_war && !is_exit => distance <= FOG_RADIUS,
        None => true,
    }
}

/// Composes the play field: backdrop, tiles, entities, enemies, player.
pub(crate) fn draw_world(state: &EngineState, sprites: &dyn SpriteProvider, canvas: &mut Canvas<'_>) {
    let Some(level) = state.level() else {
        canvas.clear(FOG_COLOR);
        return;
    };
    canvas.reset_translation();
    canvas.clear(level.background);
    if level.balloons {
        draw_balloons(state, canvas);
    }

    let viewport = Vec2::new(canvas.width() as f32, canvas.height() as f32);
    let player = state.player.visual;
    let camera = camera_offset(player, level.walls.size_px(), viewport);
    let shake = state.shake_offset;
    canvas.set_translation(
        (shake.x - camera.x).round() as i32,
        (shake.y - camera.y).round() as i32,
    );

    let tile = TILE_SIZE as i32;
    for y in 0..level.walls.height() {
        for x in 0..level.walls.width() {
            let cell = GridPos::new(x, y);
            let (px, py) = (x * tile, y * tile);
            if !tile_visible(level.fog_of_war, cell, player) {
                canvas.fill_rect(px, py, tile, tile, FOG_COLOR);
                continue;
            }
            if level.walls.is_wall(cell) {
                draw_wall(sprites, canvas, px, py, 1.0);
            } else if state
                .entities
                .iter()
                .any(|entity| entity.kind == EntityKind::FakeWall && entity.pos == cell)
            {
                draw_wall(sprites, canvas, px, py, FAKE_WALL_OPACITY);
            }
        }
    }

    for entity in &state.entities {
        let pos = entity.pos.to_pixels();
        let is_exit = entity.kind == EntityKind::Exit;
        if !entity_visible(
            level.fog_of_war,
            is_exit,
            entity.visibility_radius,
            pos,
            player,
        ) {
            continue;
        }
        let (px, py) = (pos.x.round() as i32, pos.y.round() as i32);
        if let Some(image) = entity.sprite().and_then(|key| sprites.sprite(key)) {
            canvas.draw_image(image, px, py, tile, tile, 1.0);
            continue;
        }
        match &entity.kind {
            EntityKind::Obstacle { color } => {
                canvas.fill_rect(px, py, tile, tile, color.unwrap_or(OBSTACLE_FALLBACK));
            }
            EntityKind::Exit => {
                canvas.stroke_rect(px + 5, py + 5, tile - 10, tile - 10, 3, EXIT_COLOR);
            }
            _ => {}
        }
    }

    for enemy in &state.enemies {
        if !entity_visible(
            level.fog_of_war,
            false,
            enemy.visibility_radius,
            enemy.pos,
            player,
        ) {
            continue;
        }
        let key = enemy.sprite_key.as_deref().unwrap_or("enemy_ghost");
        if let Some(image) = sprites.sprite(key) {
            canvas.draw_image(
                image,
                enemy.pos.x.round() as i32,
                enemy.pos.y.round() as i32,
                tile,
                tile,
                1.0,
            );
        }
    }

    if let Some(image) = sprites.sprite("hero") {
        canvas.draw_image(
            image,
            player.x.round() as i32,
            player.y.round() as i32,
            tile,
            tile,
            1.0,
        );
    }
    canvas.reset_translation();
}

fn draw_wall(sprites: &dyn SpriteProvider, canvas: &mut Canvas<'_>, x: i32, y: i32, opacity: f32) {
    let tile = TILE_SIZE as i32;
    match sprites.sprite("wall") {
        Some(image) => canvas.draw_image(image, x, y, tile, tile, opacity),
        None => {
            let mut color = WALL_FALLBACK;
            color[3] = (opacity * 255.0).round() as u8;
            canvas.fill_rect(x, y, tile, tile, color);
        }
    }
}

/// Screen-space backdrop; drawn before the camera translation.
fn draw_balloons(state: &EngineState, canvas: &mut Canvas<'_>) {
    let sway_time = (state.clock_ms / 500.0) as f32;
    for balloon in &state.balloons {
        let sway = (sway_time + balloon.phase).sin() * 20.0;
        let x = (balloon.x + sway).round() as i32;
        let y = balloon.y.round() as i32;
        let hue = (balloon.phase * 100.0).rem_euclid(360.0);
        canvas.fill_circle(x, y, BALLOON_RADIUS, hsl_to_rgba(hue, 0.7, 0.7));
        canvas.fill_rect(x, y + BALLOON_RADIUS, 1, 12, BALLOON_STRING);
    }
}

/// `hue` in degrees, `saturation` and `lightness` in 0..=1.
pub(crate) fn hsl_to_rgba(hue: f32, saturation: f32, lightness: f32) -> Rgba8 {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue.rem_euclid(360.0) / 60.0;
    let second = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };
    let base = lightness - chroma / 2.0;
    let channel = |value: f32| ((value + base) * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b), 255]
}
