use std::collections::HashSet;

use engine::{Rgba8, Vec2};
use thiserror::Error;
use tracing::warn;

use super::entity::{DoorLock, Entity, EntityKind, GridPos};
use super::TILE_SIZE;

/// Row-major solid/floor grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WallMap {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl WallMap {
    /// Open floor enclosed by a one-cell solid border.
    pub(crate) fn room(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(x == 0 || y == 0 || x == width - 1 || y == height - 1);
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub(crate) fn width(&self) -> i32 {
        self.width
    }

    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    pub(crate) fn size_px(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * TILE_SIZE,
            self.height as f32 * TILE_SIZE,
        )
    }

    pub(crate) fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Off-grid cells read as floor; callers check bounds separately.
    pub(crate) fn is_wall(&self, pos: GridPos) -> bool {
        self.index(pos).is_some_and(|index| self.cells[index])
    }

    pub(crate) fn set(&mut self, x: i32, y: i32, solid: bool) {
        if let Some(index) = self.index(GridPos::new(x, y)) {
            self.cells[index] = solid;
        }
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some((pos.y * self.width + pos.x) as usize)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Level {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) walls: WallMap,
    pub(crate) entities: Vec<Entity>,
    pub(crate) start: GridPos,
    pub(crate) background: Rgba8,
    pub(crate) fog_of_war: bool,
    pub(crate) chaos_mode: bool,
    pub(crate) balloons: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum LevelError {
    #[error("level catalog is empty")]
    EmptyCatalog,
    #[error("level {level}: start ({x}, {y}) lies outside the {width}x{height} grid")]
    StartOffGrid {
        level: u32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    #[error("level {level}: start ({x}, {y}) is a wall cell")]
    StartOnWall { level: u32, x: i32, y: i32 },
    #[error("level {level}: entity `{id}` at ({x}, {y}) lies outside the grid")]
    EntityOffGrid { level: u32, id: String, x: i32, y: i32 },
    #[error("level {level}: duplicate entity id `{id}`")]
    DuplicateEntityId { level: u32, id: String },
    #[error("level {level}: door `{door}` needs `{item}` but nothing in the level provides it")]
    MissingDoorItem {
        level: u32,
        door: String,
        item: String,
    },
    #[error("level {level}: quiz door `{door}` has an empty answer")]
    EmptyQuizAnswer { level: u32, door: String },
}

pub(crate) fn validate_catalog(levels: &[Level]) -> Result<(), LevelError> {
    if levels.is_empty() {
        return Err(LevelError::EmptyCatalog);
    }
    levels.iter().try_for_each(validate_level)
}

/// Checks the level data contract. Entities placed on solid cells are
/// legal but logged, since they can only be reached by knockback.
pub(crate) fn validate_level(level: &Level) -> Result<(), LevelError> {
    let walls = &level.walls;
    if !walls.in_bounds(level.start) {
        return Err(LevelError::StartOffGrid {
            level: level.id,
            x: level.start.x,
            y: level.start.y,
            width: walls.width(),
            height: walls.height(),
        });
    }
    if walls.is_wall(level.start) {
        return Err(LevelError::StartOnWall {
            level: level.id,
            x: level.start.x,
            y: level.start.y,
        });
    }

    let mut seen_ids = HashSet::new();
    let mut provided_items = HashSet::new();
    for entity in &level.entities {
        if !seen_ids.insert(entity.id.as_str()) {
            return Err(LevelError::DuplicateEntityId {
                level: level.id,
                id: entity.id.clone(),
            });
        }
        if !walls.in_bounds(entity.pos) {
            return Err(LevelError::EntityOffGrid {
                level: level.id,
                id: entity.id.clone(),
                x: entity.pos.x,
                y: entity.pos.y,
            });
        }
        if walls.is_wall(entity.pos) && !matches!(entity.kind, EntityKind::Enemy(_)) {
            warn!(
                level = level.id,
                entity = %entity.id,
                kind = entity.kind.name(),
                x = entity.pos.x,
                y = entity.pos.y,
                "entity_on_wall"
            );
        }
        if matches!(entity.kind, EntityKind::Key | EntityKind::Collectible) {
            provided_items.insert(entity.id.as_str());
        }
    }

    for entity in &level.entities {
        let EntityKind::Door { lock, .. } = &entity.kind else {
            continue;
        };
        match lock {
            DoorLock::Item { required } if !provided_items.contains(required.as_str()) => {
                return Err(LevelError::MissingDoorItem {
                    level: level.id,
                    door: entity.id.clone(),
                    item: required.clone(),
                });
            }
            DoorLock::Quiz { answer, .. } if answer.trim().is_empty() => {
                return Err(LevelError::EmptyQuizAnswer {
                    level: level.id,
                    door: entity.id.clone(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}
