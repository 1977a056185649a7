use engine::{Rgba8, Vec2};

use super::TILE_SIZE;

/// Integer cell coordinate. Signed so knockback can resolve to cells
/// outside the map without wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct GridPos {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl GridPos {
    pub(crate) const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub(crate) fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub(crate) fn to_pixels(self) -> Vec2 {
        Vec2::new(self.x as f32 * TILE_SIZE, self.y as f32 * TILE_SIZE)
    }

    /// Cell whose area contains the center of a tile drawn at `pixels`.
    pub(crate) fn from_pixels_rounded(pixels: Vec2) -> Self {
        let half = TILE_SIZE / 2.0;
        Self::new(
            ((pixels.x + half) / TILE_SIZE).floor() as i32,
            ((pixels.y + half) / TILE_SIZE).floor() as i32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnemyBehavior {
    PatrolHorizontal,
    PatrolVertical,
    Chase,
    Wander,
    Static,
}

/// Authored enemy parameters. Unset values fall back to the simulation
/// defaults when the enemy spawns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EnemyDef {
    pub(crate) behavior: EnemyBehavior,
    pub(crate) speed: Option<f32>,
    pub(crate) patrol_range: Option<f32>,
    pub(crate) dir: Option<f32>,
}

impl EnemyDef {
    pub(crate) fn new(behavior: EnemyBehavior) -> Self {
        Self {
            behavior,
            speed: None,
            patrol_range: None,
            dir: None,
        }
    }

    pub(crate) fn speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub(crate) fn patrol_range(mut self, tiles: f32) -> Self {
        self.patrol_range = Some(tiles);
        self
    }

    pub(crate) fn dir(mut self, dir: f32) -> Self {
        self.dir = Some(dir);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DoorLock {
    Item { required: String },
    Quiz { question: String, answer: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EntityKind {
    Obstacle { color: Option<Rgba8> },
    Enemy(EnemyDef),
    Collectible,
    Npc { lines: Vec<String> },
    Exit,
    Door { locked: bool, lock: DoorLock },
    Key,
    FakeWall,
    Trap,
}

impl EntityKind {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            EntityKind::Obstacle { .. } => "obstacle",
            EntityKind::Enemy(_) => "enemy",
            EntityKind::Collectible => "collectible",
            EntityKind::Npc { .. } => "npc",
            EntityKind::Exit => "exit",
            EntityKind::Door { .. } => "door",
            EntityKind::Key => "key",
            EntityKind::FakeWall => "fake_wall",
            EntityKind::Trap => "trap",
        }
    }

    /// Sprite drawn when the entity does not name its own.
    pub(crate) fn default_sprite(&self) -> Option<&'static str> {
        match self {
            EntityKind::Npc { .. } => Some("npc"),
            EntityKind::Collectible | EntityKind::Key => Some("key"),
            EntityKind::Door { .. } => Some("door"),
            EntityKind::Trap => Some("trap"),
            EntityKind::Enemy(_) => Some("enemy_ghost"),
            EntityKind::Obstacle { .. } | EntityKind::Exit | EntityKind::FakeWall => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Entity {
    pub(crate) id: String,
    pub(crate) pos: GridPos,
    pub(crate) sprite_key: Option<String>,
    pub(crate) visibility_radius: Option<f32>,
    pub(crate) kind: EntityKind,
}

impl Entity {
    pub(crate) fn new(id: &str, x: i32, y: i32, kind: EntityKind) -> Self {
        Self {
            id: id.to_string(),
            pos: GridPos::new(x, y),
            sprite_key: None,
            visibility_radius: None,
            kind,
        }
    }

    pub(crate) fn with_sprite(mut self, key: &str) -> Self {
        self.sprite_key = Some(key.to_string());
        self
    }

    pub(crate) fn sprite(&self) -> Option<&str> {
        self.sprite_key
            .as_deref()
            .or_else(|| self.kind.default_sprite())
    }

    pub(crate) fn is_locked_door(&self) -> bool {
        matches!(self.kind, EntityKind::Door { locked: true, .. })
    }
}
