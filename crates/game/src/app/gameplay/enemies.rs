use std::f32::consts::{PI, TAU};

use engine::Vec2;
use rand::Rng;

use super::entity::{EnemyBehavior, EnemyDef, Entity, GridPos};
use super::{
    CONTACT_RADIUS, DEFAULT_ENEMY_SPEED, DEFAULT_PATROL_RANGE, DEFAULT_WANDER_ANGLE, TILE_SIZE,
    WANDER_TURN_CHANCE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Motion {
    /// `dir` is +1 or -1 along `axis`; `range` is in tiles.
    Patrol { axis: Axis, range: f32, dir: f32 },
    Chase,
    /// Heading in radians.
    Wander { angle: f32 },
    Static,
}

/// Live enemy. Unlike static entities it lives in pixel space; `origin`
/// keeps the authored cell for patrol bounds.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) id: String,
    pub(crate) sprite_key: Option<String>,
    pub(crate) visibility_radius: Option<f32>,
    pub(crate) origin: GridPos,
    pub(crate) pos: Vec2,
    pub(crate) speed: f32,
    pub(crate) motion: Motion,
}

impl Enemy {
    pub(crate) fn spawn(entity: &Entity, def: &EnemyDef) -> Self {
        let motion = match def.behavior {
            EnemyBehavior::PatrolHorizontal | EnemyBehavior::PatrolVertical => Motion::Patrol {
                axis: if def.behavior == EnemyBehavior::PatrolHorizontal {
                    Axis::Horizontal
                } else {
                    Axis::Vertical
                },
                range: def.patrol_range.unwrap_or(DEFAULT_PATROL_RANGE),
                dir: match def.dir {
                    Some(dir) if dir < 0.0 => -1.0,
                    _ => 1.0,
                },
            },
            EnemyBehavior::Chase => Motion::Chase,
            EnemyBehavior::Wander => Motion::Wander {
                angle: def.dir.unwrap_or(DEFAULT_WANDER_ANGLE),
            },
            EnemyBehavior::Static => Motion::Static,
        };
        Self {
            id: entity.id.clone(),
            sprite_key: entity.sprite_key.clone(),
            visibility_radius: entity.visibility_radius,
            origin: entity.pos,
            pos: entity.pos.to_pixels(),
            speed: def.speed.unwrap_or(DEFAULT_ENEMY_SPEED),
            motion,
        }
    }

    /// Pixels travelled per frame.
    pub(crate) fn effective_speed(&self) -> f32 {
        self.speed * TILE_SIZE
    }

    /// Advances one frame. `player` is the player's drawn top-left corner;
    /// `bounds` is the map size in pixels, used only for wander reflection.
    pub(crate) fn step<R: Rng>(&mut self, player: Vec2, bounds: Vec2, rng: &mut R) {
        let speed = self.effective_speed();
        match &mut self.motion {
            Motion::Patrol { axis, range, dir } => {
                let origin = self.origin.to_pixels();
                let displacement = match axis {
                    Axis::Horizontal => {
                        self.pos.x += speed * *dir;
                        self.pos.x - origin.x
                    }
                    Axis::Vertical => {
                        self.pos.y += speed * *dir;
                        self.pos.y - origin.y
                    }
                };
                if displacement.abs() > *range * TILE_SIZE {
                    *dir = -*dir;
                }
            }
            Motion::Chase => {
                let angle = (player.y - self.pos.y).atan2(player.x - self.pos.x);
                self.pos += Vec2::new(angle.cos(), angle.sin()) * speed;
            }
            Motion::Wander { angle } => {
                if rng.gen::<f32>() < WANDER_TURN_CHANCE {
                    *angle = rng.gen::<f32>() * TAU;
                }
                let heading = *angle;
                self.pos += Vec2::new(heading.cos(), heading.sin()) * speed;
                let outside_x = self.pos.x < 0.0 || self.pos.x > bounds.x;
                let outside_y = self.pos.y < 0.0 || self.pos.y > bounds.y;
                if outside_x || outside_y {
                    *angle = heading + PI;
                }
            }
            Motion::Static => {}
        }
    }

    /// Whether tile centers are close enough to hurt. Both positions are
    /// top-left corners of tile-sized boxes, so center offsets cancel.
    pub(crate) fn touches(&self, player: Vec2) -> bool {
        self.pos.distance(player) < CONTACT_RADIUS
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::super::entity::EntityKind;
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(960.0, 720.0);

    fn spawn(x: i32, y: i32, def: EnemyDef) -> Enemy {
        let entity = Entity::new("e", x, y, EntityKind::Enemy(def));
        Enemy::spawn(&entity, &def)
    }

    #[test]
    fn spawn_converts_grid_to_pixels_and_keeps_origin() {
        let enemy = spawn(6, 5, EnemyDef::new(EnemyBehavior::PatrolHorizontal));
        assert_eq!(enemy.origin, GridPos::new(6, 5));
        assert_eq!(enemy.pos, Vec2::new(288.0, 240.0));
        assert_eq!(
            enemy.motion,
            Motion::Patrol {
                axis: Axis::Horizontal,
                range: DEFAULT_PATROL_RANGE,
                dir: 1.0
            }
        );
        assert!((enemy.effective_speed() - 2.4).abs() < 1e-5);
    }

    #[test]
    fn vertical_patrol_moves_along_y_in_authored_direction() {
        let mut enemy = spawn(
            12,
            12,
            EnemyDef::new(EnemyBehavior::PatrolVertical)
                .speed(0.15)
                .dir(-1.0),
        );
        let mut rng = StdRng::seed_from_u64(1);
        enemy.step(Vec2::ZERO, BOUNDS, &mut rng);
        assert_eq!(enemy.pos.x, 576.0);
        assert!((enemy.pos.y - (576.0 - 7.2)).abs() < 1e-3);
    }

    #[test]
    fn chase_heads_straight_for_player() {
        let mut enemy = spawn(0, 0, EnemyDef::new(EnemyBehavior::Chase).speed(0.1));
        let mut rng = StdRng::seed_from_u64(1);
        enemy.step(Vec2::new(300.0, 400.0), BOUNDS, &mut rng);
        assert!((enemy.pos.x - 2.88).abs() < 1e-3);
        assert!((enemy.pos.y - 3.84).abs() < 1e-3);
    }

    #[test]
    fn wander_reflects_once_when_leaving_both_axes() {
        let mut enemy = spawn(0, 0, EnemyDef::new(EnemyBehavior::Wander).speed(0.05));
        enemy.pos = Vec2::new(0.5, 0.5);
        enemy.motion = Motion::Wander { angle: PI * 1.25 };
        let mut never_turns = StepRng::new(u64::MAX, 0);
        enemy.step(Vec2::ZERO, BOUNDS, &mut never_turns);
        let Motion::Wander { angle } = enemy.motion else {
            panic!("motion changed kind");
        };
        assert!((angle - PI * 2.25).abs() < 1e-4);
    }

    #[test]
    fn wander_resamples_heading_on_low_roll() {
        let mut enemy = spawn(5, 5, EnemyDef::new(EnemyBehavior::Wander).speed(0.05));
        let mut always_turns = StepRng::new(0, 0);
        enemy.step(Vec2::ZERO, BOUNDS, &mut always_turns);
        assert_eq!(enemy.motion, Motion::Wander { angle: 0.0 });
        assert!((enemy.pos.x - (240.0 + 2.4)).abs() < 1e-3);
        assert_eq!(enemy.pos.y, 240.0);
    }

    #[test]
    fn wander_defaults_to_one_radian_heading() {
        let enemy = spawn(3, 3, EnemyDef::new(EnemyBehavior::Wander));
        assert_eq!(enemy.motion, Motion::Wander { angle: 1.0 });
    }

    #[test]
    fn static_enemy_never_moves() {
        let mut enemy = spawn(4, 4, EnemyDef::new(EnemyBehavior::Static));
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            enemy.step(Vec2::ZERO, BOUNDS, &mut rng);
        }
        assert_eq!(enemy.pos, Vec2::new(192.0, 192.0));
    }

    #[test]
    fn contact_uses_sixty_percent_of_a_tile() {
        let enemy = spawn(2, 2, EnemyDef::new(EnemyBehavior::Static));
        assert!(enemy.touches(Vec2::new(96.0 + 28.0, 96.0)));
        assert!(!enemy.touches(Vec2::new(96.0 + 29.0, 96.0)));
    }
}
