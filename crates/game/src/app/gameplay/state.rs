use engine::Vec2;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use super::enemies::Enemy;
use super::entity::{Entity, EntityKind, GridPos};
use super::levels::Level;
use super::{
    BALLOON_COUNT, CANVAS_HEIGHT, CANVAS_WIDTH, CHAOS_INTERVAL_MS, GAME_OVER_DELAY_MS,
    STARTING_HEARTS,
};

const START_BANNER_MS: f64 = 2000.0;
const FLIPPED_BANNER_MS: f64 = 1000.0;

/// One-shot notifications for the shell that owns screen routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineEvent {
    GameOver { won: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Tween {
    pub(crate) start: Vec2,
    pub(crate) target: Vec2,
    pub(crate) progress: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Player {
    pub(crate) grid: GridPos,
    /// Drawn top-left corner in map pixels.
    pub(crate) visual: Vec2,
    pub(crate) tween: Option<Tween>,
}

impl Player {
    fn at(cell: GridPos) -> Self {
        Self {
            grid: cell,
            visual: cell.to_pixels(),
            tween: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Dialogue {
    pub(crate) lines: Vec<String>,
    pub(crate) cursor: usize,
    pub(crate) finale: bool,
}

impl Dialogue {
    pub(crate) fn current_line(&self) -> &str {
        self.lines.get(self.cursor).map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Quiz {
    pub(crate) door_id: String,
    pub(crate) question: String,
    pub(crate) answer: String,
    pub(crate) input: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Banner {
    pub(crate) text: String,
    pub(crate) expires_at_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Shake {
    pub(crate) magnitude: f32,
    pub(crate) expires_at_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Balloon {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) speed: f32,
    pub(crate) phase: f32,
}

/// Everything one playthrough mutates. The shell owns one of these per
/// run and drives it through input calls plus `advance_frame`.
#[derive(Debug)]
pub(crate) struct EngineState {
    pub(super) levels: Vec<Level>,
    pub(super) level_index: usize,
    pub(super) entities: Vec<Entity>,
    pub(super) enemies: Vec<Enemy>,
    pub(super) player: Player,
    pub(super) hearts: u32,
    pub(super) inventory: Vec<String>,
    pub(super) dialogue: Option<Dialogue>,
    pub(super) quiz: Option<Quiz>,
    pub(super) banner: Option<Banner>,
    pub(super) shake: Option<Shake>,
    pub(super) shake_offset: Vec2,
    pub(super) controls_flipped: bool,
    pub(super) last_chaos_roll_ms: Option<f64>,
    pub(super) clock_ms: f64,
    pub(super) pending_loss_at_ms: Option<f64>,
    pub(super) finished: bool,
    pub(super) god_mode: bool,
    pub(super) balloons: Vec<Balloon>,
    pub(super) rng: StdRng,
    pub(super) events: Vec<EngineEvent>,
}

impl EngineState {
    /// Starts a run at `start_level` (clamped to the catalog). `levels`
    /// must be non-empty; the catalog is validated before any run begins.
    pub(crate) fn new(levels: Vec<Level>, start_level: usize, god_mode: bool, rng: StdRng) -> Self {
        let mut state = Self {
            levels,
            level_index: 0,
            entities: Vec::new(),
            enemies: Vec::new(),
            player: Player::at(GridPos::new(0, 0)),
            hearts: STARTING_HEARTS,
            inventory: Vec::new(),
            dialogue: None,
            quiz: None,
            banner: None,
            shake: None,
            shake_offset: Vec2::ZERO,
            controls_flipped: false,
            last_chaos_roll_ms: None,
            clock_ms: 0.0,
            pending_loss_at_ms: None,
            finished: false,
            god_mode,
            balloons: Vec::new(),
            rng,
            events: Vec::new(),
        };
        let start = start_level.min(state.levels.len().saturating_sub(1));
        state.enter_level(start);
        state
    }

    pub(crate) fn level(&self) -> Option<&Level> {
        self.levels.get(self.level_index)
    }

    pub(crate) fn level_index(&self) -> usize {
        self.level_index
    }

    pub(crate) fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub(crate) fn hearts(&self) -> u32 {
        self.hearts
    }

    pub(crate) fn inventory(&self) -> &[String] {
        &self.inventory
    }

    pub(crate) fn player(&self) -> &Player {
        &self.player
    }

    pub(crate) fn dialogue(&self) -> Option<&Dialogue> {
        self.dialogue.as_ref()
    }

    pub(crate) fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub(crate) fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub(crate) fn god_mode(&self) -> bool {
        self.god_mode
    }

    pub(crate) fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Rebuilds live state from the catalog template of `index`. Hearts,
    /// god mode and the clock carry over; everything else resets.
    pub(crate) fn enter_level(&mut self, index: usize) {
        let Some(level) = self.levels.get(index) else {
            return;
        };
        let mut entities = Vec::with_capacity(level.entities.len());
        let mut enemies = Vec::new();
        for entity in &level.entities {
            match &entity.kind {
                EntityKind::Enemy(def) => enemies.push(Enemy::spawn(entity, def)),
                _ => entities.push(entity.clone()),
            }
        }
        let start = level.start;
        let banner = format!("START: {}", level.name);
        let balloons = level.balloons;
        info!(
            level = level.id,
            name = %level.name,
            entity_count = entities.len(),
            enemy_count = enemies.len(),
            "level_entered"
        );

        self.level_index = index;
        self.entities = entities;
        self.enemies = enemies;
        self.player = Player::at(start);
        self.inventory.clear();
        self.dialogue = None;
        self.quiz = None;
        self.shake = None;
        self.shake_offset = Vec2::ZERO;
        self.controls_flipped = false;
        self.last_chaos_roll_ms = None;
        self.balloons = if balloons {
            self.spawn_balloons()
        } else {
            Vec::new()
        };
        self.show_banner(banner, START_BANNER_MS);
    }

    /// Jumps to the following level, wrapping after the last one.
    pub(crate) fn warp_next(&mut self) {
        if self.levels.is_empty() {
            return;
        }
        let next = (self.level_index + 1) % self.levels.len();
        info!(from = self.level_index + 1, to = next + 1, "level_warp");
        self.enter_level(next);
    }

    pub(crate) fn toggle_god_mode(&mut self) {
        self.god_mode = !self.god_mode;
        info!(enabled = self.god_mode, "god_mode_toggled");
    }

    /// One simulation frame: clocks, tween, chaos roll, enemies, shake.
    pub(crate) fn advance_frame(&mut self, dt_ms: f64) {
        if self.finished {
            return;
        }
        self.clock_ms += dt_ms.max(0.0);
        self.expire_timers();
        if self
            .pending_loss_at_ms
            .is_some_and(|due| self.clock_ms >= due)
        {
            self.pending_loss_at_ms = None;
            self.finish(false);
            return;
        }

        self.advance_tween();
        self.roll_chaos();
        self.update_enemies();
        self.shake_offset = match self.shake {
            Some(shake) => Vec2::new(
                (self.rng.gen::<f32>() - 0.5) * shake.magnitude,
                (self.rng.gen::<f32>() - 0.5) * shake.magnitude,
            ),
            None => Vec2::ZERO,
        };
        for balloon in &mut self.balloons {
            balloon.y -= balloon.speed;
            if balloon.y < -50.0 {
                balloon.y = CANVAS_HEIGHT + 50.0;
            }
        }
    }

    /// Replaces any visible banner.
    pub(super) fn show_banner(&mut self, text: String, duration_ms: f64) {
        debug!(text = %text, duration_ms, "banner_shown");
        self.banner = Some(Banner {
            text,
            expires_at_ms: self.clock_ms + duration_ms,
        });
    }

    /// Replaces any running shake.
    pub(super) fn start_shake(&mut self, magnitude: f32, duration_ms: f64) {
        self.shake = Some(Shake {
            magnitude,
            expires_at_ms: self.clock_ms + duration_ms,
        });
    }

    /// Latches the run outcome. Later calls are ignored.
    pub(super) fn finish(&mut self, won: bool) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.pending_loss_at_ms = None;
        info!(
            won,
            level = self.level_index + 1,
            hearts = self.hearts,
            "game_over"
        );
        self.events.push(EngineEvent::GameOver { won });
    }

    pub(super) fn schedule_loss(&mut self) {
        if self.pending_loss_at_ms.is_none() && !self.finished {
            self.pending_loss_at_ms = Some(self.clock_ms + GAME_OVER_DELAY_MS);
        }
    }

    fn expire_timers(&mut self) {
        let now = self.clock_ms;
        if self
            .banner
            .as_ref()
            .is_some_and(|banner| now >= banner.expires_at_ms)
        {
            self.banner = None;
        }
        if self.shake.is_some_and(|shake| now >= shake.expires_at_ms) {
            self.shake = None;
        }
    }

    fn roll_chaos(&mut self) {
        let chaos = self.level().is_some_and(|level| level.chaos_mode);
        if !chaos {
            return;
        }
        let due = self
            .last_chaos_roll_ms
            .map_or(true, |last| self.clock_ms - last > CHAOS_INTERVAL_MS);
        if !due {
            return;
        }
        self.last_chaos_roll_ms = Some(self.clock_ms);
        self.controls_flipped = self.rng.gen_bool(0.5);
        debug!(flipped = self.controls_flipped, "chaos_rolled");
        if self.controls_flipped {
            self.show_banner("CONTROLS FLIPPED!".to_string(), FLIPPED_BANNER_MS);
        }
    }

    fn spawn_balloons(&mut self) -> Vec<Balloon> {
        (0..BALLOON_COUNT)
            .map(|_| Balloon {
                x: self.rng.gen::<f32>() * CANVAS_WIDTH,
                y: CANVAS_HEIGHT + self.rng.gen::<f32>() * 200.0,
                speed: 0.5 + self.rng.gen::<f32>(),
                phase: self.rng.gen::<f32>() * std::f32::consts::TAU,
            })
            .collect()
    }
}
