use engine::Vec2;
use tracing::trace;

use super::entity::{EntityKind, GridPos};
use super::state::{EngineState, Tween};
use super::TWEEN_STEP;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub(crate) fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub(crate) fn reversed(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveOutcome {
    /// Input was suppressed by a modal, a banner, a running tween or a
    /// finished run.
    Ignored,
    /// Wall or grid edge; nothing changed.
    Blocked,
    /// Stayed put but interacted with what occupies the cell.
    Bumped,
    /// Grid position committed and a tween began.
    Started,
}

impl EngineState {
    /// Dialogue, quiz and banners each suppress movement.
    pub(crate) fn input_blocked(&self) -> bool {
        self.dialogue.is_some() || self.quiz.is_some() || self.banner.is_some()
    }

    pub(crate) fn controls_flipped(&self) -> bool {
        self.controls_flipped && self.level().is_some_and(|level| level.chaos_mode)
    }

    /// Directional input after the chaos mapping.
    pub(crate) fn request_move(&mut self, direction: Direction) -> MoveOutcome {
        let direction = if self.controls_flipped() {
            direction.reversed()
        } else {
            direction
        };
        let (dx, dy) = direction.delta();
        self.attempt_move(dx, dy)
    }

    /// Resolves one cardinal step against the map and live entities.
    pub(crate) fn attempt_move(&mut self, dx: i32, dy: i32) -> MoveOutcome {
        if self.finished || self.input_blocked() || self.player.tween.is_some() {
            return MoveOutcome::Ignored;
        }
        let Some(level) = self.level() else {
            return MoveOutcome::Ignored;
        };
        let target = self.player.grid.offset(dx, dy);
        if !level.walls.in_bounds(target) || level.walls.is_wall(target) {
            trace!(x = target.x, y = target.y, "move_blocked");
            return MoveOutcome::Blocked;
        }

        let occupant = self
            .entities
            .iter()
            .position(|entity| entity.pos == target);
        if let Some(index) = occupant {
            let entity = &self.entities[index];
            if entity.is_locked_door() {
                let door = entity.clone();
                self.interact_with_door(&door);
                return MoveOutcome::Bumped;
            }
            if matches!(
                entity.kind,
                EntityKind::Obstacle { .. } | EntityKind::Npc { .. }
            ) {
                let entity = entity.clone();
                self.handle_collision(&entity);
                return MoveOutcome::Bumped;
            }
        }

        self.begin_tween(target);
        if let Some(index) = occupant {
            let entity = self.entities[index].clone();
            self.handle_collision(&entity);
        }
        MoveOutcome::Started
    }

    pub(super) fn advance_tween(&mut self) {
        let Some(tween) = self.player.tween.as_mut() else {
            return;
        };
        tween.progress += TWEEN_STEP;
        if tween.progress >= 1.0 {
            self.player.visual = tween.target;
            self.player.tween = None;
        } else {
            self.player.visual = tween.start.lerp(tween.target, tween.progress);
        }
    }

    /// Pushes the player away from `source` by twice the overlap, cancels
    /// any tween and resyncs the grid cell from the new drawn position.
    pub(super) fn knock_back(&mut self, source: Vec2) {
        let visual = self.player.visual;
        self.player.visual = visual - (source - visual) * 2.0;
        self.player.tween = None;
        self.player.grid = GridPos::from_pixels_rounded(self.player.visual);
    }

    fn begin_tween(&mut self, target: GridPos) {
        self.player.tween = Some(Tween {
            start: self.player.visual,
            target: target.to_pixels(),
            progress: 0.0,
        });
        self.player.grid = target;
    }
}
