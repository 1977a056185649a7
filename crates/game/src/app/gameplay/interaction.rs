use tracing::{debug, info};

use super::catalog::{FINALE_DIALOGUE, FINALE_NPC_ID};
use super::entity::{DoorLock, Entity, EntityKind};
use super::state::{Dialogue, EngineState, Quiz};

const FOUND_BANNER_MS: f64 = 1000.0;
const UNLOCKED_BANNER_MS: f64 = 1000.0;
const LOCKED_BANNER_MS: f64 = 1000.0;
const LOCKED_SHAKE: f32 = 5.0;
const OUCH_BANNER_MS: f64 = 800.0;
const OUCH_SHAKE: f32 = 15.0;
const CORRECT_BANNER_MS: f64 = 1500.0;
const WRONG_BANNER_MS: f64 = 1000.0;
const WRONG_SHAKE: f32 = 10.0;

/// Lenient answer check: case and surrounding whitespace are ignored, and
/// any attempt containing the expected answer passes. A blank expected
/// answer never matches.
pub(crate) fn quiz_answer_matches(expected: &str, attempt: &str) -> bool {
    let expected = expected.trim().to_lowercase();
    if expected.is_empty() {
        return false;
    }
    let attempt = attempt.trim().to_lowercase();
    attempt == expected || attempt.contains(&expected)
}

impl EngineState {
    /// Effects of touching a non-door entity.
    pub(super) fn handle_collision(&mut self, entity: &Entity) {
        match &entity.kind {
            EntityKind::Npc { lines } => {
                if entity.id == FINALE_NPC_ID {
                    info!(npc = %entity.id, "finale_started");
                    self.dialogue = Some(Dialogue {
                        lines: FINALE_DIALOGUE.iter().map(|line| line.to_string()).collect(),
                        cursor: 0,
                        finale: true,
                    });
                } else if !lines.is_empty() {
                    self.dialogue = Some(Dialogue {
                        lines: lines.clone(),
                        cursor: 0,
                        finale: false,
                    });
                }
            }
            EntityKind::Collectible | EntityKind::Key => {
                if !self.remove_entity(&entity.id) {
                    return;
                }
                if !self.inventory.contains(&entity.id) {
                    self.inventory.push(entity.id.clone());
                }
                info!(item = %entity.id, "item_collected");
                self.show_banner(format!("Found {}!", entity.id), FOUND_BANNER_MS);
            }
            EntityKind::Trap => self.apply_damage("trap"),
            EntityKind::Exit => {
                if self.level_index + 1 < self.levels.len() {
                    self.enter_level(self.level_index + 1);
                } else {
                    self.finish(true);
                }
            }
            EntityKind::Obstacle { .. }
            | EntityKind::Door { .. }
            | EntityKind::FakeWall
            | EntityKind::Enemy(_) => {}
        }
    }

    /// Entry point for bumping into a locked door.
    pub(super) fn interact_with_door(&mut self, door: &Entity) {
        let EntityKind::Door { lock, .. } = &door.kind else {
            return;
        };
        match lock {
            DoorLock::Quiz { question, answer } => {
                debug!(door = %door.id, "quiz_opened");
                self.quiz = Some(Quiz {
                    door_id: door.id.clone(),
                    question: question.clone(),
                    answer: answer.clone(),
                    input: String::new(),
                });
            }
            DoorLock::Item { required } => {
                if self.inventory.contains(required) {
                    self.remove_entity(&door.id);
                    info!(door = %door.id, item = %required, "door_unlocked");
                    self.show_banner("UNLOCKED!".to_string(), UNLOCKED_BANNER_MS);
                } else {
                    self.show_banner(format!("LOCKED! Need {required}"), LOCKED_BANNER_MS);
                    self.start_shake(LOCKED_SHAKE, LOCKED_BANNER_MS);
                }
            }
        }
    }

    pub(crate) fn quiz_type(&mut self, text: &str) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.input.push_str(text);
        }
    }

    pub(crate) fn quiz_erase(&mut self) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.input.pop();
        }
    }

    /// Checks the typed answer. A wrong answer keeps the quiz open.
    pub(crate) fn submit_quiz(&mut self) -> bool {
        if self.finished {
            return false;
        }
        let Some(quiz) = self.quiz.as_ref() else {
            return false;
        };
        if quiz_answer_matches(&quiz.answer, &quiz.input) {
            let door_id = quiz.door_id.clone();
            self.quiz = None;
            self.remove_entity(&door_id);
            info!(door = %door_id, "door_unlocked");
            self.show_banner("CORRECT! Smart Boy.".to_string(), CORRECT_BANNER_MS);
            true
        } else {
            debug!(door = %quiz.door_id, "quiz_answer_rejected");
            if !self.god_mode {
                self.lose_heart("quiz");
            }
            self.show_banner("WRONG! Try again.".to_string(), WRONG_BANNER_MS);
            self.start_shake(WRONG_SHAKE, WRONG_BANNER_MS);
            false
        }
    }

    /// Steps through the open dialogue; closing the finale wins the run.
    pub(crate) fn confirm_dialogue(&mut self) {
        let Some(dialogue) = self.dialogue.as_mut() else {
            return;
        };
        if dialogue.cursor + 1 < dialogue.lines.len() {
            dialogue.cursor += 1;
            return;
        }
        let finale = dialogue.finale;
        self.dialogue = None;
        if finale {
            self.finish(true);
        }
    }

    /// Shared trap and enemy damage path.
    pub(super) fn apply_damage(&mut self, source: &str) {
        if self.god_mode || self.finished {
            return;
        }
        self.lose_heart(source);
        self.show_banner("OUCH!".to_string(), OUCH_BANNER_MS);
        self.start_shake(OUCH_SHAKE, OUCH_BANNER_MS);
    }

    /// Enemy contact pass: damage plus knockback unless invulnerable.
    pub(super) fn update_enemies(&mut self) {
        let Some(bounds) = self.level().map(|level| level.walls.size_px()) else {
            return;
        };
        for index in 0..self.enemies.len() {
            let player = self.player.visual;
            let enemy = &mut self.enemies[index];
            enemy.step(player, bounds, &mut self.rng);
            if self.god_mode || !enemy.touches(player) {
                continue;
            }
            let source = enemy.pos;
            debug!(enemy = %enemy.id, "enemy_contact");
            self.apply_damage("enemy");
            self.knock_back(source);
        }
    }

    fn lose_heart(&mut self, source: &str) {
        self.hearts = self.hearts.saturating_sub(1);
        info!(source, hearts = self.hearts, "player_damaged");
        if self.hearts == 0 {
            self.schedule_loss();
        }
    }

    fn remove_entity(&mut self, id: &str) -> bool {
        let before = self.entities.len();
        self.entities.retain(|entity| entity.id != id);
        self.entities.len() != before
    }
}
