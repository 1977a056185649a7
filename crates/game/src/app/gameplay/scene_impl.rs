use engine::{Canvas, InputAction, InputSnapshot, Rgba8, Scene, SceneCommand, SpriteAtlas};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::catalog::STORY_BRIEF;
use super::hud::{draw_centered, draw_hud};
use super::levels::Level;
use super::movement::Direction;
use super::render::draw_world;
use super::state::{EngineEvent, EngineState};

const MENU_BG: Rgba8 = [17, 24, 39, 255];
const TITLE_YELLOW: Rgba8 = [250, 204, 21, 255];
const TITLE_PINK: Rgba8 = [236, 72, 153, 255];
const SUBTITLE_PINK: Rgba8 = [249, 168, 212, 255];
const BRIEF_GREEN: Rgba8 = [134, 239, 172, 255];
const BRIEF_BORDER: Rgba8 = [34, 197, 94, 255];
const LOSS_RED: Rgba8 = [220, 38, 38, 255];
const MUTED: Rgba8 = [107, 114, 128, 255];
const WHITE: Rgba8 = [255, 255, 255, 255];

/// Run options fixed at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SessionSettings {
    pub(crate) start_level: usize,
    pub(crate) god_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShellPhase {
    Menu,
    Brief,
    Playing,
    GameOver,
    Victory,
}

impl ShellPhase {
    fn as_token(self) -> &'static str {
        match self {
            ShellPhase::Menu => "menu",
            ShellPhase::Brief => "brief",
            ShellPhase::Playing => "playing",
            ShellPhase::GameOver => "game_over",
            ShellPhase::Victory => "victory",
        }
    }
}

/// Screen router around the gameplay engine: menu, brief, the run
/// itself and the two end screens.
pub(crate) struct QuestScene {
    catalog: Vec<Level>,
    sprites: SpriteAtlas,
    settings: SessionSettings,
    rng: StdRng,
    phase: ShellPhase,
    session: Option<EngineState>,
}

impl QuestScene {
    pub(crate) fn new(
        catalog: Vec<Level>,
        sprites: SpriteAtlas,
        settings: SessionSettings,
        rng: StdRng,
    ) -> Self {
        Self {
            catalog,
            sprites,
            settings,
            rng,
            phase: ShellPhase::Menu,
            session: None,
        }
    }

    pub(crate) fn phase(&self) -> ShellPhase {
        self.phase
    }

    pub(crate) fn session(&self) -> Option<&EngineState> {
        self.session.as_ref()
    }

    fn set_phase(&mut self, phase: ShellPhase) {
        if self.phase != phase {
            info!(from = self.phase.as_token(), to = phase.as_token(), "phase_changed");
            self.phase = phase;
        }
    }

    fn start_run(&mut self) {
        let session_rng = StdRng::seed_from_u64(self.rng.gen());
        self.session = Some(EngineState::new(
            self.catalog.clone(),
            self.settings.start_level,
            self.settings.god_mode,
            session_rng,
        ));
        self.set_phase(ShellPhase::Playing);
    }

    fn update_playing(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) {
        if input.was_pressed(InputAction::Back) {
            info!("mission_aborted");
            self.session = None;
            self.set_phase(ShellPhase::Menu);
            return;
        }
        let Some(session) = self.session.as_mut() else {
            self.set_phase(ShellPhase::Menu);
            return;
        };

        if input.was_pressed(InputAction::ToggleGodMode) {
            session.toggle_god_mode();
        }
        if input.was_pressed(InputAction::WarpNext) {
            session.warp_next();
        }

        if session.quiz().is_some() {
            if !input.typed_text().is_empty() {
                session.quiz_type(input.typed_text());
            }
            if input.was_pressed(InputAction::Erase) {
                session.quiz_erase();
            }
            if input.was_pressed(InputAction::Submit) {
                session.submit_quiz();
            }
        } else if session.dialogue().is_some() {
            if input.was_pressed(InputAction::Confirm) {
                session.confirm_dialogue();
            }
        } else if let Some(direction) = movement_intent(input) {
            session.request_move(direction);
        }

        session.advance_frame(f64::from(fixed_dt_seconds) * 1000.0);

        let outcome = session
            .drain_events()
            .into_iter()
            .map(|EngineEvent::GameOver { won }| won)
            .last();
        if let Some(won) = outcome {
            self.set_phase(if won {
                ShellPhase::Victory
            } else {
                ShellPhase::GameOver
            });
        }
    }
}

/// First held direction, with fresh presses taking priority so a tap
/// between held keys still registers.
fn movement_intent(input: &InputSnapshot) -> Option<Direction> {
    const BINDINGS: [(InputAction, Direction); 4] = [
        (InputAction::MoveUp, Direction::Up),
        (InputAction::MoveDown, Direction::Down),
        (InputAction::MoveLeft, Direction::Left),
        (InputAction::MoveRight, Direction::Right),
    ];
    BINDINGS
        .iter()
        .find(|(action, _)| input.was_pressed(*action))
        .or_else(|| BINDINGS.iter().find(|(action, _)| input.is_down(*action)))
        .map(|(_, direction)| *direction)
}

impl Scene for QuestScene {
    fn load(&mut self) {
        info!(
            levels = self.catalog.len(),
            sprites = self.sprites.len(),
            start_level = self.settings.start_level + 1,
            god_mode = self.settings.god_mode,
            "scene_loaded"
        );
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        match self.phase {
            ShellPhase::Menu => {
                if input.was_pressed(InputAction::Back) {
                    info!(reason = "menu_quit", "shutdown_requested");
                    return SceneCommand::Quit;
                }
                if input.was_pressed(InputAction::Submit) {
                    self.start_run();
                } else if input.was_pressed(InputAction::Brief) {
                    self.set_phase(ShellPhase::Brief);
                }
            }
            ShellPhase::Brief => {
                if [
                    InputAction::Back,
                    InputAction::Brief,
                    InputAction::Submit,
                    InputAction::Confirm,
                ]
                .into_iter()
                .any(|action| input.was_pressed(action))
                {
                    self.set_phase(ShellPhase::Menu);
                }
            }
            ShellPhase::Playing => self.update_playing(fixed_dt_seconds, input),
            ShellPhase::GameOver | ShellPhase::Victory => {
                if [InputAction::Back, InputAction::Submit, InputAction::Confirm]
                    .into_iter()
                    .any(|action| input.was_pressed(action))
                {
                    self.session = None;
                    self.set_phase(ShellPhase::Menu);
                }
            }
        }
        SceneCommand::None
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) {
        canvas.reset_translation();
        match self.phase {
            ShellPhase::Menu => draw_menu(canvas),
            ShellPhase::Brief => draw_brief(canvas),
            ShellPhase::Playing => match self.session.as_ref() {
                Some(session) => {
                    draw_world(session, &self.sprites, canvas);
                    draw_hud(session, canvas);
                }
                None => canvas.clear(MENU_BG),
            },
            ShellPhase::GameOver => {
                canvas.clear(MENU_BG);
                draw_centered(canvas, 220, "GAME OVER", 8, LOSS_RED);
                draw_centered(canvas, 300, "Don't give up on love.", 3, WHITE);
                draw_centered(canvas, 380, "ENTER: TRY AGAIN", 2, MUTED);
            }
            ShellPhase::Victory => {
                canvas.clear([0, 0, 0, 255]);
                canvas.stroke_rect(40, 40, 720, 520, 4, TITLE_PINK);
                draw_centered(canvas, 150, "MISSION ACCOMPLISHED", 5, TITLE_PINK);
                draw_centered(canvas, 240, "<3  <3  <3", 6, LOSS_RED);
                draw_centered(canvas, 330, "Happy Valentine's Day, Harvey!", 3, WHITE);
                draw_centered(canvas, 370, "I love you more than Biryani.", 3, WHITE);
                draw_centered(canvas, 460, "ENTER: REPLAY MEMORIES", 2, SUBTITLE_PINK);
            }
        }
    }

    fn unload(&mut self) {
        self.session = None;
        info!("scene_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        let mut title = format!("Tile Quest | {}", self.phase.as_token());
        if let Some(session) = self.session.as_ref().filter(|_| self.phase == ShellPhase::Playing) {
            title.push_str(&format!(
                " | level {}/{} | hearts {}",
                session.level_index() + 1,
                session.level_count(),
                session.hearts()
            ));
            if session.god_mode() {
                title.push_str(" | GM");
            }
        }
        Some(title)
    }
}

fn draw_menu(canvas: &mut Canvas<'_>) {
    canvas.clear(MENU_BG);
    canvas.stroke_rect(80, 80, 640, 440, 4, TITLE_PINK);
    draw_centered(canvas, 140, "DESI FIRANGAN'S", 6, TITLE_YELLOW);
    draw_centered(canvas, 190, "QUEST", 6, TITLE_PINK);
    draw_centered(canvas, 260, "TO MADAME SPICE'S HEART", 2, SUBTITLE_PINK);
    draw_centered(canvas, 330, "ENTER: START JOURNEY", 3, WHITE);
    draw_centered(canvas, 370, "B: READ FILE", 3, WHITE);
    draw_centered(canvas, 410, "ESC: QUIT", 2, MUTED);
    draw_centered(canvas, 480, "EST. MAY 2023 | OMEGLE", 2, MUTED);
}

fn draw_brief(canvas: &mut Canvas<'_>) {
    canvas.clear([0, 0, 0, 255]);
    canvas.fill_rect(60, 40, 680, 520, [31, 41, 55, 255]);
    canvas.stroke_rect(60, 40, 680, 520, 2, BRIEF_BORDER);
    canvas.draw_text(84, 64, "TOP SECRET: MISSION BRIEF", 3, BRIEF_BORDER);
    let mut y = 110;
    for line in STORY_BRIEF.lines() {
        canvas.draw_text(84, y, line, 2, BRIEF_GREEN);
        y += 24;
    }
    canvas.draw_text(84, 524, "[ESC] CLOSE", 2, BRIEF_BORDER);
}
