use engine::{InputAction, InputSnapshot, Scene, SceneCommand, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::catalog::{FINALE_DIALOGUE, FINALE_NPC_ID};
use super::enemies::Motion;
use super::entity::{DoorLock, EnemyBehavior, EnemyDef, Entity, EntityKind, GridPos};
use super::levels::{Level, WallMap};
use super::movement::{Direction, MoveOutcome};
use super::render::entity_visible;
use super::scene_impl::{QuestScene, SessionSettings, ShellPhase};
use super::sprites::build_sprite_atlas;
use super::state::{EngineEvent, EngineState};

const FRAME_MS: f64 = 1000.0 / 60.0;
const FRAME_SECONDS: f32 = 1.0 / 60.0;

fn level(id: u32, start: (i32, i32), entities: Vec<Entity>) -> Level {
    Level {
        id,
        name: format!("Test {id}"),
        walls: WallMap::room(20, 15),
        entities,
        start: GridPos::new(start.0, start.1),
        background: [0, 0, 0, 255],
        fog_of_war: false,
        chaos_mode: false,
        balloons: false,
    }
}

fn engine(levels: Vec<Level>) -> EngineState {
    let mut state = EngineState::new(levels, 0, false, StdRng::seed_from_u64(7));
    state.banner = None;
    state
}

fn single(entities: Vec<Entity>) -> EngineState {
    engine(vec![level(1, (2, 2), entities)])
}

fn run_frames(state: &mut EngineState, frames: usize) {
    for _ in 0..frames {
        state.advance_frame(FRAME_MS);
    }
}

/// Lets the tween finish and drops any banner so the next move is live.
fn settle(state: &mut EngineState) {
    run_frames(state, 10);
    state.banner = None;
}

fn quiz_door(answer: &str) -> Entity {
    Entity::new(
        "door_quiz",
        3,
        2,
        EntityKind::Door {
            locked: true,
            lock: DoorLock::Quiz {
                question: "Does pineapple belong on pizza? (Yes/No)".to_string(),
                answer: answer.to_string(),
            },
        },
    )
}

fn item_door(x: i32, y: i32, required: &str) -> Entity {
    Entity::new(
        "door_item",
        x,
        y,
        EntityKind::Door {
            locked: true,
            lock: DoorLock::Item {
                required: required.to_string(),
            },
        },
    )
}

fn npc(id: &str, x: i32, y: i32) -> Entity {
    Entity::new(
        id,
        x,
        y,
        EntityKind::Npc {
            lines: vec!["Hello.".to_string(), "Goodbye.".to_string()],
        },
    )
}

fn game_over_events(state: &mut EngineState) -> Vec<bool> {
    state
        .drain_events()
        .into_iter()
        .map(|EngineEvent::GameOver { won }| won)
        .collect()
}

#[test]
fn wall_move_is_rejected_without_state_change() {
    let mut state = engine(vec![level(1, (1, 1), Vec::new())]);
    assert_eq!(state.attempt_move(-1, 0), MoveOutcome::Blocked);
    assert_eq!(state.attempt_move(0, -1), MoveOutcome::Blocked);
    assert_eq!(state.player().grid, GridPos::new(1, 1));
    assert!(state.player().tween.is_none());
}

#[test]
fn off_grid_move_is_rejected() {
    let mut edge = level(1, (0, 3), Vec::new());
    edge.walls.set(0, 3, false);
    let mut state = engine(vec![edge]);
    assert_eq!(state.attempt_move(-1, 0), MoveOutcome::Blocked);
    assert_eq!(state.player().grid, GridPos::new(0, 3));
}

#[test]
fn npc_blocks_and_opens_dialogue() {
    let mut state = single(vec![npc("npc_chef", 3, 2)]);
    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Bumped);
    assert_eq!(state.player().grid, GridPos::new(2, 2));
    let dialogue = state.dialogue().expect("dialogue opened");
    assert_eq!(dialogue.current_line(), "Hello.");

    state.confirm_dialogue();
    assert_eq!(state.dialogue().map(|d| d.cursor), Some(1));
    state.confirm_dialogue();
    assert!(state.dialogue().is_none());
    assert!(game_over_events(&mut state).is_empty());
}

#[test]
fn obstacle_and_locked_door_block_movement() {
    let mut state = single(vec![
        Entity::new("w1", 3, 2, EntityKind::Obstacle { color: None }),
        item_door(2, 3, "ConnectionKey"),
    ]);
    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Bumped);
    assert_eq!(state.hearts(), 3);
    assert_eq!(state.attempt_move(0, 1), MoveOutcome::Bumped);
    assert_eq!(state.player().grid, GridPos::new(2, 2));
    assert_eq!(
        state.banner().map(|b| b.text.as_str()),
        Some("LOCKED! Need ConnectionKey")
    );
    assert!(state.shake.is_some());
}

#[test]
fn blocking_ui_and_running_tween_suppress_moves() {
    let mut state = EngineState::new(
        vec![level(1, (2, 2), Vec::new())],
        0,
        false,
        StdRng::seed_from_u64(1),
    );
    assert!(state.banner().is_some());
    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Ignored);

    state.banner = None;
    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Started);
    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Ignored);
    assert_eq!(state.player().grid, GridPos::new(3, 2));
}

#[test]
fn tween_snaps_exactly_to_committed_cell() {
    let mut state = single(Vec::new());
    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Started);
    assert_eq!(state.player().grid, GridPos::new(3, 2));

    run_frames(&mut state, 2);
    let midway = state.player().visual;
    assert!(midway.x > 96.0 && midway.x < 144.0);

    run_frames(&mut state, 8);
    assert!(state.player().tween.is_none());
    assert_eq!(state.player().visual, GridPos::new(3, 2).to_pixels());
}

#[test]
fn pickup_is_removed_and_never_duplicated() {
    let mut state = single(vec![Entity::new("ConnectionKey", 3, 2, EntityKind::Key)]);
    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Started);
    assert_eq!(state.inventory(), ["ConnectionKey".to_string()]);
    assert_eq!(
        state.banner().map(|b| b.text.as_str()),
        Some("Found ConnectionKey!")
    );
    assert!(state.entities.is_empty());

    settle(&mut state);
    state.attempt_move(-1, 0);
    settle(&mut state);
    state.attempt_move(1, 0);
    assert_eq!(state.inventory().len(), 1);
}

#[test]
fn item_door_opens_with_key_in_inventory() {
    let mut state = single(vec![
        Entity::new("ConnectionKey", 2, 3, EntityKind::Key),
        item_door(3, 2, "ConnectionKey"),
    ]);
    state.attempt_move(0, 1);
    settle(&mut state);
    state.attempt_move(0, -1);
    settle(&mut state);

    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Bumped);
    assert_eq!(state.banner().map(|b| b.text.as_str()), Some("UNLOCKED!"));
    assert!(state.entities.iter().all(|e| e.id != "door_item"));

    state.banner = None;
    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Started);
}

#[test]
fn lenient_quiz_answers_unlock_the_door() {
    for attempt in ["yes", " YES ", "yes i think so"] {
        let mut state = single(vec![quiz_door("Yes")]);
        assert_eq!(state.attempt_move(1, 0), MoveOutcome::Bumped);
        assert!(state.quiz().is_some());

        state.quiz_type(attempt);
        assert!(state.submit_quiz(), "attempt {attempt:?} should pass");
        assert!(state.quiz().is_none());
        assert!(state.entities.is_empty());
        assert_eq!(state.hearts(), 3);
        assert_eq!(
            state.banner().map(|b| b.text.as_str()),
            Some("CORRECT! Smart Boy.")
        );
    }
}

#[test]
fn wrong_quiz_answer_costs_exactly_one_heart_per_attempt() {
    let mut state = single(vec![quiz_door("Yes")]);
    state.attempt_move(1, 0);
    state.quiz_type("no");

    assert!(!state.submit_quiz());
    assert_eq!(state.hearts(), 2);
    assert!(state.quiz().is_some());
    assert_eq!(
        state.banner().map(|b| b.text.as_str()),
        Some("WRONG! Try again.")
    );

    assert!(!state.submit_quiz());
    assert_eq!(state.hearts(), 1);
    assert_eq!(state.entities.len(), 1);
}

#[test]
fn quiz_input_edits_before_submit() {
    let mut state = single(vec![quiz_door("Yes")]);
    state.attempt_move(1, 0);
    state.quiz_type("yez");
    state.quiz_erase();
    state.quiz_type("s");
    assert_eq!(state.quiz().map(|q| q.input.as_str()), Some("yes"));
    assert!(state.submit_quiz());
}

#[test]
fn god_mode_ignores_quiz_and_trap_damage() {
    let mut state = single(vec![quiz_door("Yes"), Entity::new("trap_0", 2, 3, EntityKind::Trap)]);
    state.toggle_god_mode();
    state.attempt_move(1, 0);
    state.quiz_type("no");
    assert!(!state.submit_quiz());
    state.quiz = None;
    state.banner = None;
    state.attempt_move(0, 1);
    assert_eq!(state.hearts(), 3);
}

#[test]
fn game_over_fires_once_after_delay() {
    let mut state = single(vec![
        Entity::new("trap_0", 3, 2, EntityKind::Trap),
        Entity::new("trap_1", 4, 2, EntityKind::Trap),
    ]);
    state.hearts = 1;
    state.attempt_move(1, 0);
    assert_eq!(state.hearts(), 0);
    assert_eq!(state.banner().map(|b| b.text.as_str()), Some("OUCH!"));

    run_frames(&mut state, 10);
    assert!(game_over_events(&mut state).is_empty());

    run_frames(&mut state, 30);
    assert_eq!(game_over_events(&mut state), vec![false]);
    assert!(state.finished);

    state.apply_damage("trap");
    run_frames(&mut state, 60);
    assert_eq!(state.hearts(), 0);
    assert!(game_over_events(&mut state).is_empty());
    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Ignored);
}

#[test]
fn last_heart_lost_to_quiz_ends_the_run() {
    let mut state = single(vec![quiz_door("Yes")]);
    state.hearts = 1;
    state.attempt_move(1, 0);
    state.quiz_type("no");
    state.submit_quiz();
    run_frames(&mut state, 31);
    assert_eq!(game_over_events(&mut state), vec![false]);
}

#[test]
fn exit_advances_and_resets_level_state() {
    let first = level(
        1,
        (2, 2),
        vec![
            Entity::new("ConnectionKey", 2, 3, EntityKind::Key),
            Entity::new("exit", 3, 2, EntityKind::Exit),
        ],
    );
    let second = level(
        2,
        (4, 4),
        vec![Entity::new(
            "police1",
            6,
            5,
            EntityKind::Enemy(
                EnemyDef::new(EnemyBehavior::PatrolHorizontal)
                    .patrol_range(5.0)
                    .speed(0.1),
            ),
        )],
    );
    let mut state = engine(vec![first, second]);
    state.attempt_move(0, 1);
    settle(&mut state);
    state.attempt_move(0, -1);
    settle(&mut state);
    assert_eq!(state.inventory().len(), 1);
    state.hearts = 2;

    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Started);
    assert_eq!(state.level_index(), 1);
    assert!(state.inventory().is_empty());
    assert!(state.player().tween.is_none());
    assert_eq!(state.player().grid, GridPos::new(4, 4));
    assert_eq!(state.player().visual, Vec2::new(192.0, 192.0));
    assert_eq!(state.hearts(), 2);
    assert_eq!(state.enemies.len(), 1);
    assert_eq!(state.enemies[0].origin, GridPos::new(6, 5));
    assert_eq!(state.enemies[0].pos, Vec2::new(288.0, 240.0));
    assert!(state
        .banner()
        .is_some_and(|banner| banner.text == "START: Test 2"));
}

#[test]
fn level_entry_clears_modals() {
    let mut state = engine(vec![
        level(1, (2, 2), vec![quiz_door("Yes"), npc("npc", 2, 3)]),
        level(2, (2, 2), Vec::new()),
    ]);
    state.attempt_move(1, 0);
    assert!(state.quiz().is_some());
    state.enter_level(1);
    assert!(state.quiz().is_none());

    state.enter_level(0);
    state.banner = None;
    state.attempt_move(0, 1);
    assert!(state.dialogue().is_some());
    state.enter_level(1);
    assert!(state.dialogue().is_none());
}

#[test]
fn final_exit_signals_victory() {
    let mut state = single(vec![Entity::new("exit", 3, 2, EntityKind::Exit)]);
    state.attempt_move(1, 0);
    assert_eq!(game_over_events(&mut state), vec![true]);
}

#[test]
fn finale_dialogue_wins_when_closed() {
    let mut state = single(vec![npc(FINALE_NPC_ID, 3, 2)]);
    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Bumped);
    let dialogue = state.dialogue().expect("finale opened");
    assert!(dialogue.finale);
    assert_eq!(dialogue.lines.len(), FINALE_DIALOGUE.len());

    for _ in 0..FINALE_DIALOGUE.len() - 1 {
        state.confirm_dialogue();
    }
    assert!(state.dialogue().is_some());
    assert!(game_over_events(&mut state).is_empty());
    state.confirm_dialogue();
    assert!(state.dialogue().is_none());
    assert_eq!(game_over_events(&mut state), vec![true]);
}

#[test]
fn horizontal_patrol_reverses_only_past_its_range() {
    let patrol = Entity::new(
        "police1",
        6,
        5,
        EntityKind::Enemy(
            EnemyDef::new(EnemyBehavior::PatrolHorizontal)
                .patrol_range(5.0)
                .speed(0.1)
                .dir(1.0),
        ),
    );
    let mut state = engine(vec![level(1, (1, 13), vec![patrol])]);
    let origin_x = 6.0 * 48.0;
    let bound = 5.0 * 48.0;
    let step = 0.1 * 48.0;
    let mut last_dir = 1.0;
    let mut reversals = 0;

    for _ in 0..600 {
        run_frames(&mut state, 1);
        let enemy = &state.enemies[0];
        let displacement = (enemy.pos.x - origin_x).abs();
        assert!(displacement <= bound + step + 1e-3);
        assert_eq!(enemy.pos.y, 240.0);

        let Motion::Patrol { dir, .. } = enemy.motion else {
            panic!("patrol motion expected");
        };
        if dir != last_dir {
            reversals += 1;
            assert!(displacement > bound);
        }
        last_dir = dir;
    }
    assert!(reversals >= 2);
    assert_eq!(state.hearts(), 3);
}

#[test]
fn enemy_contact_damages_and_knocks_back() {
    let ghost = Entity::new(
        "ghost",
        3,
        2,
        EntityKind::Enemy(EnemyDef::new(EnemyBehavior::Static)),
    );
    let mut state = single(vec![ghost]);
    assert_eq!(state.attempt_move(1, 0), MoveOutcome::Started);

    run_frames(&mut state, 1);
    assert_eq!(state.hearts(), 3);
    run_frames(&mut state, 2);
    assert_eq!(state.hearts(), 2);
    let player = state.player();
    assert!(player.tween.is_none());
    assert!(player.visual.x < 96.0);
    assert_eq!(player.visual.y, 96.0);
    assert_eq!(player.grid, GridPos::from_pixels_rounded(player.visual));
    assert_eq!(state.banner().map(|b| b.text.as_str()), Some("OUCH!"));
}

#[test]
fn god_mode_skips_contact_damage_and_knockback() {
    let ghost = Entity::new(
        "ghost",
        3,
        2,
        EntityKind::Enemy(EnemyDef::new(EnemyBehavior::Static)),
    );
    let mut state = single(vec![ghost]);
    state.toggle_god_mode();
    state.attempt_move(1, 0);
    run_frames(&mut state, 10);
    assert_eq!(state.hearts(), 3);
    assert_eq!(state.player().visual, Vec2::new(144.0, 96.0));
}

#[test]
fn flipped_controls_swap_every_direction() {
    let mut chaos = level(1, (5, 5), Vec::new());
    chaos.chaos_mode = true;
    let mut state = engine(vec![chaos]);
    state.controls_flipped = true;

    assert_eq!(state.request_move(Direction::Left), MoveOutcome::Started);
    assert_eq!(state.player().grid, GridPos::new(6, 5));
    settle(&mut state);
    state.controls_flipped = true;
    state.request_move(Direction::Up);
    assert_eq!(state.player().grid, GridPos::new(6, 6));
}

#[test]
fn chaos_roll_announces_flips() {
    let mut flipped_seen = false;
    for seed in 0..32 {
        let mut chaos = level(1, (5, 5), Vec::new());
        chaos.chaos_mode = true;
        let mut state = EngineState::new(vec![chaos], 0, false, StdRng::seed_from_u64(seed));
        run_frames(&mut state, 1);
        let text = state.banner().map(|b| b.text.clone()).unwrap_or_default();
        if state.controls_flipped() {
            flipped_seen = true;
            assert_eq!(text, "CONTROLS FLIPPED!");
        } else {
            assert!(text.starts_with("START:"));
        }
    }
    assert!(flipped_seen);
}

#[test]
fn newer_banner_replaces_older_one() {
    let mut state = single(Vec::new());
    state.show_banner("first".to_string(), 2000.0);
    state.show_banner("second".to_string(), 500.0);
    assert_eq!(state.banner().map(|b| b.text.as_str()), Some("second"));
    run_frames(&mut state, 31);
    assert!(state.banner().is_none());
}

#[test]
fn warp_wraps_to_first_level() {
    let mut state = engine(vec![level(1, (2, 2), Vec::new()), level(2, (3, 3), Vec::new())]);
    state.warp_next();
    assert_eq!(state.level_index(), 1);
    state.warp_next();
    assert_eq!(state.level_index(), 0);
    assert_eq!(state.player().grid, GridPos::new(2, 2));
}

#[test]
fn fog_keeps_far_exit_visible_but_hides_other_entities() {
    let mut fogged = level(
        1,
        (1, 1),
        vec![
            Entity::new("exit", 18, 13, EntityKind::Exit),
            Entity::new("ConnectionKey", 18, 1, EntityKind::Key),
            Entity::new("near", 2, 1, EntityKind::Key),
        ],
    );
    fogged.fog_of_war = true;
    let state = engine(vec![fogged]);
    let player = state.player().visual;
    let visible: Vec<&str> = state
        .entities
        .iter()
        .filter(|entity| {
            entity_visible(
                true,
                entity.kind == EntityKind::Exit,
                entity.visibility_radius,
                entity.pos.to_pixels(),
                player,
            )
        })
        .map(|entity| entity.id.as_str())
        .collect();
    assert_eq!(visible, vec!["exit", "near"]);
}

fn scene_with(levels: Vec<Level>) -> QuestScene {
    QuestScene::new(
        levels,
        build_sprite_atlas().expect("builtin sprites"),
        SessionSettings::default(),
        StdRng::seed_from_u64(5),
    )
}

fn tick(scene: &mut QuestScene, input: &InputSnapshot) -> SceneCommand {
    scene.update(FRAME_SECONDS, input)
}

#[test]
fn menu_starts_run_and_escape_aborts_to_menu() {
    let mut scene = scene_with(vec![level(1, (2, 2), Vec::new())]);
    assert_eq!(scene.phase(), ShellPhase::Menu);

    tick(&mut scene, &InputSnapshot::empty().with_action_pressed(InputAction::Brief));
    assert_eq!(scene.phase(), ShellPhase::Brief);
    tick(&mut scene, &InputSnapshot::empty().with_action_pressed(InputAction::Back));
    assert_eq!(scene.phase(), ShellPhase::Menu);

    tick(&mut scene, &InputSnapshot::empty().with_action_pressed(InputAction::Submit));
    assert_eq!(scene.phase(), ShellPhase::Playing);
    assert_eq!(scene.session().map(EngineState::hearts), Some(3));

    tick(&mut scene, &InputSnapshot::empty().with_action_pressed(InputAction::Back));
    assert_eq!(scene.phase(), ShellPhase::Menu);
    assert!(scene.session().is_none());

    let command = tick(&mut scene, &InputSnapshot::empty().with_action_pressed(InputAction::Back));
    assert_eq!(command, SceneCommand::Quit);
}

#[test]
fn reaching_final_exit_routes_to_victory() {
    let mut scene = scene_with(vec![level(
        1,
        (2, 2),
        vec![Entity::new("exit", 3, 2, EntityKind::Exit)],
    )]);
    tick(&mut scene, &InputSnapshot::empty().with_action_pressed(InputAction::Submit));
    for _ in 0..130 {
        tick(&mut scene, &InputSnapshot::empty());
    }
    tick(
        &mut scene,
        &InputSnapshot::empty().with_action_pressed(InputAction::MoveRight),
    );
    assert_eq!(scene.phase(), ShellPhase::Victory);

    tick(&mut scene, &InputSnapshot::empty().with_action_pressed(InputAction::Submit));
    assert_eq!(scene.phase(), ShellPhase::Menu);
}

#[test]
fn typed_text_goes_to_open_quiz() {
    let mut scene = scene_with(vec![level(1, (2, 2), vec![quiz_door("Yes")])]);
    tick(&mut scene, &InputSnapshot::empty().with_action_pressed(InputAction::Submit));
    for _ in 0..130 {
        tick(&mut scene, &InputSnapshot::empty());
    }
    tick(
        &mut scene,
        &InputSnapshot::empty().with_action_pressed(InputAction::MoveRight),
    );
    assert!(scene.session().and_then(EngineState::quiz).is_some());

    tick(&mut scene, &InputSnapshot::empty().with_typed_text("Yes"));
    tick(&mut scene, &InputSnapshot::empty().with_action_pressed(InputAction::Submit));
    let session = scene.session().expect("run in progress");
    assert!(session.quiz().is_none());
    assert_eq!(session.hearts(), 3);
    assert_eq!(scene.phase(), ShellPhase::Playing);
}
