use engine::Rgba8;
use rand::Rng;

use super::entity::{DoorLock, EnemyBehavior, EnemyDef, Entity, EntityKind, GridPos};
use super::levels::{Level, WallMap};

pub(crate) const FINALE_NPC_ID: &str = "Madame Spice";
pub(crate) const FINALE_DIALOGUE: [&str; 6] = [
    "Madame Spice: Harvey, you made it...",
    "Madame Spice: You found me.",
    "Harvey: I would search every universe for you.",
    "Madame Spice: I knew you would.",
    "Madame Spice: I love you, my Desi Firangan.",
    "Madame Spice: Happy Valentine's Day! <3",
];

pub(crate) const STORY_BRIEF: &str = "\
TOP SECRET: DESI FIRANGAN'S FILE
--------------------------------
SUBJECT: Harvey (aka Desi Firangan)
TARGET: Shruti (aka Madame Spice)
MISSION DURATION: 992 Days (and counting)

MISSION:
Navigate the complexities of your relationship.
Beware: The challenges are now ACTIVE.
Doubt will chase you.
Gym Bros will block you.
The Argument will confuse you.

Good luck, Desi Prince.";

const TRAP_COUNT: usize = 10;
const GRID_WIDTH: i32 = 20;
const GRID_HEIGHT: i32 = 15;

/// Builds the ten shipped levels. The minefield layout is rolled from
/// `rng` once per catalog, so every playthrough of a session shares it.
pub(crate) fn build_catalog<R: Rng>(rng: &mut R) -> Vec<Level> {
    vec![
        glitch_level(),
        pineapple_level(),
        doubts_level(),
        gym_level(),
        show_quiz_level(),
        long_distance_level(),
        minefield_level(rng),
        argument_level(),
        promise_level(),
        cappadocia_level(),
    ]
}

pub(crate) const fn rgb(hex: u32) -> Rgba8 {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255]
}

fn base_level(id: u32, name: &str, background: u32, start: (i32, i32), walls: WallMap) -> Level {
    Level {
        id,
        name: name.to_string(),
        walls,
        entities: Vec::new(),
        start: GridPos::new(start.0, start.1),
        background: rgb(background),
        fog_of_war: false,
        chaos_mode: false,
        balloons: false,
    }
}

fn room() -> WallMap {
    WallMap::room(GRID_WIDTH, GRID_HEIGHT)
}

fn exit(x: i32, y: i32) -> Entity {
    Entity::new("exit", x, y, EntityKind::Exit)
}

fn npc(id: &str, x: i32, y: i32, lines: &[&str]) -> Entity {
    Entity::new(
        id,
        x,
        y,
        EntityKind::Npc {
            lines: lines.iter().map(|line| line.to_string()).collect(),
        },
    )
}

fn quiz_door(id: &str, x: i32, y: i32, question: &str, answer: &str) -> Entity {
    Entity::new(
        id,
        x,
        y,
        EntityKind::Door {
            locked: true,
            lock: DoorLock::Quiz {
                question: question.to_string(),
                answer: answer.to_string(),
            },
        },
    )
}

fn enemy(id: &str, x: i32, y: i32, sprite: &str, def: EnemyDef) -> Entity {
    Entity::new(id, x, y, EntityKind::Enemy(def)).with_sprite(sprite)
}

fn glitch_level() -> Level {
    let mut walls = room();
    for row in [2, 4, 6, 10] {
        for x in (2..18).step_by(2) {
            walls.set(x, row, true);
        }
    }
    walls.set(10, 8, true);
    walls.set(11, 8, true);

    let mut level = base_level(1, "Lvl 1: Glitch in the Matrix", 0x111111, (2, 3), walls);
    level.fog_of_war = true;
    level.entities = vec![
        exit(18, 13),
        npc(
            "npc_stranger",
            2,
            1,
            &[
                "Stranger: ASL?",
                "It's dangerous to go alone.",
                "Avoid the glitches!",
            ],
        ),
        Entity::new("ConnectionKey", 18, 1, EntityKind::Key),
        Entity::new(
            "ChatRoom",
            10,
            8,
            EntityKind::Door {
                locked: true,
                lock: DoorLock::Item {
                    required: "ConnectionKey".to_string(),
                },
            },
        ),
        enemy(
            "glitch1",
            8,
            3,
            "enemy_glitch",
            EnemyDef::new(EnemyBehavior::Wander).speed(0.05),
        ),
        enemy(
            "glitch2",
            14,
            5,
            "enemy_glitch",
            EnemyDef::new(EnemyBehavior::Wander).speed(0.05),
        ),
        enemy(
            "glitch3",
            5,
            12,
            "enemy_glitch",
            EnemyDef::new(EnemyBehavior::Wander).speed(0.08),
        ),
    ];
    level
}

fn pineapple_level() -> Level {
    let mut level = base_level(2, "Lvl 2: The Pineapple Wars", 0x442200, (2, 12), room());
    level.entities = vec![
        exit(18, 2),
        npc(
            "npc_chef",
            2,
            10,
            &[
                "The Italian Police are patrolling!",
                "Get the pineapple to the oven!",
            ],
        ),
        quiz_door(
            "door_pizza",
            15,
            7,
            "Does pineapple belong on pizza? (Yes/No)",
            "Yes",
        ),
        enemy(
            "police1",
            6,
            5,
            "enemy_gymbro",
            EnemyDef::new(EnemyBehavior::PatrolHorizontal)
                .patrol_range(5.0)
                .speed(0.1)
                .dir(1.0),
        ),
        enemy(
            "police2",
            12,
            9,
            "enemy_gymbro",
            EnemyDef::new(EnemyBehavior::PatrolHorizontal)
                .patrol_range(5.0)
                .speed(0.15)
                .dir(-1.0),
        ),
        Entity::new("pineapple", 2, 2, EntityKind::Collectible).with_sprite("pineapple"),
    ];
    level
}

fn doubts_level() -> Level {
    let mut level = base_level(3, "Lvl 3: Chasing Doubts", 0x222244, (2, 2), room());
    level.entities = vec![
        exit(18, 13),
        npc(
            "npc_doubt",
            5,
            2,
            &[
                "They are coming for you...",
                "Don't let the Doubt catch you!",
            ],
        ),
        Entity::new("fake_wall1", 10, 10, EntityKind::FakeWall),
        quiz_door(
            "door_worth",
            16,
            4,
            "Are you capable enough for her?",
            "Yes",
        ),
        enemy(
            "doubt1",
            15,
            10,
            "enemy_ghost",
            EnemyDef::new(EnemyBehavior::Chase).speed(0.035),
        ),
        enemy(
            "doubt2",
            10,
            10,
            "enemy_ghost",
            EnemyDef::new(EnemyBehavior::Chase).speed(0.03),
        ),
    ];
    level
}

fn gym_level() -> Level {
    let mut walls = room();
    walls.set(5, 5, true);
    walls.set(14, 5, true);

    let mut level = base_level(4, "Lvl 4: Gym Bro Patrol", 0x333333, (2, 7), walls);
    level.entities = vec![
        exit(18, 7),
        Entity::new("w1", 9, 5, EntityKind::Obstacle { color: None }).with_sprite("weight"),
        Entity::new("w2", 11, 5, EntityKind::Obstacle { color: None }).with_sprite("weight"),
        npc(
            "npc_bro",
            2,
            5,
            &["Re-rack your weights!", "Watch out for the Gym Bros!"],
        ),
        enemy(
            "bro1",
            8,
            2,
            "enemy_gymbro",
            EnemyDef::new(EnemyBehavior::PatrolVertical)
                .patrol_range(10.0)
                .speed(0.15)
                .dir(1.0),
        ),
        enemy(
            "bro2",
            12,
            12,
            "enemy_gymbro",
            EnemyDef::new(EnemyBehavior::PatrolVertical)
                .patrol_range(10.0)
                .speed(0.15)
                .dir(-1.0),
        ),
    ];
    level
}

fn show_quiz_level() -> Level {
    let mut level = base_level(5, "Lvl 5: The Show Quiz", 0x1a051a, (2, 2), room());
    level.entities = vec![
        exit(18, 13),
        quiz_door(
            "door_show",
            10,
            8,
            "Finish the title: 'Nobody Wants ____'",
            "This",
        ),
        quiz_door(
            "door_show2",
            14,
            10,
            "Where is the Man? (Hint: On the ____)",
            "Inside",
        ),
        enemy(
            "ghost1",
            10,
            2,
            "enemy_ghost",
            EnemyDef::new(EnemyBehavior::Wander).speed(0.05),
        ),
    ];
    level
}

fn long_distance_level() -> Level {
    let mut walls = room();
    for y in 2..13 {
        walls.set(6, y, true);
        walls.set(13, y, true);
    }
    walls.set(6, 12, false);
    walls.set(13, 2, false);

    let mut level = base_level(6, "Lvl 6: Long Distance Lag", 0x000033, (2, 7), walls);
    level.entities = vec![
        exit(18, 7),
        npc(
            "npc_time",
            2,
            6,
            &["Lag Spikes incoming!", "Time the gaps carefully."],
        ),
        enemy(
            "lag1",
            8,
            3,
            "enemy_glitch",
            EnemyDef::new(EnemyBehavior::PatrolVertical)
                .patrol_range(10.0)
                .speed(0.3)
                .dir(1.0),
        ),
        enemy(
            "lag2",
            11,
            11,
            "enemy_glitch",
            EnemyDef::new(EnemyBehavior::PatrolVertical)
                .patrol_range(10.0)
                .speed(0.3)
                .dir(-1.0),
        ),
    ];
    level
}

fn minefield_level<R: Rng>(rng: &mut R) -> Level {
    let mut level = base_level(7, "Lvl 7: Spicy Minefield", 0x330000, (2, 2), room());
    level.entities = vec![
        exit(18, 13),
        npc(
            "npc_spice",
            4,
            4,
            &["Hidden Traps everywhere!", "Tread lightly."],
        ),
    ];
    for index in 0..TRAP_COUNT {
        let x = rng.gen_range(5..15);
        let y = rng.gen_range(3..13);
        level
            .entities
            .push(Entity::new(&format!("trap_{index}"), x, y, EntityKind::Trap));
    }
    level
        .entities
        .push(Entity::new("Biryani", 18, 2, EntityKind::Collectible).with_sprite("pineapple"));
    level
}

fn argument_level() -> Level {
    let mut walls = room();
    for x in (2..18).step_by(3) {
        for y in (2..13).step_by(3) {
            walls.set(x, y, true);
        }
    }

    let mut level = base_level(8, "Lvl 8: The Argument", 0x220000, (10, 7), walls);
    level.chaos_mode = true;
    level.entities = vec![
        exit(18, 13),
        npc(
            "npc_sad",
            10,
            10,
            &["I'm so confused...", "The controls keep changing!"],
        ),
        enemy(
            "regret",
            2,
            2,
            "enemy_ghost",
            EnemyDef::new(EnemyBehavior::Chase).speed(0.02),
        ),
    ];
    level
}

fn promise_level() -> Level {
    let mut level = base_level(9, "Lvl 9: The Promise", 0x440044, (2, 12), room());
    level.entities = vec![
        exit(18, 2),
        npc(
            "npc_dance",
            5,
            12,
            &["Almost there...", "Don't forget the dance."],
        ),
        quiz_door(
            "door_wedding",
            16,
            4,
            "Which movie is the dance from?",
            "Love Actually",
        ),
    ];
    level
}

fn cappadocia_level() -> Level {
    let mut level = base_level(10, "Lvl 10: Cappadocia", 0x87ceeb, (10, 13), room());
    level.balloons = true;
    level.entities = vec![
        exit(10, 2),
        Entity::new("balloon1", 4, 10, EntityKind::Collectible).with_sprite("balloon"),
        Entity::new("balloon2", 16, 10, EntityKind::Collectible).with_sprite("balloon"),
        npc("npc_final", 10, 11, &["You made it!", "Go to her."]),
        npc(
            FINALE_NPC_ID,
            10,
            4,
            &["I love you Harvey.", "Happy Valentine's Day."],
        )
        .with_sprite("madame_spice"),
    ];
    level
}
