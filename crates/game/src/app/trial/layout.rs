//! Authored layouts for the five side-scrolling trial rooms. The engine in
//! the parent module is shared; everything distinct about a run lives here.

use engine::RoomId;

use crate::app::progress::{ProgressData, StoryFlag};
use crate::app::story::explore::IntroDef;
use crate::app::story::script;
use crate::app::story::{Effect, Requirement};

use super::{GoalDef, LevelBuilder, PickupDef, QuestionPayout, TrialPlan, WarpDef};

fn trial_music(data: &ProgressData) -> &'static str {
    if data.winter_blessing {
        "silent_night"
    } else if data.has_key_relic {
        "4"
    } else if data.met_gabi {
        "1"
    } else {
        "0"
    }
}

fn tony_run_music(_data: &ProgressData) -> &'static str {
    "rescue_tony"
}

fn june_run_music(_data: &ProgressData) -> &'static str {
    "rescue_june"
}

// --- The platform trial (east forest portal) ---

fn build_platform_trial(b: &mut LevelBuilder) {
    // Base ground with three authored gaps.
    b.ground_row(
        14,
        &[30, 31, 66, 67, 68, 186, 187, 188, 189],
    );

    // Section 1: question + brick cluster.
    b.brick(15, 10);
    b.question(16, 10, QuestionPayout::PowerUp);
    b.brick(17, 10);
    b.brick(22, 9);
    b.brick(23, 9);
    b.brick(24, 9);

    // Section 2: warp pipe pair with a coin arc over it.
    b.pipe(50, 12, 3);
    b.pipe(51, 12, 3);
    b.coin(48, 9);
    b.coin(49, 8);
    b.coin(50, 8);
    b.coin(51, 8);
    b.coin(52, 9);

    // Section 3: stair-step blocks.
    b.stone(90, 13);
    b.stone(91, 12);
    b.stone(91, 13);
    b.stone(92, 11);
    b.stone(92, 12);
    b.stone(92, 13);
    b.stone(93, 10);
    b.stone(93, 11);
    b.stone(93, 12);
    b.stone(93, 13);

    b.brick(101, 10);
    b.question(102, 10, QuestionPayout::Coin);
    b.brick(103, 10);

    // Pipe pair, coins between them.
    b.pipe(126, 13, 2);
    b.pipe(127, 13, 2);
    b.pipe(136, 11, 4);
    b.pipe(137, 11, 4);
    for x in [130, 131, 132, 133] {
        b.coin(x, 9);
    }

    // Section 4: reward brick ceiling with a coin block in the middle.
    for x in 160..=168 {
        if x != 164 {
            b.brick(x, 8);
        }
    }
    b.question(164, 8, QuestionPayout::Coin);

    // Landing pad after the final gap, then a boundary wall. The end area
    // stays flat so a player who missed the pipe key can still run back.
    b.stone(190, 13);
    b.stone(191, 13);
    b.wall_column(219);

    for (x, dir) in [
        (20, -1.0),
        (46, -1.0),
        (110, -1.0),
        (118, -1.0),
        (156, -1.0),
        (164, -1.0),
        (172, -1.0),
    ] {
        b.walker(x, 13, dir);
    }
}

pub(crate) static PLATFORM_TRIAL: TrialPlan = TrialPlan {
    id: RoomId::PlatformTrial,
    tiles: (220, 15),
    entry_tile: (2, 13),
    build: build_platform_trial,
    goal: Some(GoalDef {
        tile: (214, 13),
        requires: Requirement::Flag(StoryFlag::PlatformCaveKeyFound),
        locked: &[Effect::Say(script::TRIAL_NEED_KEY)],
        complete: &[
            Effect::Mark(StoryFlag::PlatformTrialComplete),
            Effect::Objective(script::OBJ_BACK_TO_GYM),
            Effect::SayThen {
                lines: script::TRIAL_COMPLETE,
                then: &[Effect::Go(RoomId::EastForest, 980.0, 420.0)],
                auto_close_ms: Some(2800),
            },
        ],
    }),
    warp: Some(WarpDef {
        x_tiles: (50, 51),
        top_y: 12,
        to: (RoomId::PlatformBonus, 80.0, 200.0),
    }),
    pickups: &[],
    intros: &[IntroDef {
        when: Requirement::NotFlag(StoryFlag::PlatformTrialComplete),
        delay_s: 0.25,
        effects: &[Effect::Say(script::TRIAL_INTRO)],
    }],
    music: trial_music,
};

// --- The pipe bonus cave under the trial ---

fn build_platform_bonus(b: &mut LevelBuilder) {
    b.ground_row(14, &[]);
    b.wall_column(0);
    b.wall_column(59);

    // Exit pipe back up to the trial.
    b.pipe(8, 12, 2);
    b.pipe(9, 12, 2);

    // Ledges with coin rows.
    b.stone(16, 11);
    b.stone(17, 11);
    b.stone(24, 9);
    b.stone(25, 9);
    b.stone(32, 11);
    b.stone(33, 11);
    b.coin(16, 10);
    b.coin(17, 10);
    b.coin(24, 8);
    b.coin(25, 8);
    b.coin(32, 10);
    b.coin(33, 10);
    b.coin(44, 13);
    b.coin(45, 13);

    b.walker(28, 13, -1.0);
    b.walker(48, 13, -1.0);
}

pub(crate) static PLATFORM_BONUS: TrialPlan = TrialPlan {
    id: RoomId::PlatformBonus,
    tiles: (60, 15),
    entry_tile: (5, 13),
    build: build_platform_bonus,
    goal: None,
    warp: Some(WarpDef {
        x_tiles: (8, 9),
        top_y: 12,
        to: (RoomId::PlatformTrial, 1160.0, 192.0),
    }),
    pickups: &[
        PickupDef {
            id: "cave-note",
            tile: (38, 13),
            present: Requirement::NotFlag(StoryFlag::PlatformCaveNoteRead),
            effects: &[
                Effect::Mark(StoryFlag::PlatformCaveNoteRead),
                Effect::Objective(script::OBJ_CAVE_NOTE),
                Effect::Say(script::CAVE_NOTE),
            ],
        },
        PickupDef {
            id: "cave-key",
            tile: (54, 13),
            present: Requirement::NotFlag(StoryFlag::PlatformCaveKeyFound),
            effects: &[
                Effect::Mark(StoryFlag::PlatformCaveKeyFound),
                Effect::Objective(script::OBJ_CAVE_KEY),
                Effect::Say(script::CAVE_KEY_TAKEN),
            ],
        },
    ],
    intros: &[],
    music: trial_music,
};

// --- The basement tunnel run (cabin <-> library) ---

fn build_tunnel_run(b: &mut LevelBuilder) {
    b.ground_row(14, &[25, 26, 55, 56, 57, 90, 91, 115, 116, 117]);
    b.wall_column(0);
    b.wall_column(139);

    // Bridge over the widest gap.
    b.stone(55, 10);
    b.stone(56, 10);
    b.stone(57, 10);

    // Spikes on a narrow ridge; jump or burn.
    b.hazard(70, 13);
    b.hazard(71, 13);

    for (x, y) in [(30, 12), (31, 12), (56, 8), (60, 12), (100, 12), (101, 12)] {
        b.coin(x, y);
    }

    for x in [35, 65, 95, 120] {
        b.walker(x, 13, -1.0);
    }
}

pub(crate) static TUNNEL_RUN: TrialPlan = TrialPlan {
    id: RoomId::TunnelRun,
    tiles: (140, 15),
    entry_tile: (2, 13),
    build: build_tunnel_run,
    goal: Some(GoalDef {
        tile: (134, 13),
        requires: Requirement::Always,
        locked: &[],
        complete: &[Effect::GoTunnelExit],
    }),
    warp: None,
    pickups: &[],
    intros: &[IntroDef {
        when: Requirement::NotFlag(StoryFlag::TunnelDiscovered),
        delay_s: 0.25,
        effects: &[
            Effect::Mark(StoryFlag::TunnelDiscovered),
            Effect::Say(script::TUNNEL_DISCOVERY),
        ],
    }],
    music: trial_music,
};

// --- The rescue-Tony run (west woods cave) ---

fn build_rescue_tony_run(b: &mut LevelBuilder) {
    b.ground_row(14, &[30, 31, 50, 51, 52, 80, 81, 110, 111, 112, 135, 136]);
    b.wall_column(0);
    b.wall_column(159);

    // High road over the triple gap.
    b.stone(50, 10);
    b.stone(51, 10);
    b.stone(52, 10);

    for (x, y) in [(20, 12), (45, 9), (51, 8), (90, 12), (130, 12)] {
        b.coin(x, y);
    }

    for x in [40, 70, 100, 125] {
        b.walker(x, 13, -1.0);
    }
}

pub(crate) static RESCUE_TONY_RUN: TrialPlan = TrialPlan {
    id: RoomId::RescueTonyRun,
    tiles: (160, 15),
    entry_tile: (2, 13),
    build: build_rescue_tony_run,
    goal: Some(GoalDef {
        tile: (154, 13),
        requires: Requirement::Always,
        locked: &[],
        complete: &[
            Effect::Mark(StoryFlag::RescueTonyRunComplete),
            Effect::Go(RoomId::TonyCage, 320.0, 520.0),
        ],
    }),
    warp: None,
    pickups: &[],
    intros: &[IntroDef {
        when: Requirement::Always,
        delay_s: 0.25,
        effects: &[Effect::Objective(script::OBJ_TONY_RUN)],
    }],
    music: tony_run_music,
};

// --- The rescue-June run (played as Tony, final act) ---

fn build_rescue_june_run(b: &mut LevelBuilder) {
    b.ground_row(14, &[28, 29, 58, 59, 60, 88, 89, 118, 119, 120]);
    b.wall_column(0);
    b.wall_column(159);

    b.stone(58, 10);
    b.stone(59, 10);
    b.stone(60, 10);

    b.hazard(75, 13);
    b.hazard(76, 13);

    for (x, y) in [(22, 12), (59, 8), (95, 12), (126, 12), (127, 12)] {
        b.coin(x, y);
    }

    for x in [38, 68, 98, 128] {
        b.walker(x, 13, -1.0);
    }
}

pub(crate) static RESCUE_JUNE_RUN: TrialPlan = TrialPlan {
    id: RoomId::RescueJuneRun,
    tiles: (160, 15),
    entry_tile: (2, 13),
    build: build_rescue_june_run,
    goal: Some(GoalDef {
        tile: (154, 13),
        requires: Requirement::Always,
        locked: &[],
        complete: &[
            Effect::Mark(StoryFlag::RescueJuneRunComplete),
            Effect::Go(RoomId::FinalInside, 220.0, 560.0),
        ],
    }),
    warp: None,
    pickups: &[],
    intros: &[IntroDef {
        when: Requirement::Always,
        delay_s: 0.25,
        effects: &[Effect::Objective(script::OBJ_JUNE_RUN)],
    }],
    music: june_run_music,
};
