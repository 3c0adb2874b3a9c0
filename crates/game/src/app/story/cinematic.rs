use std::time::Duration;

use engine::{InputAction, InputSnapshot, Room, RoomCommand, RoomId, Vec2};
use tracing::info;

use crate::app::progress::{DEFAULT_SPAWN, DEFAULT_SPAWN_ROOM};
use crate::app::story::script;
use crate::app::story::{Effect, EffectList, StoryContext};

/// A scripted story beat with no player control: music, a short hold, an
/// auto-playing dialogue, then its completion effects (usually a transition).
pub(crate) struct CinematicPlan {
    pub id: RoomId,
    pub music: &'static str,
    pub delay_s: f32,
    pub lines: &'static [crate::app::dialogue::Line],
    pub then: EffectList,
    pub line_ms: u64,
}

pub(crate) struct CinematicRoom {
    plan: &'static CinematicPlan,
    hold: Option<f32>,
}

impl CinematicRoom {
    pub(crate) fn new(plan: &'static CinematicPlan) -> Self {
        Self { plan, hold: None }
    }
}

impl Room<StoryContext> for CinematicRoom {
    fn enter(&mut self, _spawn: Vec2, ctx: &mut StoryContext) {
        ctx.music.play(self.plan.music);
        self.hold = Some(self.plan.delay_s);
        info!(room = self.plan.id.as_str(), "cinematic_entered");
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        _input: &InputSnapshot,
        ctx: &mut StoryContext,
    ) -> RoomCommand {
        ctx.hud.prompt = None;

        if ctx.dialogue.is_active() {
            return ctx.tick_dialogue(Duration::from_secs_f32(fixed_dt_seconds));
        }

        if let Some(hold) = &mut self.hold {
            *hold -= fixed_dt_seconds;
            if *hold <= 0.0 {
                self.hold = None;
                return ctx.apply_effects(&[Effect::CinematicThen {
                    lines: self.plan.lines,
                    then: self.plan.then,
                    line_ms: self.plan.line_ms,
                }]);
            }
        }

        RoomCommand::None
    }

    fn exit(&mut self, _ctx: &mut StoryContext) {
        self.hold = None;
    }
}

const CHASE_BOUNDS: (f32, f32) = (2560.0, 1152.0);
const CHASE_PLAYER_START: Vec2 = Vec2::new(220.0, 960.0);
const CHASE_BEAR_START_X: f32 = 120.0;
const CHASE_FINISH_MARGIN: f32 = 160.0;
const CHASE_CATCH_MARGIN: f32 = 80.0;
const CHASE_BEAR_SPEED: f32 = 84.0;
const CHASE_BEAR_STALL_BONUS: f32 = 72.0;
const CHASE_PLAYER_SPEED: f32 = 120.0;
const CHASE_DEST: (RoomId, f32, f32) = (RoomId::RescueTonyRun, 120.0, 620.0);

/// The bear chase: run right, the bear shadow gains faster when you stall.
/// Getting caught resets the run locally; reaching the far edge moves on.
pub(crate) struct ChaseRoom {
    player: Vec2,
    bear_x: f32,
    intro_hold: Option<f32>,
    pending_reset: bool,
}

impl ChaseRoom {
    pub(crate) fn new() -> Self {
        Self {
            player: CHASE_PLAYER_START,
            bear_x: CHASE_BEAR_START_X,
            intro_hold: None,
            pending_reset: false,
        }
    }

    fn reset_run(&mut self) {
        self.player = CHASE_PLAYER_START;
        self.bear_x = CHASE_BEAR_START_X;
    }
}

impl Room<StoryContext> for ChaseRoom {
    fn enter(&mut self, _spawn: Vec2, ctx: &mut StoryContext) {
        ctx.music.play("rescue_tony");
        self.reset_run();
        self.intro_hold = Some(0.4);
        self.pending_reset = false;
        info!(room = RoomId::BearChase.as_str(), "chase_entered");
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut StoryContext,
    ) -> RoomCommand {
        ctx.hud.prompt = None;

        if ctx.dialogue.is_active() {
            if input.confirm_pressed() {
                ctx.advance_dialogue();
            }
            return ctx.tick_dialogue(Duration::from_secs_f32(fixed_dt_seconds));
        }

        if self.pending_reset {
            self.pending_reset = false;
            self.reset_run();
            return RoomCommand::None;
        }

        if let Some(hold) = &mut self.intro_hold {
            *hold -= fixed_dt_seconds;
            if *hold <= 0.0 {
                self.intro_hold = None;
                return ctx.apply_effects(&[Effect::Say(script::CHASE_INTRO)]);
            }
            return RoomCommand::None;
        }

        // No attacking during the chase; just run.
        let mut dx = 0.0f32;
        let mut dy = 0.0f32;
        if input.is_down(InputAction::MoveLeft) {
            dx -= 1.0;
        }
        if input.is_down(InputAction::MoveRight) {
            dx += 1.0;
        }
        if input.is_down(InputAction::MoveUp) {
            dy -= 1.0;
        }
        if input.is_down(InputAction::MoveDown) {
            dy += 1.0;
        }
        self.player.x =
            (self.player.x + dx * CHASE_PLAYER_SPEED * fixed_dt_seconds).clamp(0.0, CHASE_BOUNDS.0);
        self.player.y = (self.player.y + dy * CHASE_PLAYER_SPEED * fixed_dt_seconds)
            .clamp(820.0, CHASE_BOUNDS.1 - 40.0);

        // The bear gains ground; stalling makes it gain faster.
        let stall = 1.0 - dx.abs().min(1.0);
        self.bear_x += (CHASE_BEAR_SPEED + stall * CHASE_BEAR_STALL_BONUS) * fixed_dt_seconds;

        if self.bear_x > self.player.x - CHASE_CATCH_MARGIN {
            self.pending_reset = true;
            return ctx.apply_effects(&[Effect::Say(script::CHASE_CAUGHT)]);
        }

        if self.player.x > CHASE_BOUNDS.0 - CHASE_FINISH_MARGIN {
            let (room, x, y) = CHASE_DEST;
            return ctx.transition(room, Vec2::new(x, y));
        }

        RoomCommand::None
    }

    fn exit(&mut self, _ctx: &mut StoryContext) {}
}

const TITLE_PROMPT: &str = "E: comenzar / continuar  |  Enter: reiniciar partida";

/// Title screen: continue from the resume pointer, or wipe the save.
pub(crate) struct TitleRoom;

impl Room<StoryContext> for TitleRoom {
    fn enter(&mut self, _spawn: Vec2, ctx: &mut StoryContext) {
        ctx.music.play("title_screen");
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut StoryContext,
    ) -> RoomCommand {
        ctx.hud.prompt = Some(TITLE_PROMPT.to_string());

        if ctx.dialogue.is_active() {
            if input.confirm_pressed() {
                ctx.advance_dialogue();
            }
            return ctx.tick_dialogue(Duration::from_secs_f32(fixed_dt_seconds));
        }

        if input.menu_pressed() {
            return ctx.apply_effects(&[
                Effect::ResetProgress,
                Effect::StopMusic,
                Effect::Say(script::RESET_DONE),
                Effect::HardReset(RoomId::Title, 640.0, 360.0),
            ]);
        }

        if input.confirm_pressed() {
            let (room, spawn) = ctx.progress.spawn_point();
            let (room, spawn) = if room == RoomId::Title {
                (DEFAULT_SPAWN_ROOM, DEFAULT_SPAWN)
            } else {
                (room, spawn)
            };
            return ctx.transition(room, spawn);
        }

        RoomCommand::None
    }

    fn exit(&mut self, ctx: &mut StoryContext) {
        ctx.hud.prompt = None;
    }
}
