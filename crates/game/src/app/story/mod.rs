use std::time::Duration;

use engine::{MusicDirector, RoomCommand, RoomId, Vec2};
use tracing::debug;

use super::dialogue::{DialogueSequencer, Line, StartOptions};
use super::progress::{ProgressData, ProgressStore, StoryFlag, TunnelSide};

pub(crate) mod boss;
pub(crate) mod cinematic;
pub(crate) mod explore;
pub(crate) mod rooms;
pub(crate) mod script;

pub(crate) use rooms::build_registry;

/// Where the basement tunnel run exits on each side.
const TUNNEL_EXIT_LIBRARY: (RoomId, f32, f32) = (RoomId::Library, 200.0, 650.0);
const TUNNEL_EXIT_CABIN: (RoomId, f32, f32) = (RoomId::Cabin, 640.0, 600.0);

/// Completion token carried through the dialogue sequencer: the effects to
/// apply once the sequence ends.
pub(crate) type EffectList = &'static [Effect];

pub(crate) type StorySequencer = DialogueSequencer<EffectList>;

/// Declarative story side effects. Gate tables and dialogue completions are
/// lists of these; rooms never mutate the progress record directly.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Effect {
    Mark(StoryFlag),
    Objective(&'static str),
    SetTunnelSide(TunnelSide),
    /// Blocking dialogue with no follow-up.
    Say(&'static [Line]),
    /// Dialogue whose completion applies more effects; optionally auto-closed
    /// after the final line so the follow-up cannot stall on input.
    SayThen {
        lines: &'static [Line],
        then: EffectList,
        auto_close_ms: Option<u64>,
    },
    /// Auto-playing dialogue (cinematic mode); input is ignored throughout.
    CinematicThen {
        lines: &'static [Line],
        then: EffectList,
        line_ms: u64,
    },
    /// Room transition through the gateway.
    Go(RoomId, f32, f32),
    /// Tunnel-run completion: exit on the side opposite the recorded entry.
    GoTunnelExit,
    StopMusic,
    ResetProgress,
    /// Machine-level restart into the given room (used by the title screen).
    /// Unlike `Go`, this does not touch the resume pointer.
    HardReset(RoomId, f32, f32),
}

/// Gating predicate over the progress record. Evaluated synchronously inside
/// the owning room's update step.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Requirement {
    Always,
    Flag(StoryFlag),
    NotFlag(StoryFlag),
    AllOf(&'static [Requirement]),
    AnyOf(&'static [Requirement]),
}

impl Requirement {
    pub(crate) fn satisfied(&self, data: &ProgressData) -> bool {
        match self {
            Requirement::Always => true,
            Requirement::Flag(flag) => flag.is_set(data),
            Requirement::NotFlag(flag) => !flag.is_set(data),
            Requirement::AllOf(reqs) => reqs.iter().all(|req| req.satisfied(data)),
            Requirement::AnyOf(reqs) => reqs.iter().any(|req| req.satisfied(data)),
        }
    }
}

/// One branch of a gated exit/interactable: the first rule whose predicate
/// holds runs, the rest are skipped. A final `Always` rule carries the
/// blocking feedback for the locked case.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GateRule {
    pub when: Requirement,
    pub effects: EffectList,
}

pub(crate) fn first_matching_rule<'a>(
    rules: &'a [GateRule],
    data: &ProgressData,
) -> Option<&'a GateRule> {
    rules.iter().find(|rule| rule.when.satisfied(data))
}

/// Fields the external presenter reads each frame.
#[derive(Debug, Default)]
pub(crate) struct HudState {
    pub prompt: Option<String>,
    pub coins: Option<u32>,
}

/// The single-owner context threaded through every room: the authoritative
/// progress record, the one process-wide dialogue sequencer, the music
/// collaborator, and the HUD model.
pub(crate) struct StoryContext {
    pub(crate) progress: ProgressStore,
    pub(crate) dialogue: StorySequencer,
    pub(crate) music: Box<dyn MusicDirector>,
    pub(crate) hud: HudState,
}

impl StoryContext {
    pub(crate) fn new(progress: ProgressStore, music: Box<dyn MusicDirector>) -> Self {
        Self {
            progress,
            dialogue: StorySequencer::default(),
            music,
            hud: HudState::default(),
        }
    }

    /// The only sanctioned way to change rooms: persists the resume pointer
    /// first, then asks the machine to swap, so the target room reads a
    /// consistent pointer during its own enter.
    pub(crate) fn transition(&mut self, room: RoomId, spawn: Vec2) -> RoomCommand {
        self.progress.set_spawn_point(room, spawn);
        RoomCommand::SwitchTo(room, spawn)
    }

    /// Full heal plus a switch back to the persisted resume pointer. Used
    /// when exploration health reaches zero; deliberately does not rewrite
    /// the pointer.
    pub(crate) fn respawn(&mut self) -> RoomCommand {
        self.progress.full_heal();
        let (room, spawn) = self.progress.spawn_point();
        RoomCommand::SwitchTo(room, spawn)
    }

    /// Applies effects in order. A `Go` (or reset) produces the returned
    /// command; effects after it still apply so flag/objective updates are
    /// never lost to ordering.
    pub(crate) fn apply_effects(&mut self, effects: &[Effect]) -> RoomCommand {
        let mut command = RoomCommand::None;
        for effect in effects {
            match *effect {
                Effect::Mark(flag) => self.progress.mark(flag),
                Effect::Objective(text) => self.progress.set_objective(text),
                Effect::SetTunnelSide(side) => self.progress.set_tunnel_side(side),
                Effect::Say(lines) => {
                    if self
                        .dialogue
                        .start(lines, None, StartOptions::default())
                        .is_some()
                    {
                        debug!("dialogue_start_dropped_while_active");
                    }
                }
                Effect::SayThen {
                    lines,
                    then,
                    auto_close_ms,
                } => {
                    let opts = StartOptions {
                        auto_close: auto_close_ms.map(Duration::from_millis),
                    };
                    if self.dialogue.start(lines, Some(then), opts).is_some() {
                        // Drop-don't-queue: a second start while active is a
                        // no-op, follow-up effects included.
                        debug!("dialogue_start_dropped_while_active");
                    }
                }
                Effect::CinematicThen {
                    lines,
                    then,
                    line_ms,
                } => {
                    if self
                        .dialogue
                        .start_cinematic(lines, Some(then), Duration::from_millis(line_ms))
                        .is_some()
                    {
                        debug!("dialogue_start_dropped_while_active");
                    }
                }
                Effect::Go(room, x, y) => {
                    command = self.transition(room, Vec2::new(x, y));
                }
                Effect::GoTunnelExit => {
                    let (room, x, y) = match self.progress.tunnel_side() {
                        TunnelSide::Cabin => TUNNEL_EXIT_LIBRARY,
                        TunnelSide::Library => TUNNEL_EXIT_CABIN,
                    };
                    command = self.transition(room, Vec2::new(x, y));
                }
                Effect::StopMusic => self.music.stop(),
                Effect::ResetProgress => self.progress.reset(),
                Effect::HardReset(room, x, y) => {
                    command = RoomCommand::HardResetTo(room, Vec2::new(x, y));
                }
            }
        }
        command
    }

    /// Confirm press while dialogue is active: advance, applying completion
    /// effects when the sequence ends.
    pub(crate) fn advance_dialogue(&mut self) -> RoomCommand {
        match self.dialogue.advance() {
            Some(effects) => self.apply_effects(effects),
            None => RoomCommand::None,
        }
    }

    /// Per-tick dialogue timers (auto-close, cinematic advance).
    pub(crate) fn tick_dialogue(&mut self, dt: Duration) -> RoomCommand {
        match self.dialogue.tick(dt) {
            Some(effects) => self.apply_effects(effects),
            None => RoomCommand::None,
        }
    }

    pub(crate) fn is_set(&self, flag: StoryFlag) -> bool {
        self.progress.is_set(flag)
    }
}

#[cfg(test)]
pub(crate) fn test_context() -> StoryContext {
    StoryContext::new(ProgressStore::in_memory(), Box::new(engine::NullMusic::default()))
}
