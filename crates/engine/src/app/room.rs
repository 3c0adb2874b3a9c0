use std::collections::HashMap;

use thiserror::Error;
use tracing::info;

use super::input::InputSnapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

/// Every room the game can activate. The set is closed at compile time; the
/// registry handed to [`RoomMachine`] is expected to cover all ids it will
/// ever be asked to switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomId {
    Title,
    Cabin,
    Overworld,
    NorthForest,
    SouthForest,
    EastForest,
    WestForest,
    Library,
    Tunnel,
    TunnelRun,
    Gym,
    AnimalRescue,
    PlatformTrial,
    PlatformBonus,
    BearChase,
    RescueTonyRun,
    TonyCage,
    BearBoss,
    FinalCapture,
    RescueJuneRun,
    FinalInside,
    FinalBoss,
    ShadowHealing,
    VillageCelebration,
    BossArena,
}

impl RoomId {
    pub const ALL: [RoomId; 25] = [
        RoomId::Title,
        RoomId::Cabin,
        RoomId::Overworld,
        RoomId::NorthForest,
        RoomId::SouthForest,
        RoomId::EastForest,
        RoomId::WestForest,
        RoomId::Library,
        RoomId::Tunnel,
        RoomId::TunnelRun,
        RoomId::Gym,
        RoomId::AnimalRescue,
        RoomId::PlatformTrial,
        RoomId::PlatformBonus,
        RoomId::BearChase,
        RoomId::RescueTonyRun,
        RoomId::TonyCage,
        RoomId::BearBoss,
        RoomId::FinalCapture,
        RoomId::RescueJuneRun,
        RoomId::FinalInside,
        RoomId::FinalBoss,
        RoomId::ShadowHealing,
        RoomId::VillageCelebration,
        RoomId::BossArena,
    ];

    /// Stable token used by the persisted resume pointer.
    pub fn as_str(self) -> &'static str {
        match self {
            RoomId::Title => "title",
            RoomId::Cabin => "cabin",
            RoomId::Overworld => "overworld",
            RoomId::NorthForest => "north_forest",
            RoomId::SouthForest => "south_forest",
            RoomId::EastForest => "east_forest",
            RoomId::WestForest => "west_forest",
            RoomId::Library => "library",
            RoomId::Tunnel => "tunnel",
            RoomId::TunnelRun => "tunnel_run",
            RoomId::Gym => "gym",
            RoomId::AnimalRescue => "animal_rescue",
            RoomId::PlatformTrial => "platform_trial",
            RoomId::PlatformBonus => "platform_bonus",
            RoomId::BearChase => "bear_chase",
            RoomId::RescueTonyRun => "rescue_tony_run",
            RoomId::TonyCage => "tony_cage",
            RoomId::BearBoss => "bear_boss",
            RoomId::FinalCapture => "final_capture",
            RoomId::RescueJuneRun => "rescue_june_run",
            RoomId::FinalInside => "final_inside",
            RoomId::FinalBoss => "final_boss",
            RoomId::ShadowHealing => "shadow_healing",
            RoomId::VillageCelebration => "village_celebration",
            RoomId::BossArena => "boss_arena",
        }
    }

    /// Parses a persisted token. Returns `None` for ids this build no longer
    /// knows, so a stale save degrades instead of panicking.
    pub fn parse(token: &str) -> Option<RoomId> {
        RoomId::ALL.into_iter().find(|id| id.as_str() == token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoomCommand {
    None,
    SwitchTo(RoomId, Vec2),
    HardResetTo(RoomId, Vec2),
}

/// Tilemap origin convention:
/// - `origin` is the world position of tile (0,0) top-left corner.
/// - Tile (x,y) spans `origin + (x*size, y*size)` to `origin + ((x+1)*size, (y+1)*size)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    origin: Vec2,
    tiles: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
}

impl Tilemap {
    pub fn new(
        width: u32,
        height: u32,
        origin: Vec2,
        tiles: Vec<u16>,
    ) -> Result<Self, TilemapError> {
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            origin,
            tiles,
        })
    }

    pub fn filled(width: u32, height: u32, origin: Vec2, fill: u16) -> Self {
        Self {
            width,
            height,
            origin,
            tiles: vec![fill; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<u16> {
        self.index_of(x, y)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Overwrites one tile; returns false when out of bounds.
    pub fn set_tile(&mut self, x: u32, y: u32, tile: u16) -> bool {
        match self.index_of(x, y) {
            Some(index) => {
                self.tiles[index] = tile;
                true
            }
            None => false,
        }
    }
}

/// One discrete play area. Rooms rebuild their local state on every
/// activation from the injected context; nothing survives `exit` except what
/// the context persists.
pub trait Room<C> {
    fn enter(&mut self, spawn: Vec2, ctx: &mut C);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot, ctx: &mut C)
        -> RoomCommand;
    fn exit(&mut self, ctx: &mut C);
    fn debug_title(&self, _ctx: &C) -> Option<String> {
        None
    }
}

/// Registry of rooms plus the single active one. Switching always exits the
/// current room and re-enters the target with the requested spawn point.
pub struct RoomMachine<C> {
    rooms: HashMap<RoomId, Box<dyn Room<C>>>,
    active: RoomId,
}

impl<C> RoomMachine<C> {
    pub fn new(first_room: RoomId) -> Self {
        Self {
            rooms: HashMap::new(),
            active: first_room,
        }
    }

    pub fn register(&mut self, id: RoomId, room: Box<dyn Room<C>>) {
        self.rooms.insert(id, room);
    }

    pub fn is_registered(&self, id: RoomId) -> bool {
        self.rooms.contains_key(&id)
    }

    pub fn active(&self) -> RoomId {
        self.active
    }

    pub fn enter_active(&mut self, spawn: Vec2, ctx: &mut C) {
        let active = self.active;
        self.room_mut(active).enter(spawn, ctx);
    }

    pub fn update_active(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut C,
    ) -> RoomCommand {
        let active = self.active;
        self.room_mut(active).update(fixed_dt_seconds, input, ctx)
    }

    pub fn debug_title_active(&self, ctx: &C) -> Option<String> {
        self.rooms.get(&self.active)?.debug_title(ctx)
    }

    /// Applies a command from the active room. Returns true when the active
    /// room changed (or was hard-reset in place).
    pub fn apply(&mut self, command: RoomCommand, ctx: &mut C) -> bool {
        match command {
            RoomCommand::None => false,
            RoomCommand::SwitchTo(next, spawn) => {
                self.switch_to(next, spawn, ctx);
                true
            }
            RoomCommand::HardResetTo(next, spawn) => {
                info!(room = next.as_str(), "room_hard_reset");
                self.switch_to(next, spawn, ctx);
                true
            }
        }
    }

    fn switch_to(&mut self, next: RoomId, spawn: Vec2, ctx: &mut C) {
        let previous = self.active;
        self.room_mut(previous).exit(ctx);
        self.active = next;
        self.room_mut(next).enter(spawn, ctx);
        info!(
            from = previous.as_str(),
            to = next.as_str(),
            spawn_x = spawn.x,
            spawn_y = spawn.y,
            "room_switched"
        );
    }

    pub fn shutdown(&mut self, ctx: &mut C) {
        let active = self.active;
        self.room_mut(active).exit(ctx);
    }

    fn room_mut(&mut self, id: RoomId) -> &mut Box<dyn Room<C>> {
        // A missing entry is a wiring bug in the startup registry, not a
        // runtime condition (the id space is a closed enum).
        self.rooms
            .get_mut(&id)
            .unwrap_or_else(|| panic!("room '{}' is not registered", id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Trace {
        events: Vec<String>,
    }

    struct RecordingRoom {
        name: &'static str,
        next: Option<(RoomId, Vec2)>,
    }

    impl Room<Trace> for RecordingRoom {
        fn enter(&mut self, spawn: Vec2, ctx: &mut Trace) {
            ctx.events
                .push(format!("enter {} at {},{}", self.name, spawn.x, spawn.y));
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            _input: &InputSnapshot,
            _ctx: &mut Trace,
        ) -> RoomCommand {
            match self.next.take() {
                Some((room, spawn)) => RoomCommand::SwitchTo(room, spawn),
                None => RoomCommand::None,
            }
        }

        fn exit(&mut self, ctx: &mut Trace) {
            ctx.events.push(format!("exit {}", self.name));
        }
    }

    fn machine_with_pair() -> (RoomMachine<Trace>, Trace) {
        let mut machine = RoomMachine::new(RoomId::Cabin);
        machine.register(
            RoomId::Cabin,
            Box::new(RecordingRoom {
                name: "cabin",
                next: Some((RoomId::Overworld, Vec2::new(640.0, 820.0))),
            }),
        );
        machine.register(
            RoomId::Overworld,
            Box::new(RecordingRoom {
                name: "overworld",
                next: None,
            }),
        );
        (machine, Trace::default())
    }

    #[test]
    fn switch_exits_then_enters_with_spawn() {
        let (mut machine, mut trace) = machine_with_pair();
        machine.enter_active(Vec2::new(640.0, 360.0), &mut trace);

        let command = machine.update_active(1.0 / 60.0, &InputSnapshot::empty(), &mut trace);
        let switched = machine.apply(command, &mut trace);

        assert!(switched);
        assert_eq!(machine.active(), RoomId::Overworld);
        assert_eq!(
            trace.events,
            vec![
                "enter cabin at 640,360",
                "exit cabin",
                "enter overworld at 640,820",
            ]
        );
    }

    #[test]
    fn none_command_does_not_switch() {
        let (mut machine, mut trace) = machine_with_pair();
        machine.enter_active(Vec2::default(), &mut trace);
        assert!(!machine.apply(RoomCommand::None, &mut trace));
        assert_eq!(machine.active(), RoomId::Cabin);
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn switching_to_unregistered_room_panics() {
        let (mut machine, mut trace) = machine_with_pair();
        machine.enter_active(Vec2::default(), &mut trace);
        machine.apply(
            RoomCommand::SwitchTo(RoomId::FinalBoss, Vec2::default()),
            &mut trace,
        );
    }

    #[test]
    fn room_id_tokens_round_trip() {
        for id in RoomId::ALL {
            assert_eq!(RoomId::parse(id.as_str()), Some(id));
        }
        assert_eq!(RoomId::parse("no_such_room"), None);
    }

    #[test]
    fn tilemap_new_rejects_invalid_tile_count() {
        let err = Tilemap::new(2, 2, Vec2::default(), vec![0, 1, 2]).expect_err("err");
        assert_eq!(
            err,
            TilemapError::TileCountMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn tilemap_set_tile_respects_bounds() {
        let mut tilemap = Tilemap::filled(2, 2, Vec2::default(), 0);
        assert!(tilemap.set_tile(1, 1, 7));
        assert_eq!(tilemap.tile_at(1, 1), Some(7));
        assert!(!tilemap.set_tile(2, 0, 7));
        assert_eq!(tilemap.tile_at(2, 0), None);
    }
}
