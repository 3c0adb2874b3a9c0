use std::collections::HashMap;
use std::time::Duration;

use engine::{InputAction, InputSnapshot, Room, RoomCommand, RoomId, Tilemap, Vec2};
use tracing::{debug, info};

use crate::app::progress::ProgressData;
use crate::app::story::explore::IntroDef;
use crate::app::story::{EffectList, Requirement, StoryContext};

pub(crate) mod layout;

pub(crate) const TILE: f32 = 16.0;
const GRAVITY: f32 = 1200.0;
const MAX_FALL_SPEED: f32 = 880.0;
const RUN_SPEED: f32 = 220.0;
const JUMP_VELOCITY: f32 = -420.0;
const STOMP_MIN_FALL: f32 = 120.0;
const STOMP_BOUNCE: f32 = -320.0;
const STOMP_TOLERANCE: f32 = 10.0;
const HERO_HALF_W: f32 = 9.0;
const HERO_HALF_H: f32 = 12.0;
const WALKER_SPEED: f32 = 90.0;
const WALKER_HALF_W: f32 = 10.0;
const WALKER_HALF_H: f32 = 7.0;
const FALL_RESPAWN_MARGIN: f32 = 200.0;
const COIN_RADIUS: f32 = 12.0;
const PICKUP_RADIUS: f32 = 14.0;
const GOAL_HALF_W: f32 = 12.0;
const GOAL_HALF_H: f32 = 20.0;
const WARP_SNAP: f32 = 2.0;
const EDGE_EPS: f32 = 0.01;

/// What occupies one level tile. Stored in the engine tilemap by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TileKind {
    Empty,
    Ground,
    Stone,
    Brick,
    Question,
    Pipe,
    Hazard,
}

impl TileKind {
    fn id(self) -> u16 {
        match self {
            TileKind::Empty => 0,
            TileKind::Ground => 1,
            TileKind::Stone => 2,
            TileKind::Brick => 3,
            TileKind::Question => 4,
            TileKind::Pipe => 5,
            TileKind::Hazard => 6,
        }
    }

    fn from_id(id: u16) -> TileKind {
        match id {
            1 => TileKind::Ground,
            2 => TileKind::Stone,
            3 => TileKind::Brick,
            4 => TileKind::Question,
            5 => TileKind::Pipe,
            6 => TileKind::Hazard,
            _ => TileKind::Empty,
        }
    }

    fn is_solid(self) -> bool {
        matches!(
            self,
            TileKind::Ground | TileKind::Stone | TileKind::Brick | TileKind::Question | TileKind::Pipe
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuestionPayout {
    Coin,
    PowerUp,
}

#[derive(Debug, Clone, Copy)]
struct WalkerSpawn {
    tile_x: u32,
    tile_y: u32,
    dir: f32,
}

/// Authoring surface for trial layouts: place tiles, coins, and walkers in
/// tile coordinates the way the level data reads on paper.
pub(crate) struct LevelBuilder {
    map: Tilemap,
    questions: HashMap<(u32, u32), QuestionPayout>,
    coins: Vec<(u32, u32)>,
    walkers: Vec<WalkerSpawn>,
}

impl LevelBuilder {
    fn new(width: u32, height: u32) -> Self {
        Self {
            map: Tilemap::filled(width, height, Vec2::default(), TileKind::Empty.id()),
            questions: HashMap::new(),
            coins: Vec::new(),
            walkers: Vec::new(),
        }
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, kind: TileKind) {
        self.map.set_tile(x, y, kind.id());
    }

    /// Base ground across the full width at `y`, skipping the listed gap
    /// columns.
    pub(crate) fn ground_row(&mut self, y: u32, gaps: &[u32]) {
        for x in 0..self.map.width() {
            if gaps.contains(&x) {
                continue;
            }
            self.set(x, y, TileKind::Ground);
        }
    }

    pub(crate) fn stone(&mut self, x: u32, y: u32) {
        self.set(x, y, TileKind::Stone);
    }

    pub(crate) fn brick(&mut self, x: u32, y: u32) {
        self.set(x, y, TileKind::Brick);
    }

    pub(crate) fn question(&mut self, x: u32, y: u32, payout: QuestionPayout) {
        self.set(x, y, TileKind::Question);
        self.questions.insert((x, y), payout);
    }

    pub(crate) fn pipe(&mut self, x: u32, top_y: u32, height: u32) {
        for y in top_y..top_y + height {
            self.set(x, y, TileKind::Pipe);
        }
    }

    pub(crate) fn hazard(&mut self, x: u32, y: u32) {
        self.set(x, y, TileKind::Hazard);
    }

    /// Boundary wall so the hero cannot leave the level sideways.
    pub(crate) fn wall_column(&mut self, x: u32) {
        for y in 0..self.map.height() {
            self.set(x, y, TileKind::Stone);
        }
    }

    pub(crate) fn coin(&mut self, x: u32, y: u32) {
        self.coins.push((x, y));
    }

    pub(crate) fn walker(&mut self, x: u32, y: u32, dir: f32) {
        self.walkers.push(WalkerSpawn {
            tile_x: x,
            tile_y: y,
            dir,
        });
    }
}

/// Exit trigger: touching it while unsatisfied plays the hint once per
/// entry; touching it while satisfied applies the completion effects.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GoalDef {
    pub tile: (u32, u32),
    pub requires: Requirement,
    pub locked: EffectList,
    pub complete: EffectList,
}

/// Pressing down on top of these pipe columns warps to another room.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WarpDef {
    pub x_tiles: (u32, u32),
    pub top_y: u32,
    pub to: (RoomId, f32, f32),
}

/// A one-shot flag-granting pickup (cave key, note). Present while its
/// requirement holds.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PickupDef {
    pub id: &'static str,
    pub tile: (u32, u32),
    pub present: Requirement,
    pub effects: EffectList,
}

/// Everything that makes one trial room distinct; the side-scrolling engine
/// is shared across all of them.
pub(crate) struct TrialPlan {
    pub id: RoomId,
    pub tiles: (u32, u32),
    pub entry_tile: (u32, u32),
    pub build: fn(&mut LevelBuilder),
    pub goal: Option<GoalDef>,
    pub warp: Option<WarpDef>,
    pub pickups: &'static [PickupDef],
    pub intros: &'static [IntroDef],
    pub music: fn(&ProgressData) -> &'static str,
}

#[derive(Debug, Clone, Copy)]
struct Hero {
    pos: Vec2,
    vel: Vec2,
    on_ground: bool,
}

#[derive(Debug, Clone, Copy)]
struct Walker {
    pos: Vec2,
    dir: f32,
}

#[derive(Debug, Clone, Copy)]
struct Coin {
    pos: Vec2,
    taken: bool,
}

#[derive(Debug, Clone, Copy)]
struct FloatingPowerUp {
    pos: Vec2,
    taken: bool,
}

struct PendingIntro {
    remaining: f32,
    effects: EffectList,
}

/// Shared side-scrolling trial room: gravity, run/jump, stomp-or-respawn
/// enemies, head-bumped blocks, coins, and a gated exit. Failure is always
/// local: respawn at the entry tile with zero velocity, never touching
/// persisted health or flags.
pub(crate) struct TrialRoom {
    plan: &'static TrialPlan,
    map: Tilemap,
    questions: HashMap<(u32, u32), (QuestionPayout, bool)>,
    coins: Vec<Coin>,
    walkers: Vec<Walker>,
    powerups: Vec<FloatingPowerUp>,
    pickups_taken: Vec<bool>,
    hero: Hero,
    coin_count: u32,
    powered: bool,
    finishing: bool,
    shown_locked_hint: bool,
    pending_intro: Option<PendingIntro>,
}

impl TrialRoom {
    pub(crate) fn new(plan: &'static TrialPlan) -> Self {
        let mut room = Self {
            plan,
            map: Tilemap::filled(plan.tiles.0, plan.tiles.1, Vec2::default(), 0),
            questions: HashMap::new(),
            coins: Vec::new(),
            walkers: Vec::new(),
            powerups: Vec::new(),
            pickups_taken: Vec::new(),
            hero: Hero {
                pos: Vec2::default(),
                vel: Vec2::default(),
                on_ground: false,
            },
            coin_count: 0,
            powered: false,
            finishing: false,
            shown_locked_hint: false,
            pending_intro: None,
        };
        room.rebuild();
        room
    }

    fn rebuild(&mut self) {
        let mut builder = LevelBuilder::new(self.plan.tiles.0, self.plan.tiles.1);
        (self.plan.build)(&mut builder);
        self.map = builder.map;
        self.questions = builder
            .questions
            .into_iter()
            .map(|(tile, payout)| (tile, (payout, false)))
            .collect();
        self.coins = builder
            .coins
            .into_iter()
            .map(|(x, y)| Coin {
                pos: tile_center(x, y),
                taken: false,
            })
            .collect();
        self.walkers = builder
            .walkers
            .into_iter()
            .map(|spawn| Walker {
                pos: tile_center(spawn.tile_x, spawn.tile_y),
                dir: spawn.dir,
            })
            .collect();
        self.powerups.clear();
        self.pickups_taken = vec![false; self.plan.pickups.len()];
        self.hero = Hero {
            pos: tile_center(self.plan.entry_tile.0, self.plan.entry_tile.1),
            vel: Vec2::default(),
            on_ground: false,
        };
        self.coin_count = 0;
        self.powered = false;
        self.finishing = false;
        self.shown_locked_hint = false;
    }

    fn level_height_px(&self) -> f32 {
        self.plan.tiles.1 as f32 * TILE
    }

    fn kind_at(&self, tx: i64, ty: i64) -> TileKind {
        if tx < 0 || ty < 0 {
            return TileKind::Empty;
        }
        self.map
            .tile_at(tx as u32, ty as u32)
            .map(TileKind::from_id)
            .unwrap_or(TileKind::Empty)
    }

    fn solid_in_column_span(&self, tx: i64, y_min: f32, y_max: f32) -> bool {
        let ty0 = ((y_min + EDGE_EPS) / TILE).floor() as i64;
        let ty1 = ((y_max - EDGE_EPS) / TILE).floor() as i64;
        (ty0..=ty1).any(|ty| self.kind_at(tx, ty).is_solid())
    }

    fn solid_in_row_span(&self, ty: i64, x_min: f32, x_max: f32) -> bool {
        let tx0 = ((x_min + EDGE_EPS) / TILE).floor() as i64;
        let tx1 = ((x_max - EDGE_EPS) / TILE).floor() as i64;
        (tx0..=tx1).any(|tx| self.kind_at(tx, ty).is_solid())
    }

    /// Local retry: back to the entry tile with zero velocity. Persisted
    /// story state is deliberately untouched.
    fn respawn(&mut self) {
        debug!(room = self.plan.id.as_str(), "trial_respawn");
        self.hero.pos = tile_center(self.plan.entry_tile.0, self.plan.entry_tile.1);
        self.hero.vel = Vec2::default();
        self.hero.on_ground = false;
    }

    /// Integrates one tick of hero physics. Returns the tile bumped from
    /// below this tick, if any.
    fn step_hero(&mut self, dt: f32, input: &InputSnapshot) -> Option<(u32, u32)> {
        let left = input.is_down(InputAction::MoveLeft);
        let right = input.is_down(InputAction::MoveRight);
        self.hero.vel.x = if left && !right {
            -RUN_SPEED
        } else if right && !left {
            RUN_SPEED
        } else {
            0.0
        };

        if input.jump_pressed() && self.hero.on_ground {
            self.hero.vel.y = JUMP_VELOCITY;
        }
        self.hero.vel.y = (self.hero.vel.y + GRAVITY * dt).min(MAX_FALL_SPEED);

        // Horizontal sweep.
        let new_x = self.hero.pos.x + self.hero.vel.x * dt;
        let y_min = self.hero.pos.y - HERO_HALF_H;
        let y_max = self.hero.pos.y + HERO_HALF_H;
        if self.hero.vel.x > 0.0 {
            let tx = ((new_x + HERO_HALF_W) / TILE).floor() as i64;
            if self.solid_in_column_span(tx, y_min, y_max) {
                self.hero.pos.x = tx as f32 * TILE - HERO_HALF_W - EDGE_EPS;
                self.hero.vel.x = 0.0;
            } else {
                self.hero.pos.x = new_x;
            }
        } else if self.hero.vel.x < 0.0 {
            let tx = ((new_x - HERO_HALF_W) / TILE).floor() as i64;
            if self.solid_in_column_span(tx, y_min, y_max) {
                self.hero.pos.x = (tx + 1) as f32 * TILE + HERO_HALF_W + EDGE_EPS;
                self.hero.vel.x = 0.0;
            } else {
                self.hero.pos.x = new_x;
            }
        }

        // Vertical sweep.
        let mut bumped = None;
        let new_y = self.hero.pos.y + self.hero.vel.y * dt;
        let x_min = self.hero.pos.x - HERO_HALF_W;
        let x_max = self.hero.pos.x + HERO_HALF_W;
        self.hero.on_ground = false;
        if self.hero.vel.y > 0.0 {
            let ty = ((new_y + HERO_HALF_H) / TILE).floor() as i64;
            if self.solid_in_row_span(ty, x_min, x_max) {
                self.hero.pos.y = ty as f32 * TILE - HERO_HALF_H - EDGE_EPS;
                self.hero.vel.y = 0.0;
                self.hero.on_ground = true;
            } else {
                self.hero.pos.y = new_y;
            }
        } else if self.hero.vel.y < 0.0 {
            let ty = ((new_y - HERO_HALF_H) / TILE).floor() as i64;
            if self.solid_in_row_span(ty, x_min, x_max) {
                self.hero.pos.y = (ty + 1) as f32 * TILE + HERO_HALF_H + EDGE_EPS;
                self.hero.vel.y = 0.0;
                // Bump the tile over the hero's center column; fall back to
                // any solid tile in the span.
                let center_tx = (self.hero.pos.x / TILE).floor() as i64;
                let bump_tx = if self.kind_at(center_tx, ty).is_solid() {
                    Some(center_tx)
                } else {
                    let tx0 = ((x_min + EDGE_EPS) / TILE).floor() as i64;
                    let tx1 = ((x_max - EDGE_EPS) / TILE).floor() as i64;
                    (tx0..=tx1).find(|tx| self.kind_at(*tx, ty).is_solid())
                };
                if let (Some(tx), true) = (bump_tx, ty >= 0) {
                    if tx >= 0 {
                        bumped = Some((tx as u32, ty as u32));
                    }
                }
            } else {
                self.hero.pos.y = new_y;
            }
        } else {
            self.hero.pos.y = new_y;
        }

        bumped
    }

    fn handle_head_bump(&mut self, tile: (u32, u32)) {
        match TileKind::from_id(self.map.tile_at(tile.0, tile.1).unwrap_or(0)) {
            TileKind::Brick => {
                if self.powered {
                    self.map.set_tile(tile.0, tile.1, TileKind::Empty.id());
                    debug!(x = tile.0, y = tile.1, "brick_broken");
                }
            }
            TileKind::Question => {
                let Some((payout, used)) = self.questions.get_mut(&tile) else {
                    return;
                };
                if *used {
                    return;
                }
                *used = true;
                match (*payout, self.powered) {
                    (QuestionPayout::PowerUp, false) => {
                        self.powerups.push(FloatingPowerUp {
                            pos: tile_center(tile.0, tile.1.saturating_sub(1)),
                            taken: false,
                        });
                    }
                    _ => {
                        self.coin_count += 1;
                    }
                }
            }
            _ => {}
        }
    }

    fn touches_hazard(&self) -> bool {
        let x_min = self.hero.pos.x - HERO_HALF_W;
        let x_max = self.hero.pos.x + HERO_HALF_W;
        let y_min = self.hero.pos.y - HERO_HALF_H;
        let y_max = self.hero.pos.y + HERO_HALF_H;
        let tx0 = ((x_min + EDGE_EPS) / TILE).floor() as i64;
        let tx1 = ((x_max - EDGE_EPS) / TILE).floor() as i64;
        let ty0 = ((y_min + EDGE_EPS) / TILE).floor() as i64;
        let ty1 = ((y_max - EDGE_EPS) / TILE).floor() as i64;
        (ty0..=ty1).any(|ty| (tx0..=tx1).any(|tx| self.kind_at(tx, ty) == TileKind::Hazard))
    }

    fn step_walkers(&mut self, dt: f32) {
        let width_px = self.plan.tiles.0 as f32 * TILE;
        for walker in &mut self.walkers {
            let next_x = walker.pos.x + walker.dir * WALKER_SPEED * dt;
            let front_x = next_x + walker.dir * WALKER_HALF_W;
            let front_tx = (front_x / TILE).floor() as i64;
            let body_ty = (walker.pos.y / TILE).floor() as i64;
            let foot_ty = ((walker.pos.y + WALKER_HALF_H + 1.0) / TILE).floor() as i64;

            let wall_ahead = self.map.tile_at(
                front_tx.max(0) as u32,
                body_ty.max(0) as u32,
            )
            .map(TileKind::from_id)
            .map(TileKind::is_solid)
            .unwrap_or(true);
            let ledge_ahead = !self
                .map
                .tile_at(front_tx.max(0) as u32, foot_ty.max(0) as u32)
                .map(TileKind::from_id)
                .map(TileKind::is_solid)
                .unwrap_or(false);

            if wall_ahead || ledge_ahead || front_x <= 0.0 || front_x >= width_px {
                walker.dir = -walker.dir;
            } else {
                walker.pos.x = next_x;
            }
        }
    }

    /// Stomp-or-hurt contact resolution. Returns true when the hero must
    /// respawn.
    fn resolve_walker_contact(&mut self) -> bool {
        let hero = self.hero;
        let hero_bottom = hero.pos.y + HERO_HALF_H;
        let mut respawn = false;
        self.walkers.retain(|walker| {
            let overlaps = (walker.pos.x - hero.pos.x).abs() < HERO_HALF_W + WALKER_HALF_W
                && (walker.pos.y - hero.pos.y).abs() < HERO_HALF_H + WALKER_HALF_H;
            if !overlaps {
                return true;
            }
            let walker_top = walker.pos.y - WALKER_HALF_H;
            let stomp = hero.vel.y > STOMP_MIN_FALL && hero_bottom <= walker_top + STOMP_TOLERANCE;
            if stomp {
                false
            } else {
                respawn = true;
                true
            }
        });
        respawn
    }

    fn collect_overlaps(&mut self, ctx: &mut StoryContext) -> RoomCommand {
        let hero_pos = self.hero.pos;
        for coin in &mut self.coins {
            if !coin.taken
                && coin.pos.distance_sq(hero_pos) <= (COIN_RADIUS + HERO_HALF_W).powi(2)
            {
                coin.taken = true;
                self.coin_count += 1;
            }
        }
        for powerup in &mut self.powerups {
            if !powerup.taken
                && powerup.pos.distance_sq(hero_pos) <= (PICKUP_RADIUS + HERO_HALF_W).powi(2)
            {
                powerup.taken = true;
                self.powered = true;
                ctx.apply_effects(&[crate::app::story::Effect::Say(
                    crate::app::story::script::POWERUP_TAKEN,
                )]);
            }
        }

        let pickups: &'static [PickupDef] = self.plan.pickups;
        for (index, def) in pickups.iter().enumerate() {
            if self.pickups_taken[index] || !def.present.satisfied(ctx.progress.data()) {
                continue;
            }
            let pos = tile_center(def.tile.0, def.tile.1);
            if pos.distance_sq(hero_pos) <= (PICKUP_RADIUS + HERO_HALF_W).powi(2) {
                self.pickups_taken[index] = true;
                debug!(id = def.id, "trial_pickup_taken");
                let command = ctx.apply_effects(def.effects);
                if command != RoomCommand::None {
                    return command;
                }
            }
        }

        RoomCommand::None
    }

    fn check_goal(&mut self, ctx: &mut StoryContext) -> RoomCommand {
        let Some(goal) = &self.plan.goal else {
            return RoomCommand::None;
        };
        if self.finishing {
            return RoomCommand::None;
        }
        let center = Vec2::new(
            goal.tile.0 as f32 * TILE + TILE / 2.0,
            goal.tile.1 as f32 * TILE,
        );
        let overlaps = (center.x - self.hero.pos.x).abs() < GOAL_HALF_W + HERO_HALF_W
            && (center.y - self.hero.pos.y).abs() < GOAL_HALF_H + HERO_HALF_H;
        if !overlaps {
            return RoomCommand::None;
        }

        if goal.requires.satisfied(ctx.progress.data()) {
            self.finishing = true;
            info!(room = self.plan.id.as_str(), "trial_goal_reached");
            return ctx.apply_effects(goal.complete);
        }

        if !self.shown_locked_hint {
            self.shown_locked_hint = true;
            return ctx.apply_effects(goal.locked);
        }
        RoomCommand::None
    }

    fn check_warp(&mut self, input: &InputSnapshot, ctx: &mut StoryContext) -> RoomCommand {
        let Some(warp) = &self.plan.warp else {
            return RoomCommand::None;
        };
        if !input.descend_pressed() || !self.hero.on_ground {
            return RoomCommand::None;
        }
        let hero_tx = (self.hero.pos.x / TILE).floor() as i64;
        let on_pipe_columns =
            hero_tx >= warp.x_tiles.0 as i64 && hero_tx <= warp.x_tiles.1 as i64;
        let hero_bottom = self.hero.pos.y + HERO_HALF_H;
        let on_pipe_top = (hero_bottom - warp.top_y as f32 * TILE).abs() <= WARP_SNAP;
        if on_pipe_columns && on_pipe_top {
            let (room, x, y) = warp.to;
            return ctx.transition(room, Vec2::new(x, y));
        }
        RoomCommand::None
    }
}

fn tile_center(x: u32, y: u32) -> Vec2 {
    Vec2::new(x as f32 * TILE + TILE / 2.0, y as f32 * TILE + TILE / 2.0)
}

impl Room<StoryContext> for TrialRoom {
    fn enter(&mut self, _spawn: Vec2, ctx: &mut StoryContext) {
        ctx.music.play((self.plan.music)(ctx.progress.data()));
        self.rebuild();
        self.pending_intro = self
            .plan
            .intros
            .iter()
            .find(|intro| intro.when.satisfied(ctx.progress.data()))
            .map(|intro| PendingIntro {
                remaining: intro.delay_s,
                effects: intro.effects,
            });
        info!(
            room = self.plan.id.as_str(),
            walkers = self.walkers.len(),
            coins = self.coins.len(),
            "trial_entered"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut StoryContext,
    ) -> RoomCommand {
        ctx.hud.prompt = None;
        ctx.hud.coins = Some(self.coin_count);

        if ctx.dialogue.is_active() {
            if input.confirm_pressed() {
                let command = ctx.advance_dialogue();
                if command != RoomCommand::None {
                    return command;
                }
            }
            return ctx.tick_dialogue(Duration::from_secs_f32(fixed_dt_seconds));
        }

        if let Some(pending) = &mut self.pending_intro {
            pending.remaining -= fixed_dt_seconds;
            if pending.remaining <= 0.0 {
                let effects = pending.effects;
                self.pending_intro = None;
                return ctx.apply_effects(effects);
            }
        }

        if let Some(tile) = self.step_hero(fixed_dt_seconds, input) {
            self.handle_head_bump(tile);
        }

        let warp_command = self.check_warp(input, ctx);
        if warp_command != RoomCommand::None {
            return warp_command;
        }

        if self.hero.pos.y > self.level_height_px() + FALL_RESPAWN_MARGIN || self.touches_hazard()
        {
            self.respawn();
            return RoomCommand::None;
        }

        self.step_walkers(fixed_dt_seconds);
        let walkers_before = self.walkers.len();
        if self.resolve_walker_contact() {
            self.respawn();
            return RoomCommand::None;
        }
        if self.walkers.len() < walkers_before {
            self.hero.vel.y = STOMP_BOUNCE;
        }

        let pickup_command = self.collect_overlaps(ctx);
        if pickup_command != RoomCommand::None {
            return pickup_command;
        }

        self.check_goal(ctx)
    }

    fn exit(&mut self, ctx: &mut StoryContext) {
        ctx.hud.coins = None;
        ctx.hud.prompt = None;
    }

    fn debug_title(&self, _ctx: &StoryContext) -> Option<String> {
        Some(format!(
            "{} | hero ({:.0}, {:.0}) | coins {} | walkers {}",
            self.plan.id.as_str(),
            self.hero.pos.x,
            self.hero.pos.y,
            self.coin_count,
            self.walkers.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::progress::StoryFlag;
    use crate::app::story::script;
    use crate::app::story::{test_context, Effect};

    const DT: f32 = 1.0 / 60.0;

    fn flat_music(_data: &ProgressData) -> &'static str {
        "0"
    }

    fn build_flat(builder: &mut LevelBuilder) {
        builder.ground_row(14, &[]);
        builder.wall_column(0);
        builder.wall_column(39);
        builder.question(6, 10, QuestionPayout::Coin);
        builder.brick(7, 10);
        builder.coin(10, 13);
        builder.walker(20, 13, -1.0);
        builder.hazard(30, 13);
    }

    static FLAT_PLAN: TrialPlan = TrialPlan {
        id: RoomId::PlatformTrial,
        tiles: (40, 15),
        entry_tile: (2, 13),
        build: build_flat,
        goal: Some(GoalDef {
            tile: (36, 13),
            requires: Requirement::Flag(StoryFlag::PlatformCaveKeyFound),
            locked: &[Effect::Say(script::TRIAL_NEED_KEY)],
            complete: &[
                Effect::Mark(StoryFlag::PlatformTrialComplete),
                Effect::Go(RoomId::EastForest, 980.0, 420.0),
            ],
        }),
        warp: None,
        pickups: &[],
        intros: &[],
        music: flat_music,
    };

    fn entered(ctx: &mut StoryContext) -> TrialRoom {
        let mut room = TrialRoom::new(&FLAT_PLAN);
        room.enter(Vec2::default(), ctx);
        room
    }

    fn settle(room: &mut TrialRoom, ctx: &mut StoryContext, ticks: usize) {
        for _ in 0..ticks {
            room.update(DT, &InputSnapshot::empty(), ctx);
        }
    }

    #[test]
    fn hero_lands_on_ground_and_stays() {
        let mut ctx = test_context();
        let mut room = entered(&mut ctx);
        settle(&mut room, &mut ctx, 60);

        // Ground row is at y=14; the hero rests on top of it.
        assert!(room.hero.on_ground);
        assert!((room.hero.pos.y - (14.0 * TILE - HERO_HALF_H)).abs() < 1.0);
    }

    #[test]
    fn jump_only_works_from_the_ground() {
        let mut ctx = test_context();
        let mut room = entered(&mut ctx);
        settle(&mut room, &mut ctx, 60);

        room.update(DT, &InputSnapshot::empty().with_jump_pressed(true), &mut ctx);
        assert!(room.hero.vel.y < 0.0);

        let airborne_vel = room.hero.vel.y;
        room.update(DT, &InputSnapshot::empty().with_jump_pressed(true), &mut ctx);
        // The second press does nothing mid-air; gravity keeps integrating.
        assert!(room.hero.vel.y > airborne_vel);
    }

    #[test]
    fn boundary_wall_blocks_running_left() {
        let mut ctx = test_context();
        let mut room = entered(&mut ctx);
        settle(&mut room, &mut ctx, 60);

        for _ in 0..240 {
            room.update(
                DT,
                &InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true),
                &mut ctx,
            );
        }
        // Wall column at x=0 spans tiles 0..16px.
        assert!(room.hero.pos.x >= TILE + HERO_HALF_W - 0.1);
    }

    #[test]
    fn coin_pickup_increments_room_local_count() {
        let mut ctx = test_context();
        let mut room = entered(&mut ctx);
        settle(&mut room, &mut ctx, 60);

        for _ in 0..600 {
            room.update(
                DT,
                &InputSnapshot::empty().with_action_down(InputAction::MoveRight, true),
                &mut ctx,
            );
            if room.coin_count > 0 {
                break;
            }
        }
        assert_eq!(room.coin_count, 1);
        assert_eq!(ctx.hud.coins, Some(1));
    }

    #[test]
    fn stomp_defeats_walker_and_bounces() {
        let mut ctx = test_context();
        let mut room = entered(&mut ctx);
        settle(&mut room, &mut ctx, 60);

        // Drop the hero straight onto the walker.
        let walker = room.walkers[0];
        room.hero.pos = Vec2::new(walker.pos.x, walker.pos.y - 40.0);
        room.hero.vel = Vec2::new(0.0, 300.0);
        room.hero.on_ground = false;

        let mut stomped = false;
        for _ in 0..20 {
            room.update(DT, &InputSnapshot::empty(), &mut ctx);
            if room.walkers.is_empty() {
                stomped = true;
                assert!(room.hero.vel.y < 0.0, "stomp bounces upward");
                break;
            }
        }
        assert!(stomped, "falling onto the walker stomps it");
    }

    #[test]
    fn side_contact_with_walker_respawns_without_story_mutation() {
        let mut ctx = test_context();
        ctx.progress.mark(StoryFlag::MetGabi);
        let health_before = ctx.progress.data().player_health;
        let mut room = entered(&mut ctx);
        settle(&mut room, &mut ctx, 60);

        // Walk into the walker from the side.
        let walker = room.walkers[0];
        room.hero.pos = Vec2::new(walker.pos.x - 15.0, walker.pos.y);
        room.hero.vel = Vec2::default();
        room.update(DT, &InputSnapshot::empty(), &mut ctx);

        let entry = tile_center(FLAT_PLAN.entry_tile.0, FLAT_PLAN.entry_tile.1);
        assert_eq!(room.hero.pos, entry);
        assert_eq!(room.hero.vel, Vec2::default());
        assert!(!room.walkers.is_empty(), "walker survives a side hit");
        assert_eq!(ctx.progress.data().player_health, health_before);
        assert!(ctx.is_set(StoryFlag::MetGabi));
    }

    #[test]
    fn falling_out_of_the_level_respawns_at_entry() {
        let mut ctx = test_context();
        let mut room = entered(&mut ctx);
        room.hero.pos = Vec2::new(100.0, room.level_height_px() + FALL_RESPAWN_MARGIN + 10.0);
        room.hero.vel = Vec2::new(50.0, 400.0);

        room.update(DT, &InputSnapshot::empty(), &mut ctx);

        let entry = tile_center(FLAT_PLAN.entry_tile.0, FLAT_PLAN.entry_tile.1);
        assert_eq!(room.hero.pos, entry);
        assert_eq!(room.hero.vel, Vec2::default());
    }

    #[test]
    fn hazard_contact_respawns_at_entry() {
        let mut ctx = test_context();
        let mut room = entered(&mut ctx);
        room.hero.pos = tile_center(30, 13);
        room.hero.vel = Vec2::default();

        room.update(DT, &InputSnapshot::empty(), &mut ctx);

        let entry = tile_center(FLAT_PLAN.entry_tile.0, FLAT_PLAN.entry_tile.1);
        assert_eq!(room.hero.pos, entry);
    }

    #[test]
    fn question_block_pays_a_coin_once() {
        let mut ctx = test_context();
        let mut room = entered(&mut ctx);

        room.handle_head_bump((6, 10));
        room.handle_head_bump((6, 10));

        assert_eq!(room.coin_count, 1);
    }

    #[test]
    fn bricks_break_only_when_powered() {
        let mut ctx = test_context();
        let mut room = entered(&mut ctx);

        room.handle_head_bump((7, 10));
        assert_eq!(
            TileKind::from_id(room.map.tile_at(7, 10).unwrap()),
            TileKind::Brick
        );

        room.powered = true;
        room.handle_head_bump((7, 10));
        assert_eq!(
            TileKind::from_id(room.map.tile_at(7, 10).unwrap()),
            TileKind::Empty
        );
    }

    #[test]
    fn goal_without_key_hints_once_then_stays_quiet() {
        let mut ctx = test_context();
        let mut room = entered(&mut ctx);
        settle(&mut room, &mut ctx, 60);

        room.hero.pos = Vec2::new(36.0 * TILE + 8.0, 14.0 * TILE - HERO_HALF_H - 0.1);
        room.update(DT, &InputSnapshot::empty(), &mut ctx);
        assert!(ctx.dialogue.is_active());

        // Burn the dialogue down, stay on the door: no second hint.
        while ctx.dialogue.is_active() {
            room.update(DT, &InputSnapshot::empty().with_interact_pressed(true), &mut ctx);
        }
        room.hero.pos = Vec2::new(36.0 * TILE + 8.0, 14.0 * TILE - HERO_HALF_H - 0.1);
        room.update(DT, &InputSnapshot::empty(), &mut ctx);
        assert!(!ctx.dialogue.is_active());
        assert!(!ctx.is_set(StoryFlag::PlatformTrialComplete));
    }

    #[test]
    fn goal_with_key_completes_and_transitions() {
        let mut ctx = test_context();
        ctx.progress.mark(StoryFlag::PlatformCaveKeyFound);
        let mut room = entered(&mut ctx);
        settle(&mut room, &mut ctx, 60);

        room.hero.pos = Vec2::new(36.0 * TILE + 8.0, 14.0 * TILE - HERO_HALF_H - 0.1);
        let command = room.update(DT, &InputSnapshot::empty(), &mut ctx);

        assert!(ctx.is_set(StoryFlag::PlatformTrialComplete));
        assert_eq!(
            command,
            RoomCommand::SwitchTo(RoomId::EastForest, Vec2::new(980.0, 420.0))
        );
    }
}
