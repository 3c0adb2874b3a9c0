use std::time::Duration;

use engine::{InputAction, InputSnapshot, Room, RoomCommand, RoomId, Vec2};
use tracing::info;

use crate::app::interact::{InteractRegistry, Interactable};
use crate::app::progress::{ProgressData, StoryFlag};
use crate::app::story::{first_matching_rule, EffectList, GateRule, Requirement, StoryContext};

pub(crate) const PLAYER_SPEED: f32 = 120.0;
pub(crate) const PLAYER_HALF: f32 = 14.0;
pub(crate) const ATTACK_COOLDOWN_S: f32 = 0.3;
pub(crate) const ATTACK_REACH: f32 = 30.0;
pub(crate) const ATTACK_RADIUS: f32 = 40.0;
pub(crate) const INVULN_S: f32 = 1.0;
pub(crate) const KNOCKBACK_PX: f32 = 30.0;
pub(crate) const INTERACT_RADIUS: f32 = 48.0;

const ENEMY_DAMAGE: i32 = 1;
const ENEMY_HALF: f32 = 14.0;
const SLIME_SPEED: f32 = 40.0;
const SLIME_HP: i32 = 2;
const SLIME_PATROL_RANGE: f32 = 60.0;
const WISP_SPEED: f32 = 60.0;
const WISP_HP: i32 = 3;
const WISP_AGGRO_RADIUS: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub(crate) const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    fn overlaps_centered_box(&self, center: Vec2, half: f32) -> bool {
        center.x + half > self.x
            && center.x - half < self.x + self.w
            && center.y + half > self.y
            && center.y - half < self.y + self.h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    fn offset(self, distance: f32) -> Vec2 {
        match self {
            Facing::Up => Vec2::new(0.0, -distance),
            Facing::Down => Vec2::new(0.0, distance),
            Facing::Left => Vec2::new(-distance, 0.0),
            Facing::Right => Vec2::new(distance, 0.0),
        }
    }
}

/// Player body shared by exploration and boss rooms: 4-directional movement
/// with wall/bounds collision, a swing cooldown, and post-hit invulnerability.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlayerState {
    pub pos: Vec2,
    pub facing: Facing,
    pub attack_cooldown: f32,
    pub invuln: f32,
}

impl PlayerState {
    pub(crate) fn at(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            facing: Facing::Down,
            attack_cooldown: 0.0,
            invuln: 0.0,
        }
    }

    pub(crate) fn tick_timers(&mut self, dt: f32) {
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        self.invuln = (self.invuln - dt).max(0.0);
    }

    /// 4-directional movement: when both axes are held, horizontal wins.
    pub(crate) fn step(
        &mut self,
        dt: f32,
        input: &InputSnapshot,
        bounds: (f32, f32),
        walls: &[Rect],
    ) {
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
        if dx != 0.0 {
            dy = 0.0;
        }

        if dx < 0.0 {
            self.facing = Facing::Left;
        } else if dx > 0.0 {
            self.facing = Facing::Right;
        } else if dy < 0.0 {
            self.facing = Facing::Up;
        } else if dy > 0.0 {
            self.facing = Facing::Down;
        }

        let step = Vec2::new(dx * PLAYER_SPEED * dt, dy * PLAYER_SPEED * dt);
        self.move_clamped(step, bounds, walls);
    }

    pub(crate) fn move_clamped(&mut self, step: Vec2, bounds: (f32, f32), walls: &[Rect]) {
        let mut next = Vec2::new(self.pos.x + step.x, self.pos.y);
        next.x = next.x.clamp(PLAYER_HALF, bounds.0 - PLAYER_HALF);
        if !collides(next, walls) {
            self.pos.x = next.x;
        }

        let mut next = Vec2::new(self.pos.x, self.pos.y + step.y);
        next.y = next.y.clamp(PLAYER_HALF, bounds.1 - PLAYER_HALF);
        if !collides(next, walls) {
            self.pos.y = next.y;
        }
    }

    /// Swing origin for hit tests: a circle in front of the player.
    pub(crate) fn swing_center(&self) -> Vec2 {
        let offset = self.facing.offset(ATTACK_REACH);
        Vec2::new(self.pos.x + offset.x, self.pos.y + offset.y)
    }

    /// Takes one hit from something at `from`: damage through the store,
    /// knockback away from the source, invulnerability window. Returns true
    /// when this hit defeated the player.
    pub(crate) fn take_contact_hit(&mut self, from: Vec2, ctx: &mut StoryContext) -> bool {
        self.invuln = INVULN_S;
        let away_x = if self.pos.x >= from.x { 1.0 } else { -1.0 };
        let away_y = if self.pos.y >= from.y { 1.0 } else { -1.0 };
        self.pos.x += away_x * KNOCKBACK_PX;
        self.pos.y += away_y * KNOCKBACK_PX;
        ctx.progress.damage_player(ENEMY_DAMAGE)
    }
}

fn collides(center: Vec2, walls: &[Rect]) -> bool {
    walls
        .iter()
        .any(|wall| wall.overlaps_centered_box(center, PLAYER_HALF))
}

/// Whether attacking is available in a room right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttackPolicy {
    Enabled,
    RequiresFlag(StoryFlag),
    Disabled,
}

impl AttackPolicy {
    pub(crate) fn allows(self, data: &ProgressData) -> bool {
        match self {
            AttackPolicy::Enabled => true,
            AttackPolicy::RequiresFlag(flag) => flag.is_set(data),
            AttackPolicy::Disabled => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnemyKind {
    Slime,
    Wisp,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct EnemySpawn {
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy)]
struct Enemy {
    kind: EnemyKind,
    pos: Vec2,
    home: Vec2,
    hp: i32,
    patrol_dir: f32,
}

impl Enemy {
    fn spawn(def: &EnemySpawn) -> Self {
        Self {
            kind: def.kind,
            pos: Vec2::new(def.x, def.y),
            home: Vec2::new(def.x, def.y),
            hp: match def.kind {
                EnemyKind::Slime => SLIME_HP,
                EnemyKind::Wisp => WISP_HP,
            },
            patrol_dir: 1.0,
        }
    }

    fn step(&mut self, dt: f32, player: Vec2) {
        match self.kind {
            EnemyKind::Slime => {
                self.pos.x += self.patrol_dir * SLIME_SPEED * dt;
                if (self.pos.x - self.home.x).abs() > SLIME_PATROL_RANGE {
                    self.patrol_dir = -self.patrol_dir;
                    self.pos.x = self.home.x + self.patrol_dir * SLIME_PATROL_RANGE;
                }
            }
            EnemyKind::Wisp => {
                let target = if self.pos.distance_sq(player)
                    <= WISP_AGGRO_RADIUS * WISP_AGGRO_RADIUS
                {
                    player
                } else {
                    self.home
                };
                let dx = target.x - self.pos.x;
                let dy = target.y - self.pos.y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > 1.0 {
                    self.pos.x += dx / dist * WISP_SPEED * dt;
                    self.pos.y += dy / dist * WISP_SPEED * dt;
                }
            }
        }
    }

    fn touches(&self, player: Vec2) -> bool {
        (self.pos.x - player.x).abs() < PLAYER_HALF + ENEMY_HALF
            && (self.pos.y - player.y).abs() < PLAYER_HALF + ENEMY_HALF
    }
}

/// How a point of interest's prompt reads, possibly varying with progress.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Prompt {
    Fixed(&'static str),
    When {
        when: Requirement,
        then: &'static str,
        otherwise: &'static str,
    },
}

impl Prompt {
    fn resolve(&self, data: &ProgressData) -> &'static str {
        match self {
            Prompt::Fixed(text) => text,
            Prompt::When {
                when,
                then,
                otherwise,
            } => {
                if when.satisfied(data) {
                    then
                } else {
                    otherwise
                }
            }
        }
    }
}

/// One point of interest: a proximity circle plus its gate table. `present`
/// controls whether the entry exists at all given current progress.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PoiDef {
    pub id: &'static str,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub present: Requirement,
    pub prompt: Prompt,
    pub rules: &'static [GateRule],
}

/// Symbols a puzzle stone can show. Stones cycle through these in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PuzzleSymbol {
    Pine,
    Star,
    Moon,
    Eye,
    Fish,
    Hand,
}

impl PuzzleSymbol {
    fn next(self) -> PuzzleSymbol {
        match self {
            PuzzleSymbol::Pine => PuzzleSymbol::Star,
            PuzzleSymbol::Star => PuzzleSymbol::Moon,
            PuzzleSymbol::Moon => PuzzleSymbol::Eye,
            PuzzleSymbol::Eye => PuzzleSymbol::Fish,
            PuzzleSymbol::Fish => PuzzleSymbol::Hand,
            PuzzleSymbol::Hand => PuzzleSymbol::Pine,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PuzzleStoneDef {
    pub id: &'static str,
    pub x: f32,
    pub y: f32,
}

/// A symbol-matching stone puzzle. Every stone starts on `Pine`; interacting
/// cycles it one symbol forward. Matching `solution` plays the solved beat
/// and spawns `chest`. Rooms entered with `solved_when` already satisfied
/// treat the puzzle as done (the chest reward was claimed on an earlier
/// visit).
#[derive(Debug, Clone, Copy)]
pub(crate) struct PuzzleDef {
    pub stones: &'static [PuzzleStoneDef],
    pub solution: &'static [PuzzleSymbol],
    pub solved_when: Requirement,
    pub on_solved: EffectList,
    pub chest: PoiDef,
}

/// A beat played shortly after entering the room, once per activation. The
/// first matching entry wins.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IntroDef {
    pub when: Requirement,
    pub delay_s: f32,
    pub effects: EffectList,
}

/// Everything that makes one exploration room distinct. The behavior is
/// shared; only this data varies.
pub(crate) struct RoomPlan {
    pub id: RoomId,
    pub bounds: (f32, f32),
    pub walls: &'static [Rect],
    pub pois: &'static [PoiDef],
    pub puzzle: Option<&'static PuzzleDef>,
    pub intros: &'static [IntroDef],
    pub enemies: &'static [EnemySpawn],
    pub attack: AttackPolicy,
    pub music: fn(&ProgressData) -> &'static str,
}

struct PendingIntro {
    remaining: f32,
    effects: EffectList,
}

const STONE_PROMPT: &str = "Presiona E para cambiar el símbolo";

/// What activating a registered circle means.
#[derive(Debug, Clone, Copy)]
enum PoiAction {
    Rules(&'static [GateRule]),
    PuzzleStone(usize),
}

/// Data-driven top-down exploration room: movement, simple combat, gated
/// interactables, and per-entry intro beats.
pub(crate) struct ExploreRoom {
    plan: &'static RoomPlan,
    player: PlayerState,
    enemies: Vec<Enemy>,
    registry: InteractRegistry<PoiAction>,
    prompt_cache: Vec<Option<&'static str>>,
    pending_intro: Option<PendingIntro>,
    stone_symbols: Vec<PuzzleSymbol>,
    puzzle_solved: bool,
}

impl ExploreRoom {
    pub(crate) fn new(plan: &'static RoomPlan) -> Self {
        Self {
            plan,
            player: PlayerState::at(Vec2::default()),
            enemies: Vec::new(),
            registry: InteractRegistry::default(),
            prompt_cache: Vec::new(),
            pending_intro: None,
            stone_symbols: Vec::new(),
            puzzle_solved: false,
        }
    }

    fn sync_pois(&mut self, data: &ProgressData) {
        for (index, def) in self.plan.pois.iter().enumerate() {
            let present = def.present.satisfied(data);
            if !present {
                if self.registry.contains(def.id) {
                    self.registry.unregister(def.id);
                    self.prompt_cache[index] = None;
                }
                continue;
            }

            let prompt = def.prompt.resolve(data);
            if !self.registry.contains(def.id) || self.prompt_cache[index] != Some(prompt) {
                self.registry.register(Interactable {
                    id: def.id,
                    position: Vec2::new(def.x, def.y),
                    radius: def.radius,
                    prompt: prompt.to_string(),
                    action: PoiAction::Rules(def.rules),
                });
                self.prompt_cache[index] = Some(prompt);
            }
        }

        if let Some(puzzle) = self.plan.puzzle {
            let chest = &puzzle.chest;
            let show = self.puzzle_solved && chest.present.satisfied(data);
            if show && !self.registry.contains(chest.id) {
                self.registry.register(Interactable {
                    id: chest.id,
                    position: Vec2::new(chest.x, chest.y),
                    radius: chest.radius,
                    prompt: chest.prompt.resolve(data).to_string(),
                    action: PoiAction::Rules(chest.rules),
                });
            } else if !show && self.registry.contains(chest.id) {
                self.registry.unregister(chest.id);
            }
        }
    }

    /// Cycles one stone forward. Solving plays the solved beat; the chest
    /// appears on the next sync. Stones keep their prompt after solving but
    /// no longer respond.
    fn cycle_stone(&mut self, index: usize, ctx: &mut StoryContext) -> RoomCommand {
        let Some(puzzle) = self.plan.puzzle else {
            return RoomCommand::None;
        };
        if self.puzzle_solved {
            return RoomCommand::None;
        }
        let Some(symbol) = self.stone_symbols.get_mut(index) else {
            return RoomCommand::None;
        };
        *symbol = symbol.next();

        if self.stone_symbols.as_slice() == puzzle.solution {
            self.puzzle_solved = true;
            info!(room = self.plan.id.as_str(), "puzzle_solved");
            return ctx.apply_effects(puzzle.on_solved);
        }
        RoomCommand::None
    }

    fn try_attack(&mut self) {
        if self.player.attack_cooldown > 0.0 {
            return;
        }
        self.player.attack_cooldown = ATTACK_COOLDOWN_S;
        let center = self.player.swing_center();
        for enemy in &mut self.enemies {
            if enemy.pos.distance_sq(center) <= ATTACK_RADIUS * ATTACK_RADIUS {
                enemy.hp -= 1;
            }
        }
        self.enemies.retain(|enemy| enemy.hp > 0);
    }

    /// Returns true when contact damage defeated the player.
    fn update_enemies(&mut self, dt: f32, ctx: &mut StoryContext) -> bool {
        let player_pos = self.player.pos;
        for enemy in &mut self.enemies {
            enemy.step(dt, player_pos);
        }
        if self.player.invuln > 0.0 {
            return false;
        }
        let hit_from = self
            .enemies
            .iter()
            .find(|enemy| enemy.touches(player_pos))
            .map(|enemy| enemy.pos);
        match hit_from {
            Some(from) => self.player.take_contact_hit(from, ctx),
            None => false,
        }
    }
}

impl Room<StoryContext> for ExploreRoom {
    fn enter(&mut self, spawn: Vec2, ctx: &mut StoryContext) {
        ctx.music.play((self.plan.music)(ctx.progress.data()));
        self.player = PlayerState::at(spawn);
        self.enemies = self.plan.enemies.iter().map(Enemy::spawn).collect();
        self.registry.clear();
        self.prompt_cache = vec![None; self.plan.pois.len()];
        if let Some(puzzle) = self.plan.puzzle {
            self.stone_symbols = vec![PuzzleSymbol::Pine; puzzle.stones.len()];
            self.puzzle_solved = puzzle.solved_when.satisfied(ctx.progress.data());
            for (index, stone) in puzzle.stones.iter().enumerate() {
                self.registry.register(Interactable {
                    id: stone.id,
                    position: Vec2::new(stone.x, stone.y),
                    radius: INTERACT_RADIUS,
                    prompt: STONE_PROMPT.to_string(),
                    action: PoiAction::PuzzleStone(index),
                });
            }
        }
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
            enemies = self.enemies.len(),
            pois = self.plan.pois.len(),
            "room_entered"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut StoryContext,
    ) -> RoomCommand {
        ctx.hud.prompt = None;
        ctx.hud.coins = None;

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

        self.player.tick_timers(fixed_dt_seconds);
        self.player
            .step(fixed_dt_seconds, input, self.plan.bounds, self.plan.walls);

        if input.attack_pressed() && self.plan.attack.allows(ctx.progress.data()) {
            self.try_attack();
        }

        if self.update_enemies(fixed_dt_seconds, ctx) {
            return ctx.respawn();
        }

        self.sync_pois(ctx.progress.data());
        self.registry.update(self.player.pos);
        ctx.hud.prompt = self.registry.prompt().map(str::to_string);

        if input.interact_pressed() {
            match self.registry.activate() {
                Some(PoiAction::Rules(rules)) => {
                    if let Some(rule) = first_matching_rule(rules, ctx.progress.data()) {
                        return ctx.apply_effects(rule.effects);
                    }
                }
                Some(PoiAction::PuzzleStone(index)) => {
                    return self.cycle_stone(index, ctx);
                }
                None => {}
            }
        }

        RoomCommand::None
    }

    fn exit(&mut self, ctx: &mut StoryContext) {
        self.registry.clear();
        self.enemies.clear();
        self.pending_intro = None;
        ctx.hud.prompt = None;
    }

    fn debug_title(&self, _ctx: &StoryContext) -> Option<String> {
        Some(format!(
            "{} | player ({:.0}, {:.0}) | enemies {}",
            self.plan.id.as_str(),
            self.player.pos.x,
            self.player.pos.y,
            self.enemies.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::story::script;
    use crate::app::story::{test_context, Effect};

    fn quiet_music(_data: &ProgressData) -> &'static str {
        "0"
    }

    static TEST_PLAN: RoomPlan = RoomPlan {
        id: RoomId::Cabin,
        bounds: (1280.0, 720.0),
        walls: &[Rect::new(0.0, 0.0, 1280.0, 64.0)],
        pois: &[
            PoiDef {
                id: "door",
                x: 640.0,
                y: 660.0,
                radius: INTERACT_RADIUS,
                present: Requirement::Always,
                prompt: Prompt::Fixed("Presiona E para salir"),
                rules: &[GateRule {
                    when: Requirement::Always,
                    effects: &[Effect::Go(RoomId::Overworld, 640.0, 820.0)],
                }],
            },
            PoiDef {
                id: "locked-chest",
                x: 200.0,
                y: 200.0,
                radius: INTERACT_RADIUS,
                present: Requirement::NotFlag(StoryFlag::HasKeyRelic),
                prompt: Prompt::Fixed("Presiona E para abrir"),
                rules: &[
                    GateRule {
                        when: Requirement::Flag(StoryFlag::MetGabi),
                        effects: &[Effect::Mark(StoryFlag::HasKeyRelic)],
                    },
                    GateRule {
                        when: Requirement::Always,
                        effects: &[Effect::Say(script::LOCKED_GIFT)],
                    },
                ],
            },
        ],
        puzzle: None,
        intros: &[],
        enemies: &[EnemySpawn {
            kind: EnemyKind::Slime,
            x: 400.0,
            y: 400.0,
        }],
        attack: AttackPolicy::Enabled,
        music: quiet_music,
    };

    static PUZZLE: PuzzleDef = PuzzleDef {
        stones: &[
            PuzzleStoneDef {
                id: "stone-a",
                x: 540.0,
                y: 400.0,
            },
            PuzzleStoneDef {
                id: "stone-b",
                x: 640.0,
                y: 400.0,
            },
        ],
        solution: &[PuzzleSymbol::Pine, PuzzleSymbol::Moon],
        solved_when: Requirement::Flag(StoryFlag::HasKeyRelic),
        on_solved: &[Effect::Say(script::PUZZLE_SOLVED)],
        chest: PoiDef {
            id: "reward-chest",
            x: 640.0,
            y: 500.0,
            radius: INTERACT_RADIUS,
            present: Requirement::NotFlag(StoryFlag::HasKeyRelic),
            prompt: Prompt::Fixed("Presiona E para abrir"),
            rules: &[GateRule {
                when: Requirement::Always,
                effects: &[Effect::Mark(StoryFlag::HasKeyRelic)],
            }],
        },
    };

    static PUZZLE_PLAN: RoomPlan = RoomPlan {
        id: RoomId::Library,
        bounds: (1280.0, 720.0),
        walls: &[],
        pois: &[],
        puzzle: Some(&PUZZLE),
        intros: &[],
        enemies: &[],
        attack: AttackPolicy::Enabled,
        music: quiet_music,
    };

    const DT: f32 = 1.0 / 60.0;

    fn entered_room(ctx: &mut StoryContext, spawn: Vec2) -> ExploreRoom {
        let mut room = ExploreRoom::new(&TEST_PLAN);
        room.enter(spawn, ctx);
        room
    }

    #[test]
    fn enter_positions_player_and_starts_music() {
        let mut ctx = test_context();
        let room = entered_room(&mut ctx, Vec2::new(100.0, 300.0));
        assert_eq!(room.player.pos, Vec2::new(100.0, 300.0));
        assert_eq!(ctx.music.current(), Some("0"));
    }

    #[test]
    fn interacting_with_exit_transitions_through_gateway() {
        let mut ctx = test_context();
        let mut room = entered_room(&mut ctx, Vec2::new(640.0, 660.0));

        let command = room.update(
            DT,
            &InputSnapshot::empty().with_interact_pressed(true),
            &mut ctx,
        );

        assert_eq!(
            command,
            RoomCommand::SwitchTo(RoomId::Overworld, Vec2::new(640.0, 820.0))
        );
        assert_eq!(
            ctx.progress.spawn_point(),
            (RoomId::Overworld, Vec2::new(640.0, 820.0))
        );
    }

    #[test]
    fn locked_rule_plays_dialogue_and_stays_put() {
        let mut ctx = test_context();
        let mut room = entered_room(&mut ctx, Vec2::new(200.0, 200.0));

        let command = room.update(
            DT,
            &InputSnapshot::empty().with_interact_pressed(true),
            &mut ctx,
        );

        assert_eq!(command, RoomCommand::None);
        assert!(ctx.dialogue.is_active());
        assert!(!ctx.is_set(StoryFlag::HasKeyRelic));
    }

    #[test]
    fn satisfied_rule_applies_effects_and_poi_disappears() {
        let mut ctx = test_context();
        ctx.progress.mark(StoryFlag::MetGabi);
        let mut room = entered_room(&mut ctx, Vec2::new(200.0, 200.0));

        room.update(
            DT,
            &InputSnapshot::empty().with_interact_pressed(true),
            &mut ctx,
        );
        assert!(ctx.is_set(StoryFlag::HasKeyRelic));

        // Next tick the chest is gone: present requires the flag unset.
        room.update(DT, &InputSnapshot::empty(), &mut ctx);
        assert!(!room.registry.contains("locked-chest"));
    }

    #[test]
    fn dialogue_suppresses_movement_and_interaction() {
        let mut ctx = test_context();
        let mut room = entered_room(&mut ctx, Vec2::new(640.0, 660.0));
        ctx.apply_effects(&[Effect::Say(script::LOCKED_GIFT)]);

        let before = room.player.pos;
        let command = room.update(
            DT,
            &InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true),
            &mut ctx,
        );

        assert_eq!(command, RoomCommand::None);
        assert_eq!(room.player.pos, before);
        assert!(ctx.hud.prompt.is_none());
    }

    #[test]
    fn walls_block_movement() {
        let mut ctx = test_context();
        let mut room = entered_room(&mut ctx, Vec2::new(640.0, 90.0));

        for _ in 0..120 {
            room.update(
                DT,
                &InputSnapshot::empty().with_action_down(InputAction::MoveUp, true),
                &mut ctx,
            );
        }

        // Top wall spans y 0..64; the player's box stops against it.
        assert!(room.player.pos.y >= 64.0 + PLAYER_HALF - 0.01);
    }

    #[test]
    fn attack_defeats_slime_after_two_swings() {
        let mut ctx = test_context();
        let mut room = entered_room(&mut ctx, Vec2::new(400.0 - ATTACK_REACH, 400.0));
        room.player.facing = Facing::Right;

        for _ in 0..2 {
            room.update(
                DT,
                &InputSnapshot::empty().with_attack_pressed(true),
                &mut ctx,
            );
            // Let the cooldown lapse between swings.
            for _ in 0..20 {
                room.update(DT, &InputSnapshot::empty(), &mut ctx);
            }
            // Stay in place for a deterministic second swing.
            room.player.pos = Vec2::new(400.0 - ATTACK_REACH, 400.0);
            room.player.facing = Facing::Right;
        }

        assert!(room.enemies.is_empty());
    }

    #[test]
    fn puzzle_solves_on_matching_symbols_and_spawns_the_chest() {
        let mut ctx = test_context();
        let mut room = ExploreRoom::new(&PUZZLE_PLAN);
        // Standing by the second stone; the solution needs it on Moon.
        room.enter(Vec2::new(640.0, 430.0), &mut ctx);

        let press = InputSnapshot::empty().with_interact_pressed(true);
        room.update(DT, &press, &mut ctx);
        assert!(!room.puzzle_solved);
        assert!(!ctx.dialogue.is_active());

        room.update(DT, &press, &mut ctx);
        assert!(room.puzzle_solved);
        assert!(ctx.dialogue.is_active());

        // Burn the solved beat; the chest registers on the next sync.
        while ctx.dialogue.is_active() {
            room.update(DT, &press, &mut ctx);
        }
        room.update(DT, &InputSnapshot::empty(), &mut ctx);
        assert!(room.registry.contains("reward-chest"));

        // Claiming the reward removes the chest.
        room.player.pos = Vec2::new(640.0, 500.0);
        room.update(DT, &press, &mut ctx);
        assert!(ctx.is_set(StoryFlag::HasKeyRelic));
        room.update(DT, &InputSnapshot::empty(), &mut ctx);
        assert!(!room.registry.contains("reward-chest"));
    }

    #[test]
    fn solved_puzzle_ignores_further_stone_presses() {
        let mut ctx = test_context();
        let mut room = ExploreRoom::new(&PUZZLE_PLAN);
        room.enter(Vec2::new(640.0, 430.0), &mut ctx);
        room.puzzle_solved = true;

        let before = room.stone_symbols.clone();
        room.update(
            DT,
            &InputSnapshot::empty().with_interact_pressed(true),
            &mut ctx,
        );
        assert_eq!(room.stone_symbols, before);
        assert!(!ctx.dialogue.is_active());
    }

    #[test]
    fn puzzle_enters_solved_when_reward_was_already_claimed() {
        let mut ctx = test_context();
        ctx.progress.mark(StoryFlag::HasKeyRelic);
        let mut room = ExploreRoom::new(&PUZZLE_PLAN);
        room.enter(Vec2::new(640.0, 430.0), &mut ctx);

        assert!(room.puzzle_solved);
        // The reward is gone, so no chest reappears.
        room.update(DT, &InputSnapshot::empty(), &mut ctx);
        assert!(!room.registry.contains("reward-chest"));
    }

    #[test]
    fn contact_damage_is_clamped_and_defeat_respawns() {
        let mut ctx = test_context();
        ctx.transition(RoomId::Cabin, Vec2::new(640.0, 360.0));
        let mut room = entered_room(&mut ctx, Vec2::new(400.0, 400.0));

        let mut respawned = false;
        for _ in 0..3000 {
            // Keep standing on the slime; invulnerability windows expire.
            room.player.pos = Vec2::new(room.enemies[0].pos.x, room.enemies[0].pos.y);
            let command = room.update(DT, &InputSnapshot::empty(), &mut ctx);
            if command != RoomCommand::None {
                respawned = true;
                assert_eq!(
                    command,
                    RoomCommand::SwitchTo(RoomId::Cabin, Vec2::new(640.0, 360.0))
                );
                break;
            }
        }

        assert!(respawned, "repeated contact should defeat and respawn");
        assert_eq!(
            ctx.progress.data().player_health,
            ctx.progress.data().player_max_health
        );
    }
}
