//! The stage: authoritative entity registry and fixed-step update
//!
//! Each tick runs, in order:
//! 1. `update()` on every registered entity
//! 2. removal of expired entities
//! 3. pairwise collision detection and dispatch over the survivors
//! 4. the cosmetic animation counter
//!
//! The registry may be mutated concurrently (the network task registers
//! bullets and moves remote tanks). A tick works on a snapshot of the map, so
//! objects inserted mid-tick are first visited on the following tick.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use parking_lot::{Mutex, RwLock};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::base::BaseState;
use super::entity::{
    BaseStatus, Cue, Entity, EntityId, EntityKind, GameObject, Team, UpdateContext,
};
use super::generator::{StageGenerator, StageLayout};
use super::tank::Tank;
use crate::{panic_message, random_unit_vector};

/// Shared handle to a registered entity
pub type EntityRef = Arc<Mutex<Entity>>;

/// A presentation cue raised during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueEvent {
    pub source: EntityId,
    pub cue: Cue,
    pub position: Vec2,
}

/// Summary of one `Stage::update`
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: u64,
    /// Entities swept this tick, in id order
    pub removed: Vec<EntityId>,
    /// Colliding pairs dispatched this tick (lower id first)
    pub collisions: Vec<(EntityId, EntityId)>,
    /// Callbacks that panicked and were skipped
    pub failures: usize,
}

/// How a match stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    InProgress,
    Winner(Team),
    /// Both sides eliminated on the same tick
    Draw,
}

pub struct Stage {
    width: f32,
    height: f32,
    objects: RwLock<BTreeMap<EntityId, EntityRef>>,
    next_id: AtomicU64,
    ticks: AtomicU64,
    /// Background scroll counter; presentation only
    animation: AtomicU64,
    rng: Mutex<Pcg32>,
    cues: Mutex<Vec<CueEvent>>,
    /// Entities whose next `update` panics
    #[cfg(test)]
    trip_wires: Mutex<Vec<EntityId>>,
}

impl Stage {
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        Self {
            width,
            height,
            objects: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            ticks: AtomicU64::new(0),
            animation: AtomicU64::new(0),
            rng: Mutex::new(Pcg32::seed_from_u64(seed)),
            cues: Mutex::new(Vec::new()),
            #[cfg(test)]
            trip_wires: Mutex::new(Vec::new()),
        }
    }

    /// Build a stage sized and populated by `generator`
    pub fn with_generator(generator: &dyn StageGenerator, seed: u64) -> (Self, StageLayout) {
        let size = generator.dimensions();
        let stage = Self::new(size.x, size.y, seed);
        let layout = generator.generate(&stage);
        log::info!(
            "stage {}x{} generated with {} objects ({} tanks)",
            stage.width,
            stage.height,
            stage.len(),
            layout.tanks.len()
        );
        (stage, layout)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Number of completed ticks
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    pub fn animation_frame(&self) -> u64 {
        self.animation.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Register an entity under a fresh id
    pub fn add_object(&self, entity: impl Into<Entity>) -> EntityId {
        let id = EntityId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut entity = entity.into();
        entity.assign_id(id);
        self.objects.write().insert(id, Arc::new(Mutex::new(entity)));
        id
    }

    /// Register several entities; ids come back in input order
    pub fn add_objects<I>(&self, entities: I) -> Vec<EntityId>
    where
        I: IntoIterator,
        I::Item: Into<Entity>,
    {
        entities.into_iter().map(|e| self.add_object(e)).collect()
    }

    /// Look up an entity. `None` is normal: it may have expired already.
    pub fn get_object(&self, id: EntityId) -> Option<EntityRef> {
        self.objects.read().get(&id).cloned()
    }

    /// Registered ids in insertion order
    pub fn ids(&self) -> Vec<EntityId> {
        self.objects.read().keys().copied().collect()
    }

    /// Run `f` on the tank registered under `id`
    pub fn with_tank<R>(&self, id: EntityId, f: impl FnOnce(&mut Tank) -> R) -> Option<R> {
        let object = self.get_object(id)?;
        let mut entity = object.lock();
        entity.as_tank_mut().map(f)
    }

    pub fn has_tank(&self, id: EntityId) -> bool {
        self.get_object(id)
            .is_some_and(|o| o.lock().kind() == EntityKind::Tank)
    }

    fn snapshot(&self) -> Vec<(EntityId, EntityRef)> {
        self.objects
            .read()
            .iter()
            .map(|(id, obj)| (*id, Arc::clone(obj)))
            .collect()
    }

    fn context(snapshot: &[(EntityId, EntityRef)]) -> UpdateContext {
        let mut ctx = UpdateContext::default();
        for (id, obj) in snapshot {
            if let Some(base) = obj.lock().as_base() {
                ctx.bases.insert(
                    *id,
                    BaseStatus {
                        state: base.state(),
                        position: base.position(),
                    },
                );
            }
        }
        ctx
    }

    /// Advance the simulation by one tick
    pub fn update(&self) -> TickReport {
        let tick = self.ticks.fetch_add(1, Ordering::AcqRel) + 1;
        let mut report = TickReport {
            tick,
            ..Default::default()
        };

        let snapshot = self.snapshot();
        let ctx = Self::context(&snapshot);

        // 1. Entity updates
        for (id, obj) in &snapshot {
            let mut entity = obj.lock();
            let outcome = isolate(*id, "update", || {
                #[cfg(test)]
                self.spring_trip_wire(*id);
                entity.update(&ctx)
            });
            if outcome.is_none() {
                report.failures += 1;
            }
        }

        // 2. Sweep
        let (expired, survivors): (Vec<_>, Vec<_>) = snapshot
            .into_iter()
            .partition(|(_, obj)| obj.lock().is_expired());
        if !expired.is_empty() {
            let mut objects = self.objects.write();
            for (id, _) in &expired {
                objects.remove(id);
            }
            report.removed = expired.iter().map(|(id, _)| *id).collect();
        }

        // 3. Collisions
        self.detect_collisions(&survivors, &mut report);

        // Cues from everything visited this tick, including the swept
        {
            let mut cues = self.cues.lock();
            for (id, obj) in expired.iter().chain(survivors.iter()) {
                let mut entity = obj.lock();
                let position = entity.position();
                cues.extend(entity.drain_cues().into_iter().map(|cue| CueEvent {
                    source: *id,
                    cue,
                    position,
                }));
            }
        }

        // 4. Cosmetic counter
        self.animation.fetch_add(1, Ordering::Relaxed);

        report
    }

    #[cfg(test)]
    fn spring_trip_wire(&self, id: EntityId) {
        let mut wires = self.trip_wires.lock();
        if let Some(at) = wires.iter().position(|w| *w == id) {
            wires.remove(at);
            drop(wires);
            panic!("entity {id} tripped");
        }
    }

    /// O(n²) pass over every pair of rigid bodies
    fn detect_collisions(&self, objects: &[(EntityId, EntityRef)], report: &mut TickReport) {
        for (i, (id_a, ref_a)) in objects.iter().enumerate() {
            for (id_b, ref_b) in &objects[i + 1..] {
                if Arc::ptr_eq(ref_a, ref_b) {
                    continue;
                }
                let mut a = ref_a.lock();
                let mut b = ref_b.lock();
                if !a.has_rigid_body() || !b.has_rigid_body() {
                    continue;
                }
                let (shape_a, shape_b) = (a.shape(), b.shape());
                if !shape_a.intersects(&shape_b) {
                    continue;
                }

                let mut separation = shape_a.center() - shape_b.center();
                if separation == Vec2::ZERO {
                    separation = random_unit_vector(&mut *self.rng.lock());
                }

                // Both sides see the other as it was before either callback ran
                let seen_by_a = b.contact(*id_b, separation);
                let seen_by_b = a.contact(*id_a, -separation);

                let hit_on_b = isolate(*id_a, "collision", || a.on_collision(&seen_by_a));
                let hit_on_a = isolate(*id_b, "collision", || b.on_collision(&seen_by_b));
                if hit_on_b.is_none() {
                    report.failures += 1;
                }
                if hit_on_a.is_none() {
                    report.failures += 1;
                }

                if let Some(hit) = hit_on_b.flatten() {
                    if isolate(*id_b, "hit", || b.on_hit_by(&hit)).is_none() {
                        report.failures += 1;
                    }
                }
                if let Some(hit) = hit_on_a.flatten() {
                    if isolate(*id_a, "hit", || a.on_hit_by(&hit)).is_none() {
                        report.failures += 1;
                    }
                }

                report.collisions.push((*id_a, *id_b));
            }
        }
    }

    pub(crate) fn raise_cue(&self, event: CueEvent) {
        self.cues.lock().push(event);
    }

    /// Take all cues raised since the last call
    pub fn drain_cues(&self) -> Vec<CueEvent> {
        std::mem::take(&mut *self.cues.lock())
    }

    /// Ids grouped by render layer (ascending), insertion order within a layer
    pub fn draw_order(&self) -> Vec<EntityId> {
        let mut layered: Vec<_> = self
            .snapshot()
            .into_iter()
            .map(|(id, obj)| (obj.lock().render_layer(), id))
            .collect();
        // Stable sort keeps id order inside each layer
        layered.sort_by_key(|(layer, _)| *layer);
        layered.into_iter().map(|(_, id)| id).collect()
    }

    fn base_of(&self, team: Team) -> Option<(i32, BaseState)> {
        self.snapshot().into_iter().find_map(|(_, obj)| {
            let entity = obj.lock();
            entity
                .as_base()
                .filter(|b| b.team() == team)
                .map(|b| (b.hp(), b.state()))
        })
    }

    pub fn base_position(&self, team: Team) -> Option<Vec2> {
        self.snapshot().into_iter().find_map(|(_, obj)| {
            let entity = obj.lock();
            entity
                .as_base()
                .filter(|b| b.team() == team)
                .map(|b| b.position())
        })
    }

    pub fn base_hp(&self, team: Team) -> Option<i32> {
        self.base_of(team).map(|(hp, _)| hp)
    }

    pub fn base_state(&self, team: Team) -> Option<BaseState> {
        self.base_of(team).map(|(_, state)| state)
    }

    /// Tanks of `team` that are currently alive
    pub fn alive_tanks(&self, team: Team) -> usize {
        self.snapshot()
            .into_iter()
            .filter(|(_, obj)| {
                obj.lock()
                    .as_tank()
                    .is_some_and(|t| t.team() == team && t.is_alive())
            })
            .count()
    }

    /// Tanks of `team` still in the fight: alive, or able to respawn
    pub fn remaining_tanks(&self, team: Team) -> usize {
        let snapshot = self.snapshot();
        let ctx = Self::context(&snapshot);
        snapshot
            .into_iter()
            .filter(|(_, obj)| {
                obj.lock().as_tank().is_some_and(|t| {
                    t.team() == team
                        && (t.is_alive()
                            || ctx
                                .base(t.base())
                                .is_some_and(|b| b.state != BaseState::Ruins))
                })
            })
            .count()
    }

    /// A side is eliminated once its base is in ruins and no tank can fight on
    pub fn outcome(&self) -> MatchOutcome {
        let eliminated = |team: Team| {
            self.base_state(team) == Some(BaseState::Ruins) && self.remaining_tanks(team) == 0
        };
        match (eliminated(Team::Red), eliminated(Team::Blue)) {
            (false, false) => MatchOutcome::InProgress,
            (true, false) => MatchOutcome::Winner(Team::Blue),
            (false, true) => MatchOutcome::Winner(Team::Red),
            (true, true) => MatchOutcome::Draw,
        }
    }

    pub fn winner(&self) -> Option<Team> {
        match self.outcome() {
            MatchOutcome::Winner(team) => Some(team),
            _ => None,
        }
    }
}

/// Run one entity callback, logging and swallowing a panic
fn isolate<T>(id: EntityId, phase: &str, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            log::error!(
                "entity {id} failed during {phase}: {}; skipped",
                panic_message(&*payload)
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::base::Base;
    use crate::sim::block::Block;
    use crate::sim::bullet::Bullet;
    use crate::sim::tank::TankState;
    use crate::sim::wall::Wall;
    use proptest::prelude::*;

    fn stage() -> Stage {
        Stage::new(STAGE_WIDTH, STAGE_HEIGHT, 42)
    }

    /// A tank whose base sits far off stage
    fn tank_at(stage: &Stage, team: Team, position: Vec2) -> EntityId {
        let home = match team {
            Team::Red => Vec2::new(-1000.0, -1000.0),
            _ => Vec2::new(-3000.0, -1000.0),
        };
        let base = stage.add_object(Base::new(team, home));
        stage.add_object(Tank::new(team, position, base, home))
    }

    fn position(stage: &Stage, id: EntityId) -> Vec2 {
        stage.get_object(id).expect("registered").lock().position()
    }

    fn hp(stage: &Stage, id: EntityId) -> i32 {
        stage.get_object(id).expect("registered").lock().hp()
    }

    #[test]
    fn test_ids_are_monotonic_and_ordered() {
        let stage = stage();
        let ids = stage.add_objects([
            Wall::new(Vec2::ZERO),
            Wall::new(Vec2::new(100.0, 0.0)),
            Wall::new(Vec2::new(200.0, 0.0)),
        ]);
        assert_eq!(ids, vec![EntityId(1), EntityId(2), EntityId(3)]);
        assert_eq!(stage.ids(), ids);
    }

    #[test]
    fn test_missing_lookup_is_none() {
        let stage = stage();
        assert!(stage.get_object(EntityId(99)).is_none());
        assert!(stage.with_tank(EntityId(99), |t| t.hp()).is_none());
    }

    #[test]
    fn test_bullet_removed_on_tick_after_life() {
        let stage = stage();
        let life = 10;
        let id = stage.add_object(Bullet::with_life(Vec2::ZERO, 0.0, Team::Red, None, life));
        for _ in 0..life {
            let report = stage.update();
            assert!(report.removed.is_empty());
            assert!(stage.get_object(id).is_some());
        }
        let report = stage.update();
        assert_eq!(report.removed, vec![id]);
        assert!(stage.get_object(id).is_none());
    }

    #[test]
    fn test_ids_never_reused_after_removal() {
        let stage = stage();
        let first = stage.add_object(Bullet::with_life(Vec2::ZERO, 0.0, Team::Red, None, 1));
        stage.update();
        stage.update();
        assert!(stage.get_object(first).is_none());
        let second = stage.add_object(Wall::new(Vec2::ZERO));
        assert!(second > first);
    }

    #[test]
    fn test_horizontal_push_out_keeps_y() {
        let stage = stage();
        let red = tank_at(&stage, Team::Red, Vec2::new(300.0, 300.0));
        let blue = tank_at(&stage, Team::Blue, Vec2::new(310.0, 300.0));
        let report = stage.update();
        assert_eq!(report.collisions, vec![(red, blue)]);
        let (pr, pb) = (position(&stage, red), position(&stage, blue));
        assert_eq!(pr.y, 300.0);
        assert_eq!(pb.y, 300.0);
        assert!(pr.x < 300.0);
        assert!(pb.x > 310.0);
    }

    #[test]
    fn test_coincident_centers_still_separate() {
        let stage = stage();
        let a = tank_at(&stage, Team::Red, Vec2::new(300.0, 300.0));
        let b = tank_at(&stage, Team::Blue, Vec2::new(300.0, 300.0));
        stage.update();
        let (pa, pb) = (position(&stage, a), position(&stage, b));
        assert!(pa.is_finite() && pb.is_finite());
        assert_ne!(pa, pb);
        // Axis-aligned resolution only
        let d = pa - pb;
        assert!(d.x == 0.0 || d.y == 0.0);
    }

    #[test]
    fn test_bullet_damages_enemy_tank() {
        let stage = stage();
        let blue = tank_at(&stage, Team::Blue, Vec2::new(300.0, 300.0));
        let bullet = stage.add_object(Bullet::new(Vec2::new(280.0, 300.0), 0.0, Team::Red, None));
        let report = stage.update();
        assert_eq!(report.collisions, vec![(blue, bullet)]);
        assert_eq!(hp(&stage, blue), TANK_INITIAL_HP - BULLET_DAMAGE);
        // Exploded bullet is debris for one tick, then gone
        stage.update();
        assert!(stage.get_object(bullet).is_none());
    }

    #[test]
    fn test_friendly_bullet_neither_damages_nor_pushes() {
        let stage = stage();
        let red = tank_at(&stage, Team::Red, Vec2::new(300.0, 300.0));
        stage.add_object(Bullet::new(Vec2::new(290.0, 300.0), 0.0, Team::Red, None));
        stage.update();
        assert_eq!(hp(&stage, red), TANK_INITIAL_HP);
        assert_eq!(position(&stage, red), Vec2::new(300.0, 300.0));
    }

    #[test]
    fn test_intangible_entities_skip_collision() {
        let stage = stage();
        let block = stage.add_object(Block::new(Vec2::new(300.0, 300.0), true));
        let wall = stage.add_object(Wall::new(Vec2::new(305.0, 300.0)));
        let report = stage.update();
        assert!(report.collisions.is_empty());
        for _ in 0..BLOCK_BABY_TICKS {
            stage.update();
        }
        let report = stage.update();
        assert_eq!(report.collisions, vec![(block, wall)]);
    }

    #[test]
    fn test_draw_order_groups_layers() {
        let stage = stage();
        let wall = stage.add_object(Wall::new(Vec2::ZERO));
        let bullet = stage.add_object(Bullet::new(Vec2::new(500.0, 500.0), 0.0, Team::Red, None));
        let wall2 = stage.add_object(Wall::new(Vec2::new(100.0, 0.0)));
        let block = stage.add_object(Block::new(Vec2::new(900.0, 0.0), false));
        stage
            .get_object(block)
            .expect("block")
            .lock()
            .on_hit_by(&crate::sim::entity::Hit {
                team: Team::Red,
                damage: 100,
            });
        assert_eq!(stage.draw_order(), vec![block, bullet, wall, wall2]);
    }

    #[test]
    fn test_base_queries_and_outcome() {
        let stage = stage();
        let red_base = stage.add_object(Base::new(Team::Red, Vec2::new(100.0, 400.0)));
        let blue_base = stage.add_object(Base::new(Team::Blue, Vec2::new(1100.0, 400.0)));
        let red = stage.add_object(Tank::new(
            Team::Red,
            Vec2::new(300.0, 100.0),
            red_base,
            Vec2::new(100.0, 400.0),
        ));
        stage.add_object(Tank::new(
            Team::Blue,
            Vec2::new(900.0, 100.0),
            blue_base,
            Vec2::new(1100.0, 400.0),
        ));
        assert_eq!(stage.base_hp(Team::Red), Some(BASE_INITIAL_HP));
        assert_eq!(stage.alive_tanks(Team::Red), 1);
        assert_eq!(stage.outcome(), MatchOutcome::InProgress);

        let ruin = crate::sim::entity::Hit {
            team: Team::Blue,
            damage: BASE_INITIAL_HP,
        };
        stage.get_object(red_base).expect("base").lock().on_hit_by(&ruin);
        assert_eq!(stage.base_state(Team::Red), Some(BaseState::Ruins));
        // The red tank still fights
        assert_eq!(stage.remaining_tanks(Team::Red), 1);
        assert_eq!(stage.winner(), None);

        stage.with_tank(red, |t| t.damage(TANK_INITIAL_HP));
        assert_eq!(stage.remaining_tanks(Team::Red), 0);
        assert_eq!(stage.winner(), Some(Team::Blue));
    }

    #[test]
    fn test_dead_tank_stays_down_while_base_ruined() {
        let stage = stage();
        let base = stage.add_object(Base::new(Team::Red, Vec2::new(100.0, 100.0)));
        let tank = stage.add_object(Tank::new(
            Team::Red,
            Vec2::new(400.0, 400.0),
            base,
            Vec2::new(100.0, 100.0),
        ));
        stage.get_object(base).expect("base").lock().on_hit_by(&crate::sim::entity::Hit {
            team: Team::Blue,
            damage: 5000,
        });
        stage.with_tank(tank, |t| t.damage(1000));
        for _ in 0..(RESPAWN_LAG_TICKS + RESPAWN_ANIMATION_TICKS) * 3 {
            stage.update();
        }
        assert_eq!(stage.with_tank(tank, |t| t.state()), Some(TankState::None));
    }

    #[test]
    fn test_cues_are_collected() {
        let stage = stage();
        let blue = tank_at(&stage, Team::Blue, Vec2::new(300.0, 300.0));
        stage.add_object(Bullet::new(Vec2::new(280.0, 300.0), 0.0, Team::Red, None));
        stage.with_tank(blue, |t| t.damage(TANK_INITIAL_HP - BULLET_DAMAGE));
        stage.update();
        let cues = stage.drain_cues();
        assert!(cues.iter().any(|c| c.source == blue && c.cue == Cue::Explosion));
        assert!(cues.iter().any(|c| c.cue == Cue::Impact));
        assert!(stage.drain_cues().is_empty());
    }

    #[test]
    fn test_objects_added_concurrently_survive_updates() {
        let stage = Arc::new(stage());
        let writer = {
            let stage = Arc::clone(&stage);
            std::thread::spawn(move || {
                (0..200)
                    .map(|i| stage.add_object(Wall::new(Vec2::new(i as f32 * 40.0, 0.0))))
                    .collect::<Vec<_>>()
            })
        };
        for _ in 0..50 {
            stage.update();
        }
        let ids = writer.join().expect("writer thread");
        stage.update();
        for id in ids {
            assert!(stage.get_object(id).is_some());
        }
    }

    #[test]
    fn test_isolate_swallows_panics() {
        assert_eq!(isolate(EntityId(1), "update", || 5), Some(5));
        assert_eq!(isolate(EntityId(1), "update", || -> i32 { panic!("static") }), None);
        let owned = isolate(EntityId(2), "hit", || -> i32 {
            std::panic::panic_any(String::from("owned"))
        });
        assert_eq!(owned, None);
    }

    #[test]
    fn test_failed_update_does_not_stop_the_tick() {
        let stage = stage();
        let red = tank_at(&stage, Team::Red, Vec2::new(300.0, 300.0));
        let blue = tank_at(&stage, Team::Blue, Vec2::new(310.0, 300.0));
        let spent = stage.add_object(Bullet::with_life(
            Vec2::new(900.0, 700.0),
            0.0,
            Team::Red,
            None,
            0,
        ));
        stage.trip_wires.lock().push(red);

        let report = stage.update();
        assert_eq!(report.failures, 1);
        assert_eq!(report.removed, vec![spent]);
        assert_eq!(report.collisions, vec![(red, blue)]);
        assert!(position(&stage, blue).x > 310.0);

        // The wire is spent; the next tick runs clean
        assert_eq!(stage.update().failures, 0);
        assert!(stage.get_object(red).is_some());
    }

    proptest! {
        #[test]
        fn prop_collision_pairs_are_reported_once(
            positions in prop::collection::vec((0.0f32..200.0, 0.0f32..200.0), 2..10)
        ) {
            let stage = stage();
            let ids: Vec<_> = positions
                .iter()
                .map(|(x, y)| stage.add_object(Wall::new(Vec2::new(*x, *y))))
                .collect();
            let shapes: Vec<_> = ids
                .iter()
                .map(|id| stage.get_object(*id).expect("wall").lock().shape())
                .collect();

            let report = stage.update();

            let mut expected = Vec::new();
            for i in 0..ids.len() {
                for j in i + 1..ids.len() {
                    if shapes[i].intersects(&shapes[j]) {
                        expected.push((ids[i], ids[j]));
                    }
                }
            }
            prop_assert_eq!(report.collisions, expected);
        }

        #[test]
        fn prop_ids_strictly_increase(count in 1usize..40, sweeps in 0usize..5) {
            let stage = stage();
            let mut last = EntityId(0);
            for _ in 0..sweeps {
                let id = stage.add_object(Bullet::with_life(Vec2::ZERO, 0.0, Team::Red, None, 0));
                prop_assert!(id > last);
                last = id;
                stage.update();
            }
            for _ in 0..count {
                let id = stage.add_object(Wall::new(Vec2::ZERO));
                prop_assert!(id > last);
                last = id;
            }
        }
    }
}
