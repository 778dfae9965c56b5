//! Player tanks
//!
//! A tank is created once and reused for every life: dying sends it through
//! DEBRIS and NONE, and after the respawn lag it comes back at its base unless
//! that base has been reduced to ruins.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::base::BaseState;
use super::block::Block;
use super::bullet::Bullet;
use super::countdown::Countdown;
use super::entity::{
    Contact, Cue, EntityId, EntityKind, GameObject, Hit, RenderLayer, Team, UpdateContext,
};
use super::missile::{Missile, MissileState};
use super::shape::{Shape, push_out};
use crate::consts::*;
use crate::{angle_to, direction};

/// Lifecycle / display state of a tank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TankState {
    Respawning,
    Normal,
    Broken,
    Debris,
    /// Dead and invisible, waiting for the respawn lag
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    id: Option<EntityId>,
    team: Team,
    position: Vec2,
    /// Radians
    gun_angle: f32,
    hp: i32,
    state: TankState,
    /// Spawn base, looked up through the registry each tick
    base: EntityId,
    spawn_point: Vec2,
    had_broken: bool,
    held: Option<Missile>,
    /// Touched the friendly base during the last collision pass
    on_base: bool,
    damage_flush: Countdown,
    debris: Countdown,
    respawn_lag: Countdown,
    respawn_animation: Countdown,
    #[serde(skip)]
    cues: Vec<Cue>,
}

impl Tank {
    pub fn new(team: Team, position: Vec2, base: EntityId, spawn_point: Vec2) -> Self {
        Self {
            id: None,
            team,
            position,
            gun_angle: 0.0,
            hp: TANK_INITIAL_HP,
            state: TankState::Normal,
            base,
            spawn_point,
            had_broken: false,
            held: None,
            on_base: false,
            damage_flush: Countdown::IDLE,
            debris: Countdown::IDLE,
            respawn_lag: Countdown::IDLE,
            respawn_animation: Countdown::IDLE,
            cues: Vec::new(),
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub fn state(&self) -> TankState {
        self.state
    }

    pub fn gun_angle(&self) -> f32 {
        self.gun_angle
    }

    pub fn base(&self) -> EntityId {
        self.base
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn_point
    }

    pub fn is_on_base(&self) -> bool {
        self.on_base
    }

    pub fn is_flushing(&self) -> bool {
        self.damage_flush.is_running()
    }

    /// Alive and tangible
    pub fn is_alive(&self) -> bool {
        matches!(self.state, TankState::Normal | TankState::Broken)
    }

    pub fn held_missile(&self) -> Option<&Missile> {
        self.held.as_ref()
    }

    /// A charging missile locks movement and aiming
    pub fn is_charging(&self) -> bool {
        self.held
            .as_ref()
            .is_some_and(|m| m.state() == MissileState::Charging)
    }

    /// Distance from the center at which projectiles leave the tank
    pub fn bullet_release_radius() -> f32 {
        (GUN_LENGTH / 2.0).max(TANK_WIDTH.max(TANK_HEIGHT) / 2.0)
    }

    fn muzzle(&self, clearance: f32) -> Vec2 {
        self.position + direction(self.gun_angle) * (Self::bullet_release_radius() + clearance)
    }

    pub fn aim_at(&mut self, point: Vec2) {
        if self.is_charging() {
            return;
        }
        self.gun_angle = angle_to(self.position, point);
    }

    /// Move one tick in the direction of `input`; magnitude is ignored
    pub fn move_by(&mut self, input: Vec2) {
        if self.is_charging() || !self.is_alive() {
            return;
        }
        if let Some(dir) = input.try_normalize() {
            self.position += dir * TANK_VELOCITY;
        }
    }

    /// Absolute position sync from a remote peer
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn shoot_bullet(&self) -> Option<Bullet> {
        if !self.is_alive() {
            return None;
        }
        Some(Bullet::new(
            self.muzzle(BULLET_RADIUS),
            self.gun_angle,
            self.team,
            self.id,
        ))
    }

    /// Begin charging a missile. Returns false if one is already held or the tank is dead.
    pub fn start_energy_charge(&mut self) -> bool {
        if !self.is_alive() || self.held.is_some() {
            return false;
        }
        self.held = Some(Missile::charging(
            self.muzzle(MISSILE_RADIUS),
            self.gun_angle,
            self.team,
            self.id,
        ));
        true
    }

    /// Release the held missile; the caller registers it with the stage
    pub fn finish_energy_charge(&mut self) -> Option<Missile> {
        let mut missile = self.held.take()?;
        if missile.state() != MissileState::Charging {
            return None;
        }
        missile.launch();
        Some(missile)
    }

    /// A new block in front of the gun, unless standing on the friendly base
    pub fn create_block(&self) -> Option<Block> {
        if !self.is_alive() || self.on_base {
            return None;
        }
        Some(Block::new(self.muzzle(BLOCK_SIZE / 2.0), true))
    }

    pub fn damage(&mut self, amount: i32) {
        if !self.is_alive() || amount <= 0 {
            return;
        }
        self.hp -= amount;
        self.damage_flush.arm(DAMAGE_FLUSH_TICKS);
        if self.hp <= 0 {
            self.on_die();
        } else if self.hp < TANK_INITIAL_HP / 2 && !self.had_broken {
            self.had_broken = true;
            self.state = TankState::Broken;
            self.cues.push(Cue::Crack);
        }
    }

    fn on_die(&mut self) {
        log::info!(
            "{} tank {} destroyed",
            self.team.as_str(),
            self.id.map_or(-1, |id| id.0 as i64)
        );
        self.state = TankState::Debris;
        self.debris.arm(DEBRIS_TICKS);
        self.respawn_lag.arm(RESPAWN_LAG_TICKS);
        if let Some(missile) = self.held.as_mut() {
            missile.cancel();
        }
        self.cues.push(Cue::Explosion);
    }

    /// Reset health and position for a new life
    pub fn respawn(&mut self) {
        self.hp = TANK_INITIAL_HP;
        self.position = self.spawn_point;
        self.had_broken = false;
        self.held = None;
        self.state = TankState::Normal;
    }

    fn scale(&self) -> f32 {
        match self.state {
            TankState::Respawning => self.respawn_animation.progress(RESPAWN_ANIMATION_TICKS),
            _ => 1.0,
        }
    }
}

impl GameObject for Tank {
    fn kind(&self) -> EntityKind {
        EntityKind::Tank
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn team(&self) -> Team {
        self.team
    }

    fn hp(&self) -> i32 {
        self.hp
    }

    fn shape(&self) -> Shape {
        let scale = self.scale();
        Shape::rect(self.position, TANK_WIDTH * scale, TANK_HEIGHT * scale)
    }

    fn has_rigid_body(&self) -> bool {
        self.is_alive()
    }

    fn render_layer(&self) -> RenderLayer {
        match self.state {
            TankState::Debris | TankState::None => RenderLayer::Debris,
            _ => RenderLayer::TangibleObject,
        }
    }

    fn is_expired(&self) -> bool {
        false
    }

    fn update(&mut self, ctx: &UpdateContext) {
        self.on_base = false;
        self.damage_flush.tick();

        match self.state {
            TankState::Normal | TankState::Broken => {
                let muzzle = self.muzzle(MISSILE_RADIUS);
                let angle = self.gun_angle;
                if let Some(missile) = self.held.as_mut() {
                    missile.charge(muzzle, angle);
                }
            }
            TankState::Debris => {
                if self.held.as_ref().is_some_and(|m| m.is_expired()) {
                    self.held = None;
                }
                self.respawn_lag.tick();
                if self.debris.tick() {
                    self.state = TankState::None;
                }
            }
            TankState::None => {
                self.respawn_lag.tick();
                let base_standing = ctx
                    .base(self.base)
                    .is_some_and(|b| b.state != BaseState::Ruins);
                if !self.respawn_lag.is_running() && base_standing {
                    self.state = TankState::Respawning;
                    self.position = self.spawn_point;
                    self.respawn_animation.arm(RESPAWN_ANIMATION_TICKS);
                }
            }
            TankState::Respawning => {
                if self.respawn_animation.tick() {
                    self.respawn();
                    self.cues.push(Cue::Respawn);
                    log::info!("{} tank respawned", self.team.as_str());
                }
            }
        }
    }

    fn on_collision(&mut self, other: &Contact) -> Option<Hit> {
        if !self.is_alive() {
            return None;
        }
        if other.team == self.team {
            match other.kind {
                EntityKind::Bullet | EntityKind::Missile => return None,
                EntityKind::Base => {
                    self.on_base = true;
                    return None;
                }
                _ => {}
            }
        }
        self.position += push_out(&self.shape(), &other.shape, other.separation);
        None
    }

    fn on_hit_by(&mut self, hit: &Hit) {
        if !self.is_alive() || hit.team == self.team {
            return;
        }
        self.damage(hit.damage);
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::BaseStatus;
    use proptest::prelude::*;

    const BASE: EntityId = EntityId(1);

    fn tank(team: Team) -> Tank {
        Tank::new(team, Vec2::new(100.0, 100.0), BASE, Vec2::new(50.0, 50.0))
    }

    fn ctx_with_base(state: BaseState) -> UpdateContext {
        let mut ctx = UpdateContext::default();
        ctx.bases.insert(
            BASE,
            BaseStatus {
                state,
                position: Vec2::new(50.0, 50.0),
            },
        );
        ctx
    }

    fn contact(team: Team, kind: EntityKind, separation: Vec2) -> Contact {
        let position = Vec2::new(100.0, 100.0) - separation;
        Contact {
            id: EntityId(50),
            kind,
            team,
            position,
            shape: match kind {
                EntityKind::Bullet | EntityKind::Missile => Shape::circle(position, BULLET_RADIUS),
                EntityKind::Base => Shape::circle(position, BASE_RADIUS),
                _ => Shape::rect(position, TANK_WIDTH, TANK_HEIGHT),
            },
            separation,
            damage_ability: None,
        }
    }

    fn kill(tank: &mut Tank) {
        tank.on_hit_by(&Hit {
            team: Team::Obstacle,
            damage: TANK_INITIAL_HP,
        });
    }

    #[test]
    fn test_move_is_normalized() {
        let mut t = tank(Team::Red);
        t.move_by(Vec2::new(1.0, 1.0));
        let moved = t.position() - Vec2::new(100.0, 100.0);
        assert!((moved.length() - TANK_VELOCITY).abs() < 1e-4);
    }

    #[test]
    fn test_charging_locks_move_and_aim() {
        let mut t = tank(Team::Red);
        t.aim_at(Vec2::new(200.0, 100.0));
        assert!(t.start_energy_charge());
        assert!(t.is_charging());
        t.move_by(Vec2::X);
        t.aim_at(Vec2::new(100.0, 300.0));
        assert_eq!(t.position(), Vec2::new(100.0, 100.0));
        assert_eq!(t.gun_angle(), 0.0);

        let missile = t.finish_energy_charge().expect("held missile");
        assert_eq!(missile.state(), MissileState::Debris);
        assert!(!t.is_charging());
        t.move_by(Vec2::X);
        assert!(t.position().x > 100.0);
    }

    #[test]
    fn test_charge_grows_with_ticks() {
        let ctx = ctx_with_base(BaseState::Normal);
        let mut t = tank(Team::Blue);
        assert!(t.start_energy_charge());
        for _ in 0..3 * TICKS_PER_SECOND {
            t.update(&ctx);
        }
        let missile = t.finish_energy_charge().expect("held missile");
        assert_eq!(missile.state(), MissileState::Flying);
        assert_eq!(missile.net_damage(), 30);
        assert_eq!(missile.team(), Team::Blue);
    }

    #[test]
    fn test_finish_without_charge_is_noop() {
        let mut t = tank(Team::Red);
        assert!(t.finish_energy_charge().is_none());
    }

    #[test]
    fn test_second_charge_keeps_first_missile() {
        let ctx = ctx_with_base(BaseState::Normal);
        let mut t = tank(Team::Red);
        assert!(t.start_energy_charge());
        t.update(&ctx);
        assert!(!t.start_energy_charge());
        assert_eq!(t.held_missile().map(|m| m.charge_ticks()), Some(1));
    }

    #[test]
    fn test_bullet_spawns_outside_own_hitbox() {
        let mut t = tank(Team::Red);
        for angle in [0.0f32, 0.7, 1.5, 3.0, -2.0] {
            t.aim_at(t.position() + direction(angle) * 10.0);
            let bullet = t.shoot_bullet().expect("alive tank shoots");
            let distance = bullet.position().distance(t.position());
            assert!(
                (distance - (Tank::bullet_release_radius() + BULLET_RADIUS)).abs() < 1e-3
            );
            assert_eq!(bullet.team(), Team::Red);
        }
    }

    #[test]
    fn test_friendly_projectile_passes_through() {
        let mut t = tank(Team::Red);
        let before = t.position();
        let c = contact(Team::Red, EntityKind::Bullet, Vec2::new(5.0, 0.0));
        assert!(t.on_collision(&c).is_none());
        t.on_hit_by(&Hit {
            team: Team::Red,
            damage: BULLET_DAMAGE,
        });
        assert_eq!(t.position(), before);
        assert_eq!(t.hp(), TANK_INITIAL_HP);
    }

    #[test]
    fn test_friendly_base_sets_on_base_without_push() {
        let ctx = ctx_with_base(BaseState::Normal);
        let mut t = tank(Team::Red);
        let before = t.position();
        t.on_collision(&contact(Team::Red, EntityKind::Base, Vec2::new(10.0, 0.0)));
        assert!(t.is_on_base());
        assert_eq!(t.position(), before);
        assert!(t.create_block().is_none());

        // Recomputed every tick
        t.update(&ctx);
        assert!(!t.is_on_base());
        assert!(t.create_block().is_some());
    }

    #[test]
    fn test_enemy_base_pushes_out() {
        let mut t = tank(Team::Red);
        t.on_collision(&contact(Team::Blue, EntityKind::Base, Vec2::new(30.0, 0.0)));
        assert!(t.position().x > 100.0);
        assert_eq!(t.position().y, 100.0);
    }

    #[test]
    fn test_crack_fires_once_per_life() {
        let mut t = tank(Team::Red);
        let hit = Hit {
            team: Team::Blue,
            damage: 15,
        };
        t.on_hit_by(&hit);
        assert_eq!(t.state(), TankState::Normal);
        t.on_hit_by(&hit);
        assert_eq!(t.state(), TankState::Broken);
        t.on_hit_by(&Hit {
            team: Team::Blue,
            damage: 1,
        });
        assert_eq!(t.drain_cues(), vec![Cue::Crack]);
    }

    #[test]
    fn test_death_and_respawn_cycle() {
        let ctx = ctx_with_base(BaseState::Broken);
        let mut t = tank(Team::Red);
        kill(&mut t);
        assert_eq!(t.state(), TankState::Debris);
        assert!(!t.has_rigid_body());
        assert!(t.shoot_bullet().is_none());

        for _ in 0..DEBRIS_TICKS {
            t.update(&ctx);
        }
        assert_eq!(t.state(), TankState::None);

        for _ in DEBRIS_TICKS..RESPAWN_LAG_TICKS {
            t.update(&ctx);
        }
        assert_eq!(t.state(), TankState::Respawning);
        assert!(!t.has_rigid_body());

        for _ in 0..RESPAWN_ANIMATION_TICKS {
            t.update(&ctx);
        }
        assert_eq!(t.state(), TankState::Normal);
        assert_eq!(t.hp(), TANK_INITIAL_HP);
        assert_eq!(t.position(), t.spawn_point());
        assert!(t.drain_cues().contains(&Cue::Respawn));
    }

    #[test]
    fn test_ruined_base_blocks_respawn_forever() {
        let ctx = ctx_with_base(BaseState::Ruins);
        let mut t = tank(Team::Blue);
        kill(&mut t);
        for _ in 0..10 * RESPAWN_LAG_TICKS {
            t.update(&ctx);
            assert_ne!(t.state(), TankState::Normal);
            assert_ne!(t.state(), TankState::Respawning);
        }
        assert_eq!(t.state(), TankState::None);
    }

    #[test]
    fn test_death_cancels_held_missile() {
        let ctx = ctx_with_base(BaseState::Normal);
        let mut t = tank(Team::Red);
        assert!(t.start_energy_charge());
        kill(&mut t);
        assert_eq!(
            t.held_missile().map(|m| m.state()),
            Some(MissileState::Cancelled)
        );
        t.update(&ctx);
        assert!(t.held_missile().is_none());
        assert!(t.finish_energy_charge().is_none());
    }

    proptest! {
        #[test]
        fn prop_tank_damage_is_monotonic(hits in prop::collection::vec(1i32..30, 1..12)) {
            let mut t = tank(Team::Red);
            for d in hits {
                let before = t.hp();
                let alive = t.is_alive();
                t.on_hit_by(&Hit { team: Team::Blue, damage: d });
                if alive {
                    prop_assert!(t.hp() < before);
                } else {
                    prop_assert_eq!(t.hp(), before);
                }
            }
        }
    }
}
