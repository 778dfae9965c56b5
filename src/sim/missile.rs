//! Charged missile
//!
//! A missile is held by its tank while charging; its damage ability grows with
//! charge time. Once launched it flies on its own and can be worn down by
//! incoming damage until it defuses and explodes harmlessly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::countdown::Countdown;
use super::entity::{
    Contact, Cue, EntityId, EntityKind, GameObject, Hit, RenderLayer, Team, UpdateContext,
};
use super::shape::Shape;
use crate::consts::*;
use crate::direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissileState {
    /// Held by the shooter, tethered to its gun
    Charging,
    /// Shooter died before launch
    Cancelled,
    Flying,
    Debris,
    ShouldRemove,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Missile {
    position: Vec2,
    angle: f32,
    team: Team,
    shooter: Option<EntityId>,
    state: MissileState,
    /// Ticks spent charging
    charge_ticks: u32,
    /// Counter-damage absorbed so far
    received: i32,
    flight: Countdown,
    debris: Countdown,
    #[serde(skip)]
    cues: Vec<Cue>,
}

impl Missile {
    /// Start a new charge at the shooter's gun
    pub fn charging(position: Vec2, angle: f32, team: Team, shooter: Option<EntityId>) -> Self {
        Self {
            position,
            angle,
            team,
            shooter,
            state: MissileState::Charging,
            charge_ticks: 0,
            received: 0,
            flight: Countdown::IDLE,
            debris: Countdown::IDLE,
            cues: Vec::new(),
        }
    }

    pub fn state(&self) -> MissileState {
        self.state
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn shooter(&self) -> Option<EntityId> {
        self.shooter
    }

    pub fn charge_ticks(&self) -> u32 {
        self.charge_ticks
    }

    /// Counter-damage absorbed while flying
    pub fn received_damage(&self) -> i32 {
        self.received
    }

    /// Damage accumulated by charging, before any counter-damage
    pub fn charged_damage(&self) -> i32 {
        let raw = self.charge_ticks as u64 * MISSILE_DAMAGE_PER_SECOND as u64
            / TICKS_PER_SECOND as u64;
        raw.min(MISSILE_MAX_DAMAGE as u64) as i32
    }

    /// Net damage this missile would deliver right now
    pub fn net_damage(&self) -> i32 {
        (self.charged_damage() - self.received).max(0)
    }

    /// Advance one charging tick, following the shooter's gun
    pub fn charge(&mut self, position: Vec2, angle: f32) {
        if self.state != MissileState::Charging {
            return;
        }
        self.position = position;
        self.angle = angle;
        self.charge_ticks = self.charge_ticks.saturating_add(1);
    }

    /// Release from the shooter
    pub fn launch(&mut self) {
        if self.state != MissileState::Charging {
            return;
        }
        self.state = MissileState::Flying;
        self.flight.arm(MISSILE_LIFE_TICKS);
        if self.net_damage() == 0 {
            // Released before gaining any damage
            self.explode();
        }
    }

    pub fn cancel(&mut self) {
        if self.state == MissileState::Charging {
            self.state = MissileState::Cancelled;
        }
    }

    /// Absorb counter-damage; explodes once nothing is left to deliver
    pub fn decrease_damage_ability(&mut self, amount: i32) {
        if amount <= 0 {
            return;
        }
        self.received = self.received.saturating_add(amount);
        if self.state == MissileState::Flying && self.net_damage() == 0 {
            log::debug!("missile defused after absorbing {}", self.received);
            self.explode();
        }
    }

    fn explode(&mut self) {
        if self.state == MissileState::Flying {
            self.state = MissileState::Debris;
            self.debris.arm(DEBRIS_TICKS);
            self.cues.push(Cue::Explosion);
        }
    }

    /// Visual radius; grows with the charged damage
    fn radius(&self) -> f32 {
        MISSILE_RADIUS * (1.0 + self.charged_damage() as f32 / MISSILE_MAX_DAMAGE as f32)
    }
}

impl GameObject for Missile {
    fn kind(&self) -> EntityKind {
        EntityKind::Missile
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn team(&self) -> Team {
        self.team
    }

    fn hp(&self) -> i32 {
        self.net_damage()
    }

    fn shape(&self) -> Shape {
        Shape::circle(self.position, self.radius())
    }

    fn has_rigid_body(&self) -> bool {
        self.state == MissileState::Flying
    }

    fn render_layer(&self) -> RenderLayer {
        match self.state {
            MissileState::Charging | MissileState::Flying => RenderLayer::Projectile,
            _ => RenderLayer::Debris,
        }
    }

    fn is_expired(&self) -> bool {
        matches!(
            self.state,
            MissileState::Cancelled | MissileState::ShouldRemove
        )
    }

    fn update(&mut self, _ctx: &UpdateContext) {
        match self.state {
            MissileState::Flying => {
                self.position += direction(self.angle) * MISSILE_SPEED;
                if self.flight.tick() {
                    self.explode();
                }
            }
            MissileState::Debris => {
                if !self.debris.is_running() || self.debris.tick() {
                    self.state = MissileState::ShouldRemove;
                }
            }
            MissileState::Charging | MissileState::Cancelled | MissileState::ShouldRemove => {}
        }
    }

    fn on_collision(&mut self, other: &Contact) -> Option<Hit> {
        if self.state != MissileState::Flying || other.team == self.team {
            return None;
        }
        let damage = self.net_damage();
        if other.kind.is_projectile() {
            // Trade damage; the other projectile's hit decides whether we survive
            return Some(Hit {
                team: self.team,
                damage,
            });
        }
        self.explode();
        (damage > 0).then_some(Hit {
            team: self.team,
            damage,
        })
    }

    fn on_hit_by(&mut self, hit: &Hit) {
        if hit.team != self.team {
            self.decrease_damage_ability(hit.damage);
        }
    }

    fn damage_ability(&self) -> Option<i32> {
        Some(self.net_damage())
    }

    fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }
}
