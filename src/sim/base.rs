//! Team base: the HP sink each side defends
//!
//! State is derived purely from hp and never recovers once it reaches RUINS.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::countdown::Countdown;
use super::entity::{Cue, EntityId, EntityKind, GameObject, Hit, RenderLayer, Team, UpdateContext};
use super::shape::Shape;
use crate::consts::*;
use crate::normalize_angle;

/// Display/tangibility state of a base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseState {
    Normal,
    Broken,
    Ruins,
}

impl BaseState {
    /// Ring decoration speed (radians per tick)
    fn ring_speed(self) -> f32 {
        match self {
            BaseState::Normal => 0.02,
            BaseState::Broken => 0.06,
            BaseState::Ruins => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Base {
    id: Option<EntityId>,
    position: Vec2,
    team: Team,
    hp: i32,
    state: BaseState,
    /// Cosmetic ring rotation
    ring_angle: f32,
    damage_flush: Countdown,
    #[serde(skip)]
    cues: Vec<Cue>,
}

impl Base {
    pub fn new(team: Team, position: Vec2) -> Self {
        Self {
            id: None,
            position,
            team,
            hp: BASE_INITIAL_HP,
            state: BaseState::Normal,
            ring_angle: 0.0,
            damage_flush: Countdown::IDLE,
            cues: Vec::new(),
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub fn state(&self) -> BaseState {
        self.state
    }

    pub fn ring_angle(&self) -> f32 {
        self.ring_angle
    }

    /// True for a few ticks after taking damage
    pub fn is_flushing(&self) -> bool {
        self.damage_flush.is_running()
    }

    pub fn damage(&mut self, amount: i32) {
        if self.state == BaseState::Ruins || amount <= 0 {
            return;
        }
        self.hp -= amount;
        self.damage_flush.arm(DAMAGE_FLUSH_TICKS);

        let next = Self::state_for(self.hp);
        if next != self.state {
            match next {
                BaseState::Broken => {
                    log::info!("{} base broken (hp {})", self.team.as_str(), self.hp);
                    self.cues.push(Cue::Crack);
                }
                BaseState::Ruins => {
                    log::info!("{} base destroyed", self.team.as_str());
                    self.cues.push(Cue::Explosion);
                }
                BaseState::Normal => {}
            }
            self.state = next;
        }
    }

    fn state_for(hp: i32) -> BaseState {
        if hp <= 0 {
            BaseState::Ruins
        } else if hp <= BASE_BROKEN_HP {
            BaseState::Broken
        } else {
            BaseState::Normal
        }
    }
}

impl GameObject for Base {
    fn kind(&self) -> EntityKind {
        EntityKind::Base
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
        Shape::circle(self.position, BASE_RADIUS)
    }

    fn has_rigid_body(&self) -> bool {
        self.state != BaseState::Ruins
    }

    fn render_layer(&self) -> RenderLayer {
        match self.state {
            BaseState::Ruins => RenderLayer::Debris,
            _ => RenderLayer::TangibleObject,
        }
    }

    fn is_expired(&self) -> bool {
        false
    }

    fn update(&mut self, _ctx: &UpdateContext) {
        self.damage_flush.tick();
        self.ring_angle = normalize_angle(self.ring_angle + self.state.ring_speed());
    }

    fn on_hit_by(&mut self, hit: &Hit) {
        if self.has_rigid_body() {
            self.damage(hit.damage);
        }
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }
}
