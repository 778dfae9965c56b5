//! Straight-line bullet with a fixed damage and lifetime

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{
    Contact, Cue, EntityId, EntityKind, GameObject, Hit, RenderLayer, Team, UpdateContext,
};
use super::shape::Shape;
use crate::consts::*;
use crate::direction;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    position: Vec2,
    velocity: Vec2,
    /// Captured from the shooter at creation; never looked up again
    team: Team,
    shooter: Option<EntityId>,
    /// Ticks of flight left; zero means exploded
    life: u32,
    expired: bool,
    #[serde(skip)]
    cues: Vec<Cue>,
}

impl Bullet {
    pub fn new(position: Vec2, angle: f32, team: Team, shooter: Option<EntityId>) -> Self {
        Self::with_life(position, angle, team, shooter, BULLET_LIFE_TICKS)
    }

    pub fn with_life(
        position: Vec2,
        angle: f32,
        team: Team,
        shooter: Option<EntityId>,
        life: u32,
    ) -> Self {
        Self {
            position,
            velocity: direction(angle) * BULLET_SPEED,
            team,
            shooter,
            life,
            expired: false,
            cues: Vec::new(),
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn shooter(&self) -> Option<EntityId> {
        self.shooter
    }

    pub fn remaining_life(&self) -> u32 {
        self.life
    }

    pub fn is_exploded(&self) -> bool {
        self.life == 0
    }

    fn explode(&mut self) {
        if self.life > 0 {
            self.life = 0;
            self.cues.push(Cue::Impact);
        }
    }
}

impl GameObject for Bullet {
    fn kind(&self) -> EntityKind {
        EntityKind::Bullet
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn team(&self) -> Team {
        self.team
    }

    fn hp(&self) -> i32 {
        0
    }

    fn shape(&self) -> Shape {
        Shape::circle(self.position, BULLET_RADIUS)
    }

    fn has_rigid_body(&self) -> bool {
        self.life > 0
    }

    fn render_layer(&self) -> RenderLayer {
        if self.life > 0 {
            RenderLayer::Projectile
        } else {
            RenderLayer::Debris
        }
    }

    fn is_expired(&self) -> bool {
        self.expired
    }

    fn update(&mut self, _ctx: &UpdateContext) {
        if self.life == 0 {
            // Debris lasts one tick after the explosion
            self.expired = true;
            return;
        }
        self.position += self.velocity;
        self.life -= 1;
        if self.life == 0 {
            self.cues.push(Cue::Impact);
        }
    }

    fn on_collision(&mut self, other: &Contact) -> Option<Hit> {
        if self.life == 0 || other.team == self.team {
            return None;
        }
        self.explode();
        Some(Hit {
            team: self.team,
            damage: BULLET_DAMAGE,
        })
    }

    fn damage_ability(&self) -> Option<i32> {
        Some(BULLET_DAMAGE)
    }

    fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }
}
