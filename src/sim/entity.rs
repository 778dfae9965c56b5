//! The common entity contract
//!
//! Every simulated object implements [`GameObject`]. The registry stores the
//! closed [`Entity`] sum type so the stage and renderers can reason
//! exhaustively about kinds, shapes and render layers.

use std::collections::HashMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::base::{Base, BaseState};
use super::block::Block;
use super::bullet::Bullet;
use super::missile::Missile;
use super::shape::Shape;
use super::tank::Tank;
use super::wall::Wall;

/// Registry address of an entity. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Side an entity fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Red,
    Blue,
    /// Blocks and walls
    Obstacle,
}

impl Team {
    /// The opposing fighting team (obstacles have none)
    pub fn opponent(self) -> Option<Team> {
        match self {
            Team::Red => Some(Team::Blue),
            Team::Blue => Some(Team::Red),
            Team::Obstacle => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Red => "RED",
            Team::Blue => "BLUE",
            Team::Obstacle => "OBSTACLE",
        }
    }
}

/// Paint-order bucket; lower layers are drawn first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenderLayer {
    Debris,
    Projectile,
    TangibleObject,
}

/// Concrete kind of a registered entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Tank,
    Base,
    Bullet,
    Missile,
    Block,
    Wall,
}

impl EntityKind {
    #[inline]
    pub fn is_projectile(self) -> bool {
        matches!(self, EntityKind::Bullet | EntityKind::Missile)
    }
}

/// Presentation events for the sound/effects collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// A tank, base or block crossed into its broken look
    Crack,
    /// Something was destroyed
    Explosion,
    /// A projectile exploded on impact or timeout
    Impact,
    /// A tank finished respawning
    Respawn,
    /// A tank fired a bullet
    Shot,
}

/// Damage delivered by a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub team: Team,
    pub damage: i32,
}

/// What one side of a colliding pair sees of the other side
///
/// Taken before either callback runs, so dispatch order between the two
/// sides cannot change the outcome.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub id: EntityId,
    pub kind: EntityKind,
    pub team: Team,
    pub position: Vec2,
    pub shape: Shape,
    /// `receiver.center - other.center`, never zero
    pub separation: Vec2,
    /// Set when the other side is a projectile
    pub damage_ability: Option<i32>,
}

/// Snapshot of a base as seen by the tanks that spawn there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseStatus {
    pub state: BaseState,
    pub position: Vec2,
}

/// Read-only view of the registry handed to every entity update
#[derive(Debug, Clone, Default)]
pub struct UpdateContext {
    pub bases: HashMap<EntityId, BaseStatus>,
}

impl UpdateContext {
    pub fn base(&self, id: EntityId) -> Option<&BaseStatus> {
        self.bases.get(&id)
    }
}

/// Capability set shared by every simulated object
pub trait GameObject {
    fn kind(&self) -> EntityKind;
    fn position(&self) -> Vec2;
    fn team(&self) -> Team;
    /// Current health
    fn hp(&self) -> i32;
    /// Collision shape derived from position and current visual scale
    fn shape(&self) -> Shape;
    /// Whether the entity currently participates in collision
    fn has_rigid_body(&self) -> bool;
    fn render_layer(&self) -> RenderLayer;
    /// True once the entity must leave the registry
    fn is_expired(&self) -> bool;
    /// Advance one tick
    fn update(&mut self, ctx: &UpdateContext);

    /// Called once per tick for every overlapping rigid-body partner.
    /// Returns the damage this entity inflicts on `other`, if any.
    fn on_collision(&mut self, _other: &Contact) -> Option<Hit> {
        None
    }

    fn on_hit_by(&mut self, _hit: &Hit) {}

    /// Damage this entity would deliver on impact (projectiles only)
    fn damage_ability(&self) -> Option<i32> {
        None
    }

    /// Called by the stage when the entity receives its registry id
    fn assign_id(&mut self, _id: EntityId) {}

    /// Take the presentation cues raised since the last call
    fn drain_cues(&mut self) -> Vec<Cue> {
        Vec::new()
    }
}

/// Closed set of registry entities
#[derive(Debug, Clone)]
pub enum Entity {
    Tank(Tank),
    Base(Base),
    Bullet(Bullet),
    Missile(Missile),
    Block(Block),
    Wall(Wall),
}

macro_rules! each_variant {
    ($entity:expr, $inner:ident => $body:expr) => {
        match $entity {
            Entity::Tank($inner) => $body,
            Entity::Base($inner) => $body,
            Entity::Bullet($inner) => $body,
            Entity::Missile($inner) => $body,
            Entity::Block($inner) => $body,
            Entity::Wall($inner) => $body,
        }
    };
}

impl GameObject for Entity {
    fn kind(&self) -> EntityKind {
        each_variant!(self, e => e.kind())
    }

    fn position(&self) -> Vec2 {
        each_variant!(self, e => e.position())
    }

    fn team(&self) -> Team {
        each_variant!(self, e => e.team())
    }

    fn hp(&self) -> i32 {
        each_variant!(self, e => e.hp())
    }

    fn shape(&self) -> Shape {
        each_variant!(self, e => e.shape())
    }

    fn has_rigid_body(&self) -> bool {
        each_variant!(self, e => e.has_rigid_body())
    }

    fn render_layer(&self) -> RenderLayer {
        each_variant!(self, e => e.render_layer())
    }

    fn is_expired(&self) -> bool {
        each_variant!(self, e => e.is_expired())
    }

    fn update(&mut self, ctx: &UpdateContext) {
        each_variant!(self, e => e.update(ctx))
    }

    fn on_collision(&mut self, other: &Contact) -> Option<Hit> {
        each_variant!(self, e => e.on_collision(other))
    }

    fn on_hit_by(&mut self, hit: &Hit) {
        each_variant!(self, e => e.on_hit_by(hit))
    }

    fn damage_ability(&self) -> Option<i32> {
        each_variant!(self, e => e.damage_ability())
    }

    fn assign_id(&mut self, id: EntityId) {
        each_variant!(self, e => e.assign_id(id))
    }

    fn drain_cues(&mut self) -> Vec<Cue> {
        each_variant!(self, e => e.drain_cues())
    }
}

impl Entity {
    /// Describe this entity to a collision partner
    pub fn contact(&self, id: EntityId, separation: Vec2) -> Contact {
        Contact {
            id,
            kind: self.kind(),
            team: self.team(),
            position: self.position(),
            shape: self.shape(),
            separation,
            damage_ability: self.damage_ability(),
        }
    }

    pub fn as_tank(&self) -> Option<&Tank> {
        match self {
            Entity::Tank(tank) => Some(tank),
            _ => None,
        }
    }

    pub fn as_tank_mut(&mut self) -> Option<&mut Tank> {
        match self {
            Entity::Tank(tank) => Some(tank),
            _ => None,
        }
    }

    pub fn as_base(&self) -> Option<&Base> {
        match self {
            Entity::Base(base) => Some(base),
            _ => None,
        }
    }
}

impl From<Tank> for Entity {
    fn from(tank: Tank) -> Self {
        Entity::Tank(tank)
    }
}

impl From<Base> for Entity {
    fn from(base: Base) -> Self {
        Entity::Base(base)
    }
}

impl From<Bullet> for Entity {
    fn from(bullet: Bullet) -> Self {
        Entity::Bullet(bullet)
    }
}

impl From<Missile> for Entity {
    fn from(missile: Missile) -> Self {
        Entity::Missile(missile)
    }
}

impl From<Block> for Entity {
    fn from(block: Block) -> Self {
        Entity::Block(block)
    }
}

impl From<Wall> for Entity {
    fn from(wall: Wall) -> Self {
        Entity::Wall(wall)
    }
}
