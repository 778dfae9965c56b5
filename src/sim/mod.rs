//! Stage simulation
//!
//! All gameplay logic lives here:
//! - Fixed timestep only; one `Stage::update` per tick
//! - Stable iteration order (by entity id)
//! - No rendering, audio or network dependencies

pub mod base;
pub mod block;
pub mod bullet;
pub mod command;
pub mod countdown;
pub mod entity;
pub mod generator;
pub mod missile;
pub mod shape;
pub mod stage;
pub mod tank;
pub mod wall;

pub use base::{Base, BaseState};
pub use block::{Block, BlockState};
pub use bullet::Bullet;
pub use command::{Applied, Command};
pub use countdown::Countdown;
pub use entity::{
    Contact, Cue, Entity, EntityId, EntityKind, GameObject, Hit, RenderLayer, Team, UpdateContext,
};
pub use generator::{DemoGenerator, MatchGenerator, StageGenerator, StageLayout, TutorialGenerator};
pub use missile::{Missile, MissileState};
pub use shape::Shape;
pub use stage::{CueEvent, EntityRef, MatchOutcome, Stage, TickReport};
pub use tank::{Tank, TankState};
pub use wall::Wall;
