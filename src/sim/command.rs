//! Tank commands addressed by registry id
//!
//! These are the mutators a remote peer may trigger. Local input goes through
//! the same path so both sides of a match run identical logic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Cue, Entity, EntityId, GameObject};
use super::stage::{CueEvent, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Absolute position sync
    Locate { tank: EntityId, position: Vec2 },
    Shoot { tank: EntityId },
    StartCharge { tank: EntityId },
    FinishCharge { tank: EntityId },
    /// Point the gun at a target
    Aim { tank: EntityId, target: Vec2 },
    PlaceBlock { tank: EntityId },
}

impl Command {
    /// The tank this command drives
    pub fn tank(&self) -> EntityId {
        match *self {
            Command::Locate { tank, .. }
            | Command::Shoot { tank }
            | Command::StartCharge { tank }
            | Command::FinishCharge { tank }
            | Command::Aim { tank, .. }
            | Command::PlaceBlock { tank } => tank,
        }
    }
}

/// What applying a command did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Tank state changed, nothing new registered
    Updated,
    /// A bullet, missile or block was registered under this id
    Spawned(EntityId),
    /// The tank refused (dead, on its base, nothing held, ...)
    Refused,
    /// No tank under that id; it may already be gone
    Missing,
}

impl Stage {
    /// Run a command against the addressed tank
    ///
    /// Only one entity lock is held at a time, and it is released before any
    /// spawned object is registered.
    pub fn apply(&self, command: &Command) -> Applied {
        let tank_id = command.tank();
        let step = self.with_tank(tank_id, |tank| match *command {
            Command::Locate { position, .. } => {
                tank.set_position(position);
                Step::Updated
            }
            Command::Aim { target, .. } => {
                tank.aim_at(target);
                Step::Updated
            }
            Command::StartCharge { .. } => {
                if tank.start_energy_charge() {
                    Step::Updated
                } else {
                    Step::Spawn(None)
                }
            }
            Command::Shoot { .. } => Step::Spawn(tank.shoot_bullet().map(Entity::from)),
            Command::FinishCharge { .. } => {
                Step::Spawn(tank.finish_energy_charge().map(Entity::from))
            }
            Command::PlaceBlock { .. } => Step::Spawn(tank.create_block().map(Entity::from)),
        });

        match step {
            None => {
                log::debug!("command for missing tank {tank_id} dropped");
                Applied::Missing
            }
            Some(Step::Updated) => Applied::Updated,
            Some(Step::Spawn(Some(entity))) => {
                if let Command::Shoot { .. } = command {
                    self.raise_cue(CueEvent {
                        source: tank_id,
                        cue: Cue::Shot,
                        position: entity.position(),
                    });
                }
                Applied::Spawned(self.add_object(entity))
            }
            Some(Step::Spawn(None)) => Applied::Refused,
        }
    }
}

enum Step {
    Updated,
    Spawn(Option<Entity>),
}
