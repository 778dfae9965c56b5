//! Initial stage layouts
//!
//! A generator registers the starting entities of a stage. Tanks are always
//! registered after both bases, alternating red and blue, so a peer's client
//! number picks the same tank on every machine.

use glam::Vec2;

use super::base::Base;
use super::block::Block;
use super::entity::{EntityId, Team};
use super::stage::Stage;
use super::tank::Tank;
use super::wall::Wall;
use crate::consts::*;

/// Ids of the entities a generator created
#[derive(Debug, Clone, PartialEq)]
pub struct StageLayout {
    pub width: f32,
    pub height: f32,
    pub red_base: EntityId,
    pub blue_base: EntityId,
    /// Tanks in registration order
    pub tanks: Vec<EntityId>,
}

impl StageLayout {
    /// The tank a peer with `client_number` drives
    pub fn tank_for_client(&self, client_number: usize) -> Option<EntityId> {
        if self.tanks.is_empty() {
            return None;
        }
        Some(self.tanks[client_number % self.tanks.len()])
    }
}

pub trait StageGenerator {
    /// Stage size in pixels
    fn dimensions(&self) -> Vec2 {
        Vec2::new(STAGE_WIDTH, STAGE_HEIGHT)
    }

    /// Register the starting entities on an empty stage
    fn generate(&self, stage: &Stage) -> StageLayout;
}

/// Two bases, `tanks_per_team` tanks a side, a walled arena with a braced center
#[derive(Debug, Clone, Copy)]
pub struct MatchGenerator {
    pub tanks_per_team: usize,
}

impl Default for MatchGenerator {
    fn default() -> Self {
        Self { tanks_per_team: 2 }
    }
}

/// One tank a side in an open ring; driven by bots on the title screen
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoGenerator;

/// A single red tank and a row of blocks to practice on
#[derive(Debug, Clone, Copy, Default)]
pub struct TutorialGenerator;

impl StageGenerator for MatchGenerator {
    fn generate(&self, stage: &Stage) -> StageLayout {
        let size = self.dimensions();
        stage.add_objects(perimeter(size));
        stage.add_objects(bracing(size));
        let (red_base, blue_base) = bases(stage, size);
        let tanks = tanks(stage, size, red_base, blue_base, self.tanks_per_team, true);
        StageLayout {
            width: size.x,
            height: size.y,
            red_base,
            blue_base,
            tanks,
        }
    }
}

impl StageGenerator for DemoGenerator {
    fn generate(&self, stage: &Stage) -> StageLayout {
        let size = self.dimensions();
        stage.add_objects(perimeter(size));
        let (red_base, blue_base) = bases(stage, size);
        let tanks = tanks(stage, size, red_base, blue_base, 1, true);
        StageLayout {
            width: size.x,
            height: size.y,
            red_base,
            blue_base,
            tanks,
        }
    }
}

impl StageGenerator for TutorialGenerator {
    fn generate(&self, stage: &Stage) -> StageLayout {
        let size = self.dimensions();
        stage.add_objects(perimeter(size));
        let center = size / 2.0;
        let rows = 7;
        let top = center.y - (rows as f32 - 1.0) / 2.0 * BLOCK_SIZE;
        stage.add_objects(
            (0..rows).map(|i| Block::new(Vec2::new(center.x, top + i as f32 * BLOCK_SIZE), false)),
        );
        let (red_base, blue_base) = bases(stage, size);
        let tanks = tanks(stage, size, red_base, blue_base, 1, false);
        StageLayout {
            width: size.x,
            height: size.y,
            red_base,
            blue_base,
            tanks,
        }
    }
}

fn base_position(team: Team, size: Vec2) -> Vec2 {
    let inset = size.x / 8.0;
    match team {
        Team::Blue => Vec2::new(size.x - inset, size.y / 2.0),
        _ => Vec2::new(inset, size.y / 2.0),
    }
}

fn bases(stage: &Stage, size: Vec2) -> (EntityId, EntityId) {
    let red = stage.add_object(Base::new(Team::Red, base_position(Team::Red, size)));
    let blue = stage.add_object(Base::new(Team::Blue, base_position(Team::Blue, size)));
    (red, blue)
}

/// Tanks start in a column in front of their base and respawn on it
fn tanks(
    stage: &Stage,
    size: Vec2,
    red_base: EntityId,
    blue_base: EntityId,
    per_team: usize,
    with_blue: bool,
) -> Vec<EntityId> {
    let spacing = TANK_HEIGHT * 2.0;
    let mut ids = Vec::new();
    for i in 0..per_team {
        let offset = (i as f32 - (per_team as f32 - 1.0) / 2.0) * spacing;
        let sides: &[(Team, EntityId, f32)] = if with_blue {
            &[(Team::Red, red_base, 1.0), (Team::Blue, blue_base, -1.0)]
        } else {
            &[(Team::Red, red_base, 1.0)]
        };
        for &(team, base, facing) in sides {
            let home = base_position(team, size);
            let start = home + Vec2::new(facing * (BASE_RADIUS + TANK_WIDTH), offset);
            let mut tank = Tank::new(team, start, base, home);
            tank.aim_at(Vec2::new(size.x / 2.0, start.y));
            ids.push(stage.add_object(tank));
        }
    }
    ids
}

/// Tiles from `from` toward `to`, one `WALL_SIZE` apart, never past `to`
fn wall_line(from: Vec2, to: Vec2) -> impl Iterator<Item = Wall> {
    let steps = ((to - from).length() / WALL_SIZE + 1e-3).floor() as usize;
    let step = (to - from).normalize_or_zero() * WALL_SIZE;
    (0..=steps).map(move |i| Wall::new(from + step * i as f32))
}

/// Square tiles covering `length` along `axis` from `start`; a shorter tile
/// fills whatever is left at the far end
fn wall_run(start: Vec2, axis: Vec2, length: f32) -> Vec<Wall> {
    let full = (length / WALL_SIZE + 1e-3).floor() as usize;
    let mut walls: Vec<Wall> = (0..full)
        .map(|i| Wall::new(start + axis * WALL_SIZE * (i as f32 + 0.5)))
        .collect();
    let rest = length - full as f32 * WALL_SIZE;
    if rest > 1e-3 {
        let across = Vec2::ONE - axis.abs();
        let size = axis.abs() * rest + across * WALL_SIZE;
        walls.push(Wall::sized(start + axis * (length - rest / 2.0), size));
    }
    walls
}

/// A ring of tiles along the stage edges; the side columns fit between the
/// top and bottom rows
fn perimeter(size: Vec2) -> Vec<Wall> {
    let h = WALL_SIZE / 2.0;
    let column = size.y - 2.0 * WALL_SIZE;
    let mut walls = wall_run(Vec2::new(0.0, h), Vec2::X, size.x);
    walls.extend(wall_run(Vec2::new(0.0, size.y - h), Vec2::X, size.x));
    walls.extend(wall_run(Vec2::new(h, WALL_SIZE), Vec2::Y, column));
    walls.extend(wall_run(Vec2::new(size.x - h, WALL_SIZE), Vec2::Y, column));
    walls
}

/// A cross through the center with a gap at the crossing and at each arm's end
fn bracing(size: Vec2) -> Vec<Wall> {
    let center = size / 2.0;
    let gap = WALL_SIZE * 2.5;
    let arm_v = size.y / 4.0;
    let arm_h = size.x / 8.0;
    let mut walls = Vec::new();
    for sign in [-1.0f32, 1.0] {
        walls.extend(wall_line(
            center + Vec2::new(0.0, sign * gap),
            center + Vec2::new(0.0, sign * (gap + arm_v)),
        ));
        walls.extend(wall_line(
            center + Vec2::new(sign * gap, 0.0),
            center + Vec2::new(sign * (gap + arm_h), 0.0),
        ));
    }
    walls
}
