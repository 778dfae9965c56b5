//! Indestructible wall tiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, GameObject, RenderLayer, Team, UpdateContext};
use super::shape::Shape;
use crate::consts::WALL_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    position: Vec2,
    size: Vec2,
}

impl Wall {
    /// A square tile of the default size
    pub fn new(position: Vec2) -> Self {
        Self::sized(position, Vec2::splat(WALL_SIZE))
    }

    pub fn sized(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }
}

impl GameObject for Wall {
    fn kind(&self) -> EntityKind {
        EntityKind::Wall
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn team(&self) -> Team {
        Team::Obstacle
    }

    fn hp(&self) -> i32 {
        i32::MAX
    }

    fn shape(&self) -> Shape {
        Shape::rect(self.position, self.size.x, self.size.y)
    }

    fn has_rigid_body(&self) -> bool {
        true
    }

    fn render_layer(&self) -> RenderLayer {
        RenderLayer::TangibleObject
    }

    fn is_expired(&self) -> bool {
        false
    }

    fn update(&mut self, _ctx: &UpdateContext) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Hit;

    #[test]
    fn test_wall_shrugs_off_hits() {
        let mut wall = Wall::new(Vec2::new(15.0, 15.0));
        wall.on_hit_by(&Hit {
            team: Team::Red,
            damage: 10_000,
        });
        assert_eq!(wall.hp(), i32::MAX);
        assert!(wall.has_rigid_body());
        assert!(!wall.is_expired());
    }
}
