//! Placeable obstacle blocks

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::countdown::Countdown;
use super::entity::{Cue, EntityKind, GameObject, Hit, RenderLayer, Team, UpdateContext};
use super::shape::Shape;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockState {
    /// Grace period after placement; intangible
    Baby,
    Normal,
    Broken,
    Debris,
    ShouldRemove,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    position: Vec2,
    hp: i32,
    state: BlockState,
    grace_ticks: u32,
    grace: Countdown,
    debris: Countdown,
    damage_flush: Countdown,
    #[serde(skip)]
    cues: Vec<Cue>,
}

impl Block {
    /// A block; `is_baby` starts it in the intangible grace period
    pub fn new(position: Vec2, is_baby: bool) -> Self {
        Self::with_grace(position, if is_baby { BLOCK_BABY_TICKS } else { 0 })
    }

    pub fn with_grace(position: Vec2, grace_ticks: u32) -> Self {
        Self {
            position,
            hp: BLOCK_INITIAL_HP,
            state: if grace_ticks > 0 {
                BlockState::Baby
            } else {
                BlockState::Normal
            },
            grace_ticks,
            grace: Countdown::new(grace_ticks),
            debris: Countdown::IDLE,
            damage_flush: Countdown::IDLE,
            cues: Vec::new(),
        }
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Visual scale; a baby block grows to full size over its grace period
    pub fn scale(&self) -> f32 {
        match self.state {
            BlockState::Baby => 0.5 + 0.5 * self.grace.progress(self.grace_ticks),
            _ => 1.0,
        }
    }

    pub fn damage(&mut self, amount: i32) {
        if !matches!(self.state, BlockState::Normal | BlockState::Broken) || amount <= 0 {
            return;
        }
        self.hp -= amount;
        self.damage_flush.arm(DAMAGE_FLUSH_TICKS);
        if self.hp <= 0 {
            self.state = BlockState::Debris;
            self.debris.arm(DEBRIS_TICKS);
            self.cues.push(Cue::Explosion);
        } else if self.hp < BLOCK_INITIAL_HP / 2 && self.state == BlockState::Normal {
            self.state = BlockState::Broken;
            self.cues.push(Cue::Crack);
        }
    }
}

impl GameObject for Block {
    fn kind(&self) -> EntityKind {
        EntityKind::Block
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn team(&self) -> Team {
        Team::Obstacle
    }

    fn hp(&self) -> i32 {
        self.hp
    }

    fn shape(&self) -> Shape {
        let size = BLOCK_SIZE * self.scale();
        Shape::rect(self.position, size, size)
    }

    fn has_rigid_body(&self) -> bool {
        matches!(self.state, BlockState::Normal | BlockState::Broken)
    }

    fn render_layer(&self) -> RenderLayer {
        match self.state {
            BlockState::Debris | BlockState::ShouldRemove => RenderLayer::Debris,
            _ => RenderLayer::TangibleObject,
        }
    }

    fn is_expired(&self) -> bool {
        self.state == BlockState::ShouldRemove
    }

    fn update(&mut self, _ctx: &UpdateContext) {
        self.damage_flush.tick();
        match self.state {
            BlockState::Baby => {
                if self.grace.tick() {
                    self.state = BlockState::Normal;
                }
            }
            BlockState::Debris => {
                if self.debris.tick() {
                    self.state = BlockState::ShouldRemove;
                }
            }
            BlockState::Normal | BlockState::Broken | BlockState::ShouldRemove => {}
        }
    }

    fn on_hit_by(&mut self, hit: &Hit) {
        self.damage(hit.damage);
    }

    fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_baby_grace_lasts_exactly_configured_ticks() {
        let ctx = UpdateContext::default();
        let grace = 12;
        let mut block = Block::with_grace(Vec2::ZERO, grace);
        for _ in 0..grace {
            assert!(!block.has_rigid_body());
            assert_eq!(block.state(), BlockState::Baby);
            block.update(&ctx);
        }
        assert!(block.has_rigid_body());
        assert_eq!(block.state(), BlockState::Normal);
    }

    #[test]
    fn test_new_baby_uses_default_grace() {
        let ctx = UpdateContext::default();
        let mut block = Block::new(Vec2::ZERO, true);
        for _ in 0..BLOCK_BABY_TICKS - 1 {
            block.update(&ctx);
        }
        assert!(!block.has_rigid_body());
        block.update(&ctx);
        assert!(block.has_rigid_body());
    }

    #[test]
    fn test_baby_ignores_damage() {
        let mut block = Block::new(Vec2::ZERO, true);
        block.on_hit_by(&Hit {
            team: Team::Red,
            damage: 30,
        });
        assert_eq!(block.hp(), BLOCK_INITIAL_HP);
    }

    #[test]
    fn test_block_breaks_then_is_removed() {
        let ctx = UpdateContext::default();
        let mut block = Block::new(Vec2::ZERO, false);
        let hit = Hit {
            team: Team::Red,
            damage: 30,
        };
        block.on_hit_by(&hit);
        assert_eq!(block.state(), BlockState::Broken);
        block.on_hit_by(&hit);
        assert_eq!(block.state(), BlockState::Debris);
        assert!(!block.has_rigid_body());
        for _ in 0..DEBRIS_TICKS {
            assert!(!block.is_expired());
            block.update(&ctx);
        }
        assert!(block.is_expired());
        assert_eq!(block.drain_cues(), vec![Cue::Crack, Cue::Explosion]);
    }

    #[test]
    fn test_block_is_always_obstacle() {
        let block = Block::new(Vec2::ZERO, false);
        assert_eq!(block.team(), Team::Obstacle);
    }

    proptest! {
        #[test]
        fn prop_block_damage_is_monotonic(hits in prop::collection::vec(1i32..40, 1..10)) {
            let mut block = Block::new(Vec2::ZERO, false);
            for d in hits {
                let before = block.hp();
                let tangible = block.has_rigid_body();
                block.on_hit_by(&Hit { team: Team::Blue, damage: d });
                if tangible {
                    prop_assert!(block.hp() < before);
                } else {
                    prop_assert_eq!(block.hp(), before);
                }
            }
        }
    }
}
