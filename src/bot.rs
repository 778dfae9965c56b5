//! Scripted tank drivers for the title-screen demo
//!
//! Each bot pushes toward the enemy base, keeps its gun on it, and fires on
//! a fixed cadence. Now and then it charges a missile or drops a block.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::TICKS_PER_SECOND;
use crate::engine::FrameHook;
use crate::sim::{Applied, Command, EntityId, GameObject, Stage, TickReport};

/// How often a bot fires (ticks)
const FIRE_INTERVAL: u64 = 20;
/// Default chance per tick of starting a missile charge
const CHARGE_CHANCE: f64 = 0.004;
/// Default chance per tick of placing a block
const BLOCK_CHANCE: f64 = 0.002;
/// Keeps this far from the target before holding position
const STANDOFF: f32 = 160.0;

#[derive(Debug, Clone)]
struct Bot {
    tank: EntityId,
    /// Ticks left on the current charge
    charging: Option<u32>,
    /// Lateral drift so bots don't stack up on one line
    drift: Vec2,
}

/// Receives every command a bot issues, e.g. to forward it to peers
pub type Outbox = Box<dyn FnMut(&Command) + Send>;

pub struct BotDriver {
    bots: Vec<Bot>,
    rng: Pcg32,
    charge_chance: f64,
    block_chance: f64,
    outbox: Option<Outbox>,
}

impl BotDriver {
    pub fn new(tanks: impl IntoIterator<Item = EntityId>, seed: u64) -> Self {
        let bots = tanks
            .into_iter()
            .map(|tank| Bot {
                tank,
                charging: None,
                drift: Vec2::ZERO,
            })
            .collect();
        Self {
            bots,
            rng: Pcg32::seed_from_u64(seed),
            charge_chance: CHARGE_CHANCE,
            block_chance: BLOCK_CHANCE,
            outbox: None,
        }
    }

    /// Also hand every issued command (plus a position sync per move) to `outbox`
    pub fn with_outbox(mut self, outbox: impl FnMut(&Command) + Send + 'static) -> Self {
        self.outbox = Some(Box::new(outbox));
        self
    }

    /// Per-tick odds of charging a missile and of placing a block
    pub fn with_tactics(mut self, charge_chance: f64, block_chance: f64) -> Self {
        self.charge_chance = charge_chance.clamp(0.0, 1.0);
        self.block_chance = block_chance.clamp(0.0, 1.0);
        self
    }

    pub fn tanks(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.bots.iter().map(|b| b.tank)
    }

    fn drive(&mut self, index: usize, stage: &Stage, tick: u64) {
        let (charge_chance, block_chance) = (self.charge_chance, self.block_chance);
        let rng = &mut self.rng;
        let bot = &mut self.bots[index];
        let outbox = &mut self.outbox;
        let mut issue = |command: Command| {
            let applied = stage.apply(&command);
            if let Some(outbox) = outbox.as_mut() {
                outbox(&command);
            }
            applied
        };
        let Some((team, position, alive)) =
            stage.with_tank(bot.tank, |t| (t.team(), t.position(), t.is_alive()))
        else {
            return;
        };
        if !alive {
            bot.charging = None;
            return;
        }
        let Some(target) = team.opponent().and_then(|enemy| stage.base_position(enemy)) else {
            return;
        };

        if tick % TICKS_PER_SECOND as u64 == 0 {
            bot.drift = Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0));
        }

        // Charging locks movement and aim; just wait it out
        if let Some(left) = bot.charging.as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                bot.charging = None;
                log_spawn(issue(Command::FinishCharge { tank: bot.tank }), "missile");
            }
            return;
        }

        issue(Command::Aim {
            tank: bot.tank,
            target,
        });
        let to_target = target - position;
        let heading = if to_target.length() > STANDOFF {
            to_target.normalize_or_zero() + bot.drift * 0.5
        } else {
            bot.drift
        };
        if let Some(moved) = stage.with_tank(bot.tank, |t| {
            t.move_by(heading);
            t.position()
        }) {
            issue(Command::Locate {
                tank: bot.tank,
                position: moved,
            });
        }

        if tick % FIRE_INTERVAL == 0 {
            issue(Command::Shoot { tank: bot.tank });
        }
        if rng.random_bool(charge_chance) {
            let ticks = rng.random_range(TICKS_PER_SECOND..=4 * TICKS_PER_SECOND);
            if issue(Command::StartCharge { tank: bot.tank }) == Applied::Updated {
                bot.charging = Some(ticks);
            }
        } else if rng.random_bool(block_chance) {
            log_spawn(issue(Command::PlaceBlock { tank: bot.tank }), "block");
        }
    }
}

fn log_spawn(applied: Applied, what: &str) {
    if let Applied::Spawned(id) = applied {
        log::debug!("bot placed {what} {id}");
    }
}

impl FrameHook for BotDriver {
    fn on_frame(&mut self, stage: &Stage, report: &TickReport) {
        for index in 0..self.bots.len() {
            self.drive(index, stage, report.tick);
        }
    }
}
