//! Level population generation
//!
//! Uses only the RNG passed in, so a seeded generator reproduces a level
//! exactly.

use glam::Vec2;
use rand::Rng;

use super::rules::RuleSet;
use super::state::{Booster, BoosterKind, Collectible, Hazard, Playfield};
use crate::consts::*;

/// Knobs the spawner reads besides the rule set
#[derive(Debug, Clone, Copy)]
pub struct SpawnParams {
    pub collectibles_per_level: u32,
    /// Probability in [0, 1] that the level gets a booster
    pub booster_chance: f64,
}

impl SpawnParams {
    /// `booster_chance` forced into [0, 1]; NaN falls back to the default
    pub fn booster_probability(&self) -> f64 {
        if self.booster_chance.is_nan() {
            BOOSTER_CHANCE
        } else {
            self.booster_chance.clamp(0.0, 1.0)
        }
    }
}

impl Default for SpawnParams {
    fn default() -> Self {
        Self {
            collectibles_per_level: COLLECTIBLES_PER_LEVEL,
            booster_chance: BOOSTER_CHANCE,
        }
    }
}

/// Every entity a level starts with
#[derive(Debug, Clone, Default)]
pub struct Population {
    pub collectibles: Vec<Collectible>,
    pub hazards: Vec<Hazard>,
    pub boosters: Vec<Booster>,
}

/// Uniform top-left corner for a square of `size` inside the playable area
fn random_corner<R: Rng>(rng: &mut R, field: &Playfield, size: f32) -> Vec2 {
    let (min, max) = field.corner_range(size);
    Vec2::new(
        rng.random_range(min.x..=max.x),
        rng.random_range(min.y..=max.y),
    )
}

fn random_sign<R: Rng>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

/// Build the population for `level` (1-based) at tick `now`.
///
/// Level numbers below 1 are treated as 1.
pub fn spawn_level<R: Rng>(
    rules: &RuleSet,
    level: u32,
    params: &SpawnParams,
    field: &Playfield,
    rng: &mut R,
    now: u64,
) -> Population {
    let mut next_id = 1u32;
    let mut alloc_id = || {
        let id = next_id;
        next_id += 1;
        id
    };

    let speed = rules.hazard_speed as f32;
    let hazards = (0..rules.hazard_count)
        .map(|_| {
            let pos = random_corner(rng, field, HAZARD_SIZE);
            let vel = Vec2::new(random_sign(rng) * speed, random_sign(rng) * speed);
            Hazard {
                id: alloc_id(),
                pos,
                size: HAZARD_SIZE,
                vel,
            }
        })
        .collect();

    let star_count = level.max(1).saturating_mul(params.collectibles_per_level);
    let collectibles = (0..star_count)
        .map(|_| Collectible {
            id: alloc_id(),
            pos: random_corner(rng, field, COLLECTIBLE_SIZE),
            size: COLLECTIBLE_SIZE,
            created_at: now,
        })
        .collect();

    let mut boosters = Vec::new();
    if rng.random_bool(params.booster_probability()) {
        let kind = if rng.random_bool(0.5) {
            BoosterKind::Shield
        } else {
            BoosterKind::SlowField
        };
        boosters.push(Booster {
            id: alloc_id(),
            kind,
            pos: random_corner(rng, field, BOOSTER_SIZE),
            size: BOOSTER_SIZE,
        });
    }

    log::info!(
        "Level {}: {} hazards at speed {}, {} collectibles, boosters: {:?}",
        level,
        rules.hazard_count,
        rules.hazard_speed,
        star_count,
        boosters.iter().map(|b| b.kind).collect::<Vec<_>>()
    );

    Population {
        collectibles,
        hazards,
        boosters,
    }
}
