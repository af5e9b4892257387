//! Level rules and the between-level mutation step

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rules a level is played under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Avatar displacement per frame per pressed key
    pub avatar_speed: u32,
    /// Hazard displacement per frame on each axis
    pub hazard_speed: u32,
    /// Directional input is negated
    pub controls_inverted: bool,
    /// Hazards spawned per level
    pub hazard_count: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            avatar_speed: 5,
            hazard_speed: 3,
            controls_inverted: false,
            hazard_count: 3,
        }
    }
}

/// One difficulty escalation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutation {
    AvatarSpeed,
    HazardSpeed,
    InvertControls,
    HazardCount,
}

/// Selection weights for `pick_mutation`
pub const MUTATION_WEIGHTS: [(Mutation, u32); 4] = [
    (Mutation::AvatarSpeed, 1),
    (Mutation::HazardSpeed, 1),
    (Mutation::InvertControls, 1),
    (Mutation::HazardCount, 1),
];

impl Mutation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mutation::AvatarSpeed => "avatar speed +1",
            Mutation::HazardSpeed => "hazard speed +1",
            Mutation::InvertControls => "controls inverted toggled",
            Mutation::HazardCount => "hazard count +1",
        }
    }
}

impl RuleSet {
    /// Apply a single mutation. Numeric rules grow by one, inversion toggles.
    pub fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::AvatarSpeed => self.avatar_speed = self.avatar_speed.saturating_add(1),
            Mutation::HazardSpeed => self.hazard_speed = self.hazard_speed.saturating_add(1),
            Mutation::InvertControls => self.controls_inverted = !self.controls_inverted,
            Mutation::HazardCount => self.hazard_count = self.hazard_count.saturating_add(1),
        }
    }
}

/// Weighted pick from `MUTATION_WEIGHTS`
pub fn pick_mutation<R: Rng>(rng: &mut R) -> Mutation {
    let total: u32 = MUTATION_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.random_range(0..total);
    for &(mutation, weight) in &MUTATION_WEIGHTS {
        if roll < weight {
            return mutation;
        }
        roll -= weight;
    }
    // Unreachable while the table has a positive total
    MUTATION_WEIGHTS[MUTATION_WEIGHTS.len() - 1].0
}

/// Pick a mutation, apply it and return it
pub fn mutate_rules<R: Rng>(rules: &mut RuleSet, rng: &mut R) -> Mutation {
    let mutation = pick_mutation(rng);
    rules.apply(mutation);
    log::info!("Rules mutated: {}", mutation.as_str());
    mutation
}
