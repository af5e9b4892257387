//! Level simulation
//!
//! Everything that decides what happens in a level lives under here and is
//! reproducible from a seed: time is the frame counter, randomness comes
//! from one `Pcg32`, and entities are visited in spawn order. Nothing here
//! draws, plays sound or touches the filesystem.

pub mod autopilot;
pub mod collision;
pub mod game;
pub mod rules;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod view;

pub use collision::{Aabb, CollisionReport, HazardContact, resolve_collisions};
pub use game::{Frontend, Game, GameEvent, GamePhase, RunSummary, run};
pub use rules::{MUTATION_WEIGHTS, Mutation, RuleSet, mutate_rules, pick_mutation};
pub use spawn::{Population, SpawnParams, spawn_level};
pub use state::{
    ActiveEffects, Avatar, Booster, BoosterKind, Collectible, Hazard, Playfield, TimedEffect,
};
pub use tick::{DirectionKeys, LevelConfig, LevelOutcome, LevelPhase, LevelSession, TickInput, tick};
pub use view::{EntityKind, EntityView, FrameView, StatusView};
