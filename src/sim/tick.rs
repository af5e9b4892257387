//! Fixed timestep level session
//!
//! One `tick` is one frame: input, movement, collisions, timers, then the
//! termination check. Time is the frame counter, so every timed effect is an
//! "elapsed since activation" comparison re-evaluated each frame.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::autopilot;
use super::collision::{CollisionReport, resolve_collisions};
use super::rules::RuleSet;
use super::spawn::{SpawnParams, spawn_level};
use super::state::{ActiveEffects, Avatar, Booster, Collectible, Hazard, Playfield};
use crate::consts::*;

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Quit signal from the input layer
    pub quit: bool,
    /// Idle/demo mode - the autopilot drives the avatar
    pub idle_mode: bool,
}

impl TickInput {
    pub fn keys(&self) -> DirectionKeys {
        DirectionKeys {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
        }
    }
}

/// Pressed state of the four directional keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl DirectionKeys {
    /// Each pressed key contributes `speed` along its axis
    pub fn delta(&self, speed: f32) -> Vec2 {
        let mut delta = Vec2::ZERO;
        if self.left {
            delta.x -= speed;
        }
        if self.right {
            delta.x += speed;
        }
        if self.up {
            delta.y -= speed;
        }
        if self.down {
            delta.y += speed;
        }
        delta
    }
}

/// How a level ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelOutcome {
    /// Every collectible picked up
    Cleared,
    /// Time budget ran out; a life was spent. Passed if any lives remain.
    TimedOut { passed: bool },
    /// A hazard took the last life
    LifeLost,
    /// Quit signal received
    Quit,
}

impl LevelOutcome {
    pub fn passed(&self) -> bool {
        matches!(
            self,
            LevelOutcome::Cleared | LevelOutcome::TimedOut { passed: true }
        )
    }
}

/// Current phase of a level session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Entities spawned, timers not started yet
    Starting,
    /// Active gameplay
    Running,
    Finished(LevelOutcome),
}

/// Per-level settings that do not change with the rules
#[derive(Debug, Clone, Copy)]
pub struct LevelConfig {
    pub field: Playfield,
    pub spawn: SpawnParams,
    pub time_limit_ticks: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            field: Playfield::default(),
            spawn: SpawnParams::default(),
            time_limit_ticks: LEVEL_TIME_LIMIT_TICKS,
        }
    }
}

/// State of one level from spawn to outcome
#[derive(Debug, Clone)]
pub struct LevelSession {
    /// 1-based level number
    pub level: u32,
    /// Cumulative run score
    pub score: u64,
    pub phase: LevelPhase,
    /// Frames since the level started running
    pub time_ticks: u64,
    pub time_limit_ticks: u64,
    /// Collectibles spawned for this level
    pub objective: u32,
    pub rules: RuleSet,
    pub field: Playfield,
    pub avatar: Avatar,
    pub collectibles: Vec<Collectible>,
    pub hazards: Vec<Hazard>,
    pub boosters: Vec<Booster>,
    pub effects: ActiveEffects,
    /// Collision results of the latest frame
    pub last_report: CollisionReport,
}

impl LevelSession {
    /// Spawn a level. The session starts in `Starting`; the first tick
    /// starts the clock.
    pub fn new<R: Rng>(
        level: u32,
        rules: &RuleSet,
        avatar: Avatar,
        score: u64,
        config: &LevelConfig,
        rng: &mut R,
    ) -> Self {
        let population = spawn_level(rules, level, &config.spawn, &config.field, rng, 0);
        Self {
            level,
            score,
            phase: LevelPhase::Starting,
            time_ticks: 0,
            time_limit_ticks: config.time_limit_ticks,
            objective: population.collectibles.len() as u32,
            rules: *rules,
            field: config.field,
            avatar,
            collectibles: population.collectibles,
            hazards: population.hazards,
            boosters: population.boosters,
            effects: ActiveEffects::default(),
            last_report: CollisionReport::default(),
        }
    }

    pub fn outcome(&self) -> Option<LevelOutcome> {
        match self.phase {
            LevelPhase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    /// Ticks left before the level times out
    pub fn remaining_ticks(&self) -> u64 {
        self.time_limit_ticks.saturating_sub(self.time_ticks)
    }

    /// Hand the avatar and score back to the controller
    pub fn into_parts(self) -> (Avatar, u64) {
        (self.avatar, self.score)
    }

    fn begin(&mut self) {
        self.time_ticks = 0;
        self.effects = ActiveEffects::default();
        // Briefly immune while the player gets their bearings
        self.effects.immunity.activate(0);
        self.avatar.pos = self.field.centered(self.avatar.size);
        self.phase = LevelPhase::Running;
        log::info!(
            "Level {} running: {} collectibles, {} lives, shield: {}",
            self.level,
            self.collectibles.len(),
            self.avatar.lives,
            self.avatar.has_shield
        );
    }

    fn finish(&mut self, outcome: LevelOutcome) -> LevelOutcome {
        self.phase = LevelPhase::Finished(outcome);
        log::info!(
            "Level {} finished: {:?} after {} ticks (score {}, lives {})",
            self.level,
            outcome,
            self.time_ticks,
            self.score,
            self.avatar.lives
        );
        outcome
    }
}

/// Advance the session by one frame. Returns the outcome on the frame the
/// level ends; ticking a finished session does nothing.
pub fn tick(session: &mut LevelSession, input: &TickInput) -> Option<LevelOutcome> {
    match session.phase {
        LevelPhase::Finished(_) => return None,
        LevelPhase::Starting => {
            session.begin();
            return None;
        }
        LevelPhase::Running => {}
    }

    session.time_ticks += 1;
    let now = session.time_ticks;

    if input.quit {
        return Some(session.finish(LevelOutcome::Quit));
    }

    // Input
    let keys = if input.idle_mode {
        autopilot::steer(
            &session.avatar,
            &session.collectibles,
            &session.hazards,
            &session.boosters,
            session.rules.controls_inverted,
        )
    } else {
        input.keys()
    };
    let mut delta = keys.delta(session.rules.avatar_speed as f32);
    if session.rules.controls_inverted {
        delta = -delta;
    }

    // Movement
    session.avatar.move_by(delta, &session.field);
    let speed_mod = session.effects.hazard_speed_mod(now);
    for hazard in &mut session.hazards {
        hazard.advance(speed_mod, &session.field);
    }

    // Collisions
    let report = resolve_collisions(
        &mut session.avatar,
        &mut session.collectibles,
        &session.hazards,
        &mut session.boosters,
        &mut session.effects,
        now,
    );
    session.score += report.points;
    let took_damage = report.took_damage();
    session.last_report = report;

    // Timers
    if session.effects.slow_field.expire(now) {
        log::debug!("Slow-field ended at tick {}", now);
    }

    // Termination
    if took_damage && session.avatar.lives == 0 {
        return Some(session.finish(LevelOutcome::LifeLost));
    }
    if now > session.time_limit_ticks {
        session.avatar.lose_life();
        let passed = session.avatar.lives > 0;
        return Some(session.finish(LevelOutcome::TimedOut { passed }));
    }
    if session.collectibles.is_empty() {
        return Some(session.finish(LevelOutcome::Cleared));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BoosterKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn quiet_config() -> LevelConfig {
        LevelConfig {
            spawn: SpawnParams {
                booster_chance: 0.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn session(seed: u64) -> LevelSession {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut s = LevelSession::new(
            1,
            &RuleSet::default(),
            Avatar::new(STARTING_LIVES),
            0,
            &quiet_config(),
            &mut rng,
        );
        tick(&mut s, &TickInput::default());
        s
    }

    /// Session with nothing that can touch the avatar by accident
    fn isolated_session() -> LevelSession {
        let mut s = session(1);
        s.hazards.clear();
        s.collectibles.truncate(1);
        s.collectibles[0].pos = Vec2::new(0.0, 560.0);
        s
    }

    #[test]
    fn test_starting_to_running() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut s = LevelSession::new(
            1,
            &RuleSet::default(),
            Avatar::new(3),
            0,
            &LevelConfig::default(),
            &mut rng,
        );
        assert_eq!(s.phase, LevelPhase::Starting);
        assert_eq!(s.objective, COLLECTIBLES_PER_LEVEL);

        assert_eq!(tick(&mut s, &TickInput::default()), None);
        assert_eq!(s.phase, LevelPhase::Running);
        assert_eq!(s.time_ticks, 0);
        assert!(s.effects.is_immune(0));
        assert_eq!(s.avatar.pos, s.field.centered(AVATAR_SIZE));
    }

    #[test]
    fn test_input_moves_avatar() {
        let mut s = isolated_session();
        let start = s.avatar.pos;
        let input = TickInput {
            right: true,
            up: true,
            ..Default::default()
        };
        tick(&mut s, &input);
        assert_eq!(s.avatar.pos, start + Vec2::new(5.0, -5.0));

        // Opposite keys cancel out
        let input = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        let before = s.avatar.pos;
        tick(&mut s, &input);
        assert_eq!(s.avatar.pos, before);
    }

    #[test]
    fn test_inverted_controls_negate_delta() {
        let mut s = isolated_session();
        s.rules.controls_inverted = true;
        let start = s.avatar.pos;
        let input = TickInput {
            right: true,
            down: true,
            ..Default::default()
        };
        tick(&mut s, &input);
        assert_eq!(s.avatar.pos, start + Vec2::new(-5.0, -5.0));
    }

    #[test]
    fn test_cleared_when_last_collectible_picked() {
        let mut s = isolated_session();
        s.collectibles[0].pos = s.avatar.pos;
        let outcome = tick(&mut s, &TickInput::default());
        assert_eq!(outcome, Some(LevelOutcome::Cleared));
        assert!(outcome.is_some_and(|o| o.passed()));
        assert_eq!(s.score, FAST_PICKUP_POINTS);
        assert_eq!(s.avatar.lives, STARTING_LIVES);
    }

    #[test]
    fn test_life_lost_on_last_life() {
        let mut s = isolated_session();
        s.avatar.lives = 1;
        s.effects.immunity.active = false;
        s.hazards.push(Hazard {
            id: 50,
            pos: s.avatar.pos,
            size: HAZARD_SIZE,
            vel: Vec2::ZERO,
        });
        let outcome = tick(&mut s, &TickInput::default());
        assert_eq!(outcome, Some(LevelOutcome::LifeLost));
        assert!(!LevelOutcome::LifeLost.passed());
        assert_eq!(s.avatar.lives, 0);
    }

    #[test]
    fn test_hit_with_lives_left_keeps_running() {
        let mut s = isolated_session();
        s.effects.immunity.active = false;
        s.hazards.push(Hazard {
            id: 50,
            pos: s.avatar.pos,
            size: HAZARD_SIZE,
            vel: Vec2::ZERO,
        });
        assert_eq!(tick(&mut s, &TickInput::default()), None);
        assert_eq!(s.avatar.lives, 2);

        // Still overlapping but immune now
        for _ in 0..IMMUNITY_TICKS - 1 {
            tick(&mut s, &TickInput::default());
        }
        assert_eq!(s.avatar.lives, 2);
        tick(&mut s, &TickInput::default());
        assert_eq!(s.avatar.lives, 1);
    }

    #[test]
    fn test_level_start_immunity() {
        let mut s = isolated_session();
        s.hazards.push(Hazard {
            id: 50,
            pos: s.avatar.pos,
            size: HAZARD_SIZE,
            vel: Vec2::ZERO,
        });
        for _ in 0..IMMUNITY_TICKS - 1 {
            tick(&mut s, &TickInput::default());
        }
        assert_eq!(s.avatar.lives, STARTING_LIVES);
        tick(&mut s, &TickInput::default());
        assert_eq!(s.avatar.lives, STARTING_LIVES - 1);
    }

    #[test]
    fn test_quit_ends_level_without_penalty() {
        let mut s = isolated_session();
        let input = TickInput {
            quit: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut s, &input), Some(LevelOutcome::Quit));
        assert!(!LevelOutcome::Quit.passed());
        assert_eq!(s.avatar.lives, STARTING_LIVES);
    }

    #[test]
    fn test_finished_session_is_inert() {
        let mut s = isolated_session();
        s.collectibles[0].pos = s.avatar.pos;
        tick(&mut s, &TickInput::default());
        let ticks = s.time_ticks;
        assert_eq!(tick(&mut s, &TickInput::default()), None);
        assert_eq!(s.time_ticks, ticks);
        assert_eq!(s.outcome(), Some(LevelOutcome::Cleared));
    }

    #[test]
    fn test_slow_field_expires() {
        let mut s = isolated_session();
        s.boosters.push(Booster {
            id: 70,
            kind: BoosterKind::SlowField,
            pos: s.avatar.pos,
            size: BOOSTER_SIZE,
        });
        tick(&mut s, &TickInput::default());
        let picked_at = s.time_ticks;
        assert!(s.effects.slow_field.active);

        for _ in 0..SLOW_FIELD_TICKS {
            tick(&mut s, &TickInput::default());
        }
        assert!(s.effects.slow_field.active);
        tick(&mut s, &TickInput::default());
        assert!(!s.effects.slow_field.active);
        assert_eq!(s.time_ticks, picked_at + SLOW_FIELD_TICKS + 1);
    }

    #[test]
    fn test_idle_mode_moves_toward_collectible() {
        let mut s = isolated_session();
        s.collectibles[0].pos = Vec2::new(700.0, s.avatar.pos.y);
        let start = s.avatar.pos;
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        tick(&mut s, &input);
        assert!(s.avatar.pos.x > start.x);
    }
}
