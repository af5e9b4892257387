//! Entity and timer types for a level session
//!
//! Plain simulation state. No entity references another; all relational
//! logic lives in the collision resolver.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;

/// Playable area. The top `status_band` pixels are reserved for the HUD and
/// excluded from movement and placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
    pub status_band: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: PLAY_WIDTH,
            height: PLAY_HEIGHT,
            status_band: STATUS_BAND_HEIGHT,
        }
    }
}

impl Playfield {
    /// Smallest and largest top-left corner for a square of `size`
    pub fn corner_range(&self, size: f32) -> (Vec2, Vec2) {
        let min = Vec2::new(0.0, self.status_band);
        let max = Vec2::new(
            (self.width - size).max(min.x),
            (self.height - size).max(min.y),
        );
        (min, max)
    }

    /// Top-left corner that centres a square of `size`
    pub fn centered(&self, size: f32) -> Vec2 {
        let (min, max) = self.corner_range(size);
        (min + max) * 0.5
    }
}

/// The player-controlled square
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
    pub lives: u8,
    pub has_shield: bool,
}

impl Avatar {
    pub fn new(lives: u8) -> Self {
        Self {
            pos: Vec2::ZERO,
            size: AVATAR_SIZE,
            lives,
            has_shield: false,
        }
    }

    /// Move by `delta`, clamping into the playable area
    pub fn move_by(&mut self, delta: Vec2, field: &Playfield) {
        let (min, max) = field.corner_range(self.size);
        self.pos = (self.pos + delta).clamp(min, max);
    }

    /// Lose one life; never goes below zero
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// A point item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    /// Session tick at which this collectible appeared
    pub created_at: u64,
}

impl Collectible {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Points awarded when picked up at tick `now`
    pub fn value_at(&self, now: u64) -> u64 {
        if now.saturating_sub(self.created_at) <= FAST_PICKUP_TICKS {
            FAST_PICKUP_POINTS
        } else {
            LATE_PICKUP_POINTS
        }
    }
}

/// A bouncing obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    /// Displacement per frame at full speed
    pub vel: Vec2,
}

impl Hazard {
    /// Advance one frame and bounce off the playable-area bounds.
    ///
    /// Position is never clamped. A velocity component flips only while the
    /// hazard is at or past a bound and still heading into it, so each
    /// contact flips it exactly once.
    pub fn advance(&mut self, speed_mod: f32, field: &Playfield) {
        self.pos += self.vel * speed_mod;

        let (min, max) = field.corner_range(self.size);
        if (self.pos.x <= min.x && self.vel.x < 0.0) || (self.pos.x >= max.x && self.vel.x > 0.0)
        {
            self.vel.x = -self.vel.x;
        }
        if (self.pos.y <= min.y && self.vel.y < 0.0) || (self.pos.y >= max.y && self.vel.y > 0.0)
        {
            self.vel.y = -self.vel.y;
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Booster types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoosterKind {
    /// Absorbs the next hazard contact
    Shield,
    /// Halves hazard speed for a while
    SlowField,
}

/// A power-up lying on the playfield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booster {
    pub id: u32,
    pub kind: BoosterKind,
    pub pos: Vec2,
    pub size: f32,
}

impl Booster {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// A timer-driven effect, re-evaluated against the tick counter every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub active: bool,
    pub activated_at: u64,
    pub duration: u64,
}

impl TimedEffect {
    pub fn new(duration: u64) -> Self {
        Self {
            active: false,
            activated_at: 0,
            duration,
        }
    }

    /// Start or restart the effect at `now`
    pub fn activate(&mut self, now: u64) {
        self.active = true;
        self.activated_at = now;
    }

    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.activated_at)
    }

    /// Active and no more than `duration` ticks since activation
    pub fn is_running(&self, now: u64) -> bool {
        self.active && self.elapsed(now) <= self.duration
    }

    /// Active and strictly fewer than `duration` ticks since activation
    pub fn is_within(&self, now: u64) -> bool {
        self.active && self.elapsed(now) < self.duration
    }

    /// Switch off once more than `duration` ticks have passed.
    /// Returns true on the frame the effect ends.
    pub fn expire(&mut self, now: u64) -> bool {
        if self.active && self.elapsed(now) > self.duration {
            self.active = false;
            return true;
        }
        false
    }
}

/// Timed effects of the current level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub slow_field: TimedEffect,
    pub immunity: TimedEffect,
}

impl Default for ActiveEffects {
    fn default() -> Self {
        Self {
            slow_field: TimedEffect::new(SLOW_FIELD_TICKS),
            immunity: TimedEffect::new(IMMUNITY_TICKS),
        }
    }
}

impl ActiveEffects {
    /// Hazard speed multiplier at `now`
    pub fn hazard_speed_mod(&self, now: u64) -> f32 {
        if self.slow_field.is_running(now) {
            SLOW_FIELD_FACTOR
        } else {
            1.0
        }
    }

    pub fn is_immune(&self, now: u64) -> bool {
        self.immunity.is_within(now)
    }
}
