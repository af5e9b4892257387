//! Per-frame snapshot for the rendering collaborator
//!
//! The simulation never draws. Each frame it exposes what is on the
//! playfield and the HUD fields, and the frontend decides how to show them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::BoosterKind;
use super::tick::LevelSession;
use crate::consts::FLICKER_TICKS;
use crate::ticks_to_secs;

/// What an entity is, for choosing how to draw it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Avatar,
    Collectible,
    Hazard,
    Booster(BoosterKind),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityView {
    pub kind: EntityKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
    pub visible: bool,
}

/// HUD fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusView {
    pub level: u32,
    pub score: u64,
    /// Collectibles this level started with
    pub objective: u32,
    pub remaining_secs: u64,
    pub lives: u8,
    pub has_shield: bool,
    pub controls_inverted: bool,
    pub slow_field_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameView {
    pub entities: Vec<EntityView>,
    pub status: StatusView,
}

impl FrameView {
    pub fn from_session(session: &LevelSession) -> Self {
        let now = session.time_ticks;

        // Blink while immune; visible on the first half-period
        let avatar_visible = !session.effects.is_immune(now)
            || (session.effects.immunity.elapsed(now) / FLICKER_TICKS) % 2 == 0;

        let mut entities = Vec::with_capacity(
            1 + session.collectibles.len() + session.hazards.len() + session.boosters.len(),
        );
        entities.extend(session.collectibles.iter().map(|c| EntityView {
            kind: EntityKind::Collectible,
            pos: c.pos,
            size: c.size,
            visible: true,
        }));
        entities.extend(session.boosters.iter().map(|b| EntityView {
            kind: EntityKind::Booster(b.kind),
            pos: b.pos,
            size: b.size,
            visible: true,
        }));
        entities.extend(session.hazards.iter().map(|h| EntityView {
            kind: EntityKind::Hazard,
            pos: h.pos,
            size: h.size,
            visible: true,
        }));
        entities.push(EntityView {
            kind: EntityKind::Avatar,
            pos: session.avatar.pos,
            size: session.avatar.size,
            visible: avatar_visible,
        });

        Self {
            entities,
            status: StatusView {
                level: session.level,
                score: session.score,
                objective: session.objective,
                remaining_secs: ticks_to_secs(session.remaining_ticks()),
                lives: session.avatar.lives,
                has_shield: session.avatar.has_shield,
                controls_inverted: session.rules.controls_inverted,
                slow_field_active: session.effects.slow_field.is_running(now),
            },
        }
    }

    /// One-line HUD text
    pub fn status_line(&self) -> String {
        let s = &self.status;
        let mut line = format!(
            "Level {}  Score {}  Objective {}  Lives {}  Time {}s",
            s.level, s.score, s.objective, s.lives, s.remaining_secs
        );
        if s.has_shield {
            line.push_str("  [shield]");
        }
        if s.slow_field_active {
            line.push_str("  [slow]");
        }
        if s.controls_inverted {
            line.push_str("  CONTROLS INVERTED");
        }
        line
    }
}
