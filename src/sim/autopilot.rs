//! Idle/demo mode: steer the avatar without a human at the keys
//!
//! Heads for the nearest pickup and veers away from hazards that get close.
//! Produces the same four key states a player would, so inverted controls
//! apply to it like anyone else.

use glam::Vec2;

use super::state::{Avatar, Booster, Collectible, Hazard};
use super::tick::DirectionKeys;

/// Hazards closer than this (centre to centre) push the avatar away
const DANGER_RADIUS: f32 = 110.0;
/// Weight of hazard avoidance against pickup attraction
const AVOID_WEIGHT: f32 = 2.5;
/// Directional components smaller than this release the key
const DEADZONE: f32 = 0.25;

fn center(pos: Vec2, size: f32) -> Vec2 {
    pos + Vec2::splat(size * 0.5)
}

/// Decide which keys to hold this frame
pub fn steer(
    avatar: &Avatar,
    collectibles: &[Collectible],
    hazards: &[Hazard],
    boosters: &[Booster],
    controls_inverted: bool,
) -> DirectionKeys {
    let me = center(avatar.pos, avatar.size);

    let target = collectibles
        .iter()
        .map(|c| center(c.pos, c.size))
        .chain(boosters.iter().map(|b| center(b.pos, b.size)))
        .min_by(|a, b| {
            a.distance_squared(me)
                .partial_cmp(&b.distance_squared(me))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let mut desired = target
        .map(|t| (t - me).normalize_or_zero())
        .unwrap_or(Vec2::ZERO);

    for hazard in hazards {
        let away = me - center(hazard.pos, hazard.size);
        let dist = away.length();
        if dist < DANGER_RADIUS {
            let urgency = 1.0 - dist / DANGER_RADIUS;
            desired += away.normalize_or_zero() * urgency * AVOID_WEIGHT;
        }
    }

    let desired = desired.normalize_or_zero();
    // Inverted controls negate the movement, so press the opposite keys
    let desired = if controls_inverted { -desired } else { desired };

    DirectionKeys {
        left: desired.x < -DEADZONE,
        right: desired.x > DEADZONE,
        up: desired.y < -DEADZONE,
        down: desired.y > DEADZONE,
    }
}
