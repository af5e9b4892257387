//! Collision detection and per-frame effect resolution
//!
//! Everything is an axis-aligned square, so overlap is a strict interval
//! test on both axes. Touching edges do not count.

use glam::Vec2;

use super::state::{ActiveEffects, Avatar, Booster, BoosterKind, Collectible, Hazard};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Square box from its top-left corner
    pub fn new(top_left: Vec2, size: f32) -> Self {
        Self {
            min: top_left,
            max: top_left + Vec2::splat(size),
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// What a hazard contact did this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardContact {
    /// Avatar was immune; nothing changed
    Ignored,
    /// Shield absorbed the hit
    Absorbed,
    /// Avatar lost a life
    Damaged,
}

/// Result of one frame of collision resolution
#[derive(Debug, Clone, Default)]
pub struct CollisionReport {
    /// Points earned from pickups
    pub points: u64,
    pub collectibles_picked: u32,
    pub hazard: Option<HazardContact>,
    pub boosters_picked: Vec<BoosterKind>,
}

impl CollisionReport {
    /// True if a hazard cost a life this frame
    pub fn took_damage(&self) -> bool {
        self.hazard == Some(HazardContact::Damaged)
    }
}

/// Resolve every avatar overlap for the frame at tick `now`.
///
/// At most one hazard contact is handled per frame: the first overlapping
/// hazard in iteration order.
pub fn resolve_collisions(
    avatar: &mut Avatar,
    collectibles: &mut Vec<Collectible>,
    hazards: &[Hazard],
    boosters: &mut Vec<Booster>,
    effects: &mut ActiveEffects,
    now: u64,
) -> CollisionReport {
    let mut report = CollisionReport::default();
    let avatar_box = avatar.bounds();

    // Collectibles
    collectibles.retain(|star| {
        if avatar_box.overlaps(&star.bounds()) {
            let points = star.value_at(now);
            report.points += points;
            report.collectibles_picked += 1;
            log::debug!("Collectible {} picked up for {} pts", star.id, points);
            false
        } else {
            true
        }
    });

    // Hazards
    if let Some(hazard) = hazards.iter().find(|h| avatar_box.overlaps(&h.bounds())) {
        let contact = if effects.is_immune(now) {
            HazardContact::Ignored
        } else if avatar.has_shield {
            avatar.has_shield = false;
            log::debug!("Shield absorbed hazard {}", hazard.id);
            HazardContact::Absorbed
        } else {
            avatar.lose_life();
            effects.immunity.activate(now);
            log::debug!("Hazard {} hit, {} lives left", hazard.id, avatar.lives);
            HazardContact::Damaged
        };
        report.hazard = Some(contact);
    }

    // Boosters
    boosters.retain(|booster| {
        if !avatar_box.overlaps(&booster.bounds()) {
            return true;
        }
        match booster.kind {
            BoosterKind::Shield => avatar.has_shield = true,
            BoosterKind::SlowField => effects.slow_field.activate(now),
        }
        log::debug!("Booster {:?} picked up", booster.kind);
        report.boosters_picked.push(booster.kind);
        false
    });

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn avatar_at(x: f32, y: f32) -> Avatar {
        let mut avatar = Avatar::new(3);
        avatar.pos = Vec2::new(x, y);
        avatar
    }

    fn star(id: u32, x: f32, y: f32, created_at: u64) -> Collectible {
        Collectible {
            id,
            pos: Vec2::new(x, y),
            size: COLLECTIBLE_SIZE,
            created_at,
        }
    }

    fn hazard(id: u32, x: f32, y: f32) -> Hazard {
        Hazard {
            id,
            pos: Vec2::new(x, y),
            size: HAZARD_SIZE,
            vel: Vec2::new(3.0, 3.0),
        }
    }

    fn booster(kind: BoosterKind, x: f32, y: f32) -> Booster {
        Booster {
            id: 99,
            kind,
            pos: Vec2::new(x, y),
            size: BOOSTER_SIZE,
        }
    }

    #[test]
    fn test_aabb_strict_overlap() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), 10.0);
        assert!(a.overlaps(&Aabb::new(Vec2::new(9.9, 9.9), 10.0)));
        // Shared edge is not an overlap
        assert!(!a.overlaps(&Aabb::new(Vec2::new(10.0, 0.0), 10.0)));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(0.0, 10.0), 10.0)));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(-10.0, 0.0), 10.0)));
    }

    #[test]
    fn test_pickup_scores_by_age() {
        let mut avatar = avatar_at(200.0, 200.0);
        let mut stars = vec![
            star(1, 210.0, 210.0, 0),
            star(2, 220.0, 220.0, 100),
            star(3, 600.0, 500.0, 0),
        ];
        let mut effects = ActiveEffects::default();

        let report = resolve_collisions(
            &mut avatar,
            &mut stars,
            &[],
            &mut Vec::new(),
            &mut effects,
            FAST_PICKUP_TICKS + 50,
        );

        // Star 1 is late (350 ticks old), star 2 is fresh (250 ticks old)
        assert_eq!(report.points, LATE_PICKUP_POINTS + FAST_PICKUP_POINTS);
        assert_eq!(report.collectibles_picked, 2);
        assert_eq!(stars.len(), 1);
        assert_eq!(stars[0].id, 3);
    }

    #[test]
    fn test_hazard_damages_and_starts_immunity() {
        let mut avatar = avatar_at(200.0, 200.0);
        let mut effects = ActiveEffects::default();
        let hazards = [hazard(1, 220.0, 220.0)];

        let report = resolve_collisions(
            &mut avatar,
            &mut Vec::new(),
            &hazards,
            &mut Vec::new(),
            &mut effects,
            500,
        );
        assert!(report.took_damage());
        assert_eq!(avatar.lives, 2);
        assert!(effects.is_immune(500));
        assert_eq!(effects.immunity.activated_at, 500);
    }

    #[test]
    fn test_hazard_ignored_while_immune() {
        let mut avatar = avatar_at(200.0, 200.0);
        avatar.has_shield = true;
        let mut effects = ActiveEffects::default();
        effects.immunity.activate(400);
        let hazards = [hazard(1, 220.0, 220.0)];

        let report = resolve_collisions(
            &mut avatar,
            &mut Vec::new(),
            &hazards,
            &mut Vec::new(),
            &mut effects,
            400 + IMMUNITY_TICKS - 1,
        );
        assert_eq!(report.hazard, Some(HazardContact::Ignored));
        assert_eq!(avatar.lives, 3);
        assert!(avatar.has_shield);
        assert_eq!(effects.immunity.activated_at, 400);
    }

    #[test]
    fn test_shield_absorbs_without_immunity() {
        let mut avatar = avatar_at(200.0, 200.0);
        avatar.has_shield = true;
        let mut effects = ActiveEffects::default();
        let hazards = [hazard(1, 220.0, 220.0)];

        let report = resolve_collisions(
            &mut avatar,
            &mut Vec::new(),
            &hazards,
            &mut Vec::new(),
            &mut effects,
            1000,
        );
        assert_eq!(report.hazard, Some(HazardContact::Absorbed));
        assert_eq!(avatar.lives, 3);
        assert!(!avatar.has_shield);
        assert!(!effects.immunity.active);
    }

    #[test]
    fn test_one_hazard_contact_per_frame() {
        let mut avatar = avatar_at(200.0, 200.0);
        avatar.has_shield = true;
        let mut effects = ActiveEffects::default();
        let hazards = [hazard(1, 220.0, 220.0), hazard(2, 190.0, 190.0)];

        resolve_collisions(
            &mut avatar,
            &mut Vec::new(),
            &hazards,
            &mut Vec::new(),
            &mut effects,
            1000,
        );
        // The shield took the first hit, the second hazard waits for next frame
        assert_eq!(avatar.lives, 3);
        assert!(!avatar.has_shield);
    }

    #[test]
    fn test_boosters_apply_effects() {
        let mut avatar = avatar_at(200.0, 200.0);
        let mut effects = ActiveEffects::default();
        let mut boosters = vec![
            booster(BoosterKind::Shield, 210.0, 210.0),
            booster(BoosterKind::SlowField, 230.0, 230.0),
        ];

        let report = resolve_collisions(
            &mut avatar,
            &mut Vec::new(),
            &[],
            &mut boosters,
            &mut effects,
            42,
        );
        assert!(boosters.is_empty());
        assert_eq!(
            report.boosters_picked,
            vec![BoosterKind::Shield, BoosterKind::SlowField]
        );
        assert!(avatar.has_shield);
        assert!(effects.slow_field.is_running(42));
        assert_eq!(effects.hazard_speed_mod(42), SLOW_FIELD_FACTOR);
    }

    #[test]
    fn test_slow_field_pickup_restarts_timer() {
        let mut avatar = avatar_at(200.0, 200.0);
        let mut effects = ActiveEffects::default();
        effects.slow_field.activate(10);
        let mut boosters = vec![booster(BoosterKind::SlowField, 210.0, 210.0)];

        resolve_collisions(
            &mut avatar,
            &mut Vec::new(),
            &[],
            &mut boosters,
            &mut effects,
            200,
        );
        assert_eq!(effects.slow_field.activated_at, 200);
    }
}
