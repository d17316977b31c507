//! State encoding for the ranged (archer) role

use std::{fmt, str::FromStr};

use super::{Side, StateEncoder, finish, take};
use crate::{
    Error,
    env::{ArcherAction, Heading},
    labels::labels,
};

labels! {
    /// Horizontal distance band, by `|dx|`.
    pub enum RangeBucket {
        MeleeRange => "melee_range",
        Close => "close",
        MediumClose => "medium_close",
        Medium => "medium",
        MediumFar => "medium_far",
        Far => "far",
        VeryFar => "very_far",
        ExtremeRange => "extreme_range",
    }
}

impl RangeBucket {
    pub fn of(dx: f64) -> Self {
        let distance = dx.abs();
        if distance <= 40.0 {
            RangeBucket::MeleeRange
        } else if distance <= 80.0 {
            RangeBucket::Close
        } else if distance <= 120.0 {
            RangeBucket::MediumClose
        } else if distance <= 160.0 {
            RangeBucket::Medium
        } else if distance <= 200.0 {
            RangeBucket::MediumFar
        } else if distance <= 250.0 {
            RangeBucket::Far
        } else if distance <= 300.0 {
            RangeBucket::VeryFar
        } else {
            RangeBucket::ExtremeRange
        }
    }
}

labels! {
    /// Vertical relationship, by signed `dy` (negative = protagonist above).
    pub enum LevelBucket {
        SameLevel => "same_level",
        SlightlyAbove => "slightly_above",
        FarAbove => "far_above",
        SlightlyBelow => "slightly_below",
        FarBelow => "far_below",
    }
}

impl LevelBucket {
    pub fn of(dy: f64) -> Self {
        if dy.abs() <= 20.0 {
            LevelBucket::SameLevel
        } else if dy > -60.0 && dy <= -20.0 {
            LevelBucket::SlightlyAbove
        } else if dy <= -60.0 {
            LevelBucket::FarAbove
        } else if dy > 20.0 && dy <= 60.0 {
            LevelBucket::SlightlyBelow
        } else {
            LevelBucket::FarBelow
        }
    }
}

labels! {
    pub enum HealthBand {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

/// Strict lower bounds of the `high` and `medium` health bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthThresholds {
    pub high_above: i32,
    pub medium_above: i32,
}

impl HealthThresholds {
    /// Bands for the archer (50 max health).
    pub const ARCHER: Self = Self {
        high_above: 35,
        medium_above: 15,
    };

    /// Bands for the protagonist (100 max health).
    pub const PROTAGONIST: Self = Self {
        high_above: 66,
        medium_above: 33,
    };

    pub fn band(&self, health: i32) -> HealthBand {
        if health > self.high_above {
            HealthBand::High
        } else if health > self.medium_above {
            HealthBand::Medium
        } else {
            HealthBand::Low
        }
    }
}

labels! {
    pub enum Facing {
        FacingPlayer => "facing_player",
        NotFacingPlayer => "not_facing_player",
    }
}

impl Facing {
    /// Facing iff the heading points toward the sign of `dx`.
    pub fn of(heading: Heading, dx: f64) -> Self {
        let toward = match heading {
            Heading::Right => dx > 0.0,
            Heading::Left => dx < 0.0,
        };
        if toward {
            Facing::FacingPlayer
        } else {
            Facing::NotFacingPlayer
        }
    }
}

labels! {
    pub enum Readiness {
        AttackReady => "attack_ready",
        AttackCooldown => "attack_cooldown",
    }
}

impl Readiness {
    pub fn of(cooldown: u32) -> Self {
        if cooldown == 0 {
            Readiness::AttackReady
        } else {
            Readiness::AttackCooldown
        }
    }
}

/// Everything the ranged role reads from the environment in one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangedObservation {
    /// Protagonist x minus archer x (top-left corners).
    pub dx: f64,
    /// Protagonist y minus archer y (top-left corners).
    pub dy: f64,
    pub health: i32,
    pub opponent_health: i32,
    pub action: ArcherAction,
    pub heading: Heading,
    pub attack_cooldown: u32,
    /// An attack began during the last applied action.
    pub attack_started: bool,
    /// One of the archer's arrows struck the protagonist this tick.
    pub hit_landed: bool,
    /// That strike reduced the protagonist to zero health.
    pub killed: bool,
}

/// Structured state key for the ranged role. Field order is the key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RangedStateKey {
    pub range: RangeBucket,
    pub side: Side,
    pub level: LevelBucket,
    pub health: HealthBand,
    pub opponent_health: HealthBand,
    pub action: ArcherAction,
    pub facing: Facing,
    pub readiness: Readiness,
}

impl fmt::Display for RangedStateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}_{}_{}_{}",
            self.range,
            self.side,
            self.level,
            self.health,
            self.opponent_health,
            self.action,
            self.facing,
            self.readiness
        )
    }
}

impl FromStr for RangedStateKey {
    type Err = Error;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let (range, rest) = take(key, key, "range bucket")?;
        let (side, rest) = take(key, rest, "direction")?;
        let (level, rest) = take(key, rest, "vertical bucket")?;
        let (health, rest) = take(key, rest, "own health band")?;
        let (opponent_health, rest) = take(key, rest, "opponent health band")?;
        let (action, rest) = take(key, rest, "action label")?;
        let (facing, rest) = take(key, rest, "facing")?;
        let (readiness, rest) = take(key, rest, "readiness")?;
        finish(key, rest)?;
        Ok(Self {
            range,
            side,
            level,
            health,
            opponent_health,
            action,
            facing,
            readiness,
        })
    }
}

/// Encoder for the ranged role.
#[derive(Debug, Clone, Copy)]
pub struct RangedEncoder {
    pub own_thresholds: HealthThresholds,
    pub opponent_thresholds: HealthThresholds,
}

impl Default for RangedEncoder {
    fn default() -> Self {
        Self {
            own_thresholds: HealthThresholds::ARCHER,
            opponent_thresholds: HealthThresholds::PROTAGONIST,
        }
    }
}

impl StateEncoder for RangedEncoder {
    type Observation = RangedObservation;
    type Key = RangedStateKey;

    fn encode(&self, obs: &RangedObservation) -> RangedStateKey {
        RangedStateKey {
            range: RangeBucket::of(obs.dx),
            side: Side::of(obs.dx),
            level: LevelBucket::of(obs.dy),
            health: self.own_thresholds.band(obs.health),
            opponent_health: self.opponent_thresholds.band(obs.opponent_health),
            action: obs.action,
            facing: Facing::of(obs.heading, obs.dx),
            readiness: Readiness::of(obs.attack_cooldown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation() -> RangedObservation {
        RangedObservation {
            dx: 130.0,
            dy: 0.0,
            health: 50,
            opponent_health: 100,
            action: ArcherAction::Idle,
            heading: Heading::Right,
            attack_cooldown: 0,
            attack_started: false,
            hit_landed: false,
            killed: false,
        }
    }

    #[test]
    fn test_range_boundaries() {
        assert_eq!(RangeBucket::of(40.0), RangeBucket::MeleeRange);
        assert_eq!(RangeBucket::of(-40.5), RangeBucket::Close);
        assert_eq!(RangeBucket::of(120.0), RangeBucket::MediumClose);
        assert_eq!(RangeBucket::of(160.0), RangeBucket::Medium);
        assert_eq!(RangeBucket::of(200.0), RangeBucket::MediumFar);
        assert_eq!(RangeBucket::of(-250.0), RangeBucket::Far);
        assert_eq!(RangeBucket::of(300.0), RangeBucket::VeryFar);
        assert_eq!(RangeBucket::of(300.1), RangeBucket::ExtremeRange);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(LevelBucket::of(-20.0), LevelBucket::SameLevel);
        assert_eq!(LevelBucket::of(20.0), LevelBucket::SameLevel);
        assert_eq!(LevelBucket::of(-20.5), LevelBucket::SlightlyAbove);
        assert_eq!(LevelBucket::of(-60.0), LevelBucket::FarAbove);
        assert_eq!(LevelBucket::of(60.0), LevelBucket::SlightlyBelow);
        assert_eq!(LevelBucket::of(60.5), LevelBucket::FarBelow);
    }

    #[test]
    fn test_health_bands_per_role() {
        assert_eq!(HealthThresholds::ARCHER.band(36), HealthBand::High);
        assert_eq!(HealthThresholds::ARCHER.band(35), HealthBand::Medium);
        assert_eq!(HealthThresholds::ARCHER.band(15), HealthBand::Low);
        assert_eq!(HealthThresholds::PROTAGONIST.band(67), HealthBand::High);
        assert_eq!(HealthThresholds::PROTAGONIST.band(66), HealthBand::Medium);
        assert_eq!(HealthThresholds::PROTAGONIST.band(33), HealthBand::Low);
    }

    #[test]
    fn test_facing_requires_strict_sign() {
        assert_eq!(Facing::of(Heading::Right, 10.0), Facing::FacingPlayer);
        assert_eq!(Facing::of(Heading::Left, 10.0), Facing::NotFacingPlayer);
        assert_eq!(Facing::of(Heading::Left, -1.0), Facing::FacingPlayer);
        assert_eq!(Facing::of(Heading::Left, 0.0), Facing::NotFacingPlayer);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let encoder = RangedEncoder::default();
        assert_eq!(encoder.encode(&observation()), encoder.encode(&observation()));

        // Non-bucket fields do not influence the key.
        let mut noisy = observation();
        noisy.dx = 125.0;
        noisy.hit_landed = true;
        assert_eq!(encoder.encode(&noisy), encoder.encode(&observation()));
    }

    #[test]
    fn test_each_bucket_field_changes_key() {
        let encoder = RangedEncoder::default();
        let base = encoder.encode(&observation());

        let variants: Vec<RangedObservation> = vec![
            RangedObservation { dx: 20.0, ..observation() },
            RangedObservation { dx: -130.0, heading: Heading::Left, ..observation() },
            RangedObservation { dy: -40.0, ..observation() },
            RangedObservation { health: 10, ..observation() },
            RangedObservation { opponent_health: 50, ..observation() },
            RangedObservation { action: ArcherAction::Run, ..observation() },
            RangedObservation { heading: Heading::Left, ..observation() },
            RangedObservation { attack_cooldown: 12, ..observation() },
        ];
        for variant in variants {
            assert_ne!(encoder.encode(&variant), base, "{variant:?}");
        }
    }

    #[test]
    fn test_key_renders_in_fixed_order() {
        let key = RangedEncoder::default().encode(&observation());
        assert_eq!(
            key.to_string(),
            "medium_right_same_level_high_high_idle_facing_player_attack_ready"
        );
    }

    #[test]
    fn test_key_parses_back() {
        let key = RangedStateKey {
            range: RangeBucket::MediumFar,
            side: Side::Left,
            level: LevelBucket::FarBelow,
            health: HealthBand::Medium,
            opponent_health: HealthBand::Low,
            action: ArcherAction::Attack,
            facing: Facing::NotFacingPlayer,
            readiness: Readiness::AttackCooldown,
        };
        let parsed: RangedStateKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_rejects_unknown_key() {
        assert!("nowhere_right_same_level_high_high_idle_facing_player_attack_ready"
            .parse::<RangedStateKey>()
            .is_err());
        assert!("close_right_same_level_high_high_idle_facing_player_attack_ready_extra"
            .parse::<RangedStateKey>()
            .is_err());
    }
}
