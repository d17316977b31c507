//! State encoding for the flyer (support bird) role

use std::{fmt, str::FromStr};

use super::{Side, StateEncoder, finish, take};
use crate::{Error, labels::labels};

/// Half-width of the square window counted as "close" to the protagonist.
pub const CLOSE_WINDOW: f64 = 50.0;
/// Half-width of the square window counted as "far".
pub const FAR_WINDOW: f64 = 150.0;

labels! {
    pub enum Proximity {
        Close => "close",
        Far => "far",
        VeryFar => "very_far",
    }
}

impl Proximity {
    pub fn of(dx: f64, dy: f64) -> Self {
        let (x, y) = (dx.abs(), dy.abs());
        if x <= CLOSE_WINDOW && y <= CLOSE_WINDOW {
            Proximity::Close
        } else if x <= FAR_WINDOW && y <= FAR_WINDOW {
            Proximity::Far
        } else {
            Proximity::VeryFar
        }
    }
}

labels! {
    pub enum Vertical {
        Above => "above",
        Below => "below",
    }
}

impl Vertical {
    /// `above` when the protagonist's centre is higher on screen.
    pub fn of(dy: f64) -> Self {
        if dy < 0.0 { Vertical::Above } else { Vertical::Below }
    }
}

/// Offsets from the bird's centre to the protagonist's centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyerObservation {
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlyerStateKey {
    pub proximity: Proximity,
    pub side: Side,
    pub vertical: Vertical,
}

impl fmt::Display for FlyerStateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.proximity, self.side, self.vertical)
    }
}

impl FromStr for FlyerStateKey {
    type Err = Error;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let (proximity, rest) = take(key, key, "proximity")?;
        let (side, rest) = take(key, rest, "horizontal direction")?;
        let (vertical, rest) = take(key, rest, "vertical direction")?;
        finish(key, rest)?;
        Ok(Self {
            proximity,
            side,
            vertical,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlyerEncoder;

impl StateEncoder for FlyerEncoder {
    type Observation = FlyerObservation;
    type Key = FlyerStateKey;

    fn encode(&self, obs: &FlyerObservation) -> FlyerStateKey {
        FlyerStateKey {
            proximity: Proximity::of(obs.dx, obs.dy),
            side: Side::of(obs.dx),
            vertical: Vertical::of(obs.dy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proximity_windows() {
        assert_eq!(Proximity::of(50.0, -50.0), Proximity::Close);
        assert_eq!(Proximity::of(51.0, 0.0), Proximity::Far);
        assert_eq!(Proximity::of(0.0, 150.0), Proximity::Far);
        assert_eq!(Proximity::of(151.0, 10.0), Proximity::VeryFar);
    }

    #[test]
    fn test_encode_directions() {
        let key = FlyerEncoder.encode(&FlyerObservation { dx: 30.0, dy: -10.0 });
        assert_eq!(key.to_string(), "close_right_above");

        let key = FlyerEncoder.encode(&FlyerObservation { dx: 0.0, dy: 0.0 });
        assert_eq!(key.to_string(), "close_left_below");
    }

    #[test]
    fn test_every_key_parses_back() {
        for &proximity in <Proximity as crate::labels::Label>::ALL {
            for &side in <Side as crate::labels::Label>::ALL {
                for &vertical in <Vertical as crate::labels::Label>::ALL {
                    let key = FlyerStateKey {
                        proximity,
                        side,
                        vertical,
                    };
                    assert_eq!(key.to_string().parse::<FlyerStateKey>().unwrap(), key);
                }
            }
        }
    }
}
