//! Discrete state encoding
//!
//! Encoders turn raw environment observations into structured, totally
//! ordered state keys. A key is built from named categorical buckets whose
//! order is fixed; keys only become strings when a snapshot is written.
//!
//! Every bucketing function has a catch-all branch, so encoding is total and
//! never fails.

pub mod flyer;
pub mod ranged;

use std::{fmt, hash::Hash, str::FromStr};

use crate::{
    Error,
    labels::{Label, labels},
};

pub use flyer::{FlyerEncoder, FlyerObservation, FlyerStateKey, Proximity, Vertical};
pub use ranged::{
    Facing, HealthBand, HealthThresholds, LevelBucket, RangeBucket, RangedEncoder,
    RangedObservation, RangedStateKey, Readiness,
};

/// A discrete state key usable as a Q-table row index.
///
/// `Display` renders the persisted form; `FromStr` parses it back.
pub trait StateKey:
    Clone + Eq + Ord + Hash + fmt::Debug + fmt::Display + FromStr<Err = Error> + Send + 'static
{
}

impl<T> StateKey for T where
    T: Clone + Eq + Ord + Hash + fmt::Debug + fmt::Display + FromStr<Err = Error> + Send + 'static
{
}

/// Pure mapping from an observation to a state key.
pub trait StateEncoder {
    type Observation;
    type Key: StateKey;

    fn encode(&self, observation: &Self::Observation) -> Self::Key;
}

labels! {
    /// Horizontal side on which the protagonist lies.
    pub enum Side {
        Right => "right",
        Left => "left",
    }
}

impl Side {
    /// `right` for strictly positive offsets, `left` otherwise.
    pub fn of(dx: f64) -> Self {
        if dx > 0.0 { Side::Right } else { Side::Left }
    }
}

/// Parse the next component of a persisted key, reporting which one failed.
pub(crate) fn take<'a, L: Label>(
    key: &str,
    rest: &'a str,
    component: &str,
) -> Result<(L, &'a str), Error> {
    crate::labels::split_label::<L>(rest).ok_or_else(|| Error::InvalidStateKey {
        key: key.to_string(),
        reason: format!("expected {component} at '{rest}'"),
    })
}

/// Reject trailing components after a full key has been parsed.
pub(crate) fn finish(key: &str, rest: &str) -> Result<(), Error> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidStateKey {
            key: key.to_string(),
            reason: format!("unexpected trailing components '{rest}'"),
        })
    }
}
