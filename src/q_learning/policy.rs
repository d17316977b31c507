//! Action selection policies

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::QTable;
use crate::{actions::ActionSpace, encoding::StateKey, labels::Label};

pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Index of the first maximal value.
///
/// Ties resolve to the lowest index, which is the earliest action in the
/// space. An empty slice yields 0.
pub fn first_max(values: &[f64]) -> usize {
    let mut best = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = index;
        }
    }
    best
}

/// Chooses an action from one row of action values.
///
/// Implementations must return a member of `space`.
pub trait ActionPolicy<A>: Send {
    fn choose(&mut self, values: &[f64], space: &ActionSpace<A>, epsilon: f64) -> A;

    /// Restart the policy's randomness from `seed`.
    fn reseed(&mut self, _seed: u64) {}
}

/// ε-greedy: uniform random with probability ε, otherwise first-max greedy.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    rng: StdRng,
}

impl EpsilonGreedy {
    /// Seeded when `seed` is given, from OS entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: build_rng(seed),
        }
    }
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<A: Label> ActionPolicy<A> for EpsilonGreedy {
    fn choose(&mut self, values: &[f64], space: &ActionSpace<A>, epsilon: f64) -> A {
        if self.rng.random::<f64>() < epsilon {
            space.sample(&mut self.rng)
        } else {
            let index = first_max(values);
            space.get(index).unwrap_or_else(|| space.sample(&mut self.rng))
        }
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Pick an action for `state`, creating its row first if it is unseen.
pub fn select<K, A>(
    policy: &mut dyn ActionPolicy<A>,
    state: &K,
    table: &mut QTable<K, A>,
    epsilon: f64,
) -> A
where
    K: StateKey,
    A: Label,
{
    let space = *table.space();
    let values = table.row_mut(state);
    policy.choose(values, &space, epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actions::{FlyerAction, RangedAction},
        encoding::{FlyerStateKey, Proximity, Side, Vertical},
    };

    fn key() -> FlyerStateKey {
        FlyerStateKey {
            proximity: Proximity::Far,
            side: Side::Right,
            vertical: Vertical::Below,
        }
    }

    #[test]
    fn test_first_max_breaks_ties_low() {
        assert_eq!(first_max(&[1.0, 3.0, 3.0, 0.0]), 1);
        assert_eq!(first_max(&[0.0, 0.0, 0.0]), 0);
        assert_eq!(first_max(&[-2.0, -1.0]), 1);
    }

    #[test]
    fn test_zero_epsilon_is_greedy() {
        let space = ActionSpace::<RangedAction>::new("ranged").unwrap();
        let mut policy = EpsilonGreedy::new(Some(1));
        for _ in 0..50 {
            let action = policy.choose(&[0.0, 1.0, 5.0, 5.0], &space, 0.0);
            assert_eq!(action, RangedAction::Shoot);
        }
    }

    #[test]
    fn test_full_epsilon_explores() {
        let space = ActionSpace::<FlyerAction>::new("flyer").unwrap();
        let mut policy = EpsilonGreedy::new(Some(42));
        let values = [0.0; 9];
        let distinct: std::collections::HashSet<_> =
            (0..500).map(|_| policy.choose(&values, &space, 1.0)).collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_seeded_policies_agree() {
        let space = ActionSpace::<FlyerAction>::new("flyer").unwrap();
        let mut a = EpsilonGreedy::new(Some(7));
        let mut b = EpsilonGreedy::new(Some(7));
        let values = [0.0; 9];
        for _ in 0..100 {
            assert_eq!(a.choose(&values, &space, 0.5), b.choose(&values, &space, 0.5));
        }
    }

    #[test]
    fn test_select_creates_unseen_row() {
        let mut table: QTable<FlyerStateKey, RangedAction> =
            QTable::new(ActionSpace::new("ranged").unwrap());
        let mut policy = EpsilonGreedy::new(Some(0));
        let action = select::<_, RangedAction>(&mut policy, &key(), &mut table, 0.0);
        assert_eq!(action, RangedAction::MoveLeft);
        assert_eq!(table.row(&key()), Some(&[0.0, 0.0, 0.0, 0.0][..]));
    }
}
