//! Q-table implementation for temporal difference learning

use std::{collections::HashMap, path::Path};

use super::{
    policy::first_max,
    serialization::{SnapshotRow, SnapshotTable},
};
use crate::{Error, Result, actions::ActionSpace, encoding::StateKey, labels::Label};

/// Sparse Q-table mapping state keys to one value per action.
///
/// Rows are created lazily, zero-filled, the first time a state is touched
/// by selection or by an update, and are never removed afterwards. Row
/// entries follow the action space order.
#[derive(Debug, Clone)]
pub struct QTable<K, A: 'static> {
    rows: HashMap<K, Vec<f64>>,
    space: ActionSpace<A>,
}

impl<K: StateKey, A: Label> QTable<K, A> {
    /// Create an empty Q-table over the given action space
    pub fn new(space: ActionSpace<A>) -> Self {
        Self {
            rows: HashMap::new(),
            space,
        }
    }

    pub fn space(&self) -> &ActionSpace<A> {
        &self.space
    }

    /// Row for `state`, if it has been touched.
    pub fn row(&self, state: &K) -> Option<&[f64]> {
        self.rows.get(state).map(Vec::as_slice)
    }

    /// Row for `state`, created zero-filled when absent.
    pub fn row_mut(&mut self, state: &K) -> &mut [f64] {
        let width = self.space.len();
        self.rows
            .entry(state.clone())
            .or_insert_with(|| vec![0.0; width])
    }

    /// Get Q-value for a state-action pair, if the row exists
    pub fn get(&self, state: &K, action: A) -> Option<f64> {
        self.row(state).map(|row| row[action.index()])
    }

    /// Set Q-value for a state-action pair, creating the row if needed
    pub fn set(&mut self, state: &K, action: A, value: f64) {
        self.row_mut(state)[action.index()] = value;
    }

    pub fn contains(&self, state: &K) -> bool {
        self.rows.contains_key(state)
    }

    /// Number of states with a row
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First action holding the row maximum, if the row exists.
    pub fn greedy_action(&self, state: &K) -> Option<A> {
        self.row(state)
            .and_then(|row| self.space.get(first_max(row)))
    }

    /// SARSA update: on-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ Q(s',a') - Q(s,a)]
    ///
    /// Both rows are created before the update. Returns the new Q(s,a).
    #[allow(clippy::too_many_arguments)]
    pub fn sarsa_update(
        &mut self,
        state: &K,
        action: A,
        reward: f64,
        next_state: &K,
        next_action: A,
        learning_rate: f64,
        discount_factor: f64,
    ) -> f64 {
        let next_q = self.row_mut(next_state)[next_action.index()];
        let slot = &mut self.row_mut(state)[action.index()];
        let current_q = *slot;
        let td_target = reward + discount_factor * next_q;
        let new_q = current_q + learning_rate * (td_target - current_q);
        *slot = new_q;
        new_q
    }

    /// The `n` states with the highest maximum value, each with its greedy
    /// action and that value. Equal values keep key order.
    pub fn top_states(&self, n: usize) -> Vec<(&K, A, f64)> {
        let mut best: Vec<_> = self
            .sorted_rows()
            .into_iter()
            .filter_map(|(key, row)| {
                let index = first_max(row);
                self.space.get(index).map(|action| (key, action, row[index]))
            })
            .collect();
        best.sort_by(|a, b| b.2.total_cmp(&a.2));
        best.truncate(n);
        best
    }

    /// Iterate rows in key order
    pub fn sorted_rows(&self) -> Vec<(&K, &[f64])> {
        let mut rows: Vec<_> = self
            .rows
            .iter()
            .map(|(key, row)| (key, row.as_slice()))
            .collect();
        rows.sort_by(|(a, _), (b, _)| a.cmp(b));
        rows
    }

    /// Convert to the persisted representation
    pub fn to_snapshot(&self) -> SnapshotTable {
        self.sorted_rows()
            .into_iter()
            .map(|(key, row)| {
                let entries = self
                    .space
                    .actions()
                    .iter()
                    .zip(row)
                    .map(|(action, value)| (action.label().to_string(), *value))
                    .collect();
                (key.to_string(), SnapshotRow(entries))
            })
            .collect()
    }

    /// Rebuild a table from its persisted representation.
    ///
    /// Every key must parse and every row must carry exactly the actions of
    /// the space. `source` only labels errors.
    pub fn from_snapshot(
        snapshot: &SnapshotTable,
        space: ActionSpace<A>,
        source: &Path,
    ) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedSnapshot {
            path: source.to_path_buf(),
            reason,
        };

        let mut table = Self::new(space);
        for (raw_key, raw_row) in snapshot.iter() {
            let key: K = raw_key
                .parse()
                .map_err(|e: Error| malformed(e.to_string()))?;

            let mut row = vec![None; space.len()];
            for (name, value) in &raw_row.0 {
                let action = A::from_label(name).ok_or_else(|| {
                    malformed(format!("unknown action '{name}' in state '{raw_key}'"))
                })?;
                row[action.index()] = Some(*value);
            }

            let values = row
                .into_iter()
                .enumerate()
                .map(|(index, value)| {
                    value.ok_or_else(|| {
                        let missing = space.get(index).map(|a| a.label()).unwrap_or("?");
                        malformed(format!("state '{raw_key}' is missing action '{missing}'"))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            table.rows.insert(key, values);
        }
        Ok(table)
    }
}
