//! Discrete action spaces for each agent role

use rand::{Rng, seq::IndexedRandom};

use crate::{
    Error, Result,
    labels::{Label, labels},
};

labels! {
    /// Actions available to the ranged (archer) role.
    pub enum RangedAction {
        MoveLeft => "move_left",
        MoveRight => "move_right",
        Shoot => "shoot",
        Idle => "idle",
    }
}

labels! {
    /// Actions available to the flyer (support bird) role.
    pub enum FlyerAction {
        MoveUp => "move_up",
        MoveDown => "move_down",
        MoveLeft => "move_left",
        MoveRight => "move_right",
        MoveUpLeft => "move_up_left",
        MoveUpRight => "move_up_right",
        MoveDownLeft => "move_down_left",
        MoveDownRight => "move_down_right",
        Stay => "stay",
    }
}

impl FlyerAction {
    /// Unit step `(dx, dy)` for this action, screen coordinates (y down).
    pub fn direction(self) -> (f64, f64) {
        match self {
            FlyerAction::MoveUp => (0.0, -1.0),
            FlyerAction::MoveDown => (0.0, 1.0),
            FlyerAction::MoveLeft => (-1.0, 0.0),
            FlyerAction::MoveRight => (1.0, 0.0),
            FlyerAction::MoveUpLeft => (-1.0, -1.0),
            FlyerAction::MoveUpRight => (1.0, -1.0),
            FlyerAction::MoveDownLeft => (-1.0, 1.0),
            FlyerAction::MoveDownRight => (1.0, 1.0),
            FlyerAction::Stay => (0.0, 0.0),
        }
    }
}

/// The fixed, ordered, non-empty set of actions for one role.
///
/// Order matters: exploitation breaks ties in favour of the earliest action.
#[derive(Debug, Clone, Copy)]
pub struct ActionSpace<A: 'static> {
    actions: &'static [A],
}

impl<A: Label> ActionSpace<A> {
    /// Build the space for `A`, rejecting empty action sets.
    pub fn new(role: &str) -> Result<Self> {
        if A::ALL.is_empty() {
            return Err(Error::EmptyActionSpace {
                role: role.to_string(),
            });
        }
        Ok(Self { actions: A::ALL })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &'static [A] {
        self.actions
    }

    /// Action at `index` in declaration order.
    pub fn get(&self, index: usize) -> Option<A> {
        self.actions.get(index).copied()
    }

    /// Uniformly random action.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> A {
        // Non-empty by construction.
        *self.actions.choose(rng).unwrap_or(&self.actions[0])
    }
}
