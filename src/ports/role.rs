//! Role port - what an agent controller needs from the character it governs
//!
//! A role bundles the capabilities the learning loop relies on: reading an
//! observation out of the shared environment, issuing one action command,
//! and reporting whether the character (and the episode) is still running.
//! Concrete roles live in [`crate::roles`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    encoding::StateEncoder,
    env::EnvironmentState,
    labels::Label,
    reward::RewardModel,
};

/// The two learning roles in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    /// The archer enemy, fighting the protagonist at range.
    Ranged,
    /// The support bird that tries to stay close to the protagonist.
    Flyer,
}

impl RoleKind {
    pub const ALL: [RoleKind; 2] = [RoleKind::Ranged, RoleKind::Flyer];
    const NAMES: &'static str = "ranged, flyer";

    pub fn name(self) -> &'static str {
        match self {
            RoleKind::Ranged => "ranged",
            RoleKind::Flyer => "flyer",
        }
    }

    /// Directory, relative to the storage root, that holds this role's
    /// snapshots.
    pub fn snapshot_dir(self) -> &'static str {
        match self {
            RoleKind::Ranged => "q_tables",
            RoleKind::Flyer => "bird_q_tables",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ranged" | "archer" => Ok(RoleKind::Ranged),
            "flyer" | "bird" => Ok(RoleKind::Flyer),
            other => Err(Error::ParseRole {
                input: other.to_string(),
                expected: Self::NAMES.to_string(),
            }),
        }
    }
}

/// Capabilities of one learnable character.
///
/// # Design Philosophy
///
/// The environment is owned by whoever drives training and is passed in by
/// reference on every call, so roles hold no game state of their own. The
/// associated types tie a role to its action space, its state encoder and
/// its reward model at compile time.
///
/// # Examples
///
/// ```no_run
/// use sarsa_arena::{
///     env::{EnvironmentState, ProtagonistKind},
///     ports::Role,
///     roles::RangedRole,
/// };
///
/// let env = EnvironmentState::new(ProtagonistKind::Patrol, Some(1));
/// let role = RangedRole;
/// assert!(role.is_alive(&env));
/// let _observation = role.observe(&env);
/// ```
pub trait Role: Send {
    /// Discrete actions this role can issue.
    type Action: Label;

    /// Raw values read from the environment each tick.
    type Observation;

    /// Maps observations to state keys.
    type Encoder: StateEncoder<Observation = Self::Observation> + Send;

    /// Scores observations.
    type Reward: RewardModel<Observation = Self::Observation>;

    fn kind(&self) -> RoleKind;

    /// Read this role's view of the environment.
    fn observe(&self, env: &EnvironmentState) -> Self::Observation;

    /// Issue one action command for the current tick.
    fn apply_action(&self, env: &mut EnvironmentState, action: Self::Action);

    /// Whether the governed character can still act.
    ///
    /// A dead character skips every tick until the next reset.
    fn is_alive(&self, env: &EnvironmentState) -> bool;

    /// Whether the episode is over from this role's point of view.
    ///
    /// # Default Implementation
    ///
    /// Episodes end when the protagonist has been defeated.
    fn is_terminal(&self, env: &EnvironmentState) -> bool {
        !env.protagonist.alive
    }
}
