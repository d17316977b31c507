//! The support bird: learns to stay close to the protagonist

use crate::{
    actions::FlyerAction,
    encoding::{FlyerEncoder, FlyerObservation},
    env::EnvironmentState,
    ports::{Role, RoleKind},
    reward::FlyerReward,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct FlyerRole;

impl Role for FlyerRole {
    type Action = FlyerAction;
    type Observation = FlyerObservation;
    type Encoder = FlyerEncoder;
    type Reward = FlyerReward;

    fn kind(&self) -> RoleKind {
        RoleKind::Flyer
    }

    /// Offsets between hit box centres.
    fn observe(&self, env: &EnvironmentState) -> FlyerObservation {
        let bird = &env.bird.bounds;
        let protagonist = &env.protagonist.bounds;
        FlyerObservation {
            dx: protagonist.center_x() - bird.center_x(),
            dy: protagonist.center_y() - bird.center_y(),
        }
    }

    fn apply_action(&self, env: &mut EnvironmentState, action: FlyerAction) {
        env.bird.apply(action);
    }

    /// The bird cannot be hurt.
    fn is_alive(&self, _env: &EnvironmentState) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ProtagonistKind;

    #[test]
    fn test_moving_toward_protagonist_shrinks_offset() {
        let mut env = EnvironmentState::new(ProtagonistKind::Stationary, Some(0));
        let before = FlyerRole.observe(&env);
        assert!(before.dx < 0.0);
        FlyerRole.apply_action(&mut env, FlyerAction::MoveLeft);
        let after = FlyerRole.observe(&env);
        assert!(after.dx.abs() < before.dx.abs());
    }

    #[test]
    fn test_episode_ends_with_protagonist() {
        let mut env = EnvironmentState::new(ProtagonistKind::Stationary, Some(0));
        assert!(!FlyerRole.is_terminal(&env));
        env.protagonist.alive = false;
        assert!(FlyerRole.is_terminal(&env));
    }
}
