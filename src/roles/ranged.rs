//! The archer: fights the protagonist at range

use crate::{
    actions::RangedAction,
    encoding::{RangedEncoder, RangedObservation},
    env::EnvironmentState,
    ports::{Role, RoleKind},
    reward::RangedReward,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RangedRole;

impl Role for RangedRole {
    type Action = RangedAction;
    type Observation = RangedObservation;
    type Encoder = RangedEncoder;
    type Reward = RangedReward;

    fn kind(&self) -> RoleKind {
        RoleKind::Ranged
    }

    /// Offsets use the top-left corners of both hit boxes.
    fn observe(&self, env: &EnvironmentState) -> RangedObservation {
        let archer = &env.archer;
        let protagonist = &env.protagonist;
        let events = env.events();
        RangedObservation {
            dx: protagonist.bounds.x - archer.bounds.x,
            dy: protagonist.bounds.y - archer.bounds.y,
            health: archer.health,
            opponent_health: protagonist.health,
            action: archer.action,
            heading: archer.heading,
            attack_cooldown: archer.attack_cooldown,
            attack_started: archer.attack_started,
            hit_landed: events.arrow_hit,
            killed: events.arrow_kill,
        }
    }

    fn apply_action(&self, env: &mut EnvironmentState, action: RangedAction) {
        env.archer.apply(action);
    }

    fn is_alive(&self, env: &EnvironmentState) -> bool {
        env.archer.alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encoding::StateEncoder,
        env::{Archer, Protagonist, ProtagonistKind},
    };

    #[test]
    fn test_initial_observation() {
        let env = EnvironmentState::new(ProtagonistKind::Stationary, Some(0));
        let obs = RangedRole.observe(&env);
        assert_eq!(obs.dx, env.protagonist.bounds.x - env.archer.bounds.x);
        assert!(obs.dx < 0.0);
        assert_eq!(obs.health, Archer::MAX_HEALTH);
        assert_eq!(obs.opponent_health, Protagonist::MAX_HEALTH);
        assert!(!obs.attack_started && !obs.hit_landed && !obs.killed);
    }

    #[test]
    fn test_shoot_is_visible_in_observation() {
        let mut env = EnvironmentState::new(ProtagonistKind::Stationary, Some(0));
        RangedRole.apply_action(&mut env, RangedAction::Shoot);
        env.advance();
        let obs = RangedRole.observe(&env);
        assert!(obs.attack_started);
        let key = RangedEncoder::default().encode(&obs);
        assert_eq!(key.to_string().split('_').last(), Some("cooldown"));
    }

    #[test]
    fn test_dead_archer_is_not_alive() {
        let mut env = EnvironmentState::new(ProtagonistKind::Stationary, Some(0));
        env.archer.take_damage(Archer::MAX_HEALTH);
        assert!(!RangedRole.is_alive(&env));
        assert!(!RangedRole.is_terminal(&env));
    }
}
