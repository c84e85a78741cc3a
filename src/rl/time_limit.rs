use tracing::debug;

use super::{Environment, Step};
use crate::Result;

/// Info key set when an episode is cut short by the step cap.
pub const TRUNCATED_KEY: &str = "TimeLimit.truncated";

/// Caller-side episode length cap layered over any environment.
///
/// Once `max_episode_steps` ticks have elapsed since the last `reset`, the
/// episode is reported as done and tagged with [`TRUNCATED_KEY`]. The wrapped
/// environment itself keeps running and is unaware of the cap.
pub struct TimeLimit<E> {
    env: E,
    max_episode_steps: usize,
    elapsed_steps: usize,
}

impl<E: Environment> TimeLimit<E> {
    pub fn new(env: E, max_episode_steps: usize) -> Self {
        Self {
            env,
            max_episode_steps,
            elapsed_steps: 0,
        }
    }

    pub fn elapsed_steps(&self) -> usize {
        self.elapsed_steps
    }

    pub fn max_episode_steps(&self) -> usize {
        self.max_episode_steps
    }

    pub fn inner(&self) -> &E {
        &self.env
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E: Environment> Environment for TimeLimit<E> {
    type S = E::S;
    type A = E::A;

    fn seed(&mut self, seed: Option<u64>) -> u64 {
        self.env.seed(seed)
    }

    fn reset(&mut self) -> Self::S {
        self.elapsed_steps = 0;
        self.env.reset()
    }

    fn step(&mut self, action: &Self::A) -> Result<Step<Self::S>> {
        let mut step = self.env.step(action)?;
        self.elapsed_steps += 1;
        if self.elapsed_steps >= self.max_episode_steps && !step.done {
            debug!(steps = self.elapsed_steps, "episode truncated by time limit");
            step.done = true;
            step.info.insert(TRUNCATED_KEY.to_string(), serde_json::Value::Bool(true));
        }
        Ok(step)
    }

    fn action_space_size(&self) -> usize {
        self.env.action_space_size()
    }

    fn valid_actions(&self, state: &Self::S) -> Vec<Self::A> {
        self.env.valid_actions(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlappyConfig;
    use crate::rl::flappy::{CollisionPolicy, FlappyBirdAction, FlappyBirdEnv};

    fn hovering_env(max_steps: usize) -> TimeLimit<FlappyBirdEnv> {
        let config = FlappyConfig::default()
            .with_policy(CollisionPolicy::HeightCutoff)
            .with_seed(7);
        TimeLimit::new(FlappyBirdEnv::new(config).unwrap(), max_steps)
    }

    fn hover_action(tick: usize) -> FlappyBirdAction {
        if tick % 2 == 0 {
            FlappyBirdAction::Flap
        } else {
            FlappyBirdAction::Fall
        }
    }

    #[test]
    fn test_truncates_at_cap() {
        let mut env = hovering_env(5);
        env.reset();

        for tick in 0..4 {
            let step = env.step(&hover_action(tick)).unwrap();
            assert!(!step.done, "tick {} should still be running", tick);
            assert!(step.info.is_empty());
        }

        let step = env.step(&hover_action(4)).unwrap();
        assert!(step.done);
        assert_eq!(step.info.get(TRUNCATED_KEY), Some(&serde_json::Value::Bool(true)));
        assert_eq!(step.reward, 1.0);
        assert_eq!(env.elapsed_steps(), 5);
    }

    #[test]
    fn test_reset_clears_counter() {
        let mut env = hovering_env(3);
        env.reset();
        for tick in 0..3 {
            env.step(&hover_action(tick)).unwrap();
        }
        env.reset();
        assert_eq!(env.elapsed_steps(), 0);
        let step = env.step(&hover_action(0)).unwrap();
        assert!(!step.done);
    }

    #[test]
    fn test_natural_termination_is_not_tagged() {
        let mut env = hovering_env(1000);
        env.reset();
        // Falling from the midpoint ends the episode within 21 ticks
        let mut last = None;
        for _ in 0..21 {
            last = Some(env.step(&FlappyBirdAction::Fall).unwrap());
        }
        let step = last.unwrap();
        assert!(step.done);
        assert!(!step.info.contains_key(TRUNCATED_KEY));
    }
}
