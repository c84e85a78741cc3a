use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Error;
use crate::Result;

pub mod flappy;
pub mod time_limit;

pub use time_limit::TimeLimit;

/// Extra per-step diagnostics. Always empty from the Flappy Bird core.
pub type Info = HashMap<String, serde_json::Value>;

/// Observation returned by `reset` and `step`.
pub trait State: Clone + Eq + std::hash::Hash + Serialize + DeserializeOwned {
    /// Flat numeric view, one entry per observation slot.
    fn to_features(&self) -> Vec<f64>;
}

/// Discrete action, addressable by its index in the action space.
pub trait Action: Clone + Eq + std::hash::Hash + Serialize + DeserializeOwned {
    fn to_index(&self) -> usize;
    /// `None` for indices outside the action space.
    fn from_index(index: usize) -> Option<Self>;
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S> {
    pub observation: S,
    pub reward: f64,
    pub done: bool,
    pub info: Info,
}

impl<S> Step<S> {
    pub fn new(observation: S, reward: f64, done: bool) -> Self {
        Self {
            observation,
            reward,
            done,
            info: Info::new(),
        }
    }

    pub fn into_tuple(self) -> (S, f64, bool, Info) {
        (self.observation, self.reward, self.done, self.info)
    }
}

/// The environment interface that RL agents interact with
pub trait Environment {
    type S: State;
    type A: Action;

    /// (Re)seed the random source and return the seed actually used
    fn seed(&mut self, seed: Option<u64>) -> u64;

    /// Reset the environment to initial state
    fn reset(&mut self) -> Self::S;

    /// Advance one tick with the given action
    fn step(&mut self, action: &Self::A) -> Result<Step<Self::S>>;

    /// Advance one tick with an action given by index.
    ///
    /// Unknown indices are rejected before the environment is touched.
    fn step_index(&mut self, index: usize) -> Result<Step<Self::S>> {
        let action = Self::A::from_index(index).ok_or(Error::InvalidAction {
            index,
            size: self.action_space_size(),
        })?;
        self.step(&action)
    }

    /// Get the number of possible actions
    fn action_space_size(&self) -> usize;

    /// Get valid actions for current state
    fn valid_actions(&self, state: &Self::S) -> Vec<Self::A>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
    struct TestState(i32);

    impl State for TestState {
        fn to_features(&self) -> Vec<f64> {
            vec![self.0 as f64]
        }
    }

    #[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
    enum TestAction {
        Up,
        Down,
    }

    impl Action for TestAction {
        fn to_index(&self) -> usize {
            match self {
                TestAction::Up => 0,
                TestAction::Down => 1,
            }
        }

        fn from_index(index: usize) -> Option<Self> {
            match index {
                0 => Some(TestAction::Up),
                1 => Some(TestAction::Down),
                _ => None,
            }
        }
    }

    struct TestEnv {
        state: i32,
    }

    impl Environment for TestEnv {
        type S = TestState;
        type A = TestAction;

        fn seed(&mut self, seed: Option<u64>) -> u64 {
            seed.unwrap_or(0)
        }

        fn reset(&mut self) -> Self::S {
            self.state = 0;
            TestState(self.state)
        }

        fn step(&mut self, action: &Self::A) -> Result<Step<Self::S>> {
            match action {
                TestAction::Up => self.state += 1,
                TestAction::Down => self.state -= 1,
            }
            Ok(Step::new(TestState(self.state), 1.0, self.state.abs() > 2))
        }

        fn action_space_size(&self) -> usize {
            2
        }

        fn valid_actions(&self, _state: &Self::S) -> Vec<Self::A> {
            vec![TestAction::Up, TestAction::Down]
        }
    }

    #[test]
    fn test_step_index_dispatches() {
        let mut env = TestEnv { state: 0 };
        env.reset();
        let step = env.step_index(0).unwrap();
        assert_eq!(step.observation, TestState(1));
        let step = env.step_index(1).unwrap();
        assert_eq!(step.observation, TestState(0));
    }

    #[test]
    fn test_step_index_rejects_unknown_action() {
        let mut env = TestEnv { state: 0 };
        env.reset();
        match env.step_index(7) {
            Err(Error::InvalidAction { index, size }) => {
                assert_eq!(index, 7);
                assert_eq!(size, 2);
            }
            other => panic!("expected InvalidAction, got {:?}", other.map(|s| s.observation)),
        }
        assert_eq!(env.state, 0, "rejected action must not touch state");
    }

    #[test]
    fn test_step_into_tuple() {
        let (obs, reward, done, info) = Step::new(TestState(3), 2.5, true).into_tuple();
        assert_eq!(obs, TestState(3));
        assert_eq!(reward, 2.5);
        assert!(done);
        assert!(info.is_empty());
    }
}
