use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::collision::{CollisionPolicy, Rect};
use super::obstacle::{Obstacle, ObstacleGenerator};
use super::observation::{FlappyObservation, ObservationEmitter, ObservationSpace};
use super::rng::RngProvider;
use super::viz::Scene;
use super::FlappyBirdAction;
use crate::config::{FlappyConfig, ScreenSize};
use crate::error::Error;
use crate::rl::Step;
use crate::Result;

pub const AGENT_X: i32 = 70;
pub const AGENT_SIZE: i32 = 10;
/// Downward pull applied every tick.
pub const GRAVITY: i32 = 10;
/// Upward push applied on a flap, on top of gravity.
pub const THRUST: i32 = 20;

/// The bird. Only `y` ever changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Agent {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Agent {
    pub fn new(y: i32) -> Self {
        Self {
            x: AGENT_X,
            y,
            width: AGENT_SIZE,
            height: AGENT_SIZE,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    Active,
    /// `done` was returned on the last step.
    JustTerminated,
    /// `step` was called again after `done`; the advisory has been emitted.
    TerminatedWarned,
}

#[derive(Debug, Clone, Copy)]
struct World {
    agent: Agent,
    obstacle: Obstacle,
    /// Last emitted observation, replayed on post-terminal steps.
    observation: FlappyObservation,
}

/// Tick-based state machine behind the Flappy Bird environment.
///
/// Owns the agent, the obstacle and the episode counters. Once an episode is
/// done, further steps only advance `steps_beyond_done` until `reset`.
pub struct FlappyCore {
    screen: ScreenSize,
    policy: CollisionPolicy,
    generator: ObstacleGenerator,
    emitter: ObservationEmitter,
    rng: RngProvider,
    world: Option<World>,
    steps_beyond_done: Option<u32>,
}

impl FlappyCore {
    pub fn new(config: &FlappyConfig) -> Result<Self> {
        config.validate()?;
        let rng = RngProvider::new(config.seed);
        debug!(seed = rng.seed(), policy = ?config.policy, "flappy core created");
        Ok(Self {
            screen: config.screen,
            policy: config.policy,
            generator: ObstacleGenerator::new(config.screen),
            emitter: ObservationEmitter::new(config.policy, config.screen),
            rng,
            world: None,
            steps_beyond_done: None,
        })
    }

    pub fn seed(&mut self, seed: Option<u64>) -> u64 {
        self.rng.reseed(seed)
    }

    pub fn reset(&mut self) -> FlappyObservation {
        let agent = Agent::new(self.screen.height / 2);
        let obstacle = self.generator.respawn(&mut self.rng);
        let observation = self.emitter.emit(&agent, &obstacle);
        self.world = Some(World {
            agent,
            obstacle,
            observation,
        });
        self.steps_beyond_done = None;
        debug!(gap = obstacle.gap, "episode reset");
        observation
    }

    pub fn step(&mut self, action: FlappyBirdAction) -> Result<Step<FlappyObservation>> {
        let world = self.world.as_mut().ok_or(Error::NotReset)?;

        if let Some(beyond) = self.steps_beyond_done.as_mut() {
            if *beyond == 0 {
                warn!(
                    "step() called even though this environment already returned done = true; \
                     call reset() once done is received, further steps are ignored"
                );
            }
            *beyond += 1;
            return Ok(Step::new(world.observation, 0.0, true));
        }

        world.agent.y -= GRAVITY;
        if action == FlappyBirdAction::Flap {
            world.agent.y += THRUST;
        }
        world.obstacle.advance();
        trace!(y = world.agent.y, x = world.obstacle.x, ?action, "tick");

        let contact = self.policy.classify(&world.agent.rect(), &world.obstacle);
        let out_of_bounds = world.agent.y < 0 || world.agent.y > self.screen.height;
        let done = out_of_bounds || contact.unsafe_overlap;

        world.observation = self.emitter.emit(&world.agent, &world.obstacle);
        self.generator.respawn_if_exited(&mut world.obstacle, &mut self.rng);

        let reward = if done {
            debug!(out_of_bounds, collided = contact.unsafe_overlap, "episode finished");
            self.steps_beyond_done = Some(0);
            0.0
        } else {
            self.policy.reward(&contact)
        };

        Ok(Step::new(world.observation, reward, done))
    }

    pub fn phase(&self) -> EpisodePhase {
        match self.steps_beyond_done {
            None => EpisodePhase::Active,
            Some(0) => EpisodePhase::JustTerminated,
            Some(_) => EpisodePhase::TerminatedWarned,
        }
    }

    pub fn is_done(&self) -> bool {
        self.steps_beyond_done.is_some()
    }

    pub fn steps_beyond_done(&self) -> Option<u32> {
        self.steps_beyond_done
    }

    pub fn agent(&self) -> Option<&Agent> {
        self.world.as_ref().map(|w| &w.agent)
    }

    pub fn obstacle(&self) -> Option<&Obstacle> {
        self.world.as_ref().map(|w| &w.obstacle)
    }

    pub fn effective_seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    pub fn observation_space(&self) -> ObservationSpace {
        self.emitter.space()
    }

    /// Snapshot for a renderer; `None` before the first reset.
    pub fn scene(&self) -> Option<Scene> {
        let world = self.world.as_ref()?;
        Some(Scene {
            screen: self.screen,
            agent: world.agent.rect(),
            obstacle: world.obstacle.column(self.screen),
            safe_band: self.policy.safe_band(&world.obstacle, self.screen),
        })
    }
}
