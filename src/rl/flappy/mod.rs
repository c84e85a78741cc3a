pub mod collision;
pub mod engine;
pub mod obstacle;
pub mod observation;
pub mod rng;
pub mod viz;

pub use collision::{CollisionPolicy, Contact, Rect};
pub use engine::{Agent, EpisodePhase, FlappyCore};
pub use obstacle::{Obstacle, ObstacleGenerator};
pub use observation::{FlappyObservation, ObservationEmitter, ObservationSpace};
pub use rng::RngProvider;
pub use viz::{Frame, RasterRenderer, RenderAdapter, RenderMode, Scene};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Action, Environment, Step};
use crate::config::{FlappyConfig, ScreenSize};
use crate::Result;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum FlappyBirdAction {
    Fall,
    Flap,
}

impl Action for FlappyBirdAction {
    fn to_index(&self) -> usize {
        match self {
            FlappyBirdAction::Fall => 0,
            FlappyBirdAction::Flap => 1,
        }
    }

    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(FlappyBirdAction::Fall),
            1 => Some(FlappyBirdAction::Flap),
            _ => None,
        }
    }
}

/// Builds the render adapter on the first render call.
pub type RendererFactory = Box<dyn FnMut(ScreenSize) -> Result<Box<dyn RenderAdapter>>>;

/// Caller-facing Flappy Bird environment.
///
/// Wraps the simulation core and owns the lazily created render adapter,
/// which is released by [`close`](Self::close) or on drop.
pub struct FlappyBirdEnv {
    core: FlappyCore,
    renderer: Option<Box<dyn RenderAdapter>>,
    make_renderer: RendererFactory,
}

impl FlappyBirdEnv {
    /// Environment that renders through [`RasterRenderer`].
    pub fn new(config: FlappyConfig) -> Result<Self> {
        Self::with_renderer(config, |screen| {
            Ok(Box::new(RasterRenderer::new(screen)?) as Box<dyn RenderAdapter>)
        })
    }

    pub fn with_renderer<F>(config: FlappyConfig, make_renderer: F) -> Result<Self>
    where
        F: FnMut(ScreenSize) -> Result<Box<dyn RenderAdapter>> + 'static,
    {
        Ok(Self {
            core: FlappyCore::new(&config)?,
            renderer: None,
            make_renderer: Box::new(make_renderer),
        })
    }

    /// Environment that presents frames in a desktop window.
    #[cfg(feature = "viz")]
    pub fn windowed(config: FlappyConfig) -> Result<Self> {
        Self::with_renderer(config, |screen| {
            Ok(Box::new(viz::WindowRenderer::new(screen)?) as Box<dyn RenderAdapter>)
        })
    }

    /// Draw the current state. Before the first `reset` there is nothing to
    /// draw and no renderer is created.
    pub fn render(&mut self, mode: RenderMode) -> Result<Option<Frame>> {
        let Some(scene) = self.core.scene() else {
            debug!("render requested before reset");
            return Ok(None);
        };

        if self.renderer.is_none() {
            debug!(?mode, "creating render adapter");
            self.renderer = Some((self.make_renderer)(self.core.screen())?);
        }
        match self.renderer.as_mut() {
            Some(renderer) => renderer.draw(&scene, mode),
            None => Ok(None),
        }
    }

    /// Release the render adapter, if any. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.close();
            debug!("render adapter released");
        }
    }

    pub fn core(&self) -> &FlappyCore {
        &self.core
    }

    pub fn phase(&self) -> EpisodePhase {
        self.core.phase()
    }

    pub fn agent(&self) -> Option<&Agent> {
        self.core.agent()
    }

    pub fn obstacle(&self) -> Option<&Obstacle> {
        self.core.obstacle()
    }

    pub fn steps_beyond_done(&self) -> Option<u32> {
        self.core.steps_beyond_done()
    }

    pub fn observation_space(&self) -> ObservationSpace {
        self.core.observation_space()
    }

    pub fn effective_seed(&self) -> u64 {
        self.core.effective_seed()
    }
}

impl Environment for FlappyBirdEnv {
    type S = FlappyObservation;
    type A = FlappyBirdAction;

    fn seed(&mut self, seed: Option<u64>) -> u64 {
        self.core.seed(seed)
    }

    fn reset(&mut self) -> Self::S {
        self.core.reset()
    }

    fn step(&mut self, action: &Self::A) -> Result<Step<Self::S>> {
        self.core.step(*action)
    }

    fn action_space_size(&self) -> usize {
        2
    }

    fn valid_actions(&self, _state: &Self::S) -> Vec<Self::A> {
        vec![FlappyBirdAction::Fall, FlappyBirdAction::Flap]
    }
}

impl Drop for FlappyBirdEnv {
    fn drop(&mut self) {
        self.close();
    }
}
