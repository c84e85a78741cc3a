pub mod config;
pub mod error;
pub mod rl;

pub use config::{FlappyConfig, ScreenSize};
pub use error::Error;
pub use rl::flappy::{CollisionPolicy, FlappyBirdAction, FlappyBirdEnv, FlappyObservation};
pub use rl::{Environment, Step, TimeLimit};

pub type Result<T> = std::result::Result<T, Error>;
