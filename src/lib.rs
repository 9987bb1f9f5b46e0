// SimPad LED controller - shared library
// Color state, fade animation, device session and the background sync worker

pub mod animation;
pub mod color;
pub mod config;
pub mod controller;
pub mod encoder;
pub mod error;
pub mod state;
pub mod worker;

pub use animation::{AnimatedValue, Animator, LinearAnimator};
pub use color::{Color, LinearColor};
pub use config::LedConfig;
pub use controller::LedController;
pub use error::LedError;
pub use state::{KeyColors, KEYS};
