// Library surface for headless/integration tests and reuse.
// Terminal rendering and key bindings stay in the binary.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod error;
pub mod guess;
pub mod logging;
pub mod places;
pub mod runtime;
pub mod session;
pub mod store;
pub mod timer;
pub mod view;

pub use controller::{ControllerOptions, SessionController};
pub use error::{GameError, PlacesError, StoreError};
