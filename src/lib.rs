//! gympro - Personal workout tracker
//!
//! Lettered workouts, set tracking with rest timers, free-text import and
//! an evolution photo gallery, all kept in a single JSON document.

pub mod config;
pub mod gallery;
pub mod i18n;
pub mod import;
pub mod model;
pub mod storage;
pub mod store;
pub mod timer;
pub mod tui;

pub use config::Config;
pub use model::AppState;
pub use store::{Action, Store};
