//! Headless EcoSort runtime: message inbox, effect execution, configuration
//! and logger setup. A visual shell renders [`ecosort_core::AppViewModel`]
//! values and posts [`ecosort_core::Msg`] values back.
mod config;
mod effects;
pub mod logging;
mod runtime;
mod ticker;

pub use config::{AppConfig, ClassifierConfig, API_KEY_VARS, DEFAULT_CONFIG_FILE};
pub use effects::EffectRunner;
pub use logging::LogDestination;
pub use runtime::{AppRuntime, Services};
