//! Shared configuration and domain types for the feedsync workspace.

mod app_config;
mod config;
mod variant;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use variant::{
    Availability, Condition, NormalizedVariant, VariantGroup, CAPACITY_DEFAULT, COLOR_SENTINEL,
};

use thiserror::Error;

/// Errors raised while loading [`AppConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
