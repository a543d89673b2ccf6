//! Shared data model, errors and configuration for the TherapySync model router.

pub mod config;
pub mod error;
pub mod model;
pub mod types;

pub use config::{DispatchConfig, PolicyConfig, RouterConfig};
pub use error::{Result, RouterError};
pub use model::{capability, ModelDescriptor};
pub use types::*;

#[cfg(test)]
mod tests;
