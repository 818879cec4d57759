//! Assemble compensating-action chains from flow files.
//!
//! A flow file lists step identifiers under `actions`. A [`StepRegistry`]
//! resolves each identifier to a step factory, and the [`Linker`] links the
//! resulting steps head to tail in the listed order.

mod config;
mod error;
mod linker;
mod registry;

pub use config::FlowConfig;
pub use error::{ConfigError, LinkError};
pub use linker::{LinkedFlow, Linker};
pub use registry::StepRegistry;
