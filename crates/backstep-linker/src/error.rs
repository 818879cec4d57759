use std::path::PathBuf;

use backstep_chain::ChainError;
use thiserror::Error;

/// The flow configuration is missing, malformed or incomplete.
///
/// Raised before any step is instantiated.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The flow file could not be read.
    #[error("failed to read flow file at '{path}'")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML or has the wrong shape.
    #[error("failed to parse flow YAML")]
    Yaml(#[from] serde_yml::Error),

    /// Empty document, `null`, or an empty mapping.
    #[error("configuration cannot be empty")]
    Empty,

    /// The mapping has no `actions` key.
    #[error("configuration is missing the required 'actions' key")]
    MissingActions,

    /// `actions` is null or an empty list.
    #[error("'actions' must list at least one step")]
    NoActions,

    /// An identifier is empty or whitespace.
    #[error("action at index {index} is blank")]
    BlankAction {
        /// Position of the blank identifier in `actions`.
        index: usize,
    },
}

/// A flow could not be assembled into a chain.
#[derive(Debug, Error)]
pub enum LinkError {
    /// No factory is registered under the identifier.
    #[error("unknown action '{id}' at index {index}")]
    UnknownAction {
        /// Position of the identifier in `actions`.
        index: usize,
        /// The unregistered identifier.
        id: String,
    },

    /// The chain rejected a link.
    #[error("failed to link steps")]
    Chain(#[from] ChainError),
}
