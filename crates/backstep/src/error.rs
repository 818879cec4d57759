use std::path::PathBuf;

use backstep_chain::RunError;
use backstep_linker::{ConfigError, LinkError};
use thiserror::Error;

use crate::steps::StepFailure;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid flow file '{path}'")]
    Flow {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("failed to link flow")]
    Link(#[from] LinkError),

    #[error("flow run failed")]
    Run(#[source] RunError<StepFailure>),

    #[error("flow rolled back after step '{step}' failed")]
    RolledBack {
        step: String,
        #[source]
        source: StepFailure,
    },
}

pub type Result<T> = std::result::Result<T, CliError>;
