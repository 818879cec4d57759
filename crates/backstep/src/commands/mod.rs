mod check;
mod run;
mod steps;
mod walk;

use std::path::{Path, PathBuf};

use backstep_linker::{FlowConfig, LinkedFlow, Linker};
use clap::{Args, Subcommand};

use crate::error::{CliError, Result};
use crate::steps::{self as builtin, StepFailure};

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a flow, rolling back completed steps if one fails
    Run(FlowArgs),
    /// Validate a flow without running it
    Check(FlowArgs),
    /// Print the linked chain head to tail
    Walk(FlowArgs),
    /// List the built-in step identifiers
    Steps,
}

#[derive(Args)]
pub(crate) struct FlowArgs {
    /// Path to the YAML flow file
    pub flow: PathBuf,
}

impl Commands {
    pub(crate) fn execute(self) -> Result<()> {
        match self {
            Self::Run(args) => run::run(&args.flow),
            Self::Check(args) => check::run(&args.flow),
            Self::Walk(args) => walk::run(&args.flow),
            Self::Steps => steps::run(),
        }
    }
}

fn load_flow(path: &Path) -> Result<LinkedFlow<(), StepFailure>> {
    let config = FlowConfig::load(path).map_err(|source| CliError::Flow {
        path: path.to_path_buf(),
        source,
    })?;
    let registry = builtin::registry();
    Ok(Linker::new(&registry).link(&config)?)
}
