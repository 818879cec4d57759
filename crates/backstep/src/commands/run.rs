use std::path::Path;

use backstep_chain::RunOutcome;
use tracing::{debug, info};

use super::load_flow;
use crate::error::{CliError, Result};

pub(crate) fn run(path: &Path) -> Result<()> {
    let mut flow = load_flow(path)?;
    debug!(dump = %flow.dump(), "linked flow");

    let (result, audit) = flow.run_with_audit(&());
    println!("{}", audit.summary());

    match result.map_err(CliError::Run)? {
        RunOutcome::Completed => {
            info!(steps = flow.len(), "flow completed");
            Ok(())
        }
        RunOutcome::RolledBack { step, error, .. } => Err(CliError::RolledBack {
            step,
            source: error,
        }),
    }
}
