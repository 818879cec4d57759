use std::fmt::{self, Debug};

use tracing::{debug, info, warn};

use crate::audit::ChainAuditLog;
use crate::chain::Chain;
use crate::error::{ChainError, RollbackError, RunError};
use crate::node::NodeId;

/// Lifecycle of a chain.
///
/// `Ready -> Running -> Completed` on success,
/// `Ready -> Running -> RollingBack -> RolledBack` after a step failure, and
/// `RollingBack -> CompensationAborted` if a compensation fails too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum RunState {
    #[default]
    Ready,
    Running,
    RollingBack,
    Completed,
    RolledBack,
    CompensationAborted,
}

impl RunState {
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::RolledBack | Self::CompensationAborted
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ready => "ready",
            Self::Running => "running",
            Self::RollingBack => "rolling back",
            Self::Completed => "completed",
            Self::RolledBack => "rolled back",
            Self::CompensationAborted => "compensation aborted",
        };
        f.write_str(label)
    }
}

/// How a run ended when rollback, if any, went through.
#[derive(Debug)]
pub enum RunOutcome<E> {
    /// Every step executed.
    Completed,
    /// A step failed and it and every step before it were compensated.
    RolledBack {
        /// Node whose forward action failed.
        failed: NodeId,
        /// Name of the failed step.
        step: String,
        /// The step error.
        error: E,
    },
}

impl<E> RunOutcome<E> {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    #[must_use]
    pub fn failed_node(&self) -> Option<NodeId> {
        match self {
            Self::Completed => None,
            Self::RolledBack { failed, .. } => Some(*failed),
        }
    }
}

impl<C, E: Debug> Chain<C, E> {
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run the chain from its head.
    ///
    /// A step failure is not an error: the chain rolls back and the failure is
    /// reported as [`RunOutcome::RolledBack`].
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Chain`] if the chain is empty, split into several
    /// sequences, or has already run. Returns [`RunError::Rollback`] if a
    /// compensation fails during rollback.
    pub fn run(&mut self, ctx: &C) -> Result<RunOutcome<E>, RunError<E>> {
        self.run_with_audit(ctx).0
    }

    /// Run the chain starting at `start`.
    ///
    /// Steps before `start` are not executed, but rollback still walks back
    /// to the head.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Chain::run), with [`ChainError::UnknownNode`] for a
    /// foreign `start`.
    pub fn run_from(&mut self, start: NodeId, ctx: &C) -> Result<RunOutcome<E>, RunError<E>> {
        self.run_from_with_audit(start, ctx).0
    }

    /// Run the chain from its head and return both the result and an audit log.
    pub fn run_with_audit(&mut self, ctx: &C) -> (Result<RunOutcome<E>, RunError<E>>, ChainAuditLog) {
        match self.head() {
            Ok(head) => self.run_from_with_audit(head, ctx),
            Err(err) => (Err(err.into()), ChainAuditLog::new()),
        }
    }

    /// Run the chain from `start` and return both the result and an audit log.
    pub fn run_from_with_audit(
        &mut self,
        start: NodeId,
        ctx: &C,
    ) -> (Result<RunOutcome<E>, RunError<E>>, ChainAuditLog) {
        let mut audit_log = ChainAuditLog::new();

        if let Err(err) = self.check_runnable(start) {
            return (Err(err.into()), audit_log);
        }
        self.state = RunState::Running;

        let mut cursor = start;
        loop {
            let node = &self.nodes[cursor.index()];
            let name = node.step.name();
            audit_log.record_start(cursor, name);
            debug!(node = %cursor, step = name, "executing step");

            match node.execute(ctx) {
                Ok(()) => {
                    audit_log.record_success(node.step.compensation_description());
                    if let Some(next) = node.next {
                        cursor = next;
                        continue;
                    }
                    self.state = RunState::Completed;
                    info!(steps = audit_log.records().len(), "chain completed");
                    return (Ok(RunOutcome::Completed), audit_log);
                }
                Err(error) => {
                    audit_log.record_failure();
                    warn!(node = %cursor, step = name, ?error, "step failed, rolling back");
                    let failed_step = name.to_string();
                    let result = self.roll_back(ctx, cursor, failed_step, error, &mut audit_log);
                    return (result, audit_log);
                }
            }
        }
    }

    fn check_runnable(&self, start: NodeId) -> Result<(), ChainError> {
        if self.state != RunState::Ready {
            return Err(ChainError::AlreadyRun { state: self.state });
        }
        self.get(start).map(|_| ())
    }

    // Compensates `failed` and then every predecessor, stopping at the first
    // compensation error.
    fn roll_back(
        &mut self,
        ctx: &C,
        failed: NodeId,
        failed_step: String,
        step_error: E,
        audit_log: &mut ChainAuditLog,
    ) -> Result<RunOutcome<E>, RunError<E>> {
        self.state = RunState::RollingBack;

        let mut cursor = Some(failed);
        while let Some(id) = cursor {
            let node = &self.nodes[id.index()];
            let name = node.step.name();
            debug!(node = %id, step = name, "compensating step");

            match node.step.compensate(ctx) {
                Ok(()) => {
                    audit_log.record_compensated(id, name);
                    cursor = node.previous;
                }
                Err(error) => {
                    audit_log.record_compensation_failed(id, name);
                    let uncompensated = self.predecessors(id);
                    warn!(
                        node = %id,
                        step = name,
                        ?error,
                        uncompensated = uncompensated.len(),
                        "compensation failed, aborting rollback"
                    );
                    let rollback_error = RollbackError {
                        failed_step,
                        failed_node: failed,
                        step_error,
                        step: name.to_string(),
                        node: id,
                        description: node.step.compensation_description(),
                        error,
                        uncompensated,
                    };
                    self.state = RunState::CompensationAborted;
                    return Err(RunError::Rollback(rollback_error));
                }
            }
        }

        self.state = RunState::RolledBack;
        info!(failed = %failed, step = %failed_step, "chain rolled back");
        Ok(RunOutcome::RolledBack {
            failed,
            step: failed_step,
            error: step_error,
        })
    }

    fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut cursor = self.nodes[id.index()].previous;
        while let Some(previous) = cursor {
            ids.push(previous);
            cursor = self.nodes[previous.index()].previous;
        }
        ids
    }
}
