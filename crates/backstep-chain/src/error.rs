use std::fmt::Debug;

use thiserror::Error;

use crate::node::NodeId;
use crate::runner::RunState;

/// Structural error from linking, traversing or starting a chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ChainError {
    /// The id was not handed out by this chain.
    #[error("node {0} does not belong to this chain")]
    UnknownNode(NodeId),

    /// A node was asked to be its own neighbor.
    #[error("node {0} cannot be linked to itself")]
    SelfLink(NodeId),

    /// The link would let traversal return to where it started.
    #[error("linking {from} -> {to} would form a cycle")]
    Cycle {
        /// Node that would become the predecessor.
        from: NodeId,
        /// Node that would become the successor.
        to: NodeId,
    },

    /// There is nothing to run.
    #[error("chain has no nodes")]
    Empty,

    /// More than one node has no predecessor, so there is no single head.
    #[error("chain is split into {segments} unlinked sequences")]
    Disconnected {
        /// Number of separate sequences.
        segments: usize,
    },

    /// The chain left `Ready` and cannot run or be changed again.
    #[error("chain has already run (state: {state})")]
    AlreadyRun {
        /// State the chain was in when the request arrived.
        state: RunState,
    },
}

/// Error from a failed compensation that aborted the rollback walk.
///
/// Rollback stops at the first compensation that fails. The nodes in
/// `uncompensated` were due for compensation but never reached.
#[derive(Debug, Error)]
#[error("compensation failed for step '{step}' while rolling back '{failed_step}'")]
pub struct RollbackError<E> {
    /// Name of the step whose forward action started the rollback.
    pub failed_step: String,
    /// Node whose forward action started the rollback.
    pub failed_node: NodeId,
    /// The error that started the rollback.
    pub step_error: E,
    /// Name of the step whose compensation failed.
    pub step: String,
    /// Node whose compensation failed.
    pub node: NodeId,
    /// Description of what the compensation was trying to do.
    pub description: String,
    /// The compensation error.
    #[source]
    pub error: E,
    /// Predecessors left without compensation, nearest first.
    pub uncompensated: Vec<NodeId>,
}

/// Error from running a chain.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError<E: Debug> {
    /// The chain could not be started.
    #[error("chain cannot run")]
    Chain(#[from] ChainError),

    /// A step failed and one of the compensations also failed.
    #[error("rollback aborted")]
    Rollback(#[source] RollbackError<E>),
}

impl<E: Debug> RunError<E> {
    #[must_use]
    pub fn as_rollback(&self) -> Option<&RollbackError<E>> {
        match self {
            Self::Rollback(err) => Some(err),
            Self::Chain(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct TestError(&'static str);

    fn rollback_error() -> RollbackError<TestError> {
        RollbackError {
            failed_step: "charge".to_string(),
            failed_node: NodeId::new(2),
            step_error: TestError("card declined"),
            step: "reserve".to_string(),
            node: NodeId::new(1),
            description: "undo reserve".to_string(),
            error: TestError("inventory offline"),
            uncompensated: vec![NodeId::new(0)],
        }
    }

    #[test]
    fn cycle_error_names_both_nodes() {
        let err = ChainError::Cycle {
            from: NodeId::new(3),
            to: NodeId::new(0),
        };

        assert_eq!(err.to_string(), "linking #3 -> #0 would form a cycle");
    }

    #[test]
    fn already_run_error_includes_state() {
        let err = ChainError::AlreadyRun {
            state: RunState::RolledBack,
        };

        assert!(err.to_string().contains("rolled back"));
    }

    #[test]
    fn rollback_error_message_names_both_steps() {
        let msg = rollback_error().to_string();

        assert!(msg.contains("'reserve'"));
        assert!(msg.contains("'charge'"));
    }

    #[test]
    fn rollback_error_source_is_compensation_error() {
        let err = rollback_error();

        let source = std::error::Error::source(&err).expect("should have a source");

        assert_eq!(source.to_string(), "inventory offline");
    }

    #[test]
    fn run_error_converts_from_chain_error() {
        let err: RunError<TestError> = ChainError::Empty.into();

        assert!(matches!(err, RunError::Chain(ChainError::Empty)));
        assert!(err.as_rollback().is_none());
    }

    #[test]
    fn rollback_run_error_chains_to_compensation_failure() {
        let err = RunError::Rollback(rollback_error());

        let source = std::error::Error::source(&err).expect("should have a source");

        assert_eq!(err.to_string(), "rollback aborted");
        assert!(source.to_string().starts_with("compensation failed for step 'reserve'"));
        assert!(err.as_rollback().is_some());
    }
}
