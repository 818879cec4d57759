//! Compensating-action chains.
//!
//! A chain is a doubly-linked sequence of steps, each with a forward action
//! and a compensating action. Running a chain executes the steps head to tail;
//! when a step fails, that step and every step before it are compensated in
//! reverse order.

mod action;
mod audit;
mod chain;
mod error;
mod node;
mod runner;
mod step;

pub use action::ActionStep;
pub use audit::{ChainAuditLog, StepRecord, StepStatus};
pub use chain::Chain;
pub use error::{ChainError, RollbackError, RunError};
pub use node::{NodeId, NodeRef, Walk};
pub use runner::{RunOutcome, RunState};
pub use step::{BoxedStep, Step};
