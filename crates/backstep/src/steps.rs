//! Built-in steps available to flow files run from the command line.

use backstep_chain::Step;
use backstep_linker::StepRegistry;
use thiserror::Error;

/// Error raised by a built-in step.
#[derive(Debug, Error)]
#[error("{step}: {reason}")]
pub struct StepFailure {
    step: &'static str,
    reason: &'static str,
}

impl StepFailure {
    pub(crate) fn new(step: &'static str, reason: &'static str) -> Self {
        Self { step, reason }
    }
}

pub(crate) type BuiltinRegistry = StepRegistry<(), StepFailure>;

/// Registry holding every built-in step, keyed by identifier.
pub(crate) fn registry() -> BuiltinRegistry {
    let mut registry = StepRegistry::new();
    registry
        .register_default::<Noop>(Noop::ID)
        .register_default::<Echo>(Echo::ID)
        .register_default::<Fail>(Fail::ID)
        .register_default::<FailUndo>(FailUndo::ID);
    registry
}

#[derive(Debug, Default)]
pub(crate) struct Noop;

impl Noop {
    const ID: &'static str = "noop";
}

impl Step for Noop {
    type Context = ();
    type Error = StepFailure;

    fn name(&self) -> &str {
        Self::ID
    }

    fn execute(&self, _ctx: &()) -> Result<(), StepFailure> {
        Ok(())
    }
}

/// Prints on both the forward and the compensating pass.
#[derive(Debug, Default)]
pub(crate) struct Echo;

impl Echo {
    const ID: &'static str = "echo";
}

impl Step for Echo {
    type Context = ();
    type Error = StepFailure;

    fn name(&self) -> &str {
        Self::ID
    }

    fn execute(&self, _ctx: &()) -> Result<(), StepFailure> {
        println!("do echo");
        Ok(())
    }

    fn compensate(&self, _ctx: &()) -> Result<(), StepFailure> {
        println!("undo echo");
        Ok(())
    }
}

/// Forward action always fails.
#[derive(Debug, Default)]
pub(crate) struct Fail;

impl Fail {
    const ID: &'static str = "fail";
}

impl Step for Fail {
    type Context = ();
    type Error = StepFailure;

    fn name(&self) -> &str {
        Self::ID
    }

    fn execute(&self, _ctx: &()) -> Result<(), StepFailure> {
        Err(StepFailure::new(Self::ID, "forward action failed"))
    }

    fn compensate(&self, _ctx: &()) -> Result<(), StepFailure> {
        println!("undo fail");
        Ok(())
    }
}

/// Forward action succeeds, compensation always fails.
#[derive(Debug, Default)]
pub(crate) struct FailUndo;

impl FailUndo {
    const ID: &'static str = "fail-undo";
}

impl Step for FailUndo {
    type Context = ();
    type Error = StepFailure;

    fn name(&self) -> &str {
        Self::ID
    }

    fn execute(&self, _ctx: &()) -> Result<(), StepFailure> {
        println!("do fail-undo");
        Ok(())
    }

    fn compensate(&self, _ctx: &()) -> Result<(), StepFailure> {
        Err(StepFailure::new(Self::ID, "compensation failed"))
    }

    fn compensation_description(&self) -> String {
        "undo fail-undo (always fails)".to_string()
    }
}
