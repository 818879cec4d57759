/// A unit of work in a chain that can be executed and compensated.
///
/// Each step performs a forward action, with the ability to undo its effects
/// if it or a later step fails. Steps share nothing except the context handed
/// to every step of a run.
///
/// # Type Parameters
///
/// - `Context`: Shared dependencies (injected, not owned by the step)
/// - `Error`: The error type for step failures
pub trait Step {
    /// Shared context providing dependencies.
    type Context;

    /// Error type for step failures.
    type Error;

    /// Human-readable name for diagnostics and error messages.
    fn name(&self) -> &str;

    /// Perform the forward action.
    ///
    /// # Errors
    ///
    /// Returns an error if the step fails to complete. The chain then rolls
    /// back starting with this step.
    fn execute(&self, ctx: &Self::Context) -> Result<(), Self::Error>;

    /// Compensate (undo) the step's effects.
    ///
    /// Called during rollback, on the failing step itself and on every step
    /// before it. The default implementation is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if compensation fails. Rollback stops at the first
    /// failed compensation.
    fn compensate(&self, ctx: &Self::Context) -> Result<(), Self::Error> {
        let _ = ctx;
        Ok(())
    }

    /// Human-readable description of what compensation will do.
    fn compensation_description(&self) -> String {
        format!("undo {}", self.name())
    }
}

/// A step boxed for storage in a chain.
pub type BoxedStep<C, E> = Box<dyn Step<Context = C, Error = E>>;
