use std::fmt;

use crate::step::Step;

pub(crate) type Action<C, E> = Box<dyn Fn(&C) -> Result<(), E>>;

/// A step whose behavior is supplied as closures instead of a dedicated type.
///
/// A fresh `ActionStep` does nothing in either direction. [`set_action`] and
/// [`set_undo`] replace the forward and compensating behavior; values the
/// closure needs are captured or read from the context.
///
/// [`set_action`]: ActionStep::set_action
/// [`set_undo`]: ActionStep::set_undo
pub struct ActionStep<C, E> {
    name: String,
    action: Option<Action<C, E>>,
    undo: Option<Action<C, E>>,
}

impl<C, E> ActionStep<C, E> {
    /// Create a step with no-op forward and compensating actions.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: None,
            undo: None,
        }
    }

    /// Replace the forward action.
    pub fn set_action<F>(&mut self, action: F)
    where
        F: Fn(&C) -> Result<(), E> + 'static,
    {
        self.action = Some(Box::new(action));
    }

    /// Replace the compensating action.
    pub fn set_undo<F>(&mut self, undo: F)
    where
        F: Fn(&C) -> Result<(), E> + 'static,
    {
        self.undo = Some(Box::new(undo));
    }

    #[must_use]
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&C) -> Result<(), E> + 'static,
    {
        self.set_action(action);
        self
    }

    #[must_use]
    pub fn with_undo<F>(mut self, undo: F) -> Self
    where
        F: Fn(&C) -> Result<(), E> + 'static,
    {
        self.set_undo(undo);
        self
    }

    #[must_use]
    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }
}

impl<C, E> Step for ActionStep<C, E> {
    type Context = C;
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &C) -> Result<(), E> {
        match &self.action {
            Some(action) => action(ctx),
            None => Ok(()),
        }
    }

    fn compensate(&self, ctx: &C) -> Result<(), E> {
        match &self.undo {
            Some(undo) => undo(ctx),
            None => Ok(()),
        }
    }
}

impl<C, E> fmt::Debug for ActionStep<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionStep")
            .field("name", &self.name)
            .field("action", &self.action.is_some())
            .field("undo", &self.undo.is_some())
            .finish()
    }
}
