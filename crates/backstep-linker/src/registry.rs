use std::fmt;

use backstep_chain::{BoxedStep, Step};
use indexmap::IndexMap;
use tracing::debug;

type Factory<C, E> = Box<dyn Fn() -> BoxedStep<C, E>>;

/// Maps action identifiers to zero-argument step factories.
///
/// Flow files name steps by identifier; the registry is how those names become
/// step instances. Identifiers keep their registration order.
pub struct StepRegistry<C, E> {
    factories: IndexMap<String, Factory<C, E>>,
}

impl<C, E> StepRegistry<C, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Register a factory under `id`, replacing any earlier registration.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> BoxedStep<C, E> + 'static,
    {
        let id = id.into();
        if self.factories.insert(id.clone(), Box::new(factory)).is_some() {
            debug!(action = %id, "replaced step registration");
        }
        self
    }

    /// Register a step type built with `Default::default()`.
    pub fn register_default<S>(&mut self, id: impl Into<String>) -> &mut Self
    where
        S: Step<Context = C, Error = E> + Default + 'static,
    {
        self.register(id, || -> BoxedStep<C, E> { Box::new(S::default()) })
    }

    #[must_use]
    pub fn with<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> BoxedStep<C, E> + 'static,
    {
        self.register(id, factory);
        self
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered identifiers in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate the step registered under `id`.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<BoxedStep<C, E>> {
        self.factories.get(id).map(|factory| factory())
    }
}

impl<C, E> Default for StepRegistry<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> fmt::Debug for StepRegistry<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use backstep_chain::ActionStep;

    use super::*;

    #[derive(Default)]
    struct Reserve;

    impl Step for Reserve {
        type Context = ();
        type Error = String;

        fn name(&self) -> &str {
            "Reserve"
        }

        fn execute(&self, _ctx: &()) -> Result<(), String> {
            Ok(())
        }
    }

    fn action(name: &'static str) -> impl Fn() -> BoxedStep<(), String> {
        move || -> BoxedStep<(), String> { Box::new(ActionStep::new(name)) }
    }

    #[test]
    fn resolve_instantiates_registered_step() {
        let registry = StepRegistry::new().with("steps.reserve", action("reserve"));

        let step = registry.resolve("steps.reserve").expect("registered");

        assert_eq!(step.name(), "reserve");
    }

    #[test]
    fn resolve_unknown_id_returns_none() {
        let registry: StepRegistry<(), String> = StepRegistry::new();

        assert!(registry.resolve("steps.missing").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn each_resolve_creates_a_fresh_instance() {
        let created = Rc::new(Cell::new(0));
        let counter = Rc::clone(&created);
        let mut registry: StepRegistry<(), String> = StepRegistry::new();
        registry.register("counted", move || -> BoxedStep<(), String> {
            counter.set(counter.get() + 1);
            Box::new(ActionStep::new("counted"))
        });

        let _first = registry.resolve("counted");
        let _second = registry.resolve("counted");

        assert_eq!(created.get(), 2);
    }

    #[test]
    fn register_default_uses_default_constructor() {
        let mut registry = StepRegistry::new();
        registry.register_default::<Reserve>("reserve");

        let step = registry.resolve("reserve").expect("registered");

        assert_eq!(step.name(), "Reserve");
    }

    #[test]
    fn re_registering_replaces_factory() {
        let registry = StepRegistry::new()
            .with("step", action("first"))
            .with("step", action("second"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("step").expect("registered").name(), "second");
    }

    #[test]
    fn ids_keep_registration_order() {
        let registry = StepRegistry::new()
            .with("c", action("c"))
            .with("a", action("a"))
            .with("b", action("b"));

        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert!(registry.contains("a"));
        assert!(!registry.contains("d"));
    }
}
