use std::fmt::Debug;

use backstep_chain::{Chain, ChainAuditLog, ChainError, NodeId, RunError, RunOutcome};
use tracing::{debug, trace};

use crate::config::FlowConfig;
use crate::error::LinkError;
use crate::registry::StepRegistry;

/// Assembles chains from flow configurations using a step registry.
pub struct Linker<'r, C, E> {
    registry: &'r StepRegistry<C, E>,
}

impl<'r, C, E> Linker<'r, C, E> {
    #[must_use]
    pub fn new(registry: &'r StepRegistry<C, E>) -> Self {
        Self { registry }
    }

    /// Check that every action of `config` is registered.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::UnknownAction` for the first unregistered action.
    pub fn check(&self, config: &FlowConfig) -> Result<(), LinkError> {
        match config
            .actions()
            .iter()
            .position(|id| !self.registry.contains(id))
        {
            Some(index) => Err(LinkError::UnknownAction {
                index,
                id: config.actions()[index].clone(),
            }),
            None => Ok(()),
        }
    }

    /// Instantiate every action in order and link each as the successor of the
    /// one before it.
    ///
    /// All identifiers are checked before any step is instantiated.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::UnknownAction` if an action is not registered.
    pub fn link(&self, config: &FlowConfig) -> Result<LinkedFlow<C, E>, LinkError> {
        self.check(config)?;

        let mut chain = Chain::new();
        let mut previous: Option<NodeId> = None;
        for (index, id) in config.actions().iter().enumerate() {
            let step = self
                .registry
                .resolve(id)
                .ok_or_else(|| LinkError::UnknownAction {
                    index,
                    id: id.clone(),
                })?;
            let node = chain.push(step);
            if let Some(prev) = previous {
                chain.set_next(prev, node)?;
            }
            debug!(index, action = %id, %node, "linked step");
            previous = Some(node);
        }

        // A validated config has at least one action.
        let last = previous.ok_or(ChainError::Empty)?;
        let head = chain.find_head(last)?;
        let flow = LinkedFlow {
            name: config.name().map(str::to_owned),
            chain,
            head,
        };
        trace!(dump = %flow.dump(), "assembled chain");
        Ok(flow)
    }
}

/// A chain assembled from a flow, together with its head.
pub struct LinkedFlow<C, E> {
    name: Option<String>,
    chain: Chain<C, E>,
    head: NodeId,
}

impl<C, E> LinkedFlow<C, E> {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn head(&self) -> NodeId {
        self.head
    }

    #[must_use]
    pub fn chain(&self) -> &Chain<C, E> {
        &self.chain
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// One line per node, head to tail, naming each node and its neighbors.
    #[must_use]
    pub fn dump(&self) -> String {
        // The head always belongs to the chain.
        self.chain.dump(self.head).unwrap_or_default()
    }

    #[must_use]
    pub fn into_parts(self) -> (Chain<C, E>, NodeId) {
        (self.chain, self.head)
    }
}

impl<C, E: Debug> LinkedFlow<C, E> {
    /// Run the chain from its head.
    ///
    /// # Errors
    ///
    /// See [`Chain::run_from`].
    pub fn run(&mut self, ctx: &C) -> Result<RunOutcome<E>, RunError<E>> {
        self.chain.run_from(self.head, ctx)
    }

    /// Run the chain from its head and return an audit log as well.
    pub fn run_with_audit(
        &mut self,
        ctx: &C,
    ) -> (Result<RunOutcome<E>, RunError<E>>, ChainAuditLog) {
        self.chain.run_from_with_audit(self.head, ctx)
    }
}
