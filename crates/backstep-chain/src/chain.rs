use std::fmt;

use tracing::trace;

use crate::error::ChainError;
use crate::node::{Node, NodeId, NodeRef, Walk};
use crate::runner::RunState;
use crate::step::BoxedStep;

/// An arena of doubly-linked nodes, each wrapping one step.
///
/// Links are only changed through [`insert`](Chain::insert),
/// [`set_next`](Chain::set_next) and [`set_previous`](Chain::set_previous).
/// Every successful call leaves the links mutually consistent (`a.next == b`
/// exactly when `b.previous == a`) and acyclic. A failed call leaves the chain
/// untouched.
pub struct Chain<C, E> {
    pub(crate) nodes: Vec<Node<C, E>>,
    pub(crate) state: RunState,
}

impl<C, E> Chain<C, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            state: RunState::Ready,
        }
    }

    /// Build a chain linking `steps` head to tail in iteration order.
    #[must_use]
    pub fn from_steps<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = BoxedStep<C, E>>,
    {
        let mut chain = Self::new();
        let mut previous: Option<NodeId> = None;
        for step in steps {
            let id = chain.push(step);
            if let Some(prev) = previous {
                chain.link(prev, id);
            }
            previous = Some(id);
        }
        chain
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add an unlinked node.
    pub fn push(&mut self, step: BoxedStep<C, E>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(step));
        id
    }

    /// Add a node, linking it after `previous` and before `next`.
    ///
    /// Either neighbor keeps its own outer neighbor, so inserting between the
    /// ends of two chains joins them into one.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::UnknownNode`] if a neighbor is not in this chain,
    /// or [`ChainError::Cycle`] if `next` already leads back to `previous`.
    /// Nothing is added on error.
    pub fn insert(
        &mut self,
        step: BoxedStep<C, E>,
        previous: Option<NodeId>,
        next: Option<NodeId>,
    ) -> Result<NodeId, ChainError> {
        if let Some(prev) = previous {
            self.check(prev)?;
        }
        if let Some(next) = next {
            self.check(next)?;
        }
        match (previous, next) {
            (Some(prev), Some(next)) if self.reaches_forward(next, prev) => {
                return Err(ChainError::Cycle {
                    from: prev,
                    to: next,
                });
            }
            _ => {}
        }

        let id = self.push(step);
        if let Some(prev) = previous {
            self.link(prev, id);
        }
        if let Some(next) = next {
            self.link(id, next);
        }
        Ok(id)
    }

    /// Make `next` the successor of `node`, updating both sides.
    ///
    /// A previous successor of `node` and a previous predecessor of `next`
    /// are unlinked from them. Returns `next`.
    ///
    /// # Errors
    ///
    /// Returns an error if either node is unknown, if `node == next`, or if
    /// `next` already leads forward to `node`.
    pub fn set_next(&mut self, node: NodeId, next: NodeId) -> Result<NodeId, ChainError> {
        self.check_link(node, next)?;
        self.link(node, next);
        Ok(next)
    }

    /// Make `previous` the predecessor of `node`, updating both sides.
    ///
    /// Mirror of [`set_next`](Chain::set_next). Returns `previous`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`set_next`](Chain::set_next).
    pub fn set_previous(&mut self, node: NodeId, previous: NodeId) -> Result<NodeId, ChainError> {
        self.check_link(previous, node)?;
        self.link(previous, node);
        Ok(previous)
    }

    /// Replace the forward action of the step held by `node`.
    ///
    /// The closure runs instead of the step's own `execute`; its compensation
    /// is unchanged. Setting an action again replaces the earlier override.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::UnknownNode`] if `node` is not in this chain, or
    /// [`ChainError::AlreadyRun`] once the chain has started running.
    pub fn set_action<F>(&mut self, node: NodeId, action: F) -> Result<(), ChainError>
    where
        F: Fn(&C) -> Result<(), E> + 'static,
    {
        if self.state != RunState::Ready {
            return Err(ChainError::AlreadyRun { state: self.state });
        }
        let target = self
            .nodes
            .get_mut(node.index())
            .ok_or(ChainError::UnknownNode(node))?;
        target.action = Some(Box::new(action));
        trace!(%node, "replaced forward action");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ChainError::UnknownNode`] if `node` is not in this chain.
    pub fn get_next(&self, node: NodeId) -> Result<Option<NodeId>, ChainError> {
        Ok(self.get(node)?.next)
    }

    /// # Errors
    ///
    /// Returns [`ChainError::UnknownNode`] if `node` is not in this chain.
    pub fn get_previous(&self, node: NodeId) -> Result<Option<NodeId>, ChainError> {
        Ok(self.get(node)?.previous)
    }

    /// Follow `previous` links from `node` to the node with no predecessor.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::UnknownNode`] if `node` is not in this chain.
    pub fn find_head(&self, node: NodeId) -> Result<NodeId, ChainError> {
        let mut current = node;
        while let Some(previous) = self.get(current)?.previous {
            current = previous;
        }
        Ok(current)
    }

    /// Follow `next` links from `node` to the node with no successor.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::UnknownNode`] if `node` is not in this chain.
    pub fn find_tail(&self, node: NodeId) -> Result<NodeId, ChainError> {
        let mut current = node;
        while let Some(next) = self.get(current)?.next {
            current = next;
        }
        Ok(current)
    }

    /// The head of the chain, if the nodes form exactly one sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Empty`] for a chain without nodes and
    /// [`ChainError::Disconnected`] when the nodes form several sequences.
    pub fn head(&self) -> Result<NodeId, ChainError> {
        let mut heads = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.previous.is_none())
            .map(|(index, _)| NodeId::new(index));

        match (heads.next(), heads.count()) {
            (None, _) => Err(ChainError::Empty),
            (Some(head), 0) => Ok(head),
            (Some(_), rest) => Err(ChainError::Disconnected { segments: rest + 1 }),
        }
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, C, E>> {
        self.nodes
            .get(id.index())
            .map(|node| NodeRef::new(self, id, node))
    }

    /// All nodes in insertion order, regardless of links.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_, C, E>> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| NodeRef::new(self, NodeId::new(index), node))
    }

    /// Traverse from `start` to the tail.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::UnknownNode`] if `start` is not in this chain.
    pub fn walk(&self, start: NodeId) -> Result<Walk<'_, C, E>, ChainError> {
        self.check(start)?;
        Ok(Walk::new(self, start))
    }

    /// One diagnostic line per node from `start` to the tail.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::UnknownNode`] if `start` is not in this chain.
    pub fn dump(&self, start: NodeId) -> Result<String, ChainError> {
        let lines: Vec<String> = self.walk(start)?.map(|node| node.to_string()).collect();
        Ok(lines.join("\n"))
    }

    pub(crate) fn get(&self, id: NodeId) -> Result<&Node<C, E>, ChainError> {
        self.nodes
            .get(id.index())
            .ok_or(ChainError::UnknownNode(id))
    }

    fn check(&self, id: NodeId) -> Result<(), ChainError> {
        self.get(id).map(|_| ())
    }

    fn check_link(&self, from: NodeId, to: NodeId) -> Result<(), ChainError> {
        self.check(from)?;
        self.check(to)?;
        if from == to {
            return Err(ChainError::SelfLink(from));
        }
        if self.reaches_forward(to, from) {
            return Err(ChainError::Cycle { from, to });
        }
        Ok(())
    }

    fn reaches_forward(&self, start: NodeId, target: NodeId) -> bool {
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            if id == target {
                return true;
            }
            cursor = self.nodes[id.index()].next;
        }
        false
    }

    // Callers have checked both ids and acyclicity.
    fn link(&mut self, from: NodeId, to: NodeId) {
        if let Some(displaced) = self.nodes[from.index()].next.filter(|&id| id != to) {
            self.nodes[displaced.index()].previous = None;
        }
        if let Some(displaced) = self.nodes[to.index()].previous.filter(|&id| id != from) {
            self.nodes[displaced.index()].next = None;
        }
        self.nodes[from.index()].next = Some(to);
        self.nodes[to.index()].previous = Some(from);
        trace!(%from, %to, "linked nodes");
    }
}

impl<C, E> Default for Chain<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> FromIterator<BoxedStep<C, E>> for Chain<C, E> {
    fn from_iter<I: IntoIterator<Item = BoxedStep<C, E>>>(iter: I) -> Self {
        Self::from_steps(iter)
    }
}

impl<C, E> fmt::Debug for Chain<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("state", &self.state)
            .field("nodes", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}
