use std::fmt;

use crate::action::Action;
use crate::chain::Chain;
use crate::step::BoxedStep;

/// Stable handle to a node in a [`Chain`].
///
/// Ids are handed out by the chain that owns the node and stay valid for the
/// chain's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Id of the node at arena position `index`.
    ///
    /// Ids returned by [`Chain::push`] and [`Chain::insert`] are the ones to
    /// use; an id built here is only meaningful for a chain with a node at
    /// that position.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in its chain's arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) struct Node<C, E> {
    pub(crate) step: BoxedStep<C, E>,
    pub(crate) previous: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) action: Option<Action<C, E>>,
}

impl<C, E> Node<C, E> {
    pub(crate) fn new(step: BoxedStep<C, E>) -> Self {
        Self {
            step,
            previous: None,
            next: None,
            action: None,
        }
    }

    // An override set through `Chain::set_action` replaces the step's own
    // forward action.
    pub(crate) fn execute(&self, ctx: &C) -> Result<(), E> {
        match &self.action {
            Some(action) => action(ctx),
            None => self.step.execute(ctx),
        }
    }
}

/// Read-only view of a node and its links.
pub struct NodeRef<'a, C, E> {
    chain: &'a Chain<C, E>,
    id: NodeId,
    node: &'a Node<C, E>,
}

impl<'a, C, E> NodeRef<'a, C, E> {
    pub(crate) fn new(chain: &'a Chain<C, E>, id: NodeId, node: &'a Node<C, E>) -> Self {
        Self { chain, id, node }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'a str {
        self.node.step.name()
    }

    #[must_use]
    pub fn previous(&self) -> Option<NodeId> {
        self.node.previous
    }

    #[must_use]
    pub fn next(&self) -> Option<NodeId> {
        self.node.next
    }

    #[must_use]
    pub fn is_head(&self) -> bool {
        self.node.previous.is_none()
    }

    #[must_use]
    pub fn is_tail(&self) -> bool {
        self.node.next.is_none()
    }

    fn neighbor_name(&self, neighbor: Option<NodeId>) -> &'a str {
        neighbor
            .and_then(|id| self.chain.node(id))
            .map_or("none", |n| n.name())
    }
}

impl<C, E> fmt::Display for NodeRef<'_, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - previous: {} next: {}",
            self.name(),
            self.neighbor_name(self.node.previous),
            self.neighbor_name(self.node.next)
        )
    }
}

impl<C, E> fmt::Debug for NodeRef<'_, C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("previous", &self.node.previous)
            .field("next", &self.node.next)
            .finish()
    }
}

/// Lazy traversal from a node to the tail of its chain.
///
/// Created by [`Chain::walk`].
pub struct Walk<'a, C, E> {
    chain: &'a Chain<C, E>,
    cursor: Option<NodeId>,
}

impl<'a, C, E> Walk<'a, C, E> {
    pub(crate) fn new(chain: &'a Chain<C, E>, start: NodeId) -> Self {
        Self {
            chain,
            cursor: Some(start),
        }
    }
}

impl<'a, C, E> Iterator for Walk<'a, C, E> {
    type Item = NodeRef<'a, C, E>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.chain.node(self.cursor?)?;
        self.cursor = current.next();
        Some(current)
    }
}
