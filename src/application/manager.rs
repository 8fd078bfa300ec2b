//! Versioned owner of a recalculating tree

use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{
    fixture, DomainError, Index, Listeners, NodeInput, NodeSource, NodeValue, NodeView,
    SubscriptionId, TreeArena,
};

/// What tree observers see: the root and the version it belongs to.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TreeSnapshot<'a> {
    pub data: NodeView<'a>,
    pub version: u64,
}

/// Single owner of a tree, its version counter and its observers.
///
/// Every successful mutation runs to completion (including the whole upward
/// recalculation chain), then bumps the version by exactly one and notifies
/// observers once. Failed mutations change nothing and do not bump.
pub struct TreeManager {
    tree: TreeArena,
    root: Index,
    version: u64,
    observers: Listeners<TreeManager>,
}

impl std::fmt::Debug for TreeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeManager")
            .field("version", &self.version)
            .field("nodes", &self.tree.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TreeManager {
    #[instrument(level = "debug", skip(input), fields(root_id = input.id))]
    pub fn new(input: NodeInput) -> ApplicationResult<Self> {
        let (tree, root) = TreeArena::with_root(input)?;
        Ok(Self {
            tree,
            root,
            version: 0,
            observers: Listeners::new(),
        })
    }

    /// Manager over the built-in sample tree.
    pub fn with_fixture() -> ApplicationResult<Self> {
        Self::new(fixture())
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> TreeSnapshot<'_> {
        TreeSnapshot {
            data: NodeView::new(&self.tree, self.root),
            version: self.version,
        }
    }

    /// Index of the attached node with caller id `id`.
    pub fn find(&self, id: i64) -> ApplicationResult<Index> {
        Ok(self.tree.find_by_id(id).ok_or(DomainError::UnknownId(id))?)
    }

    pub fn value(&self, idx: Index) -> ApplicationResult<NodeValue> {
        Ok(self.tree.value(idx)?)
    }

    /// Register a tree observer. It is called right away and after every change.
    pub fn subscribe(&mut self, observer: impl FnMut(&TreeManager) + 'static) -> SubscriptionId {
        let id = self.observers.add(observer);
        let mut observers = std::mem::take(&mut self.observers);
        observers.notify_one(id, self);
        self.observers = observers;
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    pub fn subscribe_value(
        &mut self,
        idx: Index,
        listener: impl FnMut(&NodeValue) + 'static,
    ) -> ApplicationResult<SubscriptionId> {
        Ok(self.tree.subscribe_value(idx, listener)?)
    }

    pub fn unsubscribe_value(&mut self, idx: Index, id: SubscriptionId) -> ApplicationResult<bool> {
        Ok(self.tree.unsubscribe_value(idx, id)?)
    }

    /// Increment the version and notify observers.
    #[instrument(level = "trace", skip(self))]
    pub fn bump_version(&mut self) {
        self.version += 1;
        debug!("Tree version {}", self.version);
        let mut observers = std::mem::take(&mut self.observers);
        observers.notify(self);
        self.observers = observers;
    }

    pub fn set_value(&mut self, idx: Index, value: NodeValue) -> ApplicationResult<()> {
        self.tree.set_value(idx, value)?;
        self.bump_version();
        Ok(())
    }

    pub fn update_value<F>(&mut self, idx: Index, f: F) -> ApplicationResult<()>
    where
        F: FnOnce(NodeValue) -> NodeValue,
    {
        self.tree.update_value(idx, f)?;
        self.bump_version();
        Ok(())
    }

    pub fn recalculate(&mut self, idx: Index) -> ApplicationResult<()> {
        self.tree.recalculate(idx)?;
        self.bump_version();
        Ok(())
    }

    pub fn recalculate_all(&mut self) {
        self.tree.recalculate_all();
        self.bump_version();
    }

    /// Materialize a detached node. Not part of the tree yet, so no version bump.
    pub fn create_node(&mut self, source: impl Into<NodeSource>) -> ApplicationResult<Index> {
        Ok(self.tree.create_node(source)?)
    }

    pub fn add_children<I, S>(
        &mut self,
        parent: Index,
        children: I,
        start: Option<usize>,
    ) -> ApplicationResult<Vec<Index>>
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeSource>,
    {
        let added = self.tree.add_children(parent, children, start)?;
        self.bump_version();
        Ok(added)
    }

    /// Detach `idx` from its parent. Bumps the version even when there was no parent.
    pub fn remove_node(&mut self, idx: Index) -> ApplicationResult<Option<Index>> {
        let parent = self.tree.remove_node(idx)?;
        self.bump_version();
        Ok(parent)
    }

    /// Drop a detached subtree from memory.
    pub fn discard(&mut self, idx: Index) -> ApplicationResult<usize> {
        Ok(self.tree.discard(idx)?)
    }
}
