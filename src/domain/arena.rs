use std::collections::HashSet;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::aggregate::aggregate;
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::input::{NodeInput, NodeSource};
use crate::domain::observer::SubscriptionId;
use crate::domain::serialize::NodeView;
use crate::domain::store::ValueStore;
use crate::domain::value::{DisplayType, NodeValue, Units};

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    /// Caller-assigned id, unique within a tree
    pub id: i64,
    pub label: String,
    pub display_type: DisplayType,
    /// Passed through untouched
    pub units: Option<Units>,
    value: ValueStore,
    /// Index of parent node in the arena, None for roots and detached nodes
    parent: Option<Index>,
    /// Indices of child nodes in the arena, in display order
    children: Vec<Index>,
}

impl TreeNode {
    fn from_input(input: &NodeInput, parent: Option<Index>) -> Self {
        Self {
            id: input.id,
            label: input.label.clone(),
            display_type: input.display_type.unwrap_or_default(),
            units: input.units.clone(),
            value: ValueStore::new(input.value.unwrap_or_default()),
            parent,
            children: Vec::new(),
        }
    }

    pub fn value(&self) -> NodeValue {
        self.value.get()
    }

    pub fn store(&self) -> &ValueStore {
        &self.value
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn children(&self) -> &[Index] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena-based tree that keeps every parent equal to the aggregate of its children.
///
/// Children are owned through index lists; `parent` is a plain back-index used
/// to walk upward during recalculation. Detached subtrees (created but not yet
/// inserted, or removed) stay in the arena until [`TreeArena::discard`].
#[derive(Debug)]
pub struct TreeArena {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Materialize `input` as the root of a new tree. No recalculation happens.
    pub fn from_input(input: NodeInput) -> TreeResult<Self> {
        Self::with_root(input).map(|(tree, _)| tree)
    }

    /// Like [`TreeArena::from_input`], also returning the root index.
    #[instrument(level = "debug", skip(input), fields(root_id = input.id))]
    pub fn with_root(input: NodeInput) -> TreeResult<(Self, Index)> {
        check_unique_ids(input.ids(), &HashSet::new())?;
        let mut tree = Self::new();
        let root = tree.materialize(&input, None);
        tree.root = Some(root);
        Ok((tree, root))
    }

    /// Create a detached node from a descriptor, or adopt one already in the arena.
    ///
    /// Adopting re-points each child's parent at the node, nothing else.
    #[instrument(level = "debug", skip(self, source))]
    pub fn create_node(&mut self, source: impl Into<NodeSource>) -> TreeResult<Index> {
        match source.into() {
            NodeSource::Input(input) => {
                check_unique_ids(input.ids(), &HashSet::new())?;
                Ok(self.materialize(&input, None))
            }
            NodeSource::Existing(idx) => {
                let children = self.node(idx)?.children.clone();
                for child in children {
                    if let Some(node) = self.arena.get_mut(child) {
                        node.parent = Some(idx);
                    }
                }
                Ok(idx)
            }
        }
    }

    fn materialize(&mut self, input: &NodeInput, parent: Option<Index>) -> Index {
        let idx = self.arena.insert(TreeNode::from_input(input, parent));
        let children: Vec<Index> = input
            .children
            .iter()
            .map(|child| self.materialize(child, Some(idx)))
            .collect();
        self.arena[idx].children = children;
        idx
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    /// Mutable access for label, display type and units. Structure and value
    /// only change through the tree's own operations.
    #[instrument(level = "trace", skip(self))]
    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    fn node(&self, idx: Index) -> TreeResult<&TreeNode> {
        self.arena.get(idx).ok_or(DomainError::NodeNotFound(idx))
    }

    fn node_mut(&mut self, idx: Index) -> TreeResult<&mut TreeNode> {
        self.arena.get_mut(idx).ok_or(DomainError::NodeNotFound(idx))
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    /// Number of nodes in the arena, detached subtrees included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    pub fn value(&self, idx: Index) -> TreeResult<NodeValue> {
        Ok(self.node(idx)?.value.get())
    }

    /// Replace a node's value, notify its listeners and recalculate every ancestor.
    #[instrument(level = "debug", skip(self))]
    pub fn set_value(&mut self, idx: Index, value: NodeValue) -> TreeResult<()> {
        let node = self.node_mut(idx)?;
        node.value.replace(value);
        let parent = node.parent;
        self.propagate(parent);
        Ok(())
    }

    /// `set_value` with a value computed from the current one.
    pub fn update_value<F>(&mut self, idx: Index, f: F) -> TreeResult<()>
    where
        F: FnOnce(NodeValue) -> NodeValue,
    {
        let current = self.value(idx)?;
        self.set_value(idx, f(current))
    }

    /// Recalculate `idx` from its children and propagate upward.
    ///
    /// A childless node is left untouched and nothing propagates.
    #[instrument(level = "debug", skip(self))]
    pub fn recalculate(&mut self, idx: Index) -> TreeResult<()> {
        self.node(idx)?;
        self.propagate(Some(idx));
        Ok(())
    }

    // Walks upward from `start` until a childless node or a node without parent.
    fn propagate(&mut self, start: Option<Index>) {
        let mut current = start;
        while let Some(idx) = current {
            if !self.refresh(idx) {
                break;
            }
            current = self.arena.get(idx).and_then(|node| node.parent);
        }
    }

    // Recompute one node from its children. Returns false for childless nodes.
    fn refresh(&mut self, idx: Index) -> bool {
        let Some(node) = self.arena.get(idx) else {
            return false;
        };
        if node.children.is_empty() {
            return false;
        }
        debug!("Recalculate node {}", node.id);

        let output = aggregate(
            node.value.get().exp,
            node.children
                .iter()
                .filter_map(|child| self.arena.get(*child))
                .map(|child| child.value.get()),
        );
        self.arena[idx].value.replace(output);
        true
    }

    /// Recalculate every node of the rooted tree, children before parents.
    #[instrument(level = "debug", skip(self))]
    pub fn recalculate_all(&mut self) {
        let order: Vec<Index> = self.iter_postorder().map(|(idx, _)| idx).collect();
        for idx in order {
            self.refresh(idx);
        }
    }

    /// Insert `children` under `parent` at `start` (default: the end) and
    /// recalculate `parent` and its ancestors.
    ///
    /// Every check runs before anything is changed: the position must be within
    /// `0..=len`, existing nodes must be detached and must not contain `parent`,
    /// and no id may clash with the tree `parent` belongs to.
    #[instrument(level = "debug", skip(self, children))]
    pub fn add_children<I, S>(
        &mut self,
        parent: Index,
        children: I,
        start: Option<usize>,
    ) -> TreeResult<Vec<Index>>
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeSource>,
    {
        let sources: Vec<NodeSource> = children.into_iter().map(Into::into).collect();
        let parent_node = self.node(parent)?;
        let len = parent_node.children.len();
        let parent_id = parent_node.id;
        let start = start.unwrap_or(len);
        if start > len {
            return Err(DomainError::IndexOutOfRange { index: start, len });
        }

        let tree_root = self.ancestors(parent).last().unwrap_or(parent);
        let mut taken: HashSet<i64> = self
            .iter_from(tree_root)
            .map(|(_, node)| node.id)
            .collect();
        let mut seen: HashSet<Index> = HashSet::new();
        for source in &sources {
            let ids = match source {
                NodeSource::Input(input) => input.ids(),
                NodeSource::Existing(idx) => {
                    let node = self.node(*idx)?;
                    if Some(*idx) == self.root {
                        return Err(DomainError::RootNotAllowed(node.id));
                    }
                    if node.parent.is_some() || !seen.insert(*idx) {
                        return Err(DomainError::AlreadyAttached(node.id));
                    }
                    if *idx == parent || self.ancestors(parent).any(|a| a == *idx) {
                        return Err(DomainError::CycleDetected {
                            parent: parent_id,
                            child: node.id,
                        });
                    }
                    self.iter_from(*idx).map(|(_, n)| n.id).collect()
                }
            };
            taken = check_unique_ids(ids, &taken)?;
        }

        let new_children: Vec<Index> = sources
            .iter()
            .map(|source| match source {
                NodeSource::Input(input) => self.materialize(input, Some(parent)),
                NodeSource::Existing(idx) => {
                    self.arena[*idx].parent = Some(parent);
                    *idx
                }
            })
            .collect();

        let siblings = &mut self.arena[parent].children;
        let tail = siblings.split_off(start);
        siblings.extend(new_children.iter().copied());
        siblings.extend(tail);
        debug!(
            "Added {} children to node {} at {}",
            new_children.len(),
            parent_id,
            start
        );

        self.propagate(Some(parent));
        Ok(new_children)
    }

    /// Detach `idx` from its parent (by identity) and recalculate the former parent.
    ///
    /// Returns the former parent. A node without parent is left as is. The
    /// removed subtree keeps its values and children.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, idx: Index) -> TreeResult<Option<Index>> {
        let node = self.node_mut(idx)?;
        let Some(parent) = node.parent.take() else {
            return Ok(None);
        };
        if let Some(parent_node) = self.arena.get_mut(parent) {
            parent_node.children.retain(|child| *child != idx);
        }
        self.propagate(Some(parent));
        Ok(Some(parent))
    }

    /// Free the arena slots of a detached subtree. Returns the number of nodes dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn discard(&mut self, idx: Index) -> TreeResult<usize> {
        let node = self.node(idx)?;
        if Some(idx) == self.root {
            return Err(DomainError::RootNotAllowed(node.id));
        }
        if node.parent.is_some() {
            return Err(DomainError::AlreadyAttached(node.id));
        }
        let doomed: Vec<Index> = self.iter_from(idx).map(|(i, _)| i).collect();
        for i in &doomed {
            self.arena.remove(*i);
        }
        Ok(doomed.len())
    }

    /// Register a listener on one node's value; it fires immediately with the current value.
    pub fn subscribe_value(
        &mut self,
        idx: Index,
        listener: impl FnMut(&NodeValue) + 'static,
    ) -> TreeResult<SubscriptionId> {
        Ok(self.node_mut(idx)?.value.subscribe(listener))
    }

    pub fn unsubscribe_value(&mut self, idx: Index, id: SubscriptionId) -> TreeResult<bool> {
        Ok(self.node_mut(idx)?.value.unsubscribe(id))
    }

    /// Parent, grandparent, ... up to the root of whatever tree `idx` is in.
    pub fn ancestors(&self, idx: Index) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            current: self.arena.get(idx).and_then(|node| node.parent),
        }
    }

    /// Find a node of the rooted tree by its caller-assigned id.
    #[instrument(level = "trace", skip(self))]
    pub fn find_by_id(&self, id: i64) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.id == id)
            .map(|(idx, _)| idx)
    }

    pub fn view(&self, idx: Index) -> TreeResult<NodeView<'_>> {
        self.node(idx)?;
        Ok(NodeView::new(self, idx))
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    pub fn iter_from(&self, idx: Index) -> TreeIterator<'_> {
        TreeIterator::new(self, Some(idx))
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, self.root)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Nodes of the rooted tree without children, left to right.
    pub fn leaf_nodes(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(idx, _)| idx)
            .collect()
    }
}

// Returns `taken` extended by `ids`, or the first id already present.
fn check_unique_ids(
    ids: impl IntoIterator<Item = i64>,
    taken: &HashSet<i64>,
) -> TreeResult<HashSet<i64>> {
    let mut all = taken.clone();
    for id in ids {
        if !all.insert(id) {
            return Err(DomainError::DuplicateId(id));
        }
    }
    Ok(all)
}

pub struct Ancestors<'a> {
    arena: &'a TreeArena,
    current: Option<Index>,
}

impl Iterator for Ancestors<'_> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.current?;
        self.current = self.arena.get_node(idx).and_then(|node| node.parent);
        Some(idx)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.map(|idx| (idx, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
