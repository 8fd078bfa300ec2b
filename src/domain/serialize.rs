//! Acyclic serialized form of a (sub)tree

use generational_arena::Index;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::domain::arena::{TreeArena, TreeNode};

/// Borrowed view of one node and its subtree.
///
/// Serializes as `{id, label, value, displayType, units?, children?}`. Parent
/// links are never written, so the output is always a plain tree.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    arena: &'a TreeArena,
    idx: Index,
}

impl<'a> NodeView<'a> {
    pub(crate) fn new(arena: &'a TreeArena, idx: Index) -> Self {
        Self { arena, idx }
    }

    pub fn node(&self) -> Option<&'a TreeNode> {
        self.arena.get_node(self.idx)
    }

    pub fn children(&self) -> impl Iterator<Item = NodeView<'a>> + 'a {
        let arena = self.arena;
        self.node()
            .map(|node| node.children())
            .unwrap_or_default()
            .iter()
            .map(move |&idx| NodeView::new(arena, idx))
    }
}

struct Children<'a>(NodeView<'a>);

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.children())
    }
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Some(node) = self.node() else {
            return serializer.serialize_none();
        };
        let len = 4 + usize::from(node.units.is_some()) + usize::from(node.has_children());
        let mut state = serializer.serialize_struct("Node", len)?;
        state.serialize_field("id", &node.id)?;
        state.serialize_field("label", &node.label)?;
        state.serialize_field("value", node.store())?;
        state.serialize_field("displayType", &node.display_type)?;
        if let Some(units) = &node.units {
            state.serialize_field("units", units)?;
        } else {
            state.skip_field("units")?;
        }
        if node.has_children() {
            state.serialize_field("children", &Children(*self))?;
        } else {
            state.skip_field("children")?;
        }
        state.end()
    }
}
