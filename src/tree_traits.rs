//! Rendering trees for the terminal

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::TreeArena;

pub trait TreeNodeConvert {
    /// Render the subtree at `idx`, one line per node: `label [id] = value`.
    fn to_tree_string(&self, idx: Index, precision: usize) -> Tree<String>;
}

impl TreeNodeConvert for TreeArena {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, idx: Index, precision: usize) -> Tree<String> {
        let Some(node) = self.get_node(idx) else {
            return Tree::new("Empty tree".to_string());
        };
        let line = format!(
            "{} [{}] = {}",
            node.label,
            node.id,
            node.value().render(node.display_type, precision)
        );
        let leaves: Vec<_> = node
            .children()
            .iter()
            .map(|&child| self.to_tree_string(child, precision))
            .collect();

        Tree::new(line).with_leaves(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{fixture, DisplayType, NodeInput, NodeValue};

    #[test]
    fn test_fixture_renders_every_node() {
        let tree = TreeArena::from_input(fixture()).unwrap();
        let rendered = tree.to_tree_string(tree.root().unwrap(), 2).to_string();
        assert_eq!(rendered.lines().count(), 9);
        assert!(rendered.starts_with("A thing [1] = ?"));
        assert!(rendered.contains("Subchild 2 [21] = 0.40"));
    }

    #[test]
    fn test_render_respects_display_type() {
        let input = NodeInput::new(1, "r")
            .with_display_type(DisplayType::Fraction)
            .with_value(NodeValue::known(6.0, 5.0, 1.0));
        let tree = TreeArena::from_input(input).unwrap();
        let rendered = tree.to_tree_string(tree.root().unwrap(), 2).to_string();
        assert_eq!(rendered.trim_end(), "r [1] = 6/5");
    }
}
