//! Plain node descriptors used to build trees

use generational_arena::Index;
use serde::{Deserialize, Serialize};

use crate::domain::value::{DisplayType, NodeValue, Units};

/// Caller-facing description of a node and its subtree.
///
/// Missing `value` becomes [`NodeValue::empty`], missing `displayType` becomes
/// [`DisplayType::Plain`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInput {
    pub id: i64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<NodeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<DisplayType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Units>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeInput>,
}

impl NodeInput {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            value: None,
            display_type: None,
            units: None,
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: NodeValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_display_type(mut self, display_type: DisplayType) -> Self {
        self.display_type = Some(display_type);
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    pub fn with_children(mut self, children: Vec<NodeInput>) -> Self {
        self.children = children;
        self
    }

    /// Give every node in the subtree without a display type `display_type`.
    pub fn fill_display_type(&mut self, display_type: DisplayType) {
        self.display_type.get_or_insert(display_type);
        for child in &mut self.children {
            child.fill_display_type(display_type);
        }
    }

    /// All ids in this subtree, pre-order.
    pub fn ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            ids.push(node.id);
            stack.extend(node.children.iter().rev());
        }
        ids
    }
}

/// Either a descriptor to materialize or a node already living in the arena.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSource {
    Input(NodeInput),
    Existing(Index),
}

impl From<NodeInput> for NodeSource {
    fn from(input: NodeInput) -> Self {
        NodeSource::Input(input)
    }
}

impl From<Index> for NodeSource {
    fn from(idx: Index) -> Self {
        NodeSource::Existing(idx)
    }
}

/// Sample tree used when no input is supplied.
pub fn fixture() -> NodeInput {
    NodeInput::new(1, "A thing").with_children(vec![
        NodeInput::new(10, "Child 1").with_children(vec![
            NodeInput::new(20, "Subchild 1"),
            NodeInput::new(21, "Subchild 2").with_value(NodeValue::known(2.0, 5.0, 1.0)),
        ]),
        NodeInput::new(11, "Child 2")
            .with_value(NodeValue::known(2.0, 1.0, 1.0))
            .with_children(vec![
                NodeInput::new(23, "Subchild 1"),
                NodeInput::new(24, "Subchild 2").with_value(NodeValue::known(2.0, 5.0, 1.0)),
            ]),
        NodeInput::new(12, "Child 3").with_value(NodeValue::new(None, Some(1.0), 2.0)),
        NodeInput::new(13, "Child 4").with_value(NodeValue::new(None, Some(1.0), 2.0)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_ids_preorder() {
        assert_eq!(fixture().ids(), vec![1, 10, 20, 21, 11, 23, 24, 12, 13]);
    }

    #[test]
    fn test_fill_display_type_keeps_explicit_ones() {
        let mut input = NodeInput::new(1, "a")
            .with_children(vec![NodeInput::new(2, "b").with_display_type(DisplayType::Exp)]);
        input.fill_display_type(DisplayType::Fraction);
        assert_eq!(input.display_type, Some(DisplayType::Fraction));
        assert_eq!(input.children[0].display_type, Some(DisplayType::Exp));
    }

    #[test]
    fn test_deserialize_minimal_descriptor_from_json() {
        let input: NodeInput = serde_json::from_str(
            r#"{"id": 3, "label": "x", "displayType": "fraction",
                "children": [{"id": 4, "label": "y", "value": {"num": null, "denom": 2, "exp": -1}}]}"#,
        )
        .unwrap();

        assert_eq!(input.display_type, Some(DisplayType::Fraction));
        assert_eq!(input.value, None);
        assert_eq!(input.children[0].value, Some(NodeValue::new(None, Some(2.0), -1.0)));
    }

    #[test]
    fn test_deserialize_descriptor_from_toml() {
        let input: NodeInput = toml::from_str(
            r#"
id = 1
label = "speed"
units = [["m"], ["s"]]

[[children]]
id = 2
label = "distance"
value = { num = 100.0, denom = 1.0, exp = 1.0 }
"#,
        )
        .unwrap();

        assert_eq!(input.units, Some(Units(vec!["m".into()], vec!["s".into()])));
        assert_eq!(input.children.len(), 1);
        assert_eq!(input.children[0].value, Some(NodeValue::known(100.0, 1.0, 1.0)));
    }
}
