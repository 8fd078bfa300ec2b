//! TreeManager: structural changes, versions and observers

use std::cell::RefCell;
use std::rc::Rc;

use rstest::rstest;
use serde_json::json;

use fractree::application::{ApplicationError, TreeManager};
use fractree::domain::{DomainError, Index, NodeInput, NodeValue};
use fractree::util::testing;

fn leaf(id: i64, num: f64, denom: f64) -> NodeInput {
    NodeInput::new(id, format!("leaf {id}")).with_value(NodeValue::known(num, denom, 1.0))
}

fn four_children() -> NodeInput {
    NodeInput::new(1, "root").with_children(vec![
        leaf(2, 2.0, 1.0),
        leaf(3, 3.0, 1.0),
        leaf(4, 5.0, 1.0),
        leaf(5, 7.0, 1.0),
    ])
}

fn child_ids(manager: &TreeManager, parent: Index) -> Vec<i64> {
    let tree = manager.tree();
    tree.get_node(parent)
        .unwrap()
        .children()
        .iter()
        .map(|c| tree.get_node(*c).unwrap().id)
        .collect()
}

#[rstest]
#[case(Some(0), vec![10, 11, 2, 3, 4, 5])]
#[case(Some(2), vec![2, 3, 10, 11, 4, 5])]
#[case(Some(4), vec![2, 3, 4, 5, 10, 11])]
#[case(None, vec![2, 3, 4, 5, 10, 11])]
fn given_start_index_when_adding_children_then_inserted_contiguously(
    #[case] start: Option<usize>,
    #[case] expected: Vec<i64>,
) {
    testing::init_test_setup();
    let mut manager = TreeManager::new(four_children()).unwrap();
    let root = manager.root();

    let added = manager
        .add_children(root, vec![leaf(10, 11.0, 2.0), leaf(11, 13.0, 3.0)], start)
        .unwrap();

    assert_eq!(added.len(), 2);
    assert_eq!(child_ids(&manager, root), expected);
    for idx in added {
        assert_eq!(manager.tree().get_node(idx).unwrap().parent(), Some(root));
    }
    assert_eq!(
        manager.value(root).unwrap(),
        NodeValue::known(2.0 * 3.0 * 5.0 * 7.0 * 11.0 * 13.0, 6.0, 1.0)
    );
    assert_eq!(manager.version(), 1);
}

#[test]
fn given_start_beyond_end_when_adding_children_then_rejected_without_change() {
    let mut manager = TreeManager::new(four_children()).unwrap();
    let root = manager.root();

    let err = manager
        .add_children(root, vec![leaf(10, 1.0, 1.0)], Some(5))
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::IndexOutOfRange { index: 5, len: 4 })
    ));
    assert_eq!(child_ids(&manager, root), vec![2, 3, 4, 5]);
    assert_eq!(manager.version(), 0);
}

#[test]
fn given_middle_child_when_removing_then_siblings_keep_order_and_parent_excludes_it() {
    let mut manager = TreeManager::new(four_children()).unwrap();
    let root = manager.root();
    let target = manager.find(3).unwrap();

    let parent = manager.remove_node(target).unwrap();

    assert_eq!(parent, Some(root));
    assert_eq!(child_ids(&manager, root), vec![2, 4, 5]);
    assert_eq!(manager.value(root).unwrap(), NodeValue::known(70.0, 1.0, 1.0));
    assert_eq!(manager.tree().get_node(target).unwrap().parent(), None);
    assert_eq!(manager.version(), 1);
}

#[test]
fn given_equal_ids_elsewhere_when_removing_then_identity_decides() {
    // two structurally equal leaves; only the one passed in goes
    let mut manager = TreeManager::new(
        NodeInput::new(1, "root").with_children(vec![leaf(2, 3.0, 1.0), leaf(3, 3.0, 1.0)]),
    )
    .unwrap();
    let root = manager.root();
    let second = manager.find(3).unwrap();

    manager.remove_node(second).unwrap();

    assert_eq!(child_ids(&manager, root), vec![2]);
}

#[test]
fn given_mutations_when_observing_then_version_grows_by_one_each() {
    testing::init_test_setup();
    let mut manager = TreeManager::with_fixture().unwrap();
    let versions = Rc::new(RefCell::new(Vec::new()));
    let v = Rc::clone(&versions);
    let sub = manager.subscribe(move |m| v.borrow_mut().push(m.version()));
    let root = manager.root();

    let leaf = manager.find(20).unwrap();
    manager.set_value(leaf, NodeValue::known(1.0, 1.0, 1.0)).unwrap();
    manager.update_value(leaf, |v| NodeValue { exp: 2.0, ..v }).unwrap();
    let added = manager.add_children(root, vec![NodeInput::new(30, "new")], Some(0)).unwrap();
    manager.remove_node(added[0]).unwrap();
    manager.remove_node(root).unwrap();
    manager.bump_version();

    assert_eq!(*versions.borrow(), vec![0, 1, 2, 3, 4, 5, 6]);

    assert!(manager.unsubscribe(sub));
    manager.bump_version();
    assert_eq!(versions.borrow().len(), 7);
}

#[test]
fn given_detached_subtree_when_added_back_then_recalculation_includes_it() {
    let mut manager = TreeManager::with_fixture().unwrap();
    let child1 = manager.find(10).unwrap();
    let child3 = manager.find(12).unwrap();
    manager.remove_node(child1).unwrap();

    // Child 1 becomes the only child of Child 3
    manager.add_children(child3, [child1], None).unwrap();
    manager
        .set_value(manager.find(20).unwrap(), NodeValue::known(3.0, 1.0, 1.0))
        .unwrap();

    assert_eq!(manager.value(child1).unwrap(), NodeValue::known(6.0, 5.0, 1.0));
    // Child 3 keeps its own exponent 2
    assert_eq!(manager.value(child3).unwrap(), NodeValue::known(6.0, 5.0, 2.0));
}

#[test]
fn given_node_inside_moved_subtree_when_adding_to_itself_then_cycle_is_rejected() {
    let mut manager = TreeManager::with_fixture().unwrap();
    let child2 = manager.find(11).unwrap();
    manager.remove_node(child2).unwrap();
    let inner = manager.tree().get_node(child2).unwrap().children()[0];

    let err = manager.add_children(inner, [child2], None).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::CycleDetected { parent: 23, child: 11 })
    ));
}

#[test]
fn given_value_listener_on_node_when_sibling_changes_then_only_ancestors_notify() {
    let mut manager = TreeManager::with_fixture().unwrap();
    let calls = Rc::new(RefCell::new(Vec::new()));
    for id in [1, 10, 11, 21] {
        let idx = manager.find(id).unwrap();
        let c = Rc::clone(&calls);
        manager.subscribe_value(idx, move |_| c.borrow_mut().push(id)).unwrap();
    }
    calls.borrow_mut().clear();

    manager
        .set_value(manager.find(20).unwrap(), NodeValue::known(1.0, 1.0, 1.0))
        .unwrap();

    // leaf 20 itself has no listener; its ancestors fire bottom-up
    assert_eq!(*calls.borrow(), vec![10, 1]);
}

#[test]
fn given_snapshot_when_serialized_then_data_and_version_without_back_references() {
    let mut manager = TreeManager::new(
        NodeInput::new(1, "root").with_children(vec![leaf(2, 2.0, 1.0), leaf(3, 3.0, 5.0)]),
    )
    .unwrap();
    let root = manager.root();
    manager.recalculate(root).unwrap();

    let json = serde_json::to_value(manager.snapshot()).unwrap();

    assert_eq!(json["version"], json!(1));
    assert_eq!(json["data"]["value"], json!({"num": 6.0, "denom": 5.0, "exp": 1.0}));
    assert_eq!(json["data"]["children"].as_array().unwrap().len(), 2);
    assert!(json["data"].get("parent").is_none());
    assert!(json["data"].get("manager").is_none());
}
