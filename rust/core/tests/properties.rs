// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end checks of the tree, visibility, isolation and search
//! guarantees on a synthetic model.

use std::sync::Arc;

use bim_shell_core::{
    ChangeSource, DocumentId, Element, ElementId, GroupKey, InMemoryScene, NodeIndex, ObjectId,
    Scene, ShellConfig, TreeBuilder, TreeIndex, ViewerSession, Visibility, VisibilityAggregator,
};
use rustc_hash::FxHashSet;

const CATEGORIES: [&str; 4] = ["Walls", "Doors", "Windows", "Floors"];

/// Deterministic model: 4 categories, 3 families each, 2 types per family.
fn model(count: u32) -> Vec<Element> {
    (1..=count)
        .map(|i| {
            let category = CATEGORIES[(i % 4) as usize];
            let family = format!("{} Family {}", category, i % 3);
            let family_type = format!("Type {}", i % 2);
            Element {
                id: ElementId(i),
                name: format!("{} {}", category, i),
                category: category.to_string(),
                family,
                family_type,
                object: ObjectId(1000 + i),
                document: DocumentId(0),
            }
        })
        .collect()
}

fn scene_for(elements: &[Element]) -> InMemoryScene {
    let mut scene = InMemoryScene::new();
    for e in elements {
        scene.insert(e.object, e.document, None);
    }
    scene
}

fn tree(elements: &[Element]) -> TreeIndex {
    TreeBuilder::new()
        .group_by_all(GroupKey::standard())
        .build(elements)
        .unwrap()
}

#[test]
fn every_element_has_exactly_one_leaf() {
    let elements = model(240);
    let tree = tree(&elements);

    let mut seen = FxHashSet::default();
    for e in &elements {
        let leaf = tree.node_for_element(e.id).expect("element missing from tree");
        let node = tree.node(leaf).unwrap();
        assert!(node.is_leaf());
        assert!(node.children().is_empty());
        assert_eq!(node.element(), Some(e));
        assert!(seen.insert(leaf), "two elements share leaf {leaf}");
    }
    assert_eq!(tree.leaf_count(), elements.len());
    assert_eq!(tree.nodes().filter(|n| n.is_leaf()).count(), elements.len());
}

#[test]
fn ancestor_chains_match_depth() {
    let tree = tree(&model(120));
    for node in tree.nodes() {
        let chain = tree.ancestors(node.index);
        assert_eq!(chain.len(), node.depth as usize + 1);
        let top = tree.node(*chain.last().unwrap()).unwrap();
        assert_eq!(top.parent, None);
        assert_eq!(top.parent_raw(), -1);
        // Parent links and children lists agree.
        if let Some(parent) = node.parent {
            assert!(tree.children(parent).contains(&node.index));
        }
    }
}

#[test]
fn branch_leaves_are_union_of_child_leaves() {
    let tree = tree(&model(120));
    for node in tree.nodes().filter(|n| !n.is_leaf()) {
        let leaves = tree.leafs(node.index);
        assert!(!leaves.is_empty());
        let mut from_children = Vec::new();
        for &c in node.children() {
            from_children.extend(tree.leafs(c));
        }
        assert_eq!(leaves, from_children);
    }
}

#[test]
fn siblings_are_sorted_by_title() {
    let tree = tree(&model(120));
    let root_titles: Vec<&str> = tree.roots().iter().map(|&r| tree.title(r).unwrap()).collect();
    assert_eq!(root_titles, vec!["Doors", "Floors", "Walls", "Windows"]);

    for node in tree.nodes().filter(|n| !n.is_leaf()) {
        let children = node.children();
        if tree.node(children[0]).unwrap().is_leaf() {
            continue;
        }
        for pair in children.windows(2) {
            let a = tree.title(pair[0]).unwrap().to_lowercase();
            let b = tree.title(pair[1]).unwrap().to_lowercase();
            assert!(a <= b, "{a} sorted after {b}");
        }
    }
}

#[test]
fn visibility_aggregates_and_is_idempotent() {
    let elements = model(60);
    let tree = tree(&elements);
    let mut scene = scene_for(&elements);
    for e in elements.iter().filter(|e| e.category == "Doors") {
        scene.set_visible(e.object, false);
    }
    for e in elements.iter().filter(|e| e.category == "Walls" && e.id.0 % 2 == 0) {
        scene.set_visible(e.object, false);
    }

    let mut agg = VisibilityAggregator::new();
    agg.update(&tree, |e| scene.is_visible(e.object));

    for node in tree.nodes().filter(|n| !n.is_leaf()) {
        let leaf_states: Vec<bool> = tree
            .leaf_objects(node.index)
            .into_iter()
            .map(|o| scene.is_visible(o))
            .collect();
        let expected = if leaf_states.iter().all(|&v| v) {
            Visibility::Visible
        } else if leaf_states.iter().all(|&v| !v) {
            Visibility::Hidden
        } else {
            Visibility::Mixed
        };
        assert_eq!(agg.get(node.index), Some(expected), "node {}", node.title);
    }

    let before: Vec<_> = tree.nodes().map(|n| agg.get(n.index)).collect();
    agg.update(&tree, |e| scene.is_visible(e.object));
    let after: Vec<_> = tree.nodes().map(|n| agg.get(n.index)).collect();
    assert_eq!(before, after);
}

#[test]
fn isolation_round_trip() {
    let elements = model(20);
    for subset in [vec![], vec![ObjectId(1001)], elements.iter().map(|e| e.object).collect()] {
        let mut scene = scene_for(&elements);
        let mut session = ViewerSession::default();
        session.set_elements(elements.clone().into()).unwrap();

        session.isolate(&mut scene, subset, ChangeSource::Tree);
        session.clear_isolation(&mut scene, ChangeSource::Tree);

        assert_eq!(scene.visible_objects().len(), elements.len());
        assert!(session.isolation().current().is_none());
    }
}

#[test]
fn toggle_isolates_selection_then_cancels() {
    let elements = model(3);
    let [a, b, c] = [elements[0].object, elements[1].object, elements[2].object];
    let mut scene = scene_for(&elements);
    let mut session = ViewerSession::default();
    session.set_elements(elements.into()).unwrap();

    scene.select(&[a, b]);
    assert!(session.toggle_isolation(&mut scene, ChangeSource::Keyboard));
    assert!(!scene.is_visible(c));
    assert!(scene.is_visible(a) && scene.is_visible(b));

    scene.select(&[a, b]);
    assert!(session.toggle_isolation(&mut scene, ChangeSource::Keyboard));
    assert_eq!(scene.visible_objects(), vec![a, b, c]);
}

#[test]
fn hide_then_show_restores_isolation() {
    let elements = model(5);
    let objects: Vec<ObjectId> = elements.iter().map(|e| e.object).collect();
    let (a, b, c) = (objects[0], objects[1], objects[2]);
    let mut scene = scene_for(&elements);
    let mut session = ViewerSession::default();
    session.set_elements(elements.into()).unwrap();

    session.isolate(&mut scene, [a, b, c], ChangeSource::Tree);
    session.hide(&mut scene, [b], ChangeSource::ContextMenu);
    let expected: FxHashSet<ObjectId> = [a, c].into_iter().collect();
    assert_eq!(session.isolation().current(), Some(&expected));

    session.show(&mut scene, [b], ChangeSource::ContextMenu);
    let expected: FxHashSet<ObjectId> = [a, b, c].into_iter().collect();
    assert_eq!(session.isolation().current(), Some(&expected));
}

#[test]
fn search_debounce_applies_final_text_once() {
    let elements = model(40);
    let mut scene = scene_for(&elements);
    let mut session = ViewerSession::new(ShellConfig::default());
    session.set_elements(elements.into()).unwrap();

    let mut applications = 0;
    let mut now = 0.0;
    for text in ["w", "wa", "wal"] {
        session.set_filter(text, now);
        now += 60.0;
        if session.tick(&mut scene, now).unwrap() {
            applications += 1;
        }
    }
    // Pause.
    for _ in 0..10 {
        now += 60.0;
        if session.tick(&mut scene, now).unwrap() {
            applications += 1;
        }
    }

    assert_eq!(applications, 1);
    assert_eq!(session.search_text(), "wal");
    assert!(session
        .tree()
        .nodes()
        .filter_map(|n| n.element())
        .all(|e| e.name.to_lowercase().contains("wal")));
}

#[test]
fn selection_cover_shares_ancestors() {
    let elements = model(40);
    let tree = tree(&elements);
    // Same category, family and type: ids 4 and 28 (4 % 3 == 28 % 3, both even).
    let e1 = ElementId(4);
    let e2 = ElementId(28);
    let a1 = tree.ancestors(tree.node_for_element(e1).unwrap());
    let a2 = tree.ancestors(tree.node_for_element(e2).unwrap());
    assert_eq!(&a1[1..], &a2[1..]);

    let cover = tree.selection_cover([e1, e2]);
    let shared: Vec<NodeIndex> = a1[1..].to_vec();
    for n in &shared {
        assert_eq!(cover.iter().filter(|&&c| c == *n).count(), 1);
    }
    assert_eq!(cover.len(), shared.len() + 2);
}

#[test]
fn session_survives_shared_element_list() {
    let elements: Arc<[Element]> = model(10).into();
    let mut session = ViewerSession::default();
    assert!(session.set_elements(elements.clone()).unwrap());
    assert!(!session.set_elements(elements).unwrap());
}
