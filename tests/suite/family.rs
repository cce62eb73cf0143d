//! Family tree store and layout tests

use clara_core::{FamilyLayout, FamilyTree, RelationPolicy};
use clara_types::{FamilyError, RelationSet};

use crate::common::{name, relations};

#[test]
fn grandkid_flow_from_empty_store() {
    let mut tree = FamilyTree::new();
    tree.add_person(name("Child"), relations(&["Me", "Spouse"]))
        .unwrap();
    tree.add_person(name("Grandkid"), relations(&["Child"]))
        .unwrap();

    let names: Vec<&str> = tree
        .children_of("Child")
        .into_iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Grandkid"]);
    assert_eq!(tree.list_members(), vec!["Me", "Child", "Grandkid"]);
}

#[test]
fn duplicate_is_idempotent_failure() {
    let mut tree = FamilyTree::seeded(RelationPolicy::Unchecked);
    tree.add_person(name("Grandkid"), relations(&["Child"]))
        .unwrap();
    let snapshot: Vec<String> = tree.list_members().iter().map(ToString::to_string).collect();

    for _ in 0..3 {
        assert_eq!(
            tree.add_person(name("Grandkid"), RelationSet::new()),
            Err(FamilyError::DuplicateName(name("Grandkid")))
        );
    }
    let after: Vec<String> = tree.list_members().iter().map(ToString::to_string).collect();
    assert_eq!(snapshot, after);
    assert!(tree.get("Grandkid").unwrap().relations.contains("Child"));
}

#[test]
fn list_members_always_begins_with_me() {
    let mut tree = FamilyTree::new();
    assert_eq!(tree.list_members().first(), Some(&"Me"));
    for n in ["Zed", "Amy", "Bo"] {
        tree.add_person(name(n), RelationSet::new()).unwrap();
        assert_eq!(tree.list_members().first(), Some(&"Me"));
    }
    assert_eq!(tree.list_members(), vec!["Me", "Zed", "Amy", "Bo"]);
}

#[test]
fn layout_places_new_descendants() {
    let mut tree = FamilyTree::seeded(RelationPolicy::Strict);
    tree.add_person(name("Grandkid"), relations(&["Child"]))
        .unwrap();
    let layout = FamilyLayout::compute(&tree);
    let grandkid = layout
        .descendants()
        .find(|n| n.label == "Grandkid")
        .unwrap();
    assert!((grandkid.x_percent - 85.0).abs() < f64::EPSILON);
    assert!((grandkid.y - 220.0).abs() < f64::EPSILON);
}
