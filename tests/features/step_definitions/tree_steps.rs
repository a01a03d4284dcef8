//! Resource tree step definitions

use cucumber::{given, then, when};

use permission_matrix::models::{ResourceNode, ResourceType};
use permission_matrix::services::build_resource_tree;

use crate::features::support::{split_list, TestWorld};

#[given(expr = "a resource {string} named {string} with sort order {int}")]
async fn resource_with_order(world: &mut TestWorld, key: String, name: String, order: i64) {
    world
        .resources
        .push(ResourceNode::new(key.clone(), key, name, ResourceType::Menu).with_sort_order(order));
}

#[given(expr = "a resource {string} named {string} under {string}")]
async fn resource_under(world: &mut TestWorld, key: String, name: String, parent: String) {
    world
        .resources
        .push(ResourceNode::new(key.clone(), key, name, ResourceType::Menu).with_parent(parent));
}

#[when("I build the resource tree")]
async fn build_tree(world: &mut TestWorld) {
    match build_resource_tree(&world.resources) {
        Ok(tree) => {
            world.tree = tree;
            world.tree_error = None;
        }
        Err(err) => world.tree_error = Some(err),
    }
}

#[then(expr = "the root resources are {string}")]
async fn root_resources_are(world: &mut TestWorld, expected: String) {
    assert!(world.tree_error.is_none(), "tree build failed: {:?}", world.tree_error);
    let names: Vec<String> = world.tree.iter().map(|n| n.resource_name.clone()).collect();
    assert_eq!(names, split_list(&expected));
}

#[then(expr = "{string} has children {string}")]
async fn has_children(world: &mut TestWorld, key: String, expected: String) {
    let node = permission_matrix::services::find_resource(&world.tree, &key)
        .unwrap_or_else(|| panic!("{} not in tree", key));
    let names: Vec<String> = node.children.iter().map(|n| n.resource_name.clone()).collect();
    assert_eq!(names, split_list(&expected));
}

#[then(expr = "building fails with {string}")]
async fn building_fails(world: &mut TestWorld, error_type: String) {
    let err = world.tree_error.as_ref().expect("tree build should fail");
    assert_eq!(err.error_type(), error_type);
}
