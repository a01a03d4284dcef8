//! Resource tree building and traversal
//!
//! The catalog arrives as a flat list linked by `parent_id`. The builder turns
//! it into an owned forest sorted at every level, and the traversal helpers
//! here are the single pre-order walk used by both the matrix subtree
//! operations and the merged permission view.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed};
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::models::{ResourceNode, ResourceType};
use crate::utils::error::{MatrixError, MatrixResult};

/// Build a sorted forest from a flat resource list
///
/// Nodes whose `parent_id` does not resolve become roots. Duplicate ids and
/// parent cycles are rejected. The input is not modified; every returned
/// node is a fresh copy with its own `children`.
pub fn build_resource_tree(nodes: &[ResourceNode]) -> MatrixResult<Vec<ResourceNode>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if index.insert(node.id.as_str(), i).is_some() {
            return Err(MatrixError::DuplicateResourceId {
                id: node.id.clone(),
            });
        }
    }

    let parents: Vec<Option<usize>> = nodes
        .iter()
        .map(|node| match node.parent_id.as_deref() {
            Some(parent_id) => {
                let parent = index.get(parent_id).copied();
                if parent.is_none() {
                    warn!(
                        resource_key = %node.resource_key,
                        parent_id = %parent_id,
                        "Parent not found, treating resource as root"
                    );
                }
                parent
            }
            None => None,
        })
        .collect();

    ensure_acyclic(nodes, &parents)?;

    let mut children: Vec<Vec<usize>> = vec![vec![]; nodes.len()];
    let mut roots = vec![];
    for (i, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    let mut forest: Vec<ResourceNode> = roots
        .into_iter()
        .map(|i| assemble(nodes, &children, i))
        .collect();
    forest.sort_by(compare_siblings);

    debug!(nodes = nodes.len(), roots = forest.len(), "Built resource tree");
    Ok(forest)
}

fn assemble(nodes: &[ResourceNode], children: &[Vec<usize>], i: usize) -> ResourceNode {
    let mut node = ResourceNode {
        children: vec![],
        ..nodes[i].clone()
    };
    node.children = children[i]
        .iter()
        .map(|&c| assemble(nodes, children, c))
        .collect();
    node.children.sort_by(compare_siblings);
    node
}

/// Reject any parent chain that loops back on itself
fn ensure_acyclic(nodes: &[ResourceNode], parents: &[Option<usize>]) -> MatrixResult<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Rooted,
    }

    let mut marks = vec![Mark::Unvisited; nodes.len()];
    for start in 0..nodes.len() {
        let mut path = vec![];
        let mut cursor = Some(start);
        while let Some(i) = cursor {
            match marks[i] {
                Mark::Rooted => break,
                Mark::InProgress => {
                    return Err(MatrixError::ParentCycle {
                        resource_key: nodes[i].resource_key.clone(),
                    });
                }
                Mark::Unvisited => {
                    marks[i] = Mark::InProgress;
                    path.push(i);
                    cursor = parents[i];
                }
            }
        }
        for i in path {
            marks[i] = Mark::Rooted;
        }
    }
    Ok(())
}

/// Sibling order: `sort_order` ascending with missing values last, then name
pub fn compare_siblings(a: &ResourceNode, b: &ResourceNode) -> Ordering {
    let by_order = match (a.sort_order, b.sort_order) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_order.then_with(|| compare_names(&a.resource_name, &b.resource_name))
}

// Root-locale collation; compiled data is baked in, so construction only
// fails on a broken build and we fall back to case-insensitive order.
static NAME_COLLATOR: Lazy<Option<CollatorBorrowed<'static>>> = Lazy::new(|| {
    match Collator::try_new(Default::default(), CollatorOptions::default()) {
        Ok(collator) => Some(collator),
        Err(e) => {
            warn!(error = %e, "Collator unavailable, sorting names case-insensitively");
            None
        }
    }
});

/// Locale-aware name order, raw order breaking ties
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let collated = match NAME_COLLATOR.as_ref() {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    };
    collated.then_with(|| a.cmp(b))
}

/// Sort a forest in place, recursively
pub fn sort_resource_tree(nodes: &mut [ResourceNode]) {
    nodes.sort_by(compare_siblings);
    for node in nodes.iter_mut() {
        sort_resource_tree(&mut node.children);
    }
}

/// Pre-order iterator over a forest: each node, then all of its descendants
pub struct PreorderIter<'a> {
    stack: Vec<&'a ResourceNode>,
}

impl<'a> Iterator for PreorderIter<'a> {
    type Item = &'a ResourceNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Walk a forest in pre-order
pub fn walk_preorder(tree: &[ResourceNode]) -> PreorderIter<'_> {
    PreorderIter {
        stack: tree.iter().rev().collect(),
    }
}

/// Flatten a forest into pre-order
pub fn flatten_resource_tree(tree: &[ResourceNode]) -> Vec<&ResourceNode> {
    walk_preorder(tree).collect()
}

/// First node (pre-order) with the given resource key
pub fn find_resource<'a>(tree: &'a [ResourceNode], resource_key: &str) -> Option<&'a ResourceNode> {
    walk_preorder(tree).find(|node| node.resource_key == resource_key)
}

/// Keys of every descendant of `resource_key`, at any depth
///
/// Empty when the key is not in the tree or the node is a leaf.
pub fn descendant_keys(tree: &[ResourceNode], resource_key: &str) -> Vec<String> {
    find_resource(tree, resource_key)
        .map(|node| {
            walk_preorder(&node.children)
                .map(|child| child.resource_key.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// Group a flat list by resource type, each group in sibling order
pub fn group_by_resource_type(nodes: &[ResourceNode]) -> BTreeMap<ResourceType, Vec<ResourceNode>> {
    let mut groups: BTreeMap<ResourceType, Vec<ResourceNode>> = BTreeMap::new();
    for node in nodes {
        groups.entry(node.resource_type).or_default().push(node.clone());
    }
    for group in groups.values_mut() {
        group.sort_by(compare_siblings);
    }
    groups
}
