//! Structural statistics for an [`ArtMap`](crate::ArtMap).
//!
//! Useful for checking how the adaptive node variants are populated for a given workload and
//! for verifying that deletes leave no redundant inner nodes behind.

use std::collections::HashMap;

use crate::node::{Content, DefaultNode};

pub trait TreeStatsTrait {
    fn get_tree_stats(&self) -> TreeStats;
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NodeStats {
    pub width: usize,
    pub node_type: String,
    pub total_nodes: usize,
    pub total_children: usize,
    pub density: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TreeStats {
    pub node_stats: HashMap<String, NodeStats>,
    pub num_leaves: usize,
    pub num_inner_nodes: usize,
    pub total_density: f64,
    pub max_height: usize,
}

impl TreeStats {
    /// Number of inner nodes of the named variant ("Node4", "Node16", "Node48", "Node256").
    pub fn nodes_of_type(&self, node_type: &str) -> usize {
        self.node_stats
            .get(node_type)
            .map(|ns| ns.total_nodes)
            .unwrap_or(0)
    }
}

fn update_tree_stats<V>(tree_stats: &mut TreeStats, node: &DefaultNode<V>) {
    let (node_type_name, capacity) = match &node.content {
        Content::Node4(_) => ("Node4", 4),
        Content::Node16(_) => ("Node16", 16),
        Content::Node48(_) => ("Node48", 48),
        Content::Node256(_) => ("Node256", 256),
        Content::Leaf(_) => {
            tree_stats.num_leaves += 1;
            return;
        }
    };

    let num_children = node.num_children();

    tree_stats
        .node_stats
        .entry(node_type_name.to_string())
        .and_modify(|e| {
            e.total_nodes += 1;
            e.total_children += num_children;
        })
        .or_insert(NodeStats {
            width: capacity,
            node_type: node_type_name.to_string(),
            total_nodes: 1,
            total_children: num_children,
            density: 0.0,
        });
}

/// Walk the tree under `root` and summarize it.
pub(crate) fn collect_tree_stats<V>(root: Option<&DefaultNode<V>>) -> TreeStats {
    let mut stats = TreeStats::default();
    let Some(root) = root else {
        return stats;
    };

    let mut stack = vec![(root, 1)];
    while let Some((node, height)) = stack.pop() {
        stats.max_height = stats.max_height.max(height);
        update_tree_stats(&mut stats, node);
        stack.extend(node.iter().map(|(_, child)| (child, height + 1)));
    }

    let mut total_children = 0;
    let mut total_width = 0;
    for ns in stats.node_stats.values_mut() {
        total_children += ns.total_children;
        total_width += ns.width * ns.total_nodes;
        ns.density = ns.total_children as f64 / (ns.width * ns.total_nodes) as f64;
    }
    stats.num_inner_nodes = stats.node_stats.values().map(|ns| ns.total_nodes).sum();
    if total_width > 0 {
        stats.total_density = total_children as f64 / total_width as f64;
    }

    stats
}
