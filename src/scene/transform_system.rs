//! Transform System
//!
//! World-matrix propagation for the node forest, decoupled from
//! [`NodeGraph`](crate::scene::NodeGraph) so it only borrows the node slot map.
//!
//! Staleness is tracked per node (`world == None`). Marking a node stale
//! always marks its whole subtree, so a clean node never has a stale
//! ancestor; both the eager pass and the lazy single-node query rely on it.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeKey;
use crate::scene::node::{Node, NodeParent};

/// Marks `root` and every descendant node stale.
pub fn mark_subtree_stale(nodes: &mut SlotMap<NodeKey, Node>, root: NodeKey) {
    let mut stack: Vec<NodeKey> = vec![root];
    while let Some(key) = stack.pop() {
        let Some(node) = nodes.get_mut(key) else {
            continue;
        };
        node.world = None;
        stack.extend(node.child_nodes());
    }
}

/// Collects `root` and its descendant nodes, parents before children.
pub fn collect_subtree(nodes: &SlotMap<NodeKey, Node>, root: NodeKey) -> Vec<NodeKey> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeKey> = vec![root];
    while let Some(key) = stack.pop() {
        let Some(node) = nodes.get(key) else {
            continue;
        };
        out.push(key);
        // Reverse so siblings come out in declaration order.
        let children: Vec<NodeKey> = node.child_nodes().collect();
        stack.extend(children.into_iter().rev());
    }
    out
}

/// Returns the world matrix of `key`, recomputing stale entries on the path
/// from the nearest clean ancestor down and caching them.
///
/// Returns `None` if `key` is not a live node.
pub fn resolve_world(nodes: &mut SlotMap<NodeKey, Node>, key: NodeKey) -> Option<Affine3A> {
    let mut chain: Vec<NodeKey> = Vec::new();
    let mut base = Affine3A::IDENTITY;
    let mut current = key;

    loop {
        let node = nodes.get(current)?;
        if let Some(world) = node.world {
            base = world;
            break;
        }
        chain.push(current);
        match node.parent {
            NodeParent::Node(parent) => current = parent,
            NodeParent::Orphan | NodeParent::Scene(_) => break,
        }
    }

    for &k in chain.iter().rev() {
        let node = nodes.get_mut(k)?;
        base = base * node.transform.local_matrix();
        node.world = Some(base);
    }

    Some(base)
}

/// Recomputes every stale world matrix below `roots`, top-down.
///
/// Uses an explicit stack instead of recursion so deep hierarchies cannot
/// overflow. Returns how many nodes were recomputed.
pub fn update_hierarchy(nodes: &mut SlotMap<NodeKey, Node>, roots: &[NodeKey]) -> usize {
    // (node, parent world matrix, parent recomputed)
    let mut stack: Vec<(NodeKey, Affine3A, bool)> = Vec::with_capacity(64);
    for &root in roots.iter().rev() {
        stack.push((root, Affine3A::IDENTITY, false));
    }

    let mut updated = 0;
    while let Some((key, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(key) else {
            continue;
        };

        let needs_update = parent_changed || node.world.is_none();
        let world = if needs_update {
            let world = parent_world * node.transform.local_matrix();
            node.world = Some(world);
            updated += 1;
            world
        } else {
            node.world.unwrap_or(Affine3A::IDENTITY)
        };

        for child in node.child_nodes().collect::<Vec<_>>().into_iter().rev() {
            stack.push((child, world, needs_update));
        }
    }

    updated
}
