/// Index statistics
use super::entry::IndexEntry;
use crate::types::BoundingBox;
use rstar::{ParentNode, RTreeNode};
use serde::{Deserialize, Serialize};

/// Summary of a built index, computed once at build time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Records consumed from the source
    pub records_read: usize,
    /// Records dropped because they lie outside the build region
    pub records_discarded: usize,
    /// Retained polygons that were clipped to the region
    pub polygons_clipped: usize,
    /// Polygons stored in the index
    pub polygons: usize,
    /// Distinct zone identifiers stored in the index
    pub zones: usize,
    /// Points stored over all rings of all polygons
    pub vertices: usize,
    /// Levels of tree nodes, `0` for an empty index
    pub depth: usize,
    /// Nodes whose children are polygons
    pub leaf_nodes: usize,
    /// Nodes whose children are other nodes
    pub internal_nodes: usize,
    /// Envelope of all stored polygons, restricted to the region for clipped ones
    pub bounds: Option<BoundingBox>,
    /// Wall-clock build time in milliseconds
    pub build_millis: u64,
}

/// Tree shape gathered by walking from the root.
#[derive(Debug, Default)]
pub(crate) struct TreeShape {
    pub(crate) depth: usize,
    pub(crate) leaf_nodes: usize,
    pub(crate) internal_nodes: usize,
}

impl TreeShape {
    pub(crate) fn measure(root: &ParentNode<IndexEntry>) -> Self {
        let mut shape = Self::default();
        if !root.children().is_empty() {
            shape.visit(root, 1);
        }
        shape
    }

    fn visit(&mut self, node: &ParentNode<IndexEntry>, level: usize) {
        self.depth = self.depth.max(level);

        let mut has_parents = false;
        for child in node.children() {
            if let RTreeNode::Parent(parent) = child {
                has_parents = true;
                self.visit(parent, level + 1);
            }
        }

        if has_parents {
            self.internal_nodes += 1;
        } else {
            self.leaf_nodes += 1;
        }
    }
}

/// Returns `true` when every node's envelope contains all of its children.
#[cfg(test)]
pub(crate) fn envelopes_nest(node: &ParentNode<IndexEntry>) -> bool {
    use rstar::RTreeObject;

    let envelope = node.envelope();
    node.children().iter().all(|child| match child {
        RTreeNode::Leaf(entry) => rstar::Envelope::contains_envelope(&envelope, &entry.envelope()),
        RTreeNode::Parent(parent) => {
            rstar::Envelope::contains_envelope(&envelope, &parent.envelope()) && envelopes_nest(parent)
        }
    })
}
