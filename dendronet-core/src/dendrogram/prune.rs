//! Removal of disconnected leaves.

use super::Dendrogram;

impl Dendrogram {
    /// Detaches the leaves of `disconnected` network nodes.
    ///
    /// Each leaf is removed from its parent, and every ancestor left without
    /// children is removed in turn. The root is never removed, so a network
    /// with no edges at all prunes down to a childless root.
    pub fn prune(&mut self, disconnected: impl IntoIterator<Item = usize>) {
        for node in disconnected {
            if node >= self.node_count {
                continue;
            }
            let mut current = node;
            while current != self.root {
                let Some(parent) = self.detach_from_parent(current) else {
                    break;
                };
                if let Some(record) = self.nodes.get_mut(current) {
                    record.removed = true;
                }
                let parent_empty = self
                    .nodes
                    .get(parent)
                    .is_some_and(|record| record.children.is_empty());
                if !parent_empty {
                    break;
                }
                current = parent;
            }
        }
    }
}
