// SPDX-License-Identifier: MIT

//! Page-view history signal provider

use std::collections::HashSet;

/// Supplies the set of content nodes the current visitor has viewed
pub trait PagesViewedProvider: Send + Sync {
    /// Distinct content-node identifiers from the visitor's session/history.
    /// An empty set means nothing has been viewed; this is never an error.
    fn viewed_node_ids(&self) -> HashSet<i64>;
}

/// Provider over an already-materialised view history.
///
/// Session tracking belongs to the host; this wraps whatever it recorded.
#[derive(Debug, Clone, Default)]
pub struct StaticPagesViewedProvider {
    node_ids: HashSet<i64>,
}

impl StaticPagesViewedProvider {
    pub fn new(node_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            node_ids: node_ids.into_iter().collect(),
        }
    }
}

impl PagesViewedProvider for StaticPagesViewedProvider {
    fn viewed_node_ids(&self) -> HashSet<i64> {
        self.node_ids.clone()
    }
}
