//! Tab order discovery
//!
//! Candidates are classified from attributes only; layout is consulted
//! later, when an edge is picked, so hidden descendants can still appear
//! in the list.

use fos_dom::{Document, NodeId};

use crate::tabbable::{is_structurally_tabbable, tab_index};
use crate::visibility::find_visible;

/// Tabbable descendants of `root` in sequential navigation order
///
/// Positive tab indices come first, ascending, ties in document order;
/// then every tab index 0 element in document order.
pub fn get_tabbable_candidates(doc: &Document, root: NodeId) -> Vec<NodeId> {
    let (mut positive, zero): (Vec<(i32, NodeId)>, Vec<(i32, NodeId)>) = doc.tree()
        .descendants(root)
        .filter(|&node| is_structurally_tabbable(doc, node))
        .map(|node| (tab_index(doc, node), node))
        .partition(|&(index, _)| index > 0);

    // sort_by_key is stable, so equal indices keep document order
    positive.sort_by_key(|&(index, _)| index);

    positive.into_iter()
        .chain(zero)
        .map(|(_, node)| node)
        .collect()
}

/// First and last visible tabbable elements of `container`
pub fn get_tabbable_edges(doc: &Document, container: NodeId) -> (Option<NodeId>, Option<NodeId>) {
    let candidates = get_tabbable_candidates(doc, container);
    let first = find_visible(doc, container, candidates.iter().copied());
    let last = find_visible(doc, container, candidates.iter().rev().copied());
    (first, last)
}
