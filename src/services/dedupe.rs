use std::collections::HashSet;

use crate::models::CommentNode;

/// Drops every top-level node that also appears as a descendant of another
/// node in the same list, keeping the input order of the survivors.
///
/// Used for user timelines: a user's reply to their own earlier comment is
/// already shown nested under that comment.
pub fn dedupe(nodes: Vec<CommentNode>) -> Vec<CommentNode> {
    let nested: HashSet<i64> = nodes.iter().flat_map(CommentNode::descendant_ids).collect();

    nodes
        .into_iter()
        .filter(|node| !nested.contains(&node.id()))
        .collect()
}
