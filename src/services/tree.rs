use std::collections::HashMap;
use tokio::task::JoinSet;

use crate::error::{AppError, Result};
use crate::models::{CommentNode, CommentWithAuthor};
use crate::repo::CommentRepository;

/// Expands comments into their full reply trees.
///
/// Every top-level comment passed to [`TreeLoader::expand_all`] is walked on
/// its own tokio task. Tasks share nothing but the pool.
#[derive(Clone)]
pub struct TreeLoader {
    comments: CommentRepository,
    max_depth: usize,
}

impl TreeLoader {
    pub fn new(comments: CommentRepository, max_depth: usize) -> Self {
        Self {
            comments,
            max_depth,
        }
    }

    /// Expand a single comment.
    pub async fn expand(&self, comment: CommentWithAuthor) -> Result<CommentNode> {
        load_subtree(&self.comments, comment, self.max_depth).await
    }

    /// Expand each comment concurrently, preserving input order.
    ///
    /// The first failing task aborts the others and its error is returned;
    /// a partial tree is never produced. Dropping the returned future drops
    /// the `JoinSet`, which aborts every task still in flight.
    pub async fn expand_all(&self, comments: Vec<CommentWithAuthor>) -> Result<Vec<CommentNode>> {
        let count = comments.len();
        let mut tasks = JoinSet::new();

        for (index, comment) in comments.into_iter().enumerate() {
            let repo = self.comments.clone();
            let max_depth = self.max_depth;
            tasks.spawn(async move { (index, load_subtree(&repo, comment, max_depth).await) });
        }

        let mut slots: Vec<Option<CommentNode>> = (0..count).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok((index, Ok(node))) => {
                    slots[index] = Some(node);
                    continue;
                }
                Ok((_, Err(e))) => e,
                Err(e) => AppError::from(e),
            };

            tasks.abort_all();
            tracing::warn!(error = %outcome, "Comment tree expansion failed");
            return Err(outcome);
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.ok_or_else(|| AppError::Internal("comment expansion lost a result".to_string()))
            })
            .collect()
    }
}

/// Comments of one subtree keyed by id, plus a parent to children index.
struct CommentArena {
    nodes: HashMap<i64, CommentWithAuthor>,
    children: HashMap<i64, Vec<i64>>,
}

impl CommentArena {
    fn new(root: CommentWithAuthor) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(root.id, root);
        Self {
            nodes,
            children: HashMap::new(),
        }
    }

    fn attach(&mut self, parent_id: i64, child: CommentWithAuthor) {
        self.children.entry(parent_id).or_default().push(child.id);
        self.nodes.insert(child.id, child);
    }

    fn into_tree(mut self, root_id: i64) -> Result<CommentNode> {
        self.take_node(root_id)
    }

    // Recursion depth is bounded by the loader's depth guard.
    fn take_node(&mut self, id: i64) -> Result<CommentNode> {
        let comment = self
            .nodes
            .remove(&id)
            .ok_or_else(|| AppError::Internal(format!("comment {} missing from tree", id)))?;
        let child_ids = self.children.remove(&id).unwrap_or_default();

        let children = child_ids
            .into_iter()
            .map(|child_id| self.take_node(child_id))
            .collect::<Result<Vec<_>>>()?;

        Ok(CommentNode { comment, children })
    }
}

/// Walks the replies below `root` with an explicit work stack. Children are
/// fetched newest first and keep that order in the materialized tree.
async fn load_subtree(
    repo: &CommentRepository,
    root: CommentWithAuthor,
    max_depth: usize,
) -> Result<CommentNode> {
    let root_id = root.id;
    let mut arena = CommentArena::new(root);
    let mut pending = vec![(root_id, 0usize)];

    while let Some((id, depth)) = pending.pop() {
        let children = repo.list_children(id).await?;
        if children.is_empty() {
            continue;
        }
        if depth + 1 > max_depth {
            return Err(AppError::Validation(format!(
                "Comment {} has replies nested deeper than {} levels",
                root_id, max_depth
            )));
        }

        for child in children {
            if arena.nodes.contains_key(&child.id) {
                return Err(AppError::Internal(format!(
                    "comment {} appears twice in thread {}",
                    child.id, root_id
                )));
            }
            pending.push((child.id, depth + 1));
            arena.attach(id, child);
        }
    }

    tracing::debug!(root_id, nodes = arena.nodes.len(), "Expanded comment tree");
    arena.into_tree(root_id)
}
