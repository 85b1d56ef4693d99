pub mod comments;
pub mod dedupe;
pub mod deletion;
pub mod tree;

pub use comments::CommentService;
pub use dedupe::dedupe;
pub use deletion::delete_subtree;
pub use tree::TreeLoader;
