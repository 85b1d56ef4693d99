pub mod comment;
pub mod pagination;
pub mod session;
pub mod user;

pub use comment::CommentRepository;
pub use pagination::{Page, PageRequest};
pub use session::SessionRepository;
pub use user::UserRepository;
