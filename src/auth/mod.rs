mod extractor;
mod guard;
mod password;

pub use extractor::{AuthUser, SESSION_COOKIE};
pub use guard::{assert_can_delete, Actor};
pub use password::{generate_token, hash_password, hash_token, verify_password};
