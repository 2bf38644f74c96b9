//! Request extractors.

mod user;
pub use user::{CurrentUser, USER_ID_HEADER};
