//! Statement building: named templates in, positional SQL plus bound values out.

mod builder;
mod named;
pub mod params;

pub use builder::{minify, QueryBuf};
pub use named::rewrite;
pub use params::{Params, SqlValue};
