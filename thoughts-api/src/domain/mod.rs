mod entry;
mod field;
mod tag;
mod user;

pub use entry::*;
pub use field::*;
pub use tag::*;
pub use user::*;
