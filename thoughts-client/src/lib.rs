pub mod backend;
pub mod config;
pub mod series;
pub mod session;
pub mod store;

pub use backend::Backend;
pub use session::EntrySession;
pub use store::{Slice, Store};
