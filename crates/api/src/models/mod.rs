//! API-side domain types that are not shared with other crates.

pub mod session;

pub use session::{CurrentUser, Session};
