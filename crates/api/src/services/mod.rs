//! Business logic that spans more than one repository call.

pub mod auth;
pub mod orders;
