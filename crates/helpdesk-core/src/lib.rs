//! Core types and logic for the help-desk back end.
//!
//! This crate has no HTTP or database dependencies. It holds the
//! hierarchical entities (categories and organizations), the pure tree
//! functions built over them, list-request shaping, the role table, and the
//! [`DeskStore`](store::DeskStore) abstraction that backends implement.

pub mod category;
pub mod clock;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod organization;
pub mod role;
pub mod service;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
