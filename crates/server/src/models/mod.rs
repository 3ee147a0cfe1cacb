//! Domain models backed by the SQLite database.

pub mod customer;
pub mod knowledge;
pub mod lead;
pub mod user;

pub use customer::{Customer, TshirtOrder};
pub use knowledge::KnowledgeItem;
pub use lead::Lead;
pub use user::{Message, User};
