//! Domain types and the client-side asset collection store.

pub mod asset;
pub mod collection;
pub mod content;
pub mod error;
pub mod ordering;
pub mod settings;
pub mod types;
