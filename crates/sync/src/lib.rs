//! Client-side synchronization of the asset collection with the remote
//! asset service.
//!
//! - [`SyncEngine`] -- owns the store and runs fetch, toggle, delete,
//!   reorder and create.
//! - [`DeleteConfirmation`] -- first half of the two-phase delete.
//! - [`RowLocks`] -- per-row busy flags with cancellation.

pub mod confirm;
pub mod engine;
pub mod error;
pub mod rows;

pub use confirm::DeleteConfirmation;
pub use engine::SyncEngine;
pub use error::SyncError;
pub use rows::{RowGuard, RowLocks};
