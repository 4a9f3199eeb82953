//! Collection engine
//!
//! `engine` holds the per-shape operations, `store` the shared snapshot
//! that serializes mutations and persists them.

pub mod engine;
pub mod store;

pub use store::{CollectionStore, FileSnapshotStore};
