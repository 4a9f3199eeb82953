//! Storage for the backing JSON document
//!
//! `snapshot` is the in-memory data model and loader, `writer` rewrites
//! the document after each mutation.

pub mod snapshot;
pub mod writer;

pub use snapshot::{CollectionValue, Record, RecordId, Snapshot};
pub use writer::{Layout, SnapshotWriter};
