//! Collection engine over a single JSON document.
//! - `storage` holds the snapshot data model, loading and the persistence writer.
//! - `collections` implements list/get/create/update/delete over one named collection.
//! - `pagination` validates `page`/`page_size` and computes list windows.

pub mod errors;
pub mod pagination;
pub mod storage;
pub mod collections;
