//! Shared building blocks for the JSON document server: wire types,
//! logging setup, startup environment checks and the admin listener.

pub mod types;
pub mod utils;
pub mod env;
pub mod admin_http;
