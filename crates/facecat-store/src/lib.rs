//! facecat-store — Persistent face catalog.
//!
//! One SQLite table of named embeddings, mirrored by an in-memory cache
//! that is rebuilt in full after every write.

mod schema;
pub mod store;

pub use store::{validate_name, FaceStore, StoreError};
