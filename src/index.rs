//! HTTP client for the external vector index.
//!
//! The index is a collaborator, not something this crate implements: it stores
//! vectors with metadata and answers nearest-neighbor queries by cosine similarity.
//! Identifier uniqueness is the caller's job; every upserted vector gets a fresh
//! UUID so concurrent ingestions can never overwrite each other.

mod client;
mod types;

pub use client::VectorIndex;
pub use types::{IndexError, QueryMatch, VectorMetadata, VectorRecord};
