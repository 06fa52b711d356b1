#![deny(missing_docs)]

//! Core library for the deskbot retrieval-augmented helpdesk backend.

/// HTTP routing and REST handlers.
pub mod api;
/// Retrieval and response assembly for chat requests.
pub mod chat;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and HTTP adapter.
pub mod embedding;
/// Text extraction from PDF and web sources.
pub mod extract;
/// Vector index HTTP client.
pub mod index;
/// Ingestion pipeline: extract, chunk, embed, upsert.
pub mod ingest;
/// Persistent status ledger backed by SQLite.
pub mod ledger;
/// Structured logging and tracing setup.
pub mod logging;
/// Backend service composition shared by all HTTP handlers.
pub mod service;
