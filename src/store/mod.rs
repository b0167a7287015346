//! Persistence boundary: the document-store contract, the in-memory reference
//! backend, the persisted record types, and typed repositories over them.

/// Backend-agnostic document store contract.
pub mod document;
/// In-memory reference backend.
pub mod memory;
/// Persisted record definitions.
pub mod models;
/// Typed per-collection repositories.
pub mod repository;
