//! Violet Pages Core - Shared domain types.
//!
//! This crate provides the types shared by every Violet Pages component:
//! - `server` - JSON RPC service, OAuth sign-in and adapters
//! - `cli` - Command-line tools for migrations and cache maintenance
//! - `integration-tests` - In-memory collaborators for end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, volume ids and names

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
