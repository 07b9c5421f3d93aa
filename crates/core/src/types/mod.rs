//! Core types for Violet Pages.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod name;
pub mod volume;

pub use id::*;
pub use name::{DisplayName, ListName, NameError};
pub use volume::{VolumeId, VolumeIdError};
