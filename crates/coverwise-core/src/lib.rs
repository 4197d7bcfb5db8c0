//! # coverwise-core
//!
//! Core types, traits, and abstractions for the coverwise policy pipeline.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other coverwise crates depend on: the model candidate list, the
//! generation backend trait, the extracted document and comparison shapes,
//! reference rows, and the error taxonomy.

pub mod defaults;
pub mod document;
pub mod error;
pub mod lenient;
pub mod models;
pub mod reference;
pub mod traits;

// Re-export commonly used types at crate root
pub use document::*;
pub use error::{BackendFailure, Error, Result};
pub use models::*;
pub use reference::{MatchResult, ReferenceRow};
pub use traits::*;
