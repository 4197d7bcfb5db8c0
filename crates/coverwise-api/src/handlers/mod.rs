//! HTTP handlers for coverwise-api.

pub mod policy;

pub use policy::{compare_policy, extract_policy, home};
