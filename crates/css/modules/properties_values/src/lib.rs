//! CSS Properties and Values API Level 1 — custom property registration.
//! Spec: <https://www.w3.org/TR/css-properties-values-api-1/>
//!
//! Extracts property descriptors from a parsed stylesheet: explicit
//! `@property`-style registration blocks, plus optional syntax inference
//! over plain custom property declarations.

#![forbid(unsafe_code)]

mod pattern;

pub mod extract;
pub mod inference;
pub mod registration;

// Re-exports for ergonomic access from other crates.
pub use extract::{DescriptorTable, extract_descriptors};
pub use inference::{SyntaxComponent, classify_token, infer_value_syntax};
pub use registration::{PropertyDescriptor, descriptor_from_block};
