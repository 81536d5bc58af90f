//! Category catalog
//!
//! - [`resolve_fields`] - merge inherited field definitions for a category
//! - [`normalize`] - coerce raw listing attributes to declared field types
//! - [`validate_tree`] - structural checks before a tree is stored

mod normalizer;
mod resolver;
mod slug;
mod validate;

pub use normalizer::{AttributeIssue, normalize, validate_required};
pub use resolver::{resolve_fields, resolve_for_schema};
pub use slug::slugify;
pub use validate::{TreeError, validate_tree};
