use std::collections::HashSet;

use thiserror::Error;

use crate::error::{AppError, ErrorCode};
use crate::models::CategorySchema;

#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error("category name must not be empty")]
    EmptyName,

    #[error("duplicate category name among siblings: {0}")]
    DuplicateSibling(String),

    #[error("field in category {category} has an empty key")]
    EmptyFieldKey { category: String },
}

impl From<TreeError> for AppError {
    fn from(err: TreeError) -> Self {
        let code = match &err {
            TreeError::DuplicateSibling(_) => ErrorCode::CategoryNameDuplicate,
            TreeError::EmptyName | TreeError::EmptyFieldKey { .. } => ErrorCode::CategoryTreeInvalid,
        };
        AppError::with_message(code, err.to_string())
    }
}

/// Structural checks for a category forest.
///
/// Names must be non-blank and unique among siblings, and every field must
/// resolve to a non-empty key.
pub fn validate_tree(nodes: &[CategorySchema]) -> Result<(), TreeError> {
    let mut seen = HashSet::new();
    for node in nodes {
        if node.name.trim().is_empty() {
            return Err(TreeError::EmptyName);
        }
        if !seen.insert(node.name.as_str()) {
            return Err(TreeError::DuplicateSibling(node.name.clone()));
        }
        if node.fields.iter().any(|f| f.key().is_empty()) {
            return Err(TreeError::EmptyFieldKey {
                category: node.name.clone(),
            });
        }
        validate_tree(&node.subcategories)?;
    }
    Ok(())
}
