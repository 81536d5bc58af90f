//! Category Schema Model
//!
//! Categories form a tree: each node declares typed fields that apply to the
//! node itself and are inherited by every descendant.

use serde::{Deserialize, Serialize};

use crate::catalog::slugify;

/// Declared value type of a category field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Select,
}

/// Field declaration on a category node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryField {
    /// Normalized attribute key; derived from `label` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-facing prompt
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Allowed values for `select` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl CategoryField {
    /// Resolved attribute key: explicit `name`, else `slugify(label)`
    pub fn key(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => slugify(&self.label),
        }
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// Category node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<CategoryField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<CategorySchema>,
}

impl CategorySchema {
    /// Depth-first lookup of a node by name within this subtree
    pub fn find(&self, name: &str) -> Option<&CategorySchema> {
        if self.name == name {
            return Some(self);
        }
        self.subcategories.iter().find_map(|c| c.find(name))
    }
}

/// Field resolved against a target category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFieldWithMeta {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub required: bool,
    /// True when the definition comes from an ancestor of the target
    pub inherited: bool,
    /// Name of the category node that declared the winning definition
    pub source_category_name: String,
}

impl CategoryFieldWithMeta {
    pub fn from_field(field: &CategoryField, source: &str, inherited: bool) -> Self {
        Self {
            name: field.key(),
            label: field.label.clone(),
            field_type: field.field_type,
            options: field.options.clone(),
            required: field.is_required(),
            inherited,
            source_category_name: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_deserializes_from_frontend_shape() {
        let field: CategoryField = serde_json::from_str(
            r#"{"label":"Бренд","type":"select","options":["Apple","Samsung"],"required":true}"#,
        )
        .unwrap();
        assert_eq!(field.name, None);
        assert_eq!(field.field_type, FieldType::Select);
        assert!(field.is_required());
        assert_eq!(field.key(), "бренд");
    }

    #[test]
    fn explicit_name_wins_over_label() {
        let field = CategoryField {
            name: Some("screen_size".into()),
            label: "Диагональ экрана".into(),
            field_type: FieldType::Number,
            options: None,
            required: None,
        };
        assert_eq!(field.key(), "screen_size");
        assert!(!field.is_required());
    }

    #[test]
    fn find_walks_subcategories() {
        let tree: CategorySchema = serde_json::from_str(
            r#"{"name":"Электроника","fields":[],"subcategories":[
                {"name":"Смартфоны","fields":[]},
                {"name":"Ноутбуки","fields":[],"subcategories":[{"name":"Игровые","fields":[]}]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(tree.find("Игровые").map(|c| c.name.as_str()), Some("Игровые"));
        assert!(tree.find("Одежда").is_none());
    }
}
