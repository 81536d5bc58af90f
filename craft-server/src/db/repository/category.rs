//! Category Repository
//!
//! The forest is stored as one document and replaced as a whole.

use crate::db::Storage;
use shared::catalog::{resolve_fields, validate_tree};
use shared::error::{AppError, ErrorCode};
use shared::models::{CategoryFieldWithMeta, CategorySchema};

use super::RepoResult;

#[derive(Clone)]
pub struct CategoryRepository {
    storage: Storage,
}

impl CategoryRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn tree(&self) -> RepoResult<Vec<CategorySchema>> {
        Ok(self.storage.get_category_tree()?)
    }

    /// Validate and store a new forest
    pub fn replace(&self, tree: Vec<CategorySchema>) -> RepoResult<Vec<CategorySchema>> {
        validate_tree(&tree).map_err(AppError::from)?;

        let txn = self.storage.begin_write()?;
        self.storage.put_category_tree(&txn, &tree)?;
        txn.commit()?;

        tracing::info!(roots = tree.len(), "Category tree replaced");
        Ok(tree)
    }

    /// Resolved field list; empty when the category does not exist
    pub fn fields(&self, category_name: &str) -> RepoResult<Vec<CategoryFieldWithMeta>> {
        Ok(resolve_fields(&self.tree()?, category_name))
    }

    /// Resolved field list for a category that must exist
    pub fn fields_for_listing(&self, category_name: &str) -> RepoResult<Vec<CategoryFieldWithMeta>> {
        let tree = self.tree()?;
        if !tree.iter().any(|root| root.find(category_name).is_some()) {
            return Err(AppError::with_message(
                ErrorCode::CategoryNotFound,
                format!("Category {} not found", category_name),
            )
            .into());
        }
        Ok(resolve_fields(&tree, category_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Vec<CategorySchema> {
        serde_json::from_str(
            r#"[{"name":"Электроника","fields":[
                    {"name":"brand","label":"Бренд","type":"text","required":true}],
                 "subcategories":[{"name":"Смартфоны","fields":[
                    {"name":"screen_size","label":"Диагональ","type":"number"}]}]}]"#,
        )
        .unwrap()
    }

    #[test]
    fn empty_until_replaced() {
        let repo = CategoryRepository::new(Storage::open_in_memory().unwrap());
        assert!(repo.tree().unwrap().is_empty());
        assert!(repo.fields("Смартфоны").unwrap().is_empty());

        repo.replace(tree()).unwrap();
        assert_eq!(repo.tree().unwrap(), tree());
        assert_eq!(repo.fields("Смартфоны").unwrap().len(), 2);
    }

    #[test]
    fn listing_needs_existing_category() {
        let repo = CategoryRepository::new(Storage::open_in_memory().unwrap());
        repo.replace(tree()).unwrap();

        let err: AppError = repo.fields_for_listing("Мебель").unwrap_err().into();
        assert_eq!(err.code, ErrorCode::CategoryNotFound);
        assert!(repo.fields("Мебель").unwrap().is_empty());
    }

    #[test]
    fn invalid_tree_is_not_stored() {
        let repo = CategoryRepository::new(Storage::open_in_memory().unwrap());
        let mut bad = tree();
        bad.push(bad[0].clone());

        let err: AppError = repo.replace(bad).unwrap_err().into();
        assert_eq!(err.code, ErrorCode::CategoryNameDuplicate);
        assert!(repo.tree().unwrap().is_empty());
    }
}
