//! In-memory catalog snapshot.

use super::{CatalogItem, CatalogQuery, CatalogStore, Category, CategoryQuery};
use crate::db::RepositoryError;

/// A catalog held in memory, in insertion order.
///
/// Used by tests and for local experiments with scoring policies.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    items: Vec<CatalogItem>,
    categories: Vec<Category>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add products; retrieval order is insertion order.
    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = CatalogItem>) -> Self {
        self.items.extend(items);
        self
    }

    /// Add categories.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = Category>) -> Self {
        self.categories.extend(categories);
        self
    }
}

impl CatalogStore for InMemoryCatalog {
    async fn find_items(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>, RepositoryError> {
        Ok(self
            .items
            .iter()
            .filter(|item| query.filter.matches(item))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn find_categories(
        &self,
        query: &CategoryQuery,
    ) -> Result<Vec<Category>, RepositoryError> {
        Ok(self
            .categories
            .iter()
            .filter(|category| query.filter.matches(category))
            .take(query.limit)
            .cloned()
            .collect())
    }
}
