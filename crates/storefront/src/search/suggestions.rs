//! Product-name and category completions shown alongside search results.

use serde::Serialize;

use super::policy::ScoringPolicy;
use crate::catalog::{CatalogFilter, CatalogItem, Category, CategoryFilter};

/// What a suggestion links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Product,
    Category,
}

/// A completion entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub name: String,
    pub href: String,
}

impl Suggestion {
    #[must_use]
    pub fn product(item: &CatalogItem) -> Self {
        Self {
            kind: SuggestionKind::Product,
            name: item.name.clone(),
            href: format!("/products/{}", item.slug),
        }
    }

    #[must_use]
    pub fn category(category: &Category) -> Self {
        Self {
            kind: SuggestionKind::Category,
            name: category.name.clone(),
            href: format!("/products?category={}", category.slug),
        }
    }
}

/// In-stock items whose name contains any variation.
pub(super) fn product_filter(variations: &[String]) -> CatalogFilter {
    CatalogFilter::All(vec![
        CatalogFilter::InStock,
        CatalogFilter::Any(
            variations
                .iter()
                .map(|v| CatalogFilter::NameContains(v.clone()))
                .collect(),
        ),
    ])
}

/// Active categories whose name contains any variation.
pub(super) fn category_filter(variations: &[String]) -> CategoryFilter {
    CategoryFilter::All(vec![
        CategoryFilter::Active,
        CategoryFilter::Any(
            variations
                .iter()
                .map(|v| CategoryFilter::NameContains(v.clone()))
                .collect(),
        ),
    ])
}

/// Score a product-name suggestion against the normalized query.
#[must_use]
pub fn suggestion_score(item: &CatalogItem, query: &str, policy: &ScoringPolicy) -> i32 {
    let rules = &policy.suggestions;
    let name = item.name.to_lowercase();

    let mut score = if name == query {
        rules.exact
    } else if name.starts_with(query) {
        rules.prefix
    } else if name.contains(query) {
        rules.contains
    } else {
        0
    };

    if item.bestseller {
        score += rules.bestseller;
    }
    if item.rating.is_some_and(|r| r >= rules.top_rating.min) {
        score += rules.top_rating.bonus;
    }
    score
}

/// Rank suggestion candidates; equal scores keep retrieval order.
pub(super) fn rank_products(
    items: &[CatalogItem],
    query: &str,
    policy: &ScoringPolicy,
) -> Vec<Suggestion> {
    let mut scored: Vec<(i32, &CatalogItem)> = items
        .iter()
        .map(|item| (suggestion_score(item, query, policy), item))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(policy.suggestions.max_products)
        .map(|(_, item)| Suggestion::product(item))
        .collect()
}
