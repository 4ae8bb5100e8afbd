//! Catalog search with relevance ranking.
//!
//! A search call expands the query into fuzzy variations, retrieves in-stock
//! candidates from the [`CatalogStore`], scores every candidate with the
//! [`ScoringPolicy`] and returns the top results together with product-name
//! and category completions.
//!
//! The engine holds no state of its own: results are a pure function of the
//! query, the policy and the catalog snapshot the store returns.

mod policy;
mod scoring;
mod suggestions;
mod variations;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use linen_loft_core::ProductId;

use crate::catalog::{CatalogFilter, CatalogItem, CatalogQuery, CatalogStore, CategoryQuery};
use crate::db::RepositoryError;

pub use policy::{
    FieldWeightTable, FieldWeights, PolicyError, PositionWeights, QualityWeights, RatingTier,
    ScoringPolicy, SuggestionPolicy,
};
pub use scoring::{MatchField, Relevance, calculate_relevance_score};
pub use suggestions::{Suggestion, SuggestionKind, suggestion_score};
pub use variations::query_variations;

/// Results returned when the caller gives no limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Upper bound on the limit unless configured otherwise.
pub const DEFAULT_MAX_LIMIT: usize = 50;

/// Errors from a search call.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search query is required")]
    InvalidQuery,
    #[error("catalog store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Public view of a ranked product.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultDto {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub short_description: String,
    pub description: String,
    pub tags: Vec<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub bestseller: bool,
    pub featured: bool,
    #[serde(rename = "new")]
    pub is_new: bool,
    pub on_sale: bool,
    pub in_stock: bool,
    pub rating: Option<f64>,
}

impl From<CatalogItem> for SearchResultDto {
    fn from(item: CatalogItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            slug: item.slug,
            category: item.category,
            short_description: item.short_description,
            description: item.description,
            tags: item.tags,
            price: item.price,
            original_price: item.original_price,
            bestseller: item.bestseller,
            featured: item.featured,
            is_new: item.is_new,
            on_sale: item.on_sale,
            in_stock: item.in_stock,
            rating: item.rating,
        }
    }
}

/// Response envelope for a search call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultDto>,
    pub suggestions: Vec<Suggestion>,
    pub categories: Vec<Suggestion>,
    /// The query as submitted, trimmed.
    pub query: String,
    /// Number of entries in `results`.
    pub total: usize,
}

/// Ranks catalog items for free-text queries.
#[derive(Debug, Clone)]
pub struct SearchEngine<C> {
    catalog: C,
    policy: Arc<ScoringPolicy>,
    max_limit: usize,
}

impl<C: CatalogStore> SearchEngine<C> {
    /// Create an engine over a catalog store.
    ///
    /// `max_limit` caps the number of results a caller can request; it is
    /// raised to 1 if given as 0.
    #[must_use]
    pub fn new(catalog: C, policy: Arc<ScoringPolicy>, max_limit: usize) -> Self {
        Self {
            catalog,
            policy,
            max_limit: max_limit.max(1),
        }
    }

    /// Scoring policy in use.
    #[must_use]
    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Effective result count for a requested limit.
    #[must_use]
    pub fn effective_limit(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, self.max_limit)
    }

    /// Search the catalog.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidQuery` if the query is blank and
    /// `SearchError::Store` if any catalog lookup fails. No partial results
    /// are returned.
    #[instrument(skip(self, limit), fields(limit = tracing::field::Empty, candidates = tracing::field::Empty))]
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<SearchResponse, SearchError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(SearchError::InvalidQuery);
        }

        let policy = self.policy.as_ref();
        let normalized = trimmed.to_lowercase();
        let variations = query_variations(&normalized, policy);
        let limit = self.effective_limit(limit);
        tracing::Span::current().record("limit", limit);

        let candidate_query = CatalogQuery {
            filter: candidate_filter(&variations),
            limit: limit.saturating_mul(policy.candidate_multiplier.max(1)),
        };
        let suggestion_query = CatalogQuery {
            filter: suggestions::product_filter(&variations),
            limit: policy.suggestions.candidate_pool,
        };
        let category_query = CategoryQuery {
            filter: suggestions::category_filter(&variations),
            limit: policy.suggestions.max_categories,
        };

        let (candidates, suggestion_items, categories) = tokio::try_join!(
            self.catalog.find_items(&candidate_query),
            self.catalog.find_items(&suggestion_query),
            self.catalog.find_categories(&category_query),
        )?;
        tracing::Span::current().record("candidates", candidates.len());

        let results = rank(candidates, &normalized, &variations, policy, limit);
        let suggestions = suggestions::rank_products(&suggestion_items, &normalized, policy);
        let categories = categories
            .iter()
            .take(policy.suggestions.max_categories)
            .map(Suggestion::category)
            .collect();

        tracing::debug!(results = results.len(), "search completed");

        Ok(SearchResponse {
            total: results.len(),
            results,
            suggestions,
            categories,
            query: trimmed.to_string(),
        })
    }
}

/// In-stock items matching any variation on any searchable field.
fn candidate_filter(variations: &[String]) -> CatalogFilter {
    CatalogFilter::All(vec![
        CatalogFilter::InStock,
        CatalogFilter::Any(
            variations
                .iter()
                .map(|v| CatalogFilter::any_field(v))
                .collect(),
        ),
    ])
}

/// Score, stable-sort by descending score and keep the first `limit`.
fn rank(
    candidates: Vec<CatalogItem>,
    query: &str,
    variations: &[String],
    policy: &ScoringPolicy,
    limit: usize,
) -> Vec<SearchResultDto> {
    let mut scored: Vec<(Relevance, CatalogItem)> = candidates
        .into_iter()
        .filter(|item| item.in_stock)
        .map(|item| {
            (
                calculate_relevance_score(&item, query, variations, policy),
                item,
            )
        })
        .collect();

    scored.sort_by(|a, b| b.0.score.cmp(&a.0.score));
    scored.truncate(limit);

    scored.into_iter().map(|(_, item)| item.into()).collect()
}
