//! Search route handlers.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::search::SearchResponse;
use crate::state::AppState;

/// Deserialize empty strings as None for optional numeric fields.
fn empty_string_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<usize>,
}

/// Ranked catalog search.
///
/// Returns `{ results, suggestions, categories, query, total }`.
#[instrument(skip_all, fields(q = tracing::field::Empty))]
pub async fn search(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    tracing::Span::current().record("q", query.q.as_str());

    add_breadcrumb("search", "Searched catalog", Some(&[("query", query.q.as_str())]));

    let response = state.search().search(&query.q, query.limit).await?;
    Ok(Json(response))
}

/// Create the search routes router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/search", get(search))
}
