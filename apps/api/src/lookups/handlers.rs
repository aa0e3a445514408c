use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::filter::{filter_lookup, DEFAULT_SUGGESTION_LIMIT};
use super::{fetch_catalog, LookupEntity, LookupKind};
use crate::auth::Session;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub q: String,
    /// Comma-separated ids the user has already selected.
    #[serde(default)]
    pub exclude: String,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub kind: LookupKind,
    pub suggestions: Vec<LookupEntity>,
    pub total: usize,
}

/// GET /api/v1/lookups/:kind?q=&exclude=
pub async fn handle_lookup(
    State(state): State<AppState>,
    session: Session,
    Path(kind): Path<LookupKind>,
    Query(params): Query<LookupQuery>,
) -> Result<Json<LookupResponse>, AppError> {
    let catalog = fetch_catalog(
        &state.store,
        state.lookup_cache.as_ref(),
        &state.retry_policy(),
        &session.token,
        kind,
    )
    .await?;

    let selected: Vec<String> = params
        .exclude
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect();
    let suggestions = filter_lookup(&catalog, &params.q, &selected, DEFAULT_SUGGESTION_LIMIT);

    Ok(Json(LookupResponse {
        kind,
        suggestions,
        total: catalog.len(),
    }))
}
