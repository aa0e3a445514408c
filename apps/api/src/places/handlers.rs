use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{PlaceSuggestion, PlacesError};
use crate::auth::Session;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct AutocompleteResponse {
    pub suggestions: Vec<PlaceSuggestion>,
}

/// GET /api/v1/places/autocomplete?input=
pub async fn handle_autocomplete(
    State(state): State<AppState>,
    _session: Session,
    Query(params): Query<AutocompleteQuery>,
) -> Result<Json<AutocompleteResponse>, AppError> {
    let places = state.places.as_ref().ok_or(PlacesError::Disabled)?;
    let suggestions = places.autocomplete(&params.input).await?;
    Ok(Json(AutocompleteResponse { suggestions }))
}
