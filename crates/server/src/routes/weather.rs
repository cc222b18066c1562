//! Weather proxy.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    country: String,
}

/// Pass the upstream current-weather document through unchanged.
pub async fn current(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let weather = state.weather.current(&params.country).await?;
    Ok(Json(weather))
}
