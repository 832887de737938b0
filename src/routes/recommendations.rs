use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RecommendationRequest, RecommendationResponse},
    routes::AppState,
};

/// Handler for `POST /recommendations`
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        ratings = request.ratings.len(),
        "Processing recommendation request"
    );

    let recommended_city = state
        .recommender
        .recommend(&state.dataset, &request.ratings)?;

    tracing::info!(
        request_id = %request_id,
        city = %recommended_city,
        "Recommendation completed"
    );

    Ok(Json(RecommendationResponse { recommended_city }))
}
