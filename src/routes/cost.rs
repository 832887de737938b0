use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{CostRequest, CostResponse},
    routes::AppState,
    services::cost,
};

/// Handler for `POST /cost`
pub async fn cost(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<CostRequest>, JsonRejection>,
) -> AppResult<Json<CostResponse>> {
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        city = %request.city_name,
        vacation_type = %request.vacation_type,
        num_days = request.num_days,
        num_children = request.num_children,
        "Processing cost request"
    );

    let average_cost = cost::estimate_cost(&state.dataset, &request)?;

    Ok(Json(CostResponse { average_cost }))
}
