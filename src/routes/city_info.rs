use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{CityInfo, CityInfoQuery},
    routes::AppState,
    services::city_info,
};

/// Handler for `GET /city-info`
///
/// `vacation_type` is accepted for compatibility with clients but does not
/// filter the listings.
pub async fn city_info(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    params: Result<Query<CityInfoQuery>, QueryRejection>,
) -> AppResult<Json<CityInfo>> {
    let Query(query) = params?;

    tracing::info!(
        request_id = %request_id,
        city = %query.city_name,
        vacation_type = %query.vacation_type,
        "Processing city info request"
    );

    let info = city_info::city_info(&state.dataset, &query.city_name)?;
    Ok(Json(info))
}
