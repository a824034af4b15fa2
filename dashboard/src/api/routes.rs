use axum::{
    routing::get,
    Router,
    extract::{rejection::QueryRejection, State, Query},
    Json
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::analytics::{FilterOptions, MovieView};
use crate::services::dashboard::{DashboardService, DashboardView};
use super::models::{ApiResponse, DashboardQuery};
use crate::services::AppError;

pub async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}

pub async fn filters(
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<FilterOptions>>, AppError> {
    let options = service.filter_options().await?;
    Ok(Json(ApiResponse::success(options)))
}

fn query_params(query: Result<Query<DashboardQuery>, QueryRejection>) -> Result<DashboardQuery, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

pub async fn movies(
    State(service): State<Arc<DashboardService>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<MovieView>>>, AppError> {
    let params = query_params(query)?;
    let movies = service.movies(&params.into_filter()).await?;
    Ok(Json(ApiResponse::success(movies)))
}

pub async fn dashboard(
    State(service): State<Arc<DashboardService>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<DashboardView>>, AppError> {
    let params = query_params(query)?;
    let view = service.dashboard(&params.into_filter()).await?;
    Ok(Json(ApiResponse::success(view)))
}

// Define all API routes
pub fn routes(service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/filters", get(filters))
        .route("/api/movies", get(movies))
        .route("/api/dashboard", get(dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
