// src/handlers/catalog.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError, models::grading_period::PeriodListParams, scoring::GradingService,
};

/// Lists the per-level score factor table.
pub async fn list_score_factors(
    State(grading): State<GradingService>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(grading.score_factors().await?))
}

/// Lists the bimestres of a school year.
pub async fn list_periods(
    State(grading): State<GradingService>,
    Query(params): Query<PeriodListParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(grading.periods(params.year).await?))
}
