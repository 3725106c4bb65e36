// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::{error::AppError, scoring::GradingService};

/// DTO for re-running aggregation by hand.
#[derive(Debug, Deserialize, Validate)]
pub struct RecomputeRequest {
    #[validate(range(min = 1, message = "Level must be a positive integer."))]
    pub level: i32,
    /// Defaults to now; set it to reconcile a past bimestre.
    pub as_of: Option<DateTime<Utc>>,
}

/// Recomputes a student's virtual-practice average.
/// Admin only. Used to reconcile a grade record after a failed aggregation.
pub async fn recompute_average(
    State(grading): State<GradingService>,
    Path(student_id): Path<i64>,
    Json(payload): Json<RecomputeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let as_of = payload.as_of.unwrap_or_else(Utc::now);
    let outcome = grading.recompute(student_id, payload.level, as_of).await?;

    Ok(Json(outcome))
}
