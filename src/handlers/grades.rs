// src/handlers/grades.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError, models::grade_record::GradeQueryParams, scoring::GradingService,
    utils::jwt::Claims,
};

/// Lists the caller's current game scores, best first.
pub async fn list_my_scores(
    State(grading): State<GradingService>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let entries = grading.scores_for(claims.person_id()?).await?;

    Ok(Json(entries))
}

/// Returns the caller's term grade record for one bimestre.
pub async fn get_my_grade(
    State(grading): State<GradingService>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<GradeQueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let record = grading
        .grade_record_for(claims.person_id()?, params.year, params.bimestre)
        .await?;

    Ok(Json(record))
}
