// src/handlers/games.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError, models::attempt::SubmitAttemptRequest, scoring::GradingService,
    utils::jwt::Claims,
};

/// Submits one attempt at a mini-game.
///
/// * The student is the bearer of the token.
/// * Scores the attempt and replaces the previous result for this game.
/// * Refreshes the virtual-practice average of the current bimestre.
pub async fn submit_attempt(
    State(grading): State<GradingService>,
    Extension(claims): Extension<Claims>,
    Path(game_id): Path<i64>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let person_id = claims.person_id()?;

    let result = grading
        .submit_attempt(person_id, game_id, payload, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}
