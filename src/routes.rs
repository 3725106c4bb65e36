// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, catalog, games, grades},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (games, grades, catalog, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (grading service and configuration).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            axum::http::HeaderValue::from_static("http://localhost:3000"),
            axum::http::HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let game_routes = Router::new()
        .route("/{game_id}/attempts", post(games::submit_attempt))
        .layer(auth.clone());

    let score_routes = Router::new()
        .route("/me", get(grades::list_my_scores))
        .layer(auth.clone());

    let grade_routes = Router::new()
        .route("/me", get(grades::get_my_grade))
        .layer(auth.clone());

    let admin_routes = Router::new()
        .route(
            "/students/{student_id}/recompute",
            post(admin::recompute_average),
        )
        // Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(auth);

    Router::new()
        .nest("/api/games", game_routes)
        .nest("/api/scores", score_routes)
        .nest("/api/grades", grade_routes)
        .route("/api/score-factors", get(catalog::list_score_factors))
        .route("/api/periods", get(catalog::list_periods))
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
