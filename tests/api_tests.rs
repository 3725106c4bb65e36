// tests/api_tests.rs

use chrono::{Datelike, Utc};
use notas::{
    config::{AggregationPolicy, Config},
    models::{score_factor::ScoreFactor, student::StudentProfile},
    repository::memory::{MemoryRepositories, school_year},
    routes,
    scoring::GradingService,
    state::AppState,
    utils::jwt::sign_jwt,
};

const SECRET: &str = "test_secret_for_integration_tests";
const PERSON: i64 = 500;
const STUDENT: i64 = 50;

struct TestApp {
    address: String,
    memory: MemoryRepositories,
}

/// Spawns the app on a random port, backed by in-memory repositories.
async fn spawn_app() -> TestApp {
    let memory = MemoryRepositories::new(
        vec![StudentProfile {
            student_id: STUDENT,
            person_id: PERSON,
            school_level_id: 1,
            grade: 5,
        }],
        vec![ScoreFactor {
            level: 3,
            base: 100,
            duration_base: 60,
            max_score: 500,
            factor: 2,
        }],
        school_year(Utc::now().year()),
    );

    let config = Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: SECRET.to_string(),
        rust_log: "error".to_string(),
        port: 0,
        policy: AggregationPolicy::default(),
    };

    let state = AppState {
        grading: GradingService::new(memory.repositories(), config.policy),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp { address, memory }
}

fn bearer(person_id: i64, role: &str) -> String {
    format!("Bearer {}", sign_jwt(person_id, role, SECRET, 600).unwrap())
}

#[tokio::test]
async fn unknown_path_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn submit_requires_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/games/1/attempts", app.address))
        .json(&serde_json::json!({
            "level": 3,
            "response": "ok",
            "resolution_time": 5.0,
            "reaction_time": 3.0
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn submit_scores_attempt() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/games/1/attempts", app.address))
        .header("Authorization", bearer(PERSON, "student"))
        .json(&serde_json::json!({
            "level": 3,
            "response": "56",
            "resolution_time": 5.0,
            "reaction_time": 3.0
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    let score = body["score"].as_f64().unwrap();
    assert!((score - 94.67).abs() < 0.01);
    assert_eq!(body["entry"]["student_id"], STUDENT);

    // Depending on today's date the submission may fall between bimestres.
    let status = body["aggregation"]["status"].as_str().unwrap();
    assert!(status == "insufficient_samples" || status == "no_period");
}

#[tokio::test]
async fn submit_rejects_missing_timing() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/games/1/attempts", app.address))
        .header("Authorization", bearer(PERSON, "student"))
        .json(&serde_json::json!({
            "level": 3,
            "response": "56",
            "resolution_time": 5.0
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
    assert!(app.memory.scores.all().await.is_empty());
}

#[tokio::test]
async fn submit_rejects_unenrolled_person() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/games/1/attempts", app.address))
        .header("Authorization", bearer(9999, "student"))
        .json(&serde_json::json!({
            "level": 3,
            "resolution_time": 5.0,
            "reaction_time": 3.0
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Person 9999 is not an enrolled student");
    assert!(app.memory.scores.all().await.is_empty());
}

#[tokio::test]
async fn submit_unknown_level_is_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/games/1/attempts", app.address))
        .header("Authorization", bearer(PERSON, "student"))
        .json(&serde_json::json!({
            "level": 8,
            "resolution_time": 5.0,
            "reaction_time": 3.0
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn reattempt_replaces_score() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let token = bearer(PERSON, "student");

    let mut ids = Vec::new();
    for (resolution, reaction) in [(2.0, 1.0), (30.0, 6.0)] {
        let body: serde_json::Value = client
            .post(&format!("{}/api/games/7/attempts", app.address))
            .header("Authorization", &token)
            .json(&serde_json::json!({
                "level": 3,
                "resolution_time": resolution,
                "reaction_time": reaction
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(body["entry"]["id"].as_i64().unwrap());
    }

    let scores: Vec<serde_json::Value> = client
        .get(&format!("{}/api/scores/me", app.address))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0]["id"].as_i64(), Some(ids[1]));
    // 100 - (36 * 2) / 3 = 76
    assert_eq!(scores[0]["score"].as_f64(), Some(76.0));
}

#[tokio::test]
async fn recompute_is_admin_only() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/admin/students/{}/recompute", app.address, STUDENT))
        .header("Authorization", bearer(PERSON, "student"))
        .json(&serde_json::json!({ "level": 3 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn recompute_writes_grade_record() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let token = bearer(PERSON, "student");

    for game in 1..=5 {
        client
            .post(&format!("{}/api/games/{}/attempts", app.address, game))
            .header("Authorization", &token)
            .json(&serde_json::json!({
                "level": 3,
                "resolution_time": 0.0,
                "reaction_time": 0.0
            }))
            .send()
            .await
            .unwrap();
    }

    // Pin the reconciliation to the second bimestre regardless of today's date.
    let year = Utc::now().year();
    let outcome: serde_json::Value = client
        .post(&format!("{}/api/admin/students/{}/recompute", app.address, STUDENT))
        .header("Authorization", bearer(1, "admin"))
        .json(&serde_json::json!({
            "level": 3,
            "as_of": format!("{}-06-15T12:00:00Z", year)
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(outcome["average"], 20);
    assert_eq!(outcome["bimestre"], 2);

    let record: serde_json::Value = client
        .get(&format!("{}/api/grades/me?year={}&bimestre=2", app.address, year))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(record["virtual_practice_average"], 20);
    assert!(record["final_grade"].is_null());
}

#[tokio::test]
async fn catalog_is_public() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let year = Utc::now().year();

    let factors: Vec<serde_json::Value> = client
        .get(&format!("{}/api/score-factors", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(factors.len(), 1);
    assert_eq!(factors[0]["max_score"], 500);

    let periods: Vec<serde_json::Value> = client
        .get(&format!("{}/api/periods?year={}", app.address, year))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(periods.len(), 4);
    assert_eq!(periods[0]["bimestre"], 1);
}
