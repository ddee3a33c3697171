use std::sync::Arc;

use axum::{
    Router,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::convert::case_to_graph;
use crate::engine::GridEngine;
use crate::error::EngineError;
use crate::graph::GraphModel;
use crate::parse::parse_case_str;

static INDEX_HTML: &str = include_str!("../static/index.html");

type AppState = Arc<GridEngine>;

// Helper: respond with JSON
fn json_ok(val: serde_json::Value) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        val.to_string(),
    )
        .into_response()
}

fn json_err(status: StatusCode, msg: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        json!({"error": msg}).to_string(),
    )
        .into_response()
}

fn error_status(err: &EngineError) -> StatusCode {
    match err {
        EngineError::MalformedCase(_)
        | EngineError::DanglingReference(_)
        | EngineError::UnknownCase(_) => StatusCode::BAD_REQUEST,
        EngineError::SolverUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::SolverFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// GET /
async fn serve_index() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        INDEX_HTML,
    )
}

// GET /api/grid-data
async fn grid_data(State(engine): State<AppState>) -> Response {
    let graph = engine.default_graph();
    json_ok(serde_json::to_value(&graph).unwrap_or(json!(null)))
}

// POST /api/load-case  {"case": "case14"}
#[derive(Deserialize)]
struct LoadCaseBody {
    case: String,
}

async fn load_case(
    State(engine): State<AppState>,
    body: axum::extract::Json<LoadCaseBody>,
) -> Response {
    if body.case.is_empty() {
        return json_err(StatusCode::BAD_REQUEST, "Missing case name");
    }
    let graph = engine.load_case(&body.case);
    json_ok(serde_json::to_value(&graph).unwrap_or(json!(null)))
}

// POST /api/calculate-flow  {"nodes": [...], "links": [...]}
async fn calculate_flow(
    State(engine): State<AppState>,
    body: axum::extract::Json<GraphModel>,
) -> Response {
    match engine.solve(&body.0) {
        Ok(report) => json_ok(serde_json::to_value(&report).unwrap_or(json!(null))),
        Err(e) => json_err(error_status(&e), &e.to_string()),
    }
}

// POST /api/save-grid
async fn save_grid(
    State(engine): State<AppState>,
    body: axum::extract::Json<GraphModel>,
) -> Response {
    match engine.save_graph(&body.0) {
        Ok(()) => json_ok(json!({"success": true})),
        Err(e) => json_err(error_status(&e), &e.to_string()),
    }
}

// POST /api/upload  multipart/form-data with a MATPOWER file in field "file"
async fn upload_case(mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let bytes = match field.bytes().await {
                Ok(b) => b,
                Err(_) => return json_err(StatusCode::BAD_REQUEST, "Failed to read file bytes"),
            };
            let content = String::from_utf8_lossy(&bytes).to_string();
            return match parse_case_str(&content) {
                Ok(case) => {
                    let graph = case_to_graph(&case);
                    json_ok(serde_json::to_value(&graph).unwrap_or(json!(null)))
                }
                Err(e) => json_err(error_status(&e), &e.to_string()),
            };
        }
    }
    json_err(StatusCode::BAD_REQUEST, "No 'file' field in multipart form")
}

pub async fn run_server(engine: GridEngine) {
    let state: AppState = Arc::new(engine);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(serve_index))
        .route("/api/grid-data", get(grid_data))
        .route("/api/load-case", post(load_case))
        .route("/api/calculate-flow", post(calculate_flow))
        .route("/api/save-grid", post(save_grid))
        .route("/api/upload", post(upload_case))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind port 3000");

    println!("Gridview running at http://localhost:3000");

    axum::serve(listener, app).await.expect("Server error");
}
