//! Access-code gate. Auth is a stub by design: the operator UI gates access
//! client-side, the API hands out a fixed identity.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if body.password == state.config.access_code {
        Ok(Json(json!({
            "success": true,
            "token": "operator-session",
            "user": { "name": "Operator", "role": "admin" },
        })))
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "invalid access code" })),
        ))
    }
}

/// GET /api/v1/auth/me (also mounted at /api/auth/me for older clients).
pub async fn me() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": { "id": "1", "role": "admin", "name": "Operator" },
    }))
}
