use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    models::schedule::{CreateRecitationScheduleRequest, RescheduleRequest},
    services::schedules::RecitationScheduleService,
    AppState,
};

/// GET /api/recitation-schedules
pub async fn list(State(state): State<AppState>) -> Json<Value> {
    let items = RecitationScheduleService::list(&state.recitations).await;
    Json(json!({ "success": true, "items": items }))
}

/// POST /api/recitation-schedules
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateRecitationScheduleRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    RecitationScheduleService::create(&state.recitations, &state.ids, body)
        .await
        .map(|entry| Json(json!({ "success": true, "data": entry })))
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": e.to_string() })),
            )
        })
}

/// PATCH /api/recitation-schedules/{id}
pub async fn reschedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<RescheduleRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if RecitationScheduleService::reschedule(&state.recitations, id, body.date).await {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(not_found())
    }
}

/// DELETE /api/recitation-schedules/{id} — plain removal, no cascade.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match RecitationScheduleService::delete(&state.recitations, id).await {
        Some(_) => Ok(Json(json!({ "success": true }))),
        None => Err(not_found()),
    }
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "schedule not found" })),
    )
}
