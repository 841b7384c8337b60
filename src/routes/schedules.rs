use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde_json::{json, Value};

use crate::{
    models::schedule::{CreateScheduleRequest, RescheduleRequest},
    services::schedules::ScheduleService,
    AppState,
};

/// GET /api/announcement-schedules
pub async fn list(State(state): State<AppState>) -> Json<Value> {
    let items = ScheduleService::list(&state.schedules).await;
    Json(json!({ "success": true, "items": items }))
}

/// POST /api/announcement-schedules
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateScheduleRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ScheduleService::create(&state.schedules, &state.ids, body)
        .await
        .map(|entry| Json(json!({ "success": true, "data": entry })))
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": e.to_string() })),
            )
        })
}

/// PATCH /api/announcement-schedules/{id} — move the entry to a new date.
pub async fn reschedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<RescheduleRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if ScheduleService::reschedule(&state.schedules, id, body.date).await {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(not_found())
    }
}

/// DELETE /api/announcement-schedules/{id} — may retire the referenced clip.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match ScheduleService::delete(
        &state.schedules,
        &state.announcements,
        &state.config.clip_dir,
        id,
    )
    .await
    {
        Some(_) => Ok(Json(json!({ "success": true }))),
        None => Err(not_found()),
    }
}

/// GET /api/schedules/check — everything due this minute, announcements
/// joined to their clips. Intended to be polled (the client asks every 30 s).
pub async fn check(State(state): State<AppState>) -> Json<Value> {
    let due = ScheduleService::due_now(
        &state.schedules,
        &state.recitations,
        &state.announcements,
        Local::now(),
    )
    .await;

    Json(json!({
        "success": true,
        "current_time": due.current_time,
        "current_date": due.current_date,
        "announcements": due.announcements,
        "recitations": due.recitations,
    }))
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "schedule not found" })),
    )
}
