use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::GenerateError, models::announcement::GenerateRequest,
    services::announcements::AnnouncementService, AppState,
};

/// POST /api/tts/generate — run the full production pipeline.
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state
        .pipeline
        .generate(&body.text, body.title.as_deref())
        .await
    {
        Ok(announcement) => Ok(Json(json!({
            "success": true,
            "audio_url": announcement.audio_url,
            "data": announcement,
        }))),
        Err(e) => {
            let status = match e {
                GenerateError::EmptyText => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((
                status,
                Json(json!({ "success": false, "message": e.to_string() })),
            ))
        }
    }
}

/// POST /api/tts/upload — register a pre-made clip, no pipeline.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name().unwrap_or("") {
            "audio" => {
                let name = field.file_name().unwrap_or("clip.mp3").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((bytes.to_vec(), name));
            }
            "title" => {
                title = Some(field.text().await.map_err(bad_multipart)?);
            }
            _ => {}
        }
    }

    let Some((bytes, original_name)) = file else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "no audio file in upload" })),
        ));
    };

    AnnouncementService::register_upload(
        &state.announcements,
        &state.ids,
        &state.config.clip_dir,
        &state.config.base_url,
        title,
        &original_name,
        &bytes,
    )
    .await
    .map(|announcement| {
        Json(json!({
            "success": true,
            "audio_url": announcement.audio_url,
            "data": announcement,
        }))
    })
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": e.to_string() })),
        )
    })
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": e.to_string() })),
    )
}
