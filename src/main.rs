use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use announcer_api::config::Config;
use announcer_api::routes;
use announcer_api::services::mixer::FfmpegMixer;
use announcer_api::services::pipeline::AnnouncementPipeline;
use announcer_api::services::synthesis::ProcessSynthesizer;
use announcer_api::store::ids::IdGenerator;
use announcer_api::store::{AnnouncementStore, RecitationScheduleStore, ScheduleStore};
use announcer_api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    tokio::fs::create_dir_all(&config.clip_dir).await?;
    for asset in [&config.intro_clip, &config.outro_clip] {
        if !tokio::fs::try_exists(asset).await.unwrap_or(false) {
            warn!(
                "jingle asset {} is missing; generation will fail until it is restored",
                asset.display()
            );
        }
    }

    let announcements = Arc::new(AnnouncementStore::default());
    let schedules = Arc::new(ScheduleStore::default());
    let recitations = Arc::new(RecitationScheduleStore::default());
    let ids = Arc::new(IdGenerator::new());

    let pipeline = Arc::new(AnnouncementPipeline::new(
        Arc::new(ProcessSynthesizer::new(
            config.synthesis_command.clone(),
            config.synthesis_script.clone(),
        )),
        Arc::new(FfmpegMixer::new(config.ffmpeg_bin.clone())),
        announcements.clone(),
        ids.clone(),
        config.clip_dir.clone(),
        config.intro_clip.clone(),
        config.outro_clip.clone(),
        config.base_url.clone(),
    ));

    let state = AppState {
        config: config.clone(),
        announcements,
        schedules,
        recitations,
        ids,
        pipeline,
    };

    // The operator frontend may be served from anywhere; the API is gated by
    // the access code alone.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PATCH])
        .allow_headers(Any)
        .allow_origin(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth stub
        .route("/api/v1/auth/login", post(routes::auth::login))
        .route("/api/v1/auth/me", get(routes::auth::me))
        .route("/api/auth/me", get(routes::auth::me))
        // Clip production
        .route("/api/tts/generate", post(routes::tts::generate))
        .route("/api/tts/upload", post(routes::tts::upload))
        // Announcements
        .route("/api/announcements", get(routes::announcements::list))
        .route("/api/announcements/{id}", delete(routes::announcements::remove))
        // Announcement schedules
        .route(
            "/api/announcement-schedules",
            get(routes::schedules::list).post(routes::schedules::create),
        )
        .route(
            "/api/announcement-schedules/{id}",
            patch(routes::schedules::reschedule).delete(routes::schedules::remove),
        )
        // Recitation schedules
        .route(
            "/api/recitation-schedules",
            get(routes::recitations::list).post(routes::recitations::create),
        )
        .route(
            "/api/recitation-schedules/{id}",
            patch(routes::recitations::reschedule).delete(routes::recitations::remove),
        )
        // Poll target for the player
        .route("/api/schedules/check", get(routes::schedules::check))
        // Finished clips are fetched straight off disk
        .nest_service("/clips", ServeDir::new(&config.clip_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Uploads are whole audio files
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("announcer API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
