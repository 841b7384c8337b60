// Library exports for the binary and tests.
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use config::Config;
use services::pipeline::AnnouncementPipeline;
use store::ids::IdGenerator;
use store::{AnnouncementStore, RecitationScheduleStore, ScheduleStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub announcements: Arc<AnnouncementStore>,
    pub schedules: Arc<ScheduleStore>,
    pub recitations: Arc<RecitationScheduleStore>,
    pub ids: Arc<IdGenerator>,
    pub pipeline: Arc<AnnouncementPipeline>,
}
