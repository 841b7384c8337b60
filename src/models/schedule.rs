use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Marker value for one-off schedules. Every other repeat value, whatever its
/// label, means "matches every day at `time`".
pub const REPEAT_ONCE: &str = "once";

/// Anything with a time-of-day trigger.
pub trait Trigger {
    fn time(&self) -> &str;
    fn date(&self) -> Option<NaiveDate>;
    fn repeat_type(&self) -> &str;

    /// Due iff the minute matches, and for one-off entries the date as well.
    fn is_due(&self, current_time: &str, current_date: NaiveDate) -> bool {
        self.time() == current_time
            && (self.repeat_type() != REPEAT_ONCE || self.date() == Some(current_date))
    }
}

/// A time trigger for an announcement clip. Several entries may reference the
/// same announcement; the clip is only released once the last one is gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: i64,
    pub announcement_id: i64,
    /// Local time of day, "HH:MM", zero-padded.
    pub time: String,
    /// Only meaningful when `repeat_type == "once"`.
    pub date: Option<NaiveDate>,
    pub repeat_type: String,
    /// Stored since creation but not consulted when matching.
    pub is_active: bool,
}

impl Trigger for ScheduleEntry {
    fn time(&self) -> &str {
        &self.time
    }
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
    fn repeat_type(&self) -> &str {
        &self.repeat_type
    }
}

/// A recitation trigger carries its own payload; nothing else references it
/// and no cleanup cascades from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecitationScheduleEntry {
    pub id: i64,
    pub title: String,
    pub audio_url: String,
    pub time: String,
    pub date: Option<NaiveDate>,
    pub repeat_type: String,
    pub is_active: bool,
}

impl Trigger for RecitationScheduleEntry {
    fn time(&self) -> &str {
        &self.time
    }
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
    fn repeat_type(&self) -> &str {
        &self.repeat_type
    }
}

/// Body for POST /api/announcement-schedules.
#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    pub announcement_id: i64,
    pub time: String,
    pub date: Option<NaiveDate>,
    pub repeat_type: String,
}

/// Body for POST /api/recitation-schedules.
#[derive(Debug, Deserialize)]
pub struct CreateRecitationScheduleRequest {
    pub title: String,
    pub audio_url: String,
    pub time: String,
    pub date: Option<NaiveDate>,
    pub repeat_type: String,
}

/// Body for PATCH on either schedule collection: move the entry to a new date.
#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub date: NaiveDate,
}
