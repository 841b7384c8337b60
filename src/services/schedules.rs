//! Schedule lifecycle and the "what is due right now" evaluation.
//!
//! Announcement schedules reference a clip by id; deleting the last schedule
//! that references a clip retires the clip and its file. Recitation
//! schedules carry their own payload and never cascade.

use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike};
use serde::Serialize;
use tracing::info;

use crate::error::ScheduleError;
use crate::models::announcement::Announcement;
use crate::models::schedule::{
    CreateRecitationScheduleRequest, CreateScheduleRequest, RecitationScheduleEntry,
    ScheduleEntry, Trigger, REPEAT_ONCE,
};
use crate::store::ids::IdGenerator;
use crate::store::{AnnouncementStore, RecitationScheduleStore, ScheduleStore};

/// What the polling client should play right now. Pure read; polling the
/// same minute twice returns the same set.
#[derive(Debug, Serialize)]
pub struct DueSchedules {
    pub current_time: String,
    pub current_date: NaiveDate,
    pub announcements: Vec<DueAnnouncement>,
    pub recitations: Vec<RecitationScheduleEntry>,
}

/// A due schedule joined to its clip. `announcement` is None when the clip
/// was deleted after the schedule was created; the client skips those.
#[derive(Debug, Serialize)]
pub struct DueAnnouncement {
    #[serde(flatten)]
    pub schedule: ScheduleEntry,
    pub announcement: Option<Announcement>,
}

pub struct ScheduleService;

impl ScheduleService {
    pub async fn create(
        store: &ScheduleStore,
        ids: &IdGenerator,
        req: CreateScheduleRequest,
    ) -> Result<ScheduleEntry, ScheduleError> {
        let time = canonical_time(&req.time, req.date, &req.repeat_type)?;
        let entry = ScheduleEntry {
            id: ids.next(),
            announcement_id: req.announcement_id,
            time,
            date: req.date,
            repeat_type: req.repeat_type,
            is_active: true,
        };
        store.push(entry.clone()).await;
        Ok(entry)
    }

    pub async fn list(store: &ScheduleStore) -> Vec<ScheduleEntry> {
        store.list().await
    }

    pub async fn reschedule(store: &ScheduleStore, id: i64, date: NaiveDate) -> bool {
        store.update_date(id, date).await
    }

    /// Remove the entry, then release the announcement if this was the last
    /// schedule referencing it. "Still referenced" is re-derived from the
    /// live store on every call, so correctness never depends on a counter.
    pub async fn delete(
        schedules: &ScheduleStore,
        announcements: &AnnouncementStore,
        clip_dir: &Path,
        schedule_id: i64,
    ) -> Option<ScheduleEntry> {
        let entry = schedules.remove(schedule_id).await?;

        if !schedules.references(entry.announcement_id).await {
            if let Some(announcement) = announcements.remove(entry.announcement_id).await {
                super::announcements::remove_clip_file(clip_dir, &announcement.audio_url).await;
                info!(
                    "announcement {} retired with its last schedule",
                    announcement.id
                );
            }
        }
        Some(entry)
    }

    /// Match both schedule kinds against the given instant, minute
    /// granularity, in the installation's local timezone.
    pub async fn due_now(
        schedules: &ScheduleStore,
        recitations: &RecitationScheduleStore,
        announcements: &AnnouncementStore,
        now: DateTime<Local>,
    ) -> DueSchedules {
        let current_time = format!("{:02}:{:02}", now.hour(), now.minute());
        let current_date = now.date_naive();

        let mut due_announcements = Vec::new();
        for entry in schedules.list().await {
            if entry.is_due(&current_time, current_date) {
                let announcement = announcements.find(entry.announcement_id).await;
                due_announcements.push(DueAnnouncement {
                    schedule: entry,
                    announcement,
                });
            }
        }

        let due_recitations = recitations
            .list()
            .await
            .into_iter()
            .filter(|entry| entry.is_due(&current_time, current_date))
            .collect();

        DueSchedules {
            current_time,
            current_date,
            announcements: due_announcements,
            recitations: due_recitations,
        }
    }
}

pub struct RecitationScheduleService;

impl RecitationScheduleService {
    pub async fn create(
        store: &RecitationScheduleStore,
        ids: &IdGenerator,
        req: CreateRecitationScheduleRequest,
    ) -> Result<RecitationScheduleEntry, ScheduleError> {
        let time = canonical_time(&req.time, req.date, &req.repeat_type)?;
        let entry = RecitationScheduleEntry {
            id: ids.next(),
            title: req.title,
            audio_url: req.audio_url,
            time,
            date: req.date,
            repeat_type: req.repeat_type,
            is_active: true,
        };
        store.push(entry.clone()).await;
        Ok(entry)
    }

    pub async fn list(store: &RecitationScheduleStore) -> Vec<RecitationScheduleEntry> {
        store.list().await
    }

    pub async fn reschedule(store: &RecitationScheduleStore, id: i64, date: NaiveDate) -> bool {
        store.update_date(id, date).await
    }

    pub async fn delete(store: &RecitationScheduleStore, id: i64) -> Option<RecitationScheduleEntry> {
        store.remove(id).await
    }
}

/// Validate the trigger and re-render the time zero-padded, so string
/// equality against the evaluator's clock can never miss ("7:05" → "07:05").
fn canonical_time(
    time: &str,
    date: Option<NaiveDate>,
    repeat_type: &str,
) -> Result<String, ScheduleError> {
    let parsed = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| ScheduleError::InvalidTime(time.to_string()))?;
    if repeat_type == REPEAT_ONCE && date.is_none() {
        return Err(ScheduleError::MissingDate);
    }
    Ok(format!("{:02}:{:02}", parsed.hour(), parsed.minute()))
}
