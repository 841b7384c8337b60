//! Clip records: listing, upload passthrough, manual deletion.

use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::models::announcement::Announcement;
use crate::store::ids::IdGenerator;
use crate::store::{AnnouncementStore, ScheduleStore};

pub struct AnnouncementService;

impl AnnouncementService {
    pub async fn list(announcements: &AnnouncementStore) -> Vec<Announcement> {
        announcements.list().await
    }

    /// Register a pre-made clip: same entity shape as the pipeline output,
    /// no synthesis. The file lands under the clip directory as
    /// `upload-{id}-{name}`.
    pub async fn register_upload(
        announcements: &AnnouncementStore,
        ids: &IdGenerator,
        clip_dir: &Path,
        base_url: &str,
        title: Option<String>,
        original_name: &str,
        bytes: &[u8],
    ) -> anyhow::Result<Announcement> {
        let id = ids.next();
        let file_name = format!("upload-{id}-{}", sanitize_file_name(original_name));
        tokio::fs::write(clip_dir.join(&file_name), bytes).await?;

        let announcement = Announcement {
            id,
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| original_name.to_string()),
            audio_url: format!("{base_url}/clips/{file_name}"),
            created_at: Utc::now(),
        };
        announcements.insert_front(announcement.clone()).await;
        info!("uploaded clip registered as announcement {}", announcement.id);
        Ok(announcement)
    }

    /// Manual delete: removes the metadata, the backing clip file (missing
    /// file tolerated), and every schedule row still pointing at the clip —
    /// no schedule is left referencing a record that no longer exists.
    pub async fn delete(
        announcements: &AnnouncementStore,
        schedules: &ScheduleStore,
        clip_dir: &Path,
        id: i64,
    ) -> Option<Announcement> {
        let announcement = announcements.remove(id).await?;
        remove_clip_file(clip_dir, &announcement.audio_url).await;

        let stripped = schedules.remove_by_announcement(id).await;
        if stripped > 0 {
            info!("dropped {stripped} schedule(s) referencing announcement {id}");
        }
        Some(announcement)
    }
}

/// Clip URLs end with the stored file name; deletion resolves the file from
/// the URL's last segment.
pub(crate) async fn remove_clip_file(clip_dir: &Path, audio_url: &str) {
    let Some(name) = audio_url.rsplit('/').next().filter(|n| !n.is_empty()) else {
        return;
    };
    match tokio::fs::remove_file(clip_dir.join(name)).await {
        Ok(()) => info!("clip file removed: {name}"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove clip file {name}: {e}"),
    }
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::ScheduleEntry;

    fn schedule(id: i64, announcement_id: i64) -> ScheduleEntry {
        ScheduleEntry {
            id,
            announcement_id,
            time: "07:00".into(),
            date: None,
            repeat_type: "daily".into(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn upload_registers_the_same_entity_shape() {
        let dir = tempfile::tempdir().unwrap();
        let announcements = AnnouncementStore::default();
        let ids = IdGenerator::new();

        let announcement = AnnouncementService::register_upload(
            &announcements,
            &ids,
            dir.path(),
            "http://localhost:8000",
            None,
            "friday sermon.mp3",
            b"CLIP",
        )
        .await
        .unwrap();

        // Title falls back to the original name; the stored file is sanitized.
        assert_eq!(announcement.title, "friday sermon.mp3");
        let file_name = format!("upload-{}-friday-sermon.mp3", announcement.id);
        assert_eq!(
            announcement.audio_url,
            format!("http://localhost:8000/clips/{file_name}")
        );
        assert_eq!(std::fs::read(dir.path().join(&file_name)).unwrap(), b"CLIP");
        assert_eq!(announcements.list().await.len(), 1);
    }

    #[tokio::test]
    async fn manual_delete_strips_referencing_schedules() {
        let dir = tempfile::tempdir().unwrap();
        let announcements = AnnouncementStore::default();
        let schedules = ScheduleStore::default();

        let file = dir.path().join("announcement-42.mp3");
        std::fs::write(&file, b"CLIP").unwrap();
        announcements
            .insert_front(Announcement {
                id: 42,
                title: "t".into(),
                audio_url: "http://localhost/clips/announcement-42.mp3".into(),
                created_at: Utc::now(),
            })
            .await;
        schedules.push(schedule(1, 42)).await;
        schedules.push(schedule(2, 42)).await;
        schedules.push(schedule(3, 99)).await;

        let removed = AnnouncementService::delete(&announcements, &schedules, dir.path(), 42).await;
        assert!(removed.is_some());
        assert!(!file.exists());
        assert!(announcements.list().await.is_empty());

        // Only the unrelated schedule survives.
        let remaining: Vec<i64> = schedules.list().await.iter().map(|s| s.id).collect();
        assert_eq!(remaining, vec![3]);
    }

    #[tokio::test]
    async fn delete_tolerates_a_missing_clip_file() {
        let dir = tempfile::tempdir().unwrap();
        let announcements = AnnouncementStore::default();
        let schedules = ScheduleStore::default();

        announcements
            .insert_front(Announcement {
                id: 7,
                title: "t".into(),
                audio_url: "http://localhost/clips/announcement-7.mp3".into(),
                created_at: Utc::now(),
            })
            .await;

        assert!(
            AnnouncementService::delete(&announcements, &schedules, dir.path(), 7)
                .await
                .is_some()
        );
        assert!(announcements.list().await.is_empty());
    }

    #[tokio::test]
    async fn delete_of_unknown_id_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let announcements = AnnouncementStore::default();
        let schedules = ScheduleStore::default();
        assert!(
            AnnouncementService::delete(&announcements, &schedules, dir.path(), 12345)
                .await
                .is_none()
        );
    }
}
