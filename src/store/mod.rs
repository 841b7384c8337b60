//! In-memory repositories. Each store owns its rows behind a single lock, so
//! one operation never observes another mid-mutation. A persistent backend
//! could replace the inner storage without touching the service layer.

pub mod ids;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::models::announcement::Announcement;
use crate::models::schedule::{RecitationScheduleEntry, ScheduleEntry};

/// Produced and uploaded clips, newest first.
#[derive(Default)]
pub struct AnnouncementStore {
    items: RwLock<Vec<Announcement>>,
}

impl AnnouncementStore {
    pub async fn insert_front(&self, announcement: Announcement) {
        self.items.write().await.insert(0, announcement);
    }

    pub async fn list(&self) -> Vec<Announcement> {
        self.items.read().await.clone()
    }

    pub async fn find(&self, id: i64) -> Option<Announcement> {
        self.items.read().await.iter().find(|a| a.id == id).cloned()
    }

    pub async fn remove(&self, id: i64) -> Option<Announcement> {
        let mut items = self.items.write().await;
        let idx = items.iter().position(|a| a.id == id)?;
        Some(items.remove(idx))
    }
}

/// Time triggers for announcement clips.
#[derive(Default)]
pub struct ScheduleStore {
    items: RwLock<Vec<ScheduleEntry>>,
}

impl ScheduleStore {
    pub async fn push(&self, entry: ScheduleEntry) {
        self.items.write().await.push(entry);
    }

    pub async fn list(&self) -> Vec<ScheduleEntry> {
        self.items.read().await.clone()
    }

    pub async fn remove(&self, id: i64) -> Option<ScheduleEntry> {
        let mut items = self.items.write().await;
        let idx = items.iter().position(|s| s.id == id)?;
        Some(items.remove(idx))
    }

    pub async fn update_date(&self, id: i64, date: NaiveDate) -> bool {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|s| s.id == id) {
            Some(entry) => {
                entry.date = Some(date);
                true
            }
            None => false,
        }
    }

    /// True while any entry still references the announcement.
    pub async fn references(&self, announcement_id: i64) -> bool {
        self.items
            .read()
            .await
            .iter()
            .any(|s| s.announcement_id == announcement_id)
    }

    /// Drop every entry referencing the announcement; returns how many went.
    pub async fn remove_by_announcement(&self, announcement_id: i64) -> usize {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|s| s.announcement_id != announcement_id);
        before - items.len()
    }
}

/// Time triggers for recitations. Self-contained; no cascade.
#[derive(Default)]
pub struct RecitationScheduleStore {
    items: RwLock<Vec<RecitationScheduleEntry>>,
}

impl RecitationScheduleStore {
    pub async fn push(&self, entry: RecitationScheduleEntry) {
        self.items.write().await.push(entry);
    }

    pub async fn list(&self) -> Vec<RecitationScheduleEntry> {
        self.items.read().await.clone()
    }

    pub async fn remove(&self, id: i64) -> Option<RecitationScheduleEntry> {
        let mut items = self.items.write().await;
        let idx = items.iter().position(|s| s.id == id)?;
        Some(items.remove(idx))
    }

    pub async fn update_date(&self, id: i64, date: NaiveDate) -> bool {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|s| s.id == id) {
            Some(entry) => {
                entry.date = Some(date);
                true
            }
            None => false,
        }
    }
}
