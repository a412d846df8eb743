use crate::errors::StoreError;
use crate::models::{Mood, MoodEntry};
use crate::store::TableStore;
use chrono::{Local, NaiveDateTime};
use tracing::info;

pub async fn record<S: TableStore>(store: &S, mood: Mood, note: &str) -> Result<MoodEntry, StoreError> {
    record_at(store, Local::now().naive_local(), mood, note).await
}

pub async fn record_at<S: TableStore>(
    store: &S,
    now: NaiveDateTime,
    mood: Mood,
    note: &str,
) -> Result<MoodEntry, StoreError> {
    let entry = MoodEntry::new(now, mood, note);
    store.append_row(&entry.fields()).await?;
    info!(mood = %mood, timestamp = %entry.timestamp, "mood logged");
    Ok(entry)
}
