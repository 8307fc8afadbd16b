//! Sleep entries and duration helpers.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::sync::{RecordId, RecordPatch, SyncRecord};

/// One night of sleep, keyed to the wake-up date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepEntry {
    pub id: RecordId,
    pub user_id: String,
    pub date: String,
    /// Epoch milliseconds.
    pub bed_time: i64,
    /// Epoch milliseconds; earlier or equal bed times yield zero duration.
    pub wake_time: i64,
    /// Subjective quality, 1–5.
    pub quality: Option<u8>,
}

impl SleepEntry {
    pub fn new(
        user_id: impl Into<String>,
        date: impl Into<String>,
        bed_time: i64,
        wake_time: i64,
    ) -> Self {
        Self {
            id: RecordId::mint_local(),
            user_id: user_id.into(),
            date: date.into(),
            bed_time,
            wake_time,
            quality: None,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        ((self.wake_time - self.bed_time) / 60_000).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum SleepEntryPatch {
    Date(String),
    BedTime(i64),
    WakeTime(i64),
    Quality(Option<u8>),
}

impl RecordPatch for SleepEntryPatch {
    fn field_name(&self) -> &'static str {
        match self {
            Self::Date(_) => "date",
            Self::BedTime(_) => "bedTime",
            Self::WakeTime(_) => "wakeTime",
            Self::Quality(_) => "quality",
        }
    }

    fn field_value(&self) -> serde_json::Value {
        match self {
            Self::Date(date) => json!(date),
            Self::BedTime(bed_time) => json!(bed_time),
            Self::WakeTime(wake_time) => json!(wake_time),
            Self::Quality(quality) => json!(quality),
        }
    }
}

impl SyncRecord for SleepEntry {
    type Patch = SleepEntryPatch;

    const COLLECTION: &'static str = "sleepEntries";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn owner_id(&self) -> &str {
        &self.user_id
    }

    fn apply_patch(&mut self, patch: &Self::Patch) {
        match patch {
            SleepEntryPatch::Date(date) => self.date = date.clone(),
            SleepEntryPatch::BedTime(bed_time) => self.bed_time = *bed_time,
            SleepEntryPatch::WakeTime(wake_time) => self.wake_time = *wake_time,
            SleepEntryPatch::Quality(quality) => self.quality = *quality,
        }
    }
}

/// Mean sleep duration in minutes; zero for an empty set.
pub fn average_duration_minutes(entries: &[SleepEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let total: i64 = entries.iter().map(SleepEntry::duration_minutes).sum();
    total as f64 / entries.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_clamped_at_zero() {
        let entry = SleepEntry::new("u1", "2024-06-02", 100_000, 40_000);
        assert_eq!(entry.duration_minutes(), 0);
    }

    #[test]
    fn average_duration_over_entries() {
        let eight_hours = 8 * 60 * 60_000;
        let six_hours = 6 * 60 * 60_000;
        let entries = vec![
            SleepEntry::new("u1", "2024-06-01", 0, eight_hours),
            SleepEntry::new("u1", "2024-06-02", 0, six_hours),
        ];
        assert!((average_duration_minutes(&entries) - 420.0).abs() < f64::EPSILON);
    }
}
