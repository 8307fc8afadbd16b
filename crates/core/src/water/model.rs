//! Water intake records and aggregate helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::sync::{RecordId, RecordPatch, SyncRecord};

/// One logged drink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterIntake {
    pub id: RecordId,
    pub user_id: String,
    /// Millilitres.
    pub amount_ml: u32,
    /// `YYYY-MM-DD`, lexicographically sortable.
    pub date: String,
    /// Epoch milliseconds, orders entries within a date.
    pub time: i64,
}

impl WaterIntake {
    pub fn new(
        user_id: impl Into<String>,
        amount_ml: u32,
        date: impl Into<String>,
        time: i64,
    ) -> Self {
        Self {
            id: RecordId::mint_local(),
            user_id: user_id.into(),
            amount_ml,
            date: date.into(),
            time,
        }
    }
}

/// Typed field updates for a water intake entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum WaterIntakePatch {
    AmountMl(u32),
    Date(String),
    Time(i64),
}

impl RecordPatch for WaterIntakePatch {
    fn field_name(&self) -> &'static str {
        match self {
            Self::AmountMl(_) => "amountMl",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
        }
    }

    fn field_value(&self) -> serde_json::Value {
        match self {
            Self::AmountMl(amount_ml) => json!(amount_ml),
            Self::Date(date) => json!(date),
            Self::Time(time) => json!(time),
        }
    }
}

impl SyncRecord for WaterIntake {
    type Patch = WaterIntakePatch;

    const COLLECTION: &'static str = "waterIntakes";

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
            WaterIntakePatch::AmountMl(amount_ml) => self.amount_ml = *amount_ml,
            WaterIntakePatch::Date(date) => self.date = date.clone(),
            WaterIntakePatch::Time(time) => self.time = *time,
        }
    }
}

/// Total millilitres logged on one date.
pub fn total_for_date(entries: &[WaterIntake], date: &str) -> u64 {
    entries
        .iter()
        .filter(|entry| entry.date == date)
        .map(|entry| u64::from(entry.amount_ml))
        .sum()
}

/// Per-date totals, ascending by date.
pub fn daily_totals(entries: &[WaterIntake]) -> Vec<(String, u64)> {
    let mut totals = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.date.clone()).or_insert(0u64) += u64::from(entry.amount_ml);
    }
    totals.into_iter().collect()
}

/// Mean of the per-date totals; zero when nothing is logged.
pub fn average_daily_ml(entries: &[WaterIntake]) -> f64 {
    let totals = daily_totals(entries);
    if totals.is_empty() {
        return 0.0;
    }
    let sum: u64 = totals.iter().map(|(_, total)| *total).sum();
    sum as f64 / totals.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<WaterIntake> {
        vec![
            WaterIntake::new("u1", 250, "2024-06-01", 100),
            WaterIntake::new("u1", 500, "2024-06-01", 200),
            WaterIntake::new("u1", 300, "2024-06-02", 50),
        ]
    }

    #[test]
    fn totals_group_by_date() {
        let entries = entries();
        assert_eq!(total_for_date(&entries, "2024-06-01"), 750);
        assert_eq!(total_for_date(&entries, "2024-06-03"), 0);
        assert_eq!(
            daily_totals(&entries),
            vec![
                ("2024-06-01".to_string(), 750),
                ("2024-06-02".to_string(), 300),
            ]
        );
    }

    #[test]
    fn average_is_per_logged_day() {
        let entries = entries();
        assert!((average_daily_ml(&entries) - 525.0).abs() < f64::EPSILON);
        assert_eq!(average_daily_ml(&[]), 0.0);
    }

    #[test]
    fn later_patches_win_per_field() {
        let mut entry = WaterIntake::new("u1", 250, "2024-06-01", 100);
        entry.apply_patches(&[
            WaterIntakePatch::AmountMl(400),
            WaterIntakePatch::AmountMl(600),
            WaterIntakePatch::Time(999),
        ]);
        assert_eq!(entry.amount_ml, 600);
        assert_eq!(entry.time, 999);

        let document = crate::sync::merge_patch_document(&[
            WaterIntakePatch::AmountMl(400),
            WaterIntakePatch::AmountMl(600),
        ]);
        assert_eq!(document["amountMl"], serde_json::json!(600));
    }
}
