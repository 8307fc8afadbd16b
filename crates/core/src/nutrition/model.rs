//! Nutrition entries and aggregate helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::sync::{RecordId, RecordPatch, SyncRecord};

/// One logged meal or snack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionEntry {
    pub id: RecordId,
    pub user_id: String,
    pub date: String,
    pub time: i64,
    pub name: String,
    pub calories: u32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl NutritionEntry {
    pub fn new(
        user_id: impl Into<String>,
        date: impl Into<String>,
        time: i64,
        name: impl Into<String>,
        calories: u32,
    ) -> Self {
        Self {
            id: RecordId::mint_local(),
            user_id: user_id.into(),
            date: date.into(),
            time,
            name: name.into(),
            calories,
            protein_g: 0.0,
            carbs_g: 0.0,
            fat_g: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum NutritionEntryPatch {
    Name(String),
    Calories(u32),
    ProteinG(f64),
    CarbsG(f64),
    FatG(f64),
    Time(i64),
}

impl RecordPatch for NutritionEntryPatch {
    fn field_name(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Calories(_) => "calories",
            Self::ProteinG(_) => "proteinG",
            Self::CarbsG(_) => "carbsG",
            Self::FatG(_) => "fatG",
            Self::Time(_) => "time",
        }
    }

    fn field_value(&self) -> serde_json::Value {
        match self {
            Self::Name(name) => json!(name),
            Self::Calories(calories) => json!(calories),
            Self::ProteinG(protein) => json!(protein),
            Self::CarbsG(carbs) => json!(carbs),
            Self::FatG(fat) => json!(fat),
            Self::Time(time) => json!(time),
        }
    }
}

impl SyncRecord for NutritionEntry {
    type Patch = NutritionEntryPatch;

    const COLLECTION: &'static str = "nutritionEntries";

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
            NutritionEntryPatch::Name(name) => self.name = name.clone(),
            NutritionEntryPatch::Calories(calories) => self.calories = *calories,
            NutritionEntryPatch::ProteinG(protein) => self.protein_g = *protein,
            NutritionEntryPatch::CarbsG(carbs) => self.carbs_g = *carbs,
            NutritionEntryPatch::FatG(fat) => self.fat_g = *fat,
            NutritionEntryPatch::Time(time) => self.time = *time,
        }
    }
}

/// Macro sums for one date.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacroTotals {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Calories logged on one date.
pub fn calories_for_date(entries: &[NutritionEntry], date: &str) -> u64 {
    entries
        .iter()
        .filter(|entry| entry.date == date)
        .map(|entry| u64::from(entry.calories))
        .sum()
}

/// Per-date calorie totals, ascending by date.
pub fn daily_calorie_totals(entries: &[NutritionEntry]) -> Vec<(String, u64)> {
    let mut totals = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.date.clone()).or_insert(0u64) += u64::from(entry.calories);
    }
    totals.into_iter().collect()
}

/// Macro sums for one date.
pub fn macro_totals_for_date(entries: &[NutritionEntry], date: &str) -> MacroTotals {
    let mut totals = MacroTotals::default();
    for entry in entries.iter().filter(|entry| entry.date == date) {
        totals.protein_g += entry.protein_g;
        totals.carbs_g += entry.carbs_g;
        totals.fat_g += entry.fat_g;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(date: &str, calories: u32, protein_g: f64) -> NutritionEntry {
        let mut entry = NutritionEntry::new("u1", date, 100, "meal", calories);
        entry.protein_g = protein_g;
        entry
    }

    #[test]
    fn calorie_totals_group_by_date() {
        let entries = vec![
            meal("2024-06-01", 400, 20.0),
            meal("2024-06-01", 600, 30.0),
            meal("2024-06-02", 500, 25.0),
        ];
        assert_eq!(calories_for_date(&entries, "2024-06-01"), 1000);
        assert_eq!(
            daily_calorie_totals(&entries),
            vec![
                ("2024-06-01".to_string(), 1000),
                ("2024-06-02".to_string(), 500),
            ]
        );
    }

    #[test]
    fn macro_totals_sum_one_date() {
        let entries = vec![meal("2024-06-01", 400, 20.0), meal("2024-06-01", 600, 30.0)];
        let totals = macro_totals_for_date(&entries, "2024-06-01");
        assert!((totals.protein_g - 50.0).abs() < f64::EPSILON);
    }
}
