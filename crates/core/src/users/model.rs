//! User profile records.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::sync::{RecordId, RecordPatch, SyncRecord};

/// The device owner's profile. `user_id` doubles as the owner field so the
/// profile document follows the same query conventions as every other
/// collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: RecordId,
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub daily_water_target_ml: Option<u32>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: RecordId::mint_local(),
            user_id: user_id.into(),
            display_name: display_name.into(),
            email: None,
            weight_kg: None,
            height_cm: None,
            daily_water_target_ml: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum UserProfilePatch {
    DisplayName(String),
    Email(Option<String>),
    WeightKg(Option<f64>),
    HeightCm(Option<f64>),
    DailyWaterTargetMl(Option<u32>),
}

impl RecordPatch for UserProfilePatch {
    fn field_name(&self) -> &'static str {
        match self {
            Self::DisplayName(_) => "displayName",
            Self::Email(_) => "email",
            Self::WeightKg(_) => "weightKg",
            Self::HeightCm(_) => "heightCm",
            Self::DailyWaterTargetMl(_) => "dailyWaterTargetMl",
        }
    }

    fn field_value(&self) -> serde_json::Value {
        match self {
            Self::DisplayName(name) => json!(name),
            Self::Email(email) => json!(email),
            Self::WeightKg(weight) => json!(weight),
            Self::HeightCm(height) => json!(height),
            Self::DailyWaterTargetMl(target) => json!(target),
        }
    }
}

impl SyncRecord for UserProfile {
    type Patch = UserProfilePatch;

    const COLLECTION: &'static str = "users";

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
            UserProfilePatch::DisplayName(name) => self.display_name = name.clone(),
            UserProfilePatch::Email(email) => self.email = email.clone(),
            UserProfilePatch::WeightKg(weight) => self.weight_kg = *weight,
            UserProfilePatch::HeightCm(height) => self.height_cm = *height,
            UserProfilePatch::DailyWaterTargetMl(target) => self.daily_water_target_ml = *target,
        }
    }
}
