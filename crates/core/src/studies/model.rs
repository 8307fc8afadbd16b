//! Saved medical study records.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::sync::{RecordId, RecordPatch, SyncRecord};

/// A study the user bookmarked for later reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalStudy {
    pub id: RecordId,
    pub user_id: String,
    pub title: String,
    pub url: Option<String>,
    pub summary: Option<String>,
    /// `YYYY-MM-DD` bookmark date.
    pub saved_at: String,
}

impl MedicalStudy {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        saved_at: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::mint_local(),
            user_id: user_id.into(),
            title: title.into(),
            url: None,
            summary: None,
            saved_at: saved_at.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum MedicalStudyPatch {
    Title(String),
    Url(Option<String>),
    Summary(Option<String>),
}

impl RecordPatch for MedicalStudyPatch {
    fn field_name(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Url(_) => "url",
            Self::Summary(_) => "summary",
        }
    }

    fn field_value(&self) -> serde_json::Value {
        match self {
            Self::Title(title) => json!(title),
            Self::Url(url) => json!(url),
            Self::Summary(summary) => json!(summary),
        }
    }
}

impl SyncRecord for MedicalStudy {
    type Patch = MedicalStudyPatch;

    const COLLECTION: &'static str = "medicalStudies";

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
            MedicalStudyPatch::Title(title) => self.title = title.clone(),
            MedicalStudyPatch::Url(url) => self.url = url.clone(),
            MedicalStudyPatch::Summary(summary) => self.summary = summary.clone(),
        }
    }
}
