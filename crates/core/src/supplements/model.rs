//! Supplement, dose and barcode records.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::sync::{RecordId, RecordPatch, SyncRecord};

/// A supplement the user tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplement {
    pub id: RecordId,
    pub user_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub serving_amount: f64,
    pub serving_unit: String,
    pub notes: Option<String>,
}

impl Supplement {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        serving_amount: f64,
        serving_unit: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::mint_local(),
            user_id: user_id.into(),
            name: name.into(),
            brand: None,
            serving_amount,
            serving_unit: serving_unit.into(),
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum SupplementPatch {
    Name(String),
    Brand(Option<String>),
    ServingAmount(f64),
    ServingUnit(String),
    Notes(Option<String>),
}

impl RecordPatch for SupplementPatch {
    fn field_name(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Brand(_) => "brand",
            Self::ServingAmount(_) => "servingAmount",
            Self::ServingUnit(_) => "servingUnit",
            Self::Notes(_) => "notes",
        }
    }

    fn field_value(&self) -> serde_json::Value {
        match self {
            Self::Name(name) => json!(name),
            Self::Brand(brand) => json!(brand),
            Self::ServingAmount(amount) => json!(amount),
            Self::ServingUnit(unit) => json!(unit),
            Self::Notes(notes) => json!(notes),
        }
    }
}

impl SyncRecord for Supplement {
    type Patch = SupplementPatch;

    const COLLECTION: &'static str = "supplements";

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
            SupplementPatch::Name(name) => self.name = name.clone(),
            SupplementPatch::Brand(brand) => self.brand = brand.clone(),
            SupplementPatch::ServingAmount(amount) => self.serving_amount = *amount,
            SupplementPatch::ServingUnit(unit) => self.serving_unit = unit.clone(),
            SupplementPatch::Notes(notes) => self.notes = notes.clone(),
        }
    }
}

/// One logged (or scheduled) dose of a supplement.
///
/// `supplement_id` is kept as the raw id string: a dose can reference a
/// supplement that is itself still waiting for sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementDose {
    pub id: RecordId,
    pub user_id: String,
    pub supplement_id: String,
    pub amount: f64,
    pub unit: String,
    pub date: String,
    pub time: i64,
    pub taken: bool,
}

impl SupplementDose {
    pub fn new(
        user_id: impl Into<String>,
        supplement_id: impl Into<String>,
        amount: f64,
        unit: impl Into<String>,
        date: impl Into<String>,
        time: i64,
    ) -> Self {
        Self {
            id: RecordId::mint_local(),
            user_id: user_id.into(),
            supplement_id: supplement_id.into(),
            amount,
            unit: unit.into(),
            date: date.into(),
            time,
            taken: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum SupplementDosePatch {
    Amount(f64),
    Unit(String),
    Time(i64),
    Taken(bool),
}

impl RecordPatch for SupplementDosePatch {
    fn field_name(&self) -> &'static str {
        match self {
            Self::Amount(_) => "amount",
            Self::Unit(_) => "unit",
            Self::Time(_) => "time",
            Self::Taken(_) => "taken",
        }
    }

    fn field_value(&self) -> serde_json::Value {
        match self {
            Self::Amount(amount) => json!(amount),
            Self::Unit(unit) => json!(unit),
            Self::Time(time) => json!(time),
            Self::Taken(taken) => json!(taken),
        }
    }
}

impl SyncRecord for SupplementDose {
    type Patch = SupplementDosePatch;

    const COLLECTION: &'static str = "supplementDoses";

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
            SupplementDosePatch::Amount(amount) => self.amount = *amount,
            SupplementDosePatch::Unit(unit) => self.unit = unit.clone(),
            SupplementDosePatch::Time(time) => self.time = *time,
            SupplementDosePatch::Taken(taken) => self.taken = *taken,
        }
    }
}

/// Barcode-to-supplement mapping captured when the user scans packaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementBarcode {
    pub id: RecordId,
    pub user_id: String,
    pub barcode: String,
    pub supplement_name: String,
    pub brand: Option<String>,
}

impl SupplementBarcode {
    pub fn new(
        user_id: impl Into<String>,
        barcode: impl Into<String>,
        supplement_name: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::mint_local(),
            user_id: user_id.into(),
            barcode: barcode.into(),
            supplement_name: supplement_name.into(),
            brand: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum SupplementBarcodePatch {
    SupplementName(String),
    Brand(Option<String>),
}

impl RecordPatch for SupplementBarcodePatch {
    fn field_name(&self) -> &'static str {
        match self {
            Self::SupplementName(_) => "supplementName",
            Self::Brand(_) => "brand",
        }
    }

    fn field_value(&self) -> serde_json::Value {
        match self {
            Self::SupplementName(name) => json!(name),
            Self::Brand(brand) => json!(brand),
        }
    }
}

impl SyncRecord for SupplementBarcode {
    type Patch = SupplementBarcodePatch;

    const COLLECTION: &'static str = "supplementBarcodes";

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
            SupplementBarcodePatch::SupplementName(name) => self.supplement_name = name.clone(),
            SupplementBarcodePatch::Brand(brand) => self.brand = brand.clone(),
        }
    }
}

/// Fraction of doses marked taken; zero for an empty set.
pub fn taken_ratio(doses: &[SupplementDose]) -> f64 {
    if doses.is_empty() {
        return 0.0;
    }
    let taken = doses.iter().filter(|dose| dose.taken).count();
    taken as f64 / doses.len() as f64
}
