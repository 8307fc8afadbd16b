//! Supplements domain: the supplement catalog, logged doses, and barcode
//! mappings scanned from packaging.

mod model;
mod repository;

pub use model::{
    taken_ratio, Supplement, SupplementBarcode, SupplementBarcodePatch, SupplementDose,
    SupplementDosePatch, SupplementPatch,
};
pub use repository::{
    SupplementBarcodeRepository, SupplementDoseRepository, SupplementRepository,
};
