//! Saved medical studies domain.

mod model;
mod repository;

pub use model::{MedicalStudy, MedicalStudyPatch};
pub use repository::MedicalStudyRepository;
