//! Water intake domain.

mod model;
mod repository;

pub use model::{average_daily_ml, daily_totals, total_for_date, WaterIntake, WaterIntakePatch};
pub use repository::WaterIntakeRepository;
