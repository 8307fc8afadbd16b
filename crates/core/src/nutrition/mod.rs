//! Nutrition tracking domain.

mod model;
mod repository;

pub use model::{
    calories_for_date, daily_calorie_totals, macro_totals_for_date, MacroTotals, NutritionEntry,
    NutritionEntryPatch,
};
pub use repository::NutritionRepository;
