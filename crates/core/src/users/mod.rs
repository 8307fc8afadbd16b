//! User profile domain.

mod model;
mod repository;

pub use model::{UserProfile, UserProfilePatch};
pub use repository::UserProfileRepository;
