pub mod nutrition;
pub mod profile;
pub mod workout;

pub use nutrition::NutritionHandler;
pub use profile::ProfileHandler;
pub use workout::WorkoutHandler;
