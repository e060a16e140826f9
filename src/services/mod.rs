pub mod ai_service; // Latency + recognizer traits
pub mod food_database;
pub mod openrouter; // OpenRouter vision recognizer
pub mod suggestion_engine;

pub use ai_service::{FoodRecognizer, Latency, NoLatency, Operation, PlaceholderRecognizer, SimulatedLatency};
pub use food_database::FoodDictionary;
pub use openrouter::OpenRouterRecognizer;
pub use suggestion_engine::{normalize, FoodSuggestionEngine};
