use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One canonical serving of a reference food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionFact {
    pub key: String,
    pub name: String,
    pub calories: f64,
    pub protein_grams: f64,
    pub carb_grams: f64,
    pub fat_grams: f64,
    pub serving_size_description: String,  // e.g. "1 medium (182g)"
    pub category: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSuggestion {
    pub key: String,
    pub name: String,
    pub calories: f64,
    pub protein_grams: f64,
    pub carb_grams: f64,
    pub fat_grams: f64,
    pub serving_size_description: String,
    pub category: String,
    pub confidence: f64,  // (0, 1]
}

impl FoodSuggestion {
    pub fn from_fact(fact: &NutritionFact, confidence: f64) -> Self {
        Self {
            key: fact.key.clone(),
            name: fact.name.clone(),
            calories: fact.calories,
            protein_grams: fact.protein_grams,
            carb_grams: fact.carb_grams,
            fat_grams: fact.fat_grams,
            serving_size_description: fact.serving_size_description.clone(),
            category: fact.category.clone(),
            confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Text,
    Image,
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnalysisKind::Text => "text",
            AnalysisKind::Image => "image",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub suggestions: Vec<FoodSuggestion>,
    pub analysis_kind: AnalysisKind,
    pub overall_confidence: f64,
    pub processing_duration_ms: u64,
}

/// Opaque handle to a picked image (file path or URI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(String);

impl ImageHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
    Other(String),
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snacks => "Snacks",
            MealType::Other(label) => label.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl MealType {
    /// Case-insensitive; anything unrecognized is kept as `Other`.
    pub fn from_label(s: &str) -> Self {
        let normalized = s.trim().to_lowercase();

        match normalized.as_str() {
            "breakfast" => MealType::Breakfast,
            "lunch" => MealType::Lunch,
            "dinner" => MealType::Dinner,
            "snacks" | "snack" => MealType::Snacks,
            _ => MealType::Other(s.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: u64,
    pub key: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: u64,
    pub name: MealType,
    pub foods: Vec<FoodItem>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyNutrition {
    pub date: String,  // YYYY-MM-DD
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meals: Vec<Meal>,
}

impl DailyNutrition {
    pub fn empty(date: String) -> Self {
        Self {
            date,
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            meals: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: String,
    pub muscle_groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: u64,
    pub reps: u32,
    pub weight: u32,
    pub rest_time: Option<u32>,  // seconds
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: u64,
    pub exercise: Exercise,
    pub sets: Vec<WorkoutSet>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: u64,
    pub name: String,
    pub exercises: Vec<WorkoutExercise>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub exercise_id: String,
    pub exercise_name: String,
    pub weight: u32,
    pub reps: u32,
    pub date: DateTime<Utc>,
    pub one_rep_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Lightly Active",
            ActivityLevel::Moderate => "Moderately Active",
            ActivityLevel::Active => "Very Active",
            ActivityLevel::VeryActive => "Extremely Active",
        };
        write!(f, "{}", s)
    }
}

impl ActivityLevel {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "very_active" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub weight_lb: f64,
    pub height_in: f64,
    pub activity_level: ActivityLevel,
    pub goals: MacroGoals,
}
