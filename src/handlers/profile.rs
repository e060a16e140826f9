use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::handlers::nutrition::round1;
use crate::models::{DailyNutrition, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

/// BMI from imperial measurements, one decimal.
pub fn bmi(weight_lb: f64, height_in: f64) -> f64 {
    let height_m = (height_in * 2.54) / 100.0;
    let weight_kg = weight_lb * 0.453592;
    if height_m <= 0.0 {
        return 0.0;
    }
    round1(weight_kg / (height_m * height_m))
}

pub fn goal_progress_percent(current: f64, goal: f64) -> u32 {
    if goal <= 0.0 {
        return 0;
    }
    (current / goal * 100.0).round().max(0.0) as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub profile: UserProfile,
    pub activity_level_text: String,
    pub bmi: f64,
    pub bmi_category: BmiCategory,
}

pub struct ProfileHandler {
    profile: RwLock<UserProfile>,
}

impl ProfileHandler {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile: RwLock::new(profile),
        }
    }

    pub async fn profile(&self) -> UserProfile {
        self.profile.read().await.clone()
    }

    pub async fn update(&self, profile: UserProfile) {
        log::info!("👤 Profile updated for {}", profile.name);
        *self.profile.write().await = profile;
    }

    pub async fn summary(&self) -> ProfileSummary {
        let profile = self.profile().await;
        let bmi = bmi(profile.weight_lb, profile.height_in);

        ProfileSummary {
            activity_level_text: profile.activity_level.to_string(),
            bmi,
            bmi_category: BmiCategory::from_bmi(bmi),
            profile,
        }
    }

    pub async fn progress(&self, today: &DailyNutrition) -> GoalProgress {
        let profile = self.profile.read().await;
        let goals = &profile.goals;

        GoalProgress {
            calories: goal_progress_percent(today.calories, goals.calories),
            protein: goal_progress_percent(today.protein, goals.protein),
            carbs: goal_progress_percent(today.carbs, goals.carbs),
            fat: goal_progress_percent(today.fat, goals.fat),
        }
    }
}
