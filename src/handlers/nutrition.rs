use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{Result, SuggestionError};
use crate::models::{DailyNutrition, FoodItem, FoodSuggestion, Meal, MealType};
use crate::services::FoodSuggestionEngine;

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Length of the longest leading `[+-]digits[.digits][e[+-]digits]` run.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }
    end
}

/// Falls back to one serving for anything that is not a positive, finite number.
pub fn sanitize_quantity(quantity: f64) -> f64 {
    if quantity.is_finite() && quantity > 0.0 {
        quantity
    } else {
        1.0
    }
}

/// Leading-number parse of a quantity field. Blank, zero, negative or
/// non-numeric input counts as one serving.
pub fn parse_quantity(input: &str) -> f64 {
    let trimmed = input.trim();
    let parsed = trimmed[..numeric_prefix_len(trimmed)].parse::<f64>().unwrap_or(0.0);
    sanitize_quantity(parsed)
}

pub fn meal_calories(meal: &Meal) -> f64 {
    meal.foods.iter().map(|f| f.calories).sum()
}

/// Today's meals and running totals, plus food search for the add-food flow.
pub struct NutritionHandler {
    engine: Arc<FoodSuggestionEngine>,
    today: Mutex<DailyNutrition>,
    next_id: AtomicU64,
    search_generation: AtomicU64,
}

impl NutritionHandler {
    pub fn new(engine: Arc<FoodSuggestionEngine>, date: String) -> Self {
        Self {
            engine,
            today: Mutex::new(DailyNutrition::empty(date)),
            next_id: AtomicU64::new(1),
            search_generation: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Keystroke search. Returns `None` when a newer search started before
    /// this one finished, so only the latest results are shown.
    pub async fn search(&self, query: &str) -> Option<Vec<FoodSuggestion>> {
        let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let results = self.engine.search_database(query).await;

        if self.search_generation.load(Ordering::SeqCst) != generation {
            log::debug!("⏭️ Discarding stale search results for '{}'", query);
            return None;
        }
        Some(results)
    }

    pub async fn add_food(&self, meal_type: MealType, suggestion: &FoodSuggestion, quantity: f64) -> FoodItem {
        let quantity = sanitize_quantity(quantity);
        let item = FoodItem {
            id: self.next_id(),
            key: suggestion.key.clone(),
            name: suggestion.name.clone(),
            calories: (suggestion.calories * quantity).round(),
            protein: round1(suggestion.protein_grams * quantity),
            carbs: round1(suggestion.carb_grams * quantity),
            fat: round1(suggestion.fat_grams * quantity),
            quantity,
            unit: "serving".to_string(),
        };

        let mut today = self.today.lock().await;

        match today.meals.iter().position(|m| m.name == meal_type) {
            Some(index) => today.meals[index].foods.push(item.clone()),
            None => {
                let meal = Meal {
                    id: self.next_id(),
                    name: meal_type.clone(),
                    foods: vec![item.clone()],
                    timestamp: Utc::now(),
                };
                today.meals.push(meal);
            }
        }

        today.calories += item.calories;
        today.protein = round1(today.protein + item.protein);
        today.carbs = round1(today.carbs + item.carbs);
        today.fat = round1(today.fat + item.fat);

        log::info!(
            "🍽️ Added {} x{} to {} ({} kcal, day total {} kcal)",
            item.name, quantity, meal_type, item.calories, today.calories
        );

        item
    }

    pub async fn add_food_by_key(&self, meal_type: MealType, key: &str, quantity: f64) -> Result<FoodItem> {
        let fact = self
            .engine
            .dictionary()
            .get(key)
            .ok_or_else(|| SuggestionError::UnknownFood(key.to_string()))?;

        let suggestion = FoodSuggestion::from_fact(fact, 1.0);
        Ok(self.add_food(meal_type, &suggestion, quantity).await)
    }

    /// Removes one food; meals left empty are dropped. Returns false when
    /// the meal or food does not exist.
    pub async fn remove_food(&self, meal_id: u64, food_id: u64) -> bool {
        let mut today = self.today.lock().await;

        let Some(meal) = today.meals.iter_mut().find(|m| m.id == meal_id) else {
            log::warn!("⚠️ Meal {} not found", meal_id);
            return false;
        };
        let Some(index) = meal.foods.iter().position(|f| f.id == food_id) else {
            log::warn!("⚠️ Food {} not found in meal {}", food_id, meal_id);
            return false;
        };
        let removed = meal.foods.remove(index);

        today.calories -= removed.calories;
        today.protein = round1(today.protein - removed.protein);
        today.carbs = round1(today.carbs - removed.carbs);
        today.fat = round1(today.fat - removed.fat);
        today.meals.retain(|m| !m.foods.is_empty());

        log::info!("🗑️ Removed {} from meal {}", removed.name, meal_id);
        true
    }

    pub async fn snapshot(&self) -> DailyNutrition {
        self.today.lock().await.clone()
    }

    /// Starts a fresh day, discarding the current log.
    pub async fn reset(&self, date: String) {
        let mut today = self.today.lock().await;
        log::info!("📅 Starting new nutrition day {} (previous: {})", date, today.date);
        *today = DailyNutrition::empty(date);
    }
}
