use serde::{Deserialize, Serialize};

use crate::handlers::nutrition::{parse_quantity, sanitize_quantity};
use crate::handlers::profile::GoalProgress;
use crate::models::{DailyNutrition, ImageHandle};

/// JSON API request/response structures
#[derive(Debug, Deserialize, Serialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AnalyzeTextRequest {
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AnalyzeImageRequest {
    pub image: ImageHandle,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SuggestionQuery {
    pub meal_type: String,
    /// Defaults to the current hour in the configured timezone.
    pub hour: Option<u32>,
}

/// Quantity as typed by the user: a number or the raw text field.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(f64),
    Text(String),
}

impl QuantityInput {
    pub fn value(&self) -> f64 {
        match self {
            QuantityInput::Number(n) => sanitize_quantity(*n),
            QuantityInput::Text(text) => parse_quantity(text),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AddFoodRequest {
    pub key: String,
    pub quantity: Option<QuantityInput>,
}

impl AddFoodRequest {
    pub fn quantity(&self) -> f64 {
        self.quantity.as_ref().map(QuantityInput::value).unwrap_or(1.0)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StartWorkoutRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AddExerciseRequest {
    pub exercise_id: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AddSetRequest {
    pub workout_exercise_id: u64,
    pub weight: String,
    pub reps: String,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub nutrition: DailyNutrition,
    pub progress: GoalProgress,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// Axum integration (optional - requires axum dependency)
#[cfg(feature = "api-server")]
pub mod server {
    use super::*;
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{delete, get, post, put},
        Json, Router,
    };
    use chrono::{Timelike, Utc};
    use chrono_tz::Tz;
    use std::sync::Arc;
    use tower::ServiceBuilder;
    use tower_http::cors::CorsLayer;

    use crate::error::SuggestionError;
    use crate::handlers::{NutritionHandler, ProfileHandler, WorkoutHandler};
    use crate::models::{MealType, UserProfile};
    use crate::services::FoodSuggestionEngine;

    pub struct AppState {
        pub engine: Arc<FoodSuggestionEngine>,
        pub nutrition: Arc<NutritionHandler>,
        pub workouts: Arc<WorkoutHandler>,
        pub profile: Arc<ProfileHandler>,
        pub timezone: Tz,
    }

    pub fn create_api_router(state: AppState) -> Router {
        let state = Arc::new(state);

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route("/foods/search", get(search_foods))
            .route("/foods/analyze/text", post(analyze_text))
            .route("/foods/analyze/image", post(analyze_image))
            .route("/foods/suggestions", get(smart_suggestions))
            .route("/nutrition/today", get(nutrition_today))
            .route("/nutrition/meals/:meal/foods", post(add_food))
            .route("/nutrition/meals/:meal/foods/:food_id", delete(remove_food))
            .route("/workouts/exercises", get(exercise_catalog).post(add_exercise))
            .route("/workouts/current", get(current_workout))
            .route("/workouts/start", post(start_workout))
            .route("/workouts/sets", post(add_set))
            .route("/workouts/finish", post(finish_workout))
            .route("/workouts/records", get(personal_records))
            .route("/profile", get(profile_summary).put(update_profile))
            .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
            .with_state(state)
    }

    fn error_response(status: StatusCode, message: String) -> Response {
        (status, Json(ErrorBody { error: message })).into_response()
    }

    fn suggestion_error(e: SuggestionError) -> Response {
        let status = match &e {
            SuggestionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SuggestionError::ImageUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SuggestionError::UnknownFood(_) => StatusCode::NOT_FOUND,
            SuggestionError::Inference(_) => {
                log::error!("❌ Inference error: {}", e);
                StatusCode::BAD_GATEWAY
            }
        };
        error_response(status, e.to_string())
    }

    fn bad_request(e: anyhow::Error) -> Response {
        log::warn!("⚠️ Rejected request: {}", e);
        error_response(StatusCode::BAD_REQUEST, e.to_string())
    }

    async fn search_foods(
        State(state): State<Arc<AppState>>,
        Query(query): Query<SearchQuery>,
    ) -> Response {
        match state.nutrition.search(&query.q).await {
            Some(results) => Json(results).into_response(),
            // A newer search superseded this one
            None => StatusCode::NO_CONTENT.into_response(),
        }
    }

    async fn analyze_text(
        State(state): State<Arc<AppState>>,
        Json(request): Json<AnalyzeTextRequest>,
    ) -> Response {
        match state.engine.analyze_text(&request.description).await {
            Ok(result) => Json(result).into_response(),
            Err(e) => suggestion_error(e),
        }
    }

    async fn analyze_image(
        State(state): State<Arc<AppState>>,
        Json(request): Json<AnalyzeImageRequest>,
    ) -> Response {
        match state.engine.analyze_image(&request.image).await {
            Ok(result) => Json(result).into_response(),
            Err(e) => suggestion_error(e),
        }
    }

    async fn smart_suggestions(
        State(state): State<Arc<AppState>>,
        Query(query): Query<SuggestionQuery>,
    ) -> Response {
        let hour = query
            .hour
            .unwrap_or_else(|| Utc::now().with_timezone(&state.timezone).hour());
        Json(state.engine.smart_suggestions(&query.meal_type, hour).await).into_response()
    }

    async fn nutrition_today(State(state): State<Arc<AppState>>) -> Response {
        let nutrition = state.nutrition.snapshot().await;
        let progress = state.profile.progress(&nutrition).await;
        Json(TodayResponse { nutrition, progress }).into_response()
    }

    async fn add_food(
        State(state): State<Arc<AppState>>,
        Path(meal): Path<String>,
        Json(request): Json<AddFoodRequest>,
    ) -> Response {
        let meal_type = MealType::from_label(&meal);
        match state
            .nutrition
            .add_food_by_key(meal_type, &request.key, request.quantity())
            .await
        {
            Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
            Err(e) => suggestion_error(e),
        }
    }

    async fn remove_food(
        State(state): State<Arc<AppState>>,
        Path((meal_id, food_id)): Path<(u64, u64)>,
    ) -> Response {
        if state.nutrition.remove_food(meal_id, food_id).await {
            StatusCode::NO_CONTENT.into_response()
        } else {
            error_response(
                StatusCode::NOT_FOUND,
                format!("food {} not found in meal {}", food_id, meal_id),
            )
        }
    }

    async fn exercise_catalog(State(state): State<Arc<AppState>>) -> Response {
        Json(state.workouts.catalog().to_vec()).into_response()
    }

    async fn current_workout(State(state): State<Arc<AppState>>) -> Response {
        Json(state.workouts.current().await).into_response()
    }

    async fn start_workout(
        State(state): State<Arc<AppState>>,
        Json(request): Json<StartWorkoutRequest>,
    ) -> Response {
        match state.workouts.start_workout(&request.name).await {
            Ok(workout) => (StatusCode::CREATED, Json(workout)).into_response(),
            Err(e) => bad_request(e),
        }
    }

    async fn add_exercise(
        State(state): State<Arc<AppState>>,
        Json(request): Json<AddExerciseRequest>,
    ) -> Response {
        match state.workouts.add_exercise(&request.exercise_id).await {
            Ok(id) => (StatusCode::CREATED, Json(serde_json::json!({ "workout_exercise_id": id }))).into_response(),
            Err(e) => bad_request(e),
        }
    }

    async fn add_set(
        State(state): State<Arc<AppState>>,
        Json(request): Json<AddSetRequest>,
    ) -> Response {
        match state
            .workouts
            .add_set_from_input(request.workout_exercise_id, &request.weight, &request.reps)
            .await
        {
            Ok(set) => (StatusCode::CREATED, Json(set)).into_response(),
            Err(e) => bad_request(e),
        }
    }

    async fn finish_workout(State(state): State<Arc<AppState>>) -> Response {
        match state.workouts.finish_workout().await {
            Ok(workout) => Json(workout).into_response(),
            Err(e) => bad_request(e),
        }
    }

    async fn personal_records(State(state): State<Arc<AppState>>) -> Response {
        Json(state.workouts.personal_records().await).into_response()
    }

    async fn profile_summary(State(state): State<Arc<AppState>>) -> Response {
        Json(state.profile.summary().await).into_response()
    }

    async fn update_profile(
        State(state): State<Arc<AppState>>,
        Json(profile): Json<UserProfile>,
    ) -> Response {
        state.profile.update(profile).await;
        Json(state.profile.summary().await).into_response()
    }

    async fn root_handler() -> &'static str {
        "Fitness Tracker API - Use /foods/search?q= to look up foods"
    }

    async fn health_check() -> &'static str {
        "OK"
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_food_request_deserialization() {
        let request: AddFoodRequest =
            serde_json::from_str(r#"{"key": "banana", "quantity": 1.5}"#).unwrap();
        assert_eq!(request.key, "banana");
        assert_eq!(request.quantity(), 1.5);

        let request: AddFoodRequest =
            serde_json::from_str(r#"{"key": "banana", "quantity": "2 servings"}"#).unwrap();
        assert_eq!(request.quantity(), 2.0);

        let request: AddFoodRequest = serde_json::from_str(r#"{"key": "banana"}"#).unwrap();
        assert_eq!(request.quantity(), 1.0);

        let request: AddFoodRequest =
            serde_json::from_str(r#"{"key": "banana", "quantity": -4}"#).unwrap();
        assert_eq!(request.quantity(), 1.0);
    }

    #[test]
    fn test_analyze_image_request_deserialization() {
        let request: AnalyzeImageRequest =
            serde_json::from_str(r#"{"image": "file:///photos/lunch.jpg"}"#).unwrap();
        assert_eq!(request.image.as_str(), "file:///photos/lunch.jpg");
    }
}
