use anyhow::Result;
use chrono::Utc;
use dotenv::dotenv;
use std::sync::Arc;

use fitness_tracker::config::Config;
use fitness_tracker::handlers::{NutritionHandler, ProfileHandler, WorkoutHandler};
use fitness_tracker::services::{
    FoodDictionary, FoodRecognizer, FoodSuggestionEngine, Latency, NoLatency, OpenRouterRecognizer,
    PlaceholderRecognizer, SimulatedLatency,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Fitness Tracker...");

    let config = Config::from_env()?;

    let recognizer: Arc<dyn FoodRecognizer> = match &config.openrouter_api_key {
        Some(api_key) => {
            log::info!("✅ OpenRouter recognizer initialized with model: {}", config.openrouter_model);
            Arc::new(OpenRouterRecognizer::new(api_key.clone(), config.openrouter_model.clone()))
        }
        None => {
            log::warn!("⚠️ OPENROUTER_API_KEY not set, image analysis uses the placeholder recognizer");
            Arc::new(PlaceholderRecognizer)
        }
    };

    let latency: Arc<dyn Latency> = if config.simulate_latency {
        log::info!("⏳ Simulated model latency enabled");
        Arc::new(SimulatedLatency::default())
    } else {
        Arc::new(NoLatency)
    };

    let engine = Arc::new(FoodSuggestionEngine::new(FoodDictionary::new(), latency, recognizer));
    log::info!("✅ Food suggestion engine initialized ({} foods)", engine.dictionary().len());

    let today = config.local_date(Utc::now());
    let nutrition = Arc::new(NutritionHandler::new(engine.clone(), today));
    let workouts = Arc::new(WorkoutHandler::default());
    let profile = Arc::new(ProfileHandler::new(config.profile.clone()));
    log::info!("✅ Handlers initialized for {} ({})", config.profile.name, config.timezone);

    #[cfg(feature = "api-server")]
    {
        use fitness_tracker::api::server::{create_api_router, AppState};

        let app = create_api_router(AppState {
            engine: engine.clone(),
            nutrition: nutrition.clone(),
            workouts: workouts.clone(),
            profile: profile.clone(),
            timezone: config.timezone,
        });

        let listener = tokio::net::TcpListener::bind(&config.api_addr).await?;
        log::info!("🌐 API server listening on {}", config.api_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("❌ API server stopped: {}", e);
            }
        });
    }

    #[cfg(not(feature = "api-server"))]
    {
        let hour = config.local_hour(Utc::now());
        let suggestions = engine.smart_suggestions("breakfast", hour).await;
        log::info!(
            "💡 API server disabled; sample breakfast suggestions: {:?}",
            suggestions.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
        );
        let summary = profile.summary().await;
        log::info!(
            "👤 BMI {} ({:?}), {} exercises in catalog",
            summary.bmi,
            summary.bmi_category,
            workouts.catalog().len()
        );
    }

    log::info!("🎉 Tracker is ready!");
    println!("\n🏋️ Fitness Tracker is running!");
    #[cfg(feature = "api-server")]
    {
        println!("🌐 API: http://{}", config.api_addr);
        println!("   GET  /foods/search?q=salmon");
        println!("   POST /foods/analyze/text   {{\"description\": \"grilled chicken\"}}");
        println!("   GET  /foods/suggestions?meal_type=breakfast");
        println!("   PUT  /profile");
    }
    println!("\n🛑 Press Ctrl+C to stop\n");

    // Keep running
    tokio::signal::ctrl_c().await?;

    let day = nutrition.snapshot().await;
    log::info!("🛑 Shutting down... ({} kcal logged on {})", day.calories, day.date);

    Ok(())
}
