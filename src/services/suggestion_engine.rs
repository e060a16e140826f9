use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Result, SuggestionError};
use crate::models::{AnalysisKind, AnalysisResult, FoodSuggestion, ImageHandle, MealType, NutritionFact};
use crate::services::ai_service::{FoodRecognizer, Latency, NoLatency, Operation, PlaceholderRecognizer};
use crate::services::food_database::FoodDictionary;

const NAME_MATCH: f64 = 0.9;
const ALIAS_MATCH: f64 = 0.8;
const NAME_TOKEN_MATCH: f64 = 0.6;
const ALIAS_TOKEN_MATCH: f64 = 0.5;
const MIN_CONFIDENCE: f64 = 0.4;

const MAX_TEXT_SUGGESTIONS: usize = 5;
const MAX_IMAGE_SUGGESTIONS: usize = 3;
const IMAGE_CONFIDENCE: f64 = 0.85;
const SMART_CONFIDENCE: f64 = 0.8;
const MIN_SEARCH_CHARS: usize = 2;
const MIN_TOKEN_CHARS: usize = 3;

/// Lower-case, trim, then drop everything that is not a word character or
/// whitespace.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}

fn smart_keys(meal_type: &MealType) -> &'static [&'static str] {
    match meal_type {
        MealType::Breakfast => &["oatmeal", "eggs", "banana", "greek_yogurt"],
        MealType::Lunch => &["chicken_breast", "rice", "broccoli", "salmon"],
        MealType::Dinner => &["salmon", "chicken_breast", "broccoli", "rice"],
        MealType::Snacks => &["apple", "banana", "greek_yogurt", "avocado"],
        MealType::Other(_) => &["apple", "banana", "chicken_breast"],
    }
}

pub struct FoodSuggestionEngine {
    dictionary: FoodDictionary,
    latency: Arc<dyn Latency>,
    recognizer: Arc<dyn FoodRecognizer>,
}

impl FoodSuggestionEngine {
    pub fn new(
        dictionary: FoodDictionary,
        latency: Arc<dyn Latency>,
        recognizer: Arc<dyn FoodRecognizer>,
    ) -> Self {
        Self {
            dictionary,
            latency,
            recognizer,
        }
    }

    /// No artificial delay, placeholder image recognition.
    pub fn with_defaults() -> Self {
        Self::new(
            FoodDictionary::new(),
            Arc::new(NoLatency),
            Arc::new(PlaceholderRecognizer),
        )
    }

    pub fn dictionary(&self) -> &FoodDictionary {
        &self.dictionary
    }

    fn confidence_for(fact: &NutritionFact, query: &str) -> f64 {
        let name = normalize(&fact.name);
        let aliases: Vec<String> = fact.aliases.iter().map(|a| normalize(a)).collect();

        if name.contains(query) {
            return NAME_MATCH;
        }
        if aliases.iter().any(|alias| alias.contains(query)) {
            return ALIAS_MATCH;
        }

        let mut confidence: f64 = 0.0;
        for token in query
            .split_whitespace()
            .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        {
            if name.contains(token) {
                confidence = confidence.max(NAME_TOKEN_MATCH);
            }
            if aliases.iter().any(|alias| alias.contains(token)) {
                confidence = confidence.max(ALIAS_TOKEN_MATCH);
            }
        }
        confidence
    }

    /// Ranks dictionary foods against `query`, best first, at most five.
    /// Pure: the same query always yields the same list.
    pub fn score(&self, query: &str) -> Vec<FoodSuggestion> {
        // An empty normalized query is contained in every name
        let normalized = normalize(query);

        log::debug!("🔍 Searching for food matches: '{}'", normalized);

        let mut suggestions: Vec<FoodSuggestion> = self
            .dictionary
            .iter()
            .filter_map(|fact| {
                let confidence = Self::confidence_for(fact, &normalized);
                (confidence > MIN_CONFIDENCE).then(|| FoodSuggestion::from_fact(fact, confidence))
            })
            .collect();

        // sort_by is stable, so ties keep dictionary order
        suggestions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        suggestions.truncate(MAX_TEXT_SUGGESTIONS);
        suggestions
    }

    pub async fn analyze_text(&self, description: &str) -> Result<AnalysisResult> {
        if description.trim().is_empty() {
            return Err(SuggestionError::InvalidInput(
                "food description is empty".to_string(),
            ));
        }

        log::info!("📝 Analyzing text input: '{}'", description);
        let started = Instant::now();

        self.latency.pause(Operation::TextAnalysis).await;
        let suggestions = self.score(description);

        let overall_confidence = suggestions.first().map(|s| s.confidence).unwrap_or(0.0);
        let processing_duration_ms = started.elapsed().as_millis() as u64;

        log::info!(
            "✅ Text analysis found {} suggestions in {} ms",
            suggestions.len(),
            processing_duration_ms
        );

        Ok(AnalysisResult {
            suggestions,
            analysis_kind: AnalysisKind::Text,
            overall_confidence,
            processing_duration_ms,
        })
    }

    pub async fn analyze_image(&self, image: &ImageHandle) -> Result<AnalysisResult> {
        log::info!("📸 Analyzing image input: {}", image.as_str());
        let started = Instant::now();

        self.latency.pause(Operation::ImageAnalysis).await;
        let detected = self.recognizer.detect_foods(image).await?;
        log::debug!("🍽️ Detected foods: {:?}", detected);

        let mut suggestions: Vec<FoodSuggestion> = Vec::new();
        for food in &detected {
            for suggestion in self.score(food) {
                if !suggestions.iter().any(|s| s.key == suggestion.key) {
                    suggestions.push(suggestion);
                }
            }
        }
        suggestions.truncate(MAX_IMAGE_SUGGESTIONS);

        let overall_confidence = if suggestions.is_empty() { 0.0 } else { IMAGE_CONFIDENCE };
        let processing_duration_ms = started.elapsed().as_millis() as u64;

        log::info!(
            "✅ Image analysis found {} suggestions in {} ms",
            suggestions.len(),
            processing_duration_ms
        );

        Ok(AnalysisResult {
            suggestions,
            analysis_kind: AnalysisKind::Image,
            overall_confidence,
            processing_duration_ms,
        })
    }

    /// Fixed meal-type lookup. `hour_of_day` does not change the result yet.
    pub async fn smart_suggestions(&self, meal_type: &str, hour_of_day: u32) -> Vec<FoodSuggestion> {
        log::debug!("💡 Smart suggestions for '{}' at hour {}", meal_type, hour_of_day);

        self.latency.pause(Operation::SmartSuggestions).await;

        smart_keys(&MealType::from_label(meal_type))
            .iter()
            .filter_map(|key| self.dictionary.get(key))
            .map(|fact| FoodSuggestion::from_fact(fact, SMART_CONFIDENCE))
            .collect()
    }

    pub async fn search_database(&self, query: &str) -> Vec<FoodSuggestion> {
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Vec::new();
        }

        self.latency.pause(Operation::Search).await;
        self.score(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    struct CountingLatency(AtomicUsize);

    #[async_trait::async_trait]
    impl Latency for CountingLatency {
        async fn pause(&self, _operation: Operation) {
            self.0.fetch_add(1, AtomicOrdering::SeqCst);
        }
    }

    struct FixedRecognizer(Vec<&'static str>);

    #[async_trait::async_trait]
    impl FoodRecognizer for FixedRecognizer {
        async fn detect_foods(&self, _image: &ImageHandle) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    fn engine() -> FoodSuggestionEngine {
        FoodSuggestionEngine::with_defaults()
    }

    fn keys(suggestions: &[FoodSuggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.key.as_str()).collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Grilled Chicken!  "), "grilled chicken");
        assert_eq!(normalize("Non-Fat Greek-Yogurt"), "nonfat greekyogurt");
        assert_eq!(normalize("greek_yogurt"), "greek_yogurt");
        assert_eq!(normalize("?!"), "");
    }

    #[test]
    fn test_score_full_name_match() {
        let results = engine().score("chicken");
        let chicken = results.iter().find(|s| s.key == "chicken_breast").unwrap();
        assert_eq!(chicken.confidence, 0.9);
        assert_eq!(chicken.name, "Chicken Breast");
    }

    #[test]
    fn test_score_alias_match() {
        let results = engine().score("grilled chicken");
        assert_eq!(results[0].key, "chicken_breast");
        assert_eq!(results[0].confidence, 0.8);
    }

    #[test]
    fn test_score_token_matches() {
        // "grilled" only hits aliases, "salmon" hits a name
        let results = engine().score("grilled salmon tonight");
        assert_eq!(keys(&results), vec!["salmon", "chicken_breast"]);
        assert_eq!(results[0].confidence, 0.6);
        assert_eq!(results[1].confidence, 0.5);
    }

    #[test]
    fn test_score_short_tokens_ignored() {
        assert!(engine().score("an ox ok").is_empty());
    }

    #[test]
    fn test_score_no_match() {
        assert!(engine().score("xyz123").is_empty());
    }

    #[test]
    fn test_score_punctuation_only_query_matches_every_name() {
        let results = engine().score("?!");
        assert_eq!(keys(&results), vec!["apple", "banana", "chicken_breast", "rice", "broccoli"]);
        assert!(results.iter().all(|s| s.confidence == 0.9));

        assert_eq!(engine().score("   ").len(), 5);
    }

    #[tokio::test]
    async fn test_search_database_punctuation_only_query() {
        let results = engine().search_database("!!").await;
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].key, "apple");
    }

    #[tokio::test]
    async fn test_analyze_text_punctuation_only_query() {
        let result = engine().analyze_text("...").await.unwrap();
        assert_eq!(result.suggestions.len(), 5);
        assert_eq!(result.overall_confidence, 0.9);
    }

    #[test]
    fn test_score_bounded_sorted_unique() {
        // "e" appears in almost every name
        let results = engine().score("e");
        assert_eq!(results.len(), 5);
        assert!(results.windows(2).all(|w| w[0].confidence >= w[1].confidence));

        let unique: HashSet<_> = results.iter().map(|s| s.key.clone()).collect();
        assert_eq!(unique.len(), results.len());
    }

    #[test]
    fn test_score_ties_keep_dictionary_order() {
        let results = engine().score("rice");
        assert_eq!(keys(&results), vec!["rice"]);

        let results = engine().score("ripe");
        assert_eq!(keys(&results), vec!["banana", "avocado"]);
        assert!(results.iter().all(|s| s.confidence == 0.8));
    }

    #[test]
    fn test_score_is_idempotent() {
        let engine = engine();
        assert_eq!(engine.score("cooked rice"), engine.score("cooked rice"));
    }

    #[tokio::test]
    async fn test_analyze_text() {
        let result = engine().analyze_text("Oats with banana").await.unwrap();

        assert_eq!(result.analysis_kind, AnalysisKind::Text);
        assert_eq!(keys(&result.suggestions), vec!["banana", "oatmeal"]);
        assert_eq!(result.overall_confidence, 0.6);
    }

    #[tokio::test]
    async fn test_analyze_text_no_match_is_not_an_error() {
        let result = engine().analyze_text("pizza").await.unwrap();
        assert!(result.suggestions.is_empty());
        assert_eq!(result.overall_confidence, 0.0);
    }

    #[tokio::test]
    async fn test_analyze_text_rejects_blank_input() {
        let result = engine().analyze_text("  \t ").await;
        assert!(matches!(result, Err(SuggestionError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_analyze_image_with_placeholder() {
        let result = engine()
            .analyze_image(&ImageHandle::new("/tmp/plate.jpg"))
            .await
            .unwrap();

        assert_eq!(result.analysis_kind, AnalysisKind::Image);
        assert_eq!(keys(&result.suggestions), vec!["chicken_breast", "rice", "broccoli"]);
        assert_eq!(result.overall_confidence, 0.85);
    }

    #[tokio::test]
    async fn test_analyze_image_dedupes_and_truncates() {
        let engine = FoodSuggestionEngine::new(
            FoodDictionary::new(),
            Arc::new(NoLatency),
            Arc::new(FixedRecognizer(vec!["salmon", "salmon fillet", "ripe", "apple"])),
        );

        let result = engine.analyze_image(&ImageHandle::new("img")).await.unwrap();
        assert_eq!(keys(&result.suggestions), vec!["salmon", "banana", "avocado"]);
    }

    #[tokio::test]
    async fn test_analyze_image_nothing_detected() {
        let engine = FoodSuggestionEngine::new(
            FoodDictionary::new(),
            Arc::new(NoLatency),
            Arc::new(FixedRecognizer(vec!["pizza"])),
        );

        let result = engine.analyze_image(&ImageHandle::new("img")).await.unwrap();
        assert!(result.suggestions.is_empty());
        assert_eq!(result.overall_confidence, 0.0);
    }

    #[tokio::test]
    async fn test_analyze_image_unavailable() {
        let result = engine().analyze_image(&ImageHandle::new("")).await;
        assert!(matches!(result, Err(SuggestionError::ImageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_smart_suggestions_breakfast() {
        let engine = engine();
        for hour in [0, 7, 23] {
            let results = engine.smart_suggestions("Breakfast", hour).await;
            assert_eq!(keys(&results), vec!["oatmeal", "eggs", "banana", "greek_yogurt"]);
            assert!(results.iter().all(|s| s.confidence == 0.8));
        }
    }

    #[tokio::test]
    async fn test_smart_suggestions_other_meal_types() {
        let engine = engine();
        assert_eq!(
            keys(&engine.smart_suggestions("DINNER", 19).await),
            vec!["salmon", "chicken_breast", "broccoli", "rice"]
        );
        assert_eq!(
            keys(&engine.smart_suggestions("snacks", 15).await),
            vec!["apple", "banana", "greek_yogurt", "avocado"]
        );
        assert_eq!(
            keys(&engine.smart_suggestions("midnight feast", 2).await),
            vec!["apple", "banana", "chicken_breast"]
        );
    }

    #[tokio::test]
    async fn test_search_database_short_query_skips_scoring() {
        let latency = Arc::new(CountingLatency(AtomicUsize::new(0)));
        let engine = FoodSuggestionEngine::new(
            FoodDictionary::new(),
            latency.clone(),
            Arc::new(PlaceholderRecognizer),
        );

        assert!(engine.search_database("a").await.is_empty());
        assert!(engine.search_database("").await.is_empty());
        assert_eq!(latency.0.load(AtomicOrdering::SeqCst), 0);

        let results = engine.search_database("egg").await;
        assert_eq!(keys(&results), vec!["eggs"]);
        assert_eq!(latency.0.load(AtomicOrdering::SeqCst), 1);
    }
}
