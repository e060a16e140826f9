use std::time::Duration;

use crate::error::{Result, SuggestionError};
use crate::models::ImageHandle;

/// Engine operations that may wait on model latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    TextAnalysis,
    ImageAnalysis,
    SmartSuggestions,
    Search,
}

/// Stand-in for the time a model call takes. Production uses `NoLatency`;
/// the real delay comes from the recognizer call itself.
#[async_trait::async_trait]
pub trait Latency: Send + Sync {
    async fn pause(&self, operation: Operation);
}

pub struct NoLatency;

#[async_trait::async_trait]
impl Latency for NoLatency {
    async fn pause(&self, _operation: Operation) {}
}

/// Fixed per-operation delays for demos.
#[derive(Debug, Clone)]
pub struct SimulatedLatency {
    pub text: Duration,
    pub image: Duration,
    pub smart: Duration,
    pub search: Duration,
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        Self {
            text: Duration::from_millis(800),
            image: Duration::from_millis(1500),
            smart: Duration::from_millis(300),
            search: Duration::from_millis(200),
        }
    }
}

impl SimulatedLatency {
    fn delay_for(&self, operation: Operation) -> Duration {
        match operation {
            Operation::TextAnalysis => self.text,
            Operation::ImageAnalysis => self.image,
            Operation::SmartSuggestions => self.smart,
            Operation::Search => self.search,
        }
    }
}

#[async_trait::async_trait]
impl Latency for SimulatedLatency {
    async fn pause(&self, operation: Operation) {
        let delay = self.delay_for(operation);
        log::debug!("⏳ Simulating {:?} latency: {} ms", operation, delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}

/// Trait for food recognition backends (vision models, etc.)
#[async_trait::async_trait]
pub trait FoodRecognizer: Send + Sync {
    /// Food names detected in the image, most prominent first.
    async fn detect_foods(&self, image: &ImageHandle) -> Result<Vec<String>>;
}

/// Answers every image with the same three foods. Placeholder until a vision
/// model is configured; not real recognition.
pub struct PlaceholderRecognizer;

impl PlaceholderRecognizer {
    const DETECTED: [&'static str; 3] = ["chicken breast", "rice", "broccoli"];
}

#[async_trait::async_trait]
impl FoodRecognizer for PlaceholderRecognizer {
    async fn detect_foods(&self, image: &ImageHandle) -> Result<Vec<String>> {
        if image.is_empty() {
            return Err(SuggestionError::ImageUnavailable("empty image handle".to_string()));
        }

        log::warn!("⚠️ Placeholder recognizer in use, returning fixed foods for {}", image.as_str());
        Ok(Self::DETECTED.iter().map(|s| s.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_latency_defaults() {
        let latency = SimulatedLatency::default();
        assert_eq!(latency.delay_for(Operation::TextAnalysis), Duration::from_millis(800));
        assert_eq!(latency.delay_for(Operation::ImageAnalysis), Duration::from_millis(1500));
        assert_eq!(latency.delay_for(Operation::SmartSuggestions), Duration::from_millis(300));
        assert_eq!(latency.delay_for(Operation::Search), Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_simulated_latency_waits() {
        let latency = SimulatedLatency {
            text: Duration::from_millis(20),
            image: Duration::ZERO,
            smart: Duration::ZERO,
            search: Duration::ZERO,
        };

        let started = std::time::Instant::now();
        latency.pause(Operation::TextAnalysis).await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_placeholder_recognizer() {
        let foods = PlaceholderRecognizer
            .detect_foods(&ImageHandle::new("file:///tmp/lunch.jpg"))
            .await
            .unwrap();
        assert_eq!(foods, vec!["chicken breast", "rice", "broccoli"]);
    }

    #[tokio::test]
    async fn test_placeholder_recognizer_rejects_empty_handle() {
        let result = PlaceholderRecognizer.detect_foods(&ImageHandle::new("")).await;
        assert!(matches!(result, Err(SuggestionError::ImageUnavailable(_))));
    }
}
