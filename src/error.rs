use thiserror::Error;

/// Errors surfaced by the food suggestion engine and the logs built on it.
/// "No matches" is not an error; it is an empty result.
#[derive(Error, Debug)]
pub enum SuggestionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("image unavailable: {0}")]
    ImageUnavailable(String),

    #[error("unknown food: {0}")]
    UnknownFood(String),

    #[error("inference failed: {0}")]
    Inference(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SuggestionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_input() {
        let error = SuggestionError::InvalidInput("description is empty".to_string());
        assert_eq!(format!("{}", error), "invalid input: description is empty");
    }

    #[test]
    fn test_error_from_anyhow() {
        let error: SuggestionError = anyhow::anyhow!("OpenRouter API error (500)").into();
        assert!(matches!(error, SuggestionError::Inference(_)));
        assert!(error.to_string().contains("500"));
    }
}
