//! Validation for 0 to 100 scores.

use validator::ValidationError;

/// Accepts finite scores between 0 and 100 inclusive. NaN is rejected.
pub fn validate_score(value: impl std::borrow::Borrow<f64>) -> Result<(), ValidationError> {
    let value: &f64 = value.borrow();
    if value.is_finite() && (0.0..=100.0).contains(value) {
        Ok(())
    } else {
        Err(ValidationError::new("score_range")
            .with_message("must be a finite number between 0 and 100".into()))
    }
}
