use crate::error::AppError;
use crate::models::RecommendationRequest;

/// Rejects requests the aggregator must never see. Zero seeds is handled
/// upstream by the popularity fallback; this guards the 1-or-2 seed case
/// and degenerate top_n values.
pub fn validate_recommendation_request(
    request: &RecommendationRequest,
    min_seed_titles: usize,
) -> Result<(), AppError> {
    if !request.seed_titles.is_empty() && request.seed_titles.len() < min_seed_titles {
        return Err(AppError::SeedSelection(format!(
            "select at least {} titles ({} given)",
            min_seed_titles,
            request.seed_titles.len()
        )));
    }

    if request.top_n == Some(0) {
        return Err(AppError::SeedSelection(
            "top_n must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
