use crate::algorithms::{aggregate, rank_by_popularity, AggregateOutcome};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::dataset::Dataset;
use crate::services::model_cache::ModelCache;
use crate::utils::validation::validate_recommendation_request;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrates the pipeline: seed validation, popularity fallback, and
/// correlation-based aggregation over the cached model.
pub struct RecommendationService {
    dataset: Arc<Dataset>,
    model_cache: Arc<ModelCache>,
    config: Arc<Config>,
}

impl RecommendationService {
    pub fn new(dataset: Arc<Dataset>, model_cache: Arc<ModelCache>, config: Arc<Config>) -> Self {
        Self {
            dataset,
            model_cache,
            config,
        }
    }

    /// Distinct catalog titles for the selection surface.
    pub fn titles(&self) -> Vec<String> {
        self.dataset.titles()
    }

    pub fn popular(&self, top_n: Option<usize>) -> Vec<PopularityStat> {
        let rec = &self.config.recommendation;
        rank_by_popularity(
            &self.dataset.observations,
            rec.min_rating_count,
            top_n.unwrap_or(rec.top_n),
        )
    }

    /// Builds the model eagerly so the first request does not pay for the
    /// pairwise pass.
    pub async fn warm(&self) -> AppResult<()> {
        self.model().await?;
        Ok(())
    }

    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> AppResult<RecommendationResponse> {
        let rec = &self.config.recommendation;
        let top_n = request.top_n.unwrap_or(rec.top_n);

        // Zero seeds is not an error: fall back to the popularity ranking.
        if request.seed_titles.is_empty() {
            info!("no seed titles selected, falling back to popularity ranking");
            return Ok(RecommendationResponse {
                result: RecommendationResult::PopularFallback {
                    items: self.popular(Some(top_n)),
                    message: "No titles selected; showing the highest-rated titles overall."
                        .to_string(),
                },
                skipped_seeds: Vec::new(),
                generated_at: Utc::now(),
            });
        }

        validate_recommendation_request(request, rec.min_seed_titles)?;

        let model = self.model().await?;

        // The aggregator skips these silently; report them here instead.
        let skipped_seeds: Vec<String> = request
            .seed_titles
            .iter()
            .filter(|title| !model.correlations.has_neighbors(title))
            .cloned()
            .collect();
        if !skipped_seeds.is_empty() {
            warn!(
                "{} seed titles had no correlation data and were skipped",
                skipped_seeds.len()
            );
        }

        let result = match aggregate(&model.correlations, &request.seed_titles, top_n) {
            AggregateOutcome::Ranked(items) => RecommendationResult::Ranked { items },
            AggregateOutcome::InsufficientData => RecommendationResult::InsufficientData {
                message: "Not enough overlapping ratings for these titles; \
                          try more widely-rated ones."
                    .to_string(),
            },
        };

        Ok(RecommendationResponse {
            result,
            skipped_seeds,
            generated_at: Utc::now(),
        })
    }

    async fn model(&self) -> AppResult<Arc<crate::services::model_cache::RecommendationModel>> {
        self.model_cache
            .get_or_build(
                self.dataset.clone(),
                self.config.recommendation.min_support,
            )
            .await
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}
