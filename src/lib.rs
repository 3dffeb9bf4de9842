pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult, DatasetError};
pub use models::*;

use anyhow::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dataset: Arc<services::dataset::Dataset>,
    pub model_cache: Arc<services::model_cache::ModelCache>,
    pub recommendation_service: Arc<services::recommendation::RecommendationService>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        // A load failure is fatal; nothing downstream runs on partial data.
        let dataset = services::dataset::DatasetLoader::new(config.clone()).load()?;

        let model_cache = Arc::new(services::model_cache::ModelCache::new());

        let recommendation_service = Arc::new(
            services::recommendation::RecommendationService::new(
                dataset.clone(),
                model_cache.clone(),
                config.clone(),
            ),
        );

        Ok(Self {
            config,
            dataset,
            model_cache,
            recommendation_service,
        })
    }
}

pub async fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
