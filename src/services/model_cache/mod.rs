use crate::algorithms::{CorrelationMatrix, UserItemMatrix};
use crate::services::dataset::Dataset;
use anyhow::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::info;

/// The derived tables for one dataset load: pure functions of the
/// observation set, read-only once built, safe to share across requests.
#[derive(Debug)]
pub struct RecommendationModel {
    pub matrix: UserItemMatrix,
    pub correlations: CorrelationMatrix,
}

/// Single-flight cache of recommendation models keyed by dataset
/// fingerprint.
///
/// At most one build runs per key; concurrent callers for the same key
/// await the in-flight build instead of recomputing. Entries live until the
/// underlying dataset changes (a new fingerprint is simply a new key).
pub struct ModelCache {
    cells: DashMap<u64, Arc<OnceCell<Arc<RecommendationModel>>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cells: DashMap::new(),
        }
    }

    pub async fn get_or_build(
        &self,
        dataset: Arc<Dataset>,
        min_support: usize,
    ) -> Result<Arc<RecommendationModel>> {
        let cell = self
            .cells
            .entry(dataset.fingerprint)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let model = cell
            .get_or_try_init(|| async {
                let fingerprint = dataset.fingerprint;
                let started = Instant::now();
                // The pairwise pass is CPU-heavy; keep it off the runtime
                // worker threads.
                let model = tokio::task::spawn_blocking(move || {
                    let matrix = UserItemMatrix::from_observations(&dataset.observations);
                    let correlations = CorrelationMatrix::with_min_support(&matrix, min_support);
                    RecommendationModel {
                        matrix,
                        correlations,
                    }
                })
                .await?;
                info!(
                    "Built recommendation model for dataset {:016x} in {}ms",
                    fingerprint,
                    started.elapsed().as_millis()
                );
                Ok::<_, anyhow::Error>(Arc::new(model))
            })
            .await?;

        Ok(model.clone())
    }

    pub fn invalidate(&self, fingerprint: u64) {
        self.cells.remove(&fingerprint);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}
