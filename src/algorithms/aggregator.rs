use crate::algorithms::similarity::CorrelationMatrix;
use crate::models::ScoredTitle;
use std::collections::{HashMap, HashSet};

/// Outcome of score aggregation over a seed set.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutcome {
    Ranked(Vec<ScoredTitle>),
    /// No candidate had a defined correlation to any seed. Distinct from a
    /// short ranked list so callers can suggest choosing more widely-rated
    /// titles.
    InsufficientData,
}

/// Union-sums defined correlations from each seed into candidate scores and
/// ranks the candidates.
///
/// A candidate correlated with only one seed still scores; seeds with no
/// correlation data are silently skipped (the caller may warn); seed titles
/// never appear in the output, even when correlated with another seed. The
/// sum is commutative, and ties break by column order in the matrix, so the
/// ranking is independent of seed order.
pub fn aggregate(
    correlations: &CorrelationMatrix,
    seed_titles: &[String],
    top_n: usize,
) -> AggregateOutcome {
    let seed_columns: HashSet<usize> = seed_titles
        .iter()
        .filter_map(|title| correlations.index_of(title))
        .collect();

    let mut scores: HashMap<usize, f64> = HashMap::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for title in seed_titles {
        // A repeated seed must not double its contribution.
        if !seen.insert(title.as_str()) {
            continue;
        }
        let Some(seed) = correlations.index_of(title) else {
            continue;
        };
        for &(candidate, correlation) in correlations.neighbors(seed) {
            *scores.entry(candidate).or_insert(0.0) += correlation;
        }
    }

    for seed in &seed_columns {
        scores.remove(seed);
    }

    if scores.is_empty() {
        return AggregateOutcome::InsufficientData;
    }

    let mut ranked: Vec<(usize, f64)> = scores.into_iter().collect();
    // Column order first, then a stable sort on score, so ties fall back to
    // column order no matter how the seeds were listed.
    ranked.sort_unstable_by_key(|&(column, _)| column);
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    AggregateOutcome::Ranked(
        ranked
            .into_iter()
            .take(top_n)
            .map(|(column, score)| ScoredTitle {
                title: correlations.title(column).to_string(),
                score,
            })
            .collect(),
    )
}
