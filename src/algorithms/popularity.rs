use crate::models::{PopularityStat, RatingObservation};
use std::collections::HashMap;

/// Minimum number of ratings before a title qualifies for the popularity
/// ranking.
pub const MIN_RATING_COUNT: usize = 50;

pub const DEFAULT_TOP_N: usize = 5;

/// Ranks titles by mean rating, independent of the correlation pipeline.
///
/// Titles with fewer than `min_count` ratings are filtered out. The sort is
/// stable and titles accumulate in input encounter order, so exact ties
/// keep that order. Returning fewer than `top_n` entries is not an error.
pub fn rank_by_popularity(
    observations: &[RatingObservation],
    min_count: usize,
    top_n: usize,
) -> Vec<PopularityStat> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, f64, usize)> = Vec::new();

    for obs in observations {
        match index.get(obs.title.as_str()) {
            Some(&slot) => {
                totals[slot].1 += obs.rating;
                totals[slot].2 += 1;
            }
            None => {
                index.insert(obs.title.as_str(), totals.len());
                totals.push((obs.title.as_str(), obs.rating, 1));
            }
        }
    }

    let mut qualified: Vec<PopularityStat> = totals
        .into_iter()
        .filter(|&(_, _, count)| count >= min_count)
        .map(|(title, sum, count)| PopularityStat {
            title: title.to_string(),
            mean_rating: sum / count as f64,
            rating_count: count,
        })
        .collect();

    qualified.sort_by(|a, b| {
        b.mean_rating
            .partial_cmp(&a.mean_rating)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    qualified.truncate(top_n);
    qualified
}
