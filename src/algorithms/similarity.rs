use crate::algorithms::matrix::UserItemMatrix;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Minimum number of co-raters before a pairwise correlation is considered
/// statistically meaningful.
pub const MIN_SUPPORT: usize = 30;

/// Symmetric title-by-title Pearson correlation matrix.
///
/// Only defined entries are stored: a pair is undefined when fewer than the
/// support threshold of users rated both titles, or when either sample has
/// zero variance. Undefined is an explicit "no similarity data" state,
/// distinct from a correlation of 0. The diagonal is 1.0 by definition.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    titles: Vec<String>,
    title_index: HashMap<String, usize>,
    /// Per title: (other column index, correlation), ascending by index.
    /// Mirrored on construction, so lookups never need to normalize.
    neighbors: Vec<Vec<(usize, f64)>>,
}

impl CorrelationMatrix {
    pub fn from_matrix(matrix: &UserItemMatrix) -> Self {
        Self::with_min_support(matrix, MIN_SUPPORT)
    }

    pub fn with_min_support(matrix: &UserItemMatrix, min_support: usize) -> Self {
        let count = matrix.title_count();
        let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); count];

        // Upper triangle only; mirror into both adjacency lists.
        for i in 0..count {
            for j in (i + 1)..count {
                if let Some(r) = pairwise_pearson(matrix.column(i), matrix.column(j), min_support)
                {
                    neighbors[i].push((j, r));
                    neighbors[j].push((i, r));
                }
            }
        }

        // Mirrored lower-index entries arrive out of order.
        for list in &mut neighbors {
            list.sort_unstable_by_key(|&(index, _)| index);
        }

        let defined: usize = neighbors.iter().map(Vec::len).sum();
        debug!(
            "Built correlation matrix: {} titles, {} defined pairs",
            count,
            defined / 2
        );

        let title_index = matrix
            .titles()
            .iter()
            .enumerate()
            .map(|(index, title)| (title.clone(), index))
            .collect();

        Self {
            titles: matrix.titles().to_vec(),
            title_index,
            neighbors,
        }
    }

    pub fn title(&self, index: usize) -> &str {
        &self.titles[index]
    }

    pub fn index_of(&self, title: &str) -> Option<usize> {
        self.title_index.get(title).copied()
    }

    /// Whether the title has at least one defined correlation. Titles with
    /// no defined pair carry no similarity signal at all.
    pub fn has_neighbors(&self, title: &str) -> bool {
        self.index_of(title)
            .map(|index| !self.neighbors[index].is_empty())
            .unwrap_or(false)
    }

    /// Defined correlations for one column, ascending by column index.
    pub fn neighbors(&self, index: usize) -> &[(usize, f64)] {
        &self.neighbors[index]
    }

    /// The correlation between two titles, or `None` when the pair is
    /// undefined or either title is unknown.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        if i == j {
            return Some(1.0);
        }
        self.neighbors[i]
            .binary_search_by_key(&j, |&(index, _)| index)
            .ok()
            .map(|pos| self.neighbors[i][pos].1)
    }

    /// Builds a matrix directly from precomputed entries. Each (i, j, r)
    /// defines the pair in both directions; unspecified pairs stay undefined.
    pub fn from_entries(titles: Vec<String>, entries: &[(usize, usize, f64)]) -> Self {
        let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); titles.len()];
        for &(i, j, r) in entries {
            neighbors[i].push((j, r));
            neighbors[j].push((i, r));
        }
        for list in &mut neighbors {
            list.sort_unstable_by_key(|&(index, _)| index);
        }
        let title_index = titles
            .iter()
            .enumerate()
            .map(|(index, title)| (title.clone(), index))
            .collect();
        Self {
            titles,
            title_index,
            neighbors,
        }
    }
}

/// Pearson coefficient over the users present in both columns.
///
/// Both slices must be sorted by user id; the overlap is found with a
/// two-pointer merge and the statistic is derived from running sums in the
/// same pass, so cost is linear in the overlap rather than the user count.
/// Returns `None` below the support threshold or when either sample has
/// zero variance.
fn pairwise_pearson(x: &[(u32, f64)], y: &[(u32, f64)], min_support: usize) -> Option<f64> {
    let (mut i, mut j) = (0usize, 0usize);
    let mut n = 0usize;
    let (mut sum_x, mut sum_y) = (0.0f64, 0.0f64);
    let (mut sum_xx, mut sum_yy, mut sum_xy) = (0.0f64, 0.0f64, 0.0f64);

    while i < x.len() && j < y.len() {
        match x[i].0.cmp(&y[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                let (a, b) = (x[i].1, y[j].1);
                n += 1;
                sum_x += a;
                sum_y += b;
                sum_xx += a * a;
                sum_yy += b * b;
                sum_xy += a * b;
                i += 1;
                j += 1;
            }
        }
    }

    if n < min_support || n == 0 {
        return None;
    }

    let count = n as f64;
    let covariance = sum_xy - sum_x * sum_y / count;
    let var_x = sum_xx - sum_x * sum_x / count;
    let var_y = sum_yy - sum_y * sum_y / count;

    // Constant samples have no defined correlation.
    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    Some((covariance / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RatingObservation;

    fn obs(user_id: u32, title: &str, rating: f64) -> RatingObservation {
        RatingObservation::new(user_id, title, rating)
    }

    /// `users` co-raters of A and B with perfectly aligned ratings.
    fn co_rated(users: u32) -> Vec<RatingObservation> {
        let mut observations = Vec::new();
        for user in 0..users {
            let rating = 1.0 + (user % 5) as f64;
            observations.push(obs(user, "A", rating));
            observations.push(obs(user, "B", rating));
        }
        observations
    }

    #[test]
    fn exactly_min_support_co_raters_is_defined() {
        let matrix = UserItemMatrix::from_observations(&co_rated(30));
        let corr = CorrelationMatrix::from_matrix(&matrix);
        let r = corr.get("A", "B").unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn below_min_support_is_undefined() {
        let matrix = UserItemMatrix::from_observations(&co_rated(29));
        let corr = CorrelationMatrix::from_matrix(&matrix);
        assert_eq!(corr.get("A", "B"), None);
    }

    #[test]
    fn zero_variance_is_undefined_regardless_of_support() {
        let mut observations = Vec::new();
        for user in 0..40 {
            observations.push(obs(user, "A", 3.0)); // constant
            observations.push(obs(user, "B", 1.0 + (user % 5) as f64));
        }
        let matrix = UserItemMatrix::from_observations(&observations);
        let corr = CorrelationMatrix::from_matrix(&matrix);
        assert_eq!(corr.get("A", "B"), None);
        assert_eq!(corr.get("B", "A"), None);
    }

    #[test]
    fn matrix_is_symmetric_including_undefinedness() {
        let mut observations = Vec::new();
        for user in 0..35 {
            observations.push(obs(user, "A", 1.0 + (user % 5) as f64));
            observations.push(obs(user, "B", 1.0 + ((user + 1) % 5) as f64));
        }
        // C overlaps nobody enough.
        for user in 100..110 {
            observations.push(obs(user, "C", 4.0));
        }
        let matrix = UserItemMatrix::from_observations(&observations);
        let corr = CorrelationMatrix::from_matrix(&matrix);

        assert_eq!(corr.get("A", "B"), corr.get("B", "A"));
        assert!(corr.get("A", "B").is_some());
        assert_eq!(corr.get("A", "C"), None);
        assert_eq!(corr.get("C", "A"), None);
    }

    #[test]
    fn diagonal_is_identity() {
        let matrix = UserItemMatrix::from_observations(&co_rated(30));
        let corr = CorrelationMatrix::from_matrix(&matrix);
        assert_eq!(corr.get("A", "A"), Some(1.0));
    }

    #[test]
    fn perfect_inverse_correlation() {
        let mut observations = Vec::new();
        for user in 0..30 {
            let rating = 1.0 + (user % 5) as f64;
            observations.push(obs(user, "A", rating));
            observations.push(obs(user, "B", 6.0 - rating));
        }
        let matrix = UserItemMatrix::from_observations(&observations);
        let corr = CorrelationMatrix::from_matrix(&matrix);
        let r = corr.get("A", "B").unwrap();
        assert!((r + 1.0).abs() < 1e-9);
    }

    #[test]
    fn known_coefficient_on_small_sample() {
        // x = [1, 2, 3, 4], y = [2, 2, 3, 5]: r = 5 / sqrt(30)
        let observations = vec![
            obs(1, "X", 1.0),
            obs(2, "X", 2.0),
            obs(3, "X", 3.0),
            obs(4, "X", 4.0),
            obs(1, "Y", 2.0),
            obs(2, "Y", 2.0),
            obs(3, "Y", 3.0),
            obs(4, "Y", 5.0),
        ];
        let matrix = UserItemMatrix::from_observations(&observations);
        let corr = CorrelationMatrix::with_min_support(&matrix, 4);
        let r = corr.get("X", "Y").unwrap();
        assert!((r - 0.912_870_929_175_277).abs() < 1e-9);
    }

    #[test]
    fn overlap_ignores_users_who_rated_only_one_title() {
        let mut observations = co_rated(30);
        // Extra raters of A only must not shift the pairwise statistic.
        for user in 1000..1100 {
            observations.push(obs(user, "A", 1.0));
        }
        let matrix = UserItemMatrix::from_observations(&observations);
        let corr = CorrelationMatrix::from_matrix(&matrix);
        let r = corr.get("A", "B").unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }
}
