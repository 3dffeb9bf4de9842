use crate::models::RatingObservation;
use std::collections::HashMap;

/// Sparse user-by-title rating matrix.
///
/// Columns are titles in first-encounter order. Each column holds its
/// (user_id, rating) pairs sorted by user id so that any two columns can be
/// intersected with a single merge pass. Absent cells mean "not rated",
/// which is distinct from a rating of zero; nothing is ever zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct UserItemMatrix {
    titles: Vec<String>,
    title_index: HashMap<String, usize>,
    columns: Vec<Vec<(u32, f64)>>,
}

impl UserItemMatrix {
    /// Builds the matrix by grouping observations on (user_id, title).
    ///
    /// Duplicate observations for the same cell are resolved by arithmetic
    /// mean, not summed and not last-wins. An empty observation list yields
    /// an empty matrix.
    pub fn from_observations(observations: &[RatingObservation]) -> Self {
        let mut titles: Vec<String> = Vec::new();
        let mut title_index: HashMap<String, usize> = HashMap::new();
        // Per column: user -> (rating sum, observation count).
        let mut cells: Vec<HashMap<u32, (f64, u32)>> = Vec::new();

        for obs in observations {
            let idx = match title_index.get(obs.title.as_str()) {
                Some(&idx) => idx,
                None => {
                    let idx = titles.len();
                    titles.push(obs.title.clone());
                    title_index.insert(obs.title.clone(), idx);
                    cells.push(HashMap::new());
                    idx
                }
            };
            let cell = cells[idx].entry(obs.user_id).or_insert((0.0, 0));
            cell.0 += obs.rating;
            cell.1 += 1;
        }

        let columns = cells
            .into_iter()
            .map(|column| {
                let mut ratings: Vec<(u32, f64)> = column
                    .into_iter()
                    .map(|(user_id, (sum, count))| (user_id, sum / count as f64))
                    .collect();
                ratings.sort_unstable_by_key(|&(user_id, _)| user_id);
                ratings
            })
            .collect();

        Self {
            titles,
            title_index,
            columns,
        }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn title_count(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// The (user_id, rating) pairs for one title, sorted by user id.
    pub fn column(&self, index: usize) -> &[(u32, f64)] {
        &self.columns[index]
    }

    pub fn index_of(&self, title: &str) -> Option<usize> {
        self.title_index.get(title).copied()
    }

    pub fn get(&self, user_id: u32, title: &str) -> Option<f64> {
        let column = &self.columns[self.index_of(title)?];
        column
            .binary_search_by_key(&user_id, |&(id, _)| id)
            .ok()
            .map(|pos| column[pos].1)
    }
}
