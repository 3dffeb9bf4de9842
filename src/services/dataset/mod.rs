use crate::config::Config;
use crate::error::DatasetError;
use crate::models::{CatalogEntry, RatingObservation};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{info, warn};

/// An immutable dataset load: the catalog, the observations already joined
/// with titles, and a content fingerprint identifying this exact load.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub catalog: Vec<CatalogEntry>,
    pub observations: Vec<RatingObservation>,
    pub fingerprint: u64,
}

impl Dataset {
    /// Distinct titles in catalog order, for the selection surface.
    pub fn titles(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        self.catalog
            .iter()
            .filter(|entry| seen.insert(entry.title.as_str()))
            .map(|entry| entry.title.clone())
            .collect()
    }
}

pub struct DatasetLoader {
    config: Arc<Config>,
}

impl DatasetLoader {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Reads both source files, joins ratings to titles on movie id, and
    /// fingerprints the raw bytes. Any read or parse failure aborts the
    /// load; no partial dataset is ever returned.
    pub fn load(&self) -> Result<Arc<Dataset>, DatasetError> {
        let data = &self.config.data;

        let movies_raw = read_file(&data.movies_path)?;
        let ratings_raw = read_file(&data.ratings_path)?;
        let fingerprint = fingerprint(&movies_raw, &ratings_raw);

        let catalog = parse_catalog(&movies_raw, data.movies_delimiter, &data.movies_path)?;
        let observations = parse_and_join(
            &ratings_raw,
            data.ratings_delimiter,
            &data.ratings_path,
            &catalog,
        )?;

        info!(
            "Loaded dataset: {} movies, {} joined ratings (fingerprint {:016x})",
            catalog.len(),
            observations.len(),
            fingerprint
        );

        Ok(Arc::new(Dataset {
            catalog,
            observations,
            fingerprint,
        }))
    }
}

fn read_file(path: &str) -> Result<Vec<u8>, DatasetError> {
    std::fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_string(),
        source,
    })
}

fn fingerprint(movies_raw: &[u8], ratings_raw: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    movies_raw.hash(&mut hasher);
    ratings_raw.hash(&mut hasher);
    hasher.finish()
}

/// The catalog ships Latin-1 encoded; every byte maps directly to the code
/// point of the same value.
fn decode_latin1(raw: &[u8]) -> String {
    raw.iter().map(|&byte| byte as char).collect()
}

fn column_index(
    headers: &csv::StringRecord,
    column: &str,
    path: &str,
) -> Result<usize, DatasetError> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| DatasetError::MissingColumn {
            path: path.to_string(),
            column: column.to_string(),
        })
}

fn malformed(path: &str, message: impl ToString) -> DatasetError {
    DatasetError::Malformed {
        path: path.to_string(),
        message: message.to_string(),
    }
}

fn parse_catalog(
    raw: &[u8],
    delimiter: char,
    path: &str,
) -> Result<Vec<CatalogEntry>, DatasetError> {
    let text = decode_latin1(raw);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| malformed(path, format!("failed to read headers: {e}")))?
        .clone();
    let id_col = column_index(&headers, "movie_id", path)?;
    let title_col = column_index(&headers, "movie_title", path)?;

    let mut catalog = Vec::new();
    let mut seen_ids: HashSet<u32> = HashSet::new();
    let mut seen_titles: HashSet<String> = HashSet::new();

    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(path, e))?;
        let movie_id: u32 = record
            .get(id_col)
            .ok_or_else(|| malformed(path, format!("short record on line {}", line + 2)))?
            .trim()
            .parse()
            .map_err(|e| malformed(path, format!("bad movie_id on line {}: {e}", line + 2)))?;
        let title = record
            .get(title_col)
            .ok_or_else(|| malformed(path, format!("short record on line {}", line + 2)))?
            .trim()
            .to_string();

        if !seen_ids.insert(movie_id) {
            return Err(malformed(path, format!("duplicate movie_id {movie_id}")));
        }
        // Title is the join and matrix key; distinct works sharing a title
        // collapse into one column, so surface it.
        if !seen_titles.insert(title.clone()) {
            warn!("Duplicate title in catalog, ratings will merge: {}", title);
        }

        catalog.push(CatalogEntry { movie_id, title });
    }

    Ok(catalog)
}

fn parse_and_join(
    raw: &[u8],
    delimiter: char,
    path: &str,
    catalog: &[CatalogEntry],
) -> Result<Vec<RatingObservation>, DatasetError> {
    let title_by_id: HashMap<u32, &str> = catalog
        .iter()
        .map(|entry| (entry.movie_id, entry.title.as_str()))
        .collect();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .from_reader(raw);

    let headers = reader
        .headers()
        .map_err(|e| malformed(path, format!("failed to read headers: {e}")))?
        .clone();
    let user_col = column_index(&headers, "userId", path)?;
    let movie_col = column_index(&headers, "movieId", path)?;
    let rating_col = column_index(&headers, "rating", path)?;

    let mut observations = Vec::new();
    let mut unmatched = 0usize;

    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(path, e))?;
        let field = |col: usize| {
            record
                .get(col)
                .ok_or_else(|| malformed(path, format!("short record on line {}", line + 2)))
        };

        let user_id: u32 = field(user_col)?
            .trim()
            .parse()
            .map_err(|e| malformed(path, format!("bad userId on line {}: {e}", line + 2)))?;
        let movie_id: u32 = field(movie_col)?
            .trim()
            .parse()
            .map_err(|e| malformed(path, format!("bad movieId on line {}: {e}", line + 2)))?;
        let rating: f64 = field(rating_col)?
            .trim()
            .parse()
            .map_err(|e| malformed(path, format!("bad rating on line {}: {e}", line + 2)))?;

        // Inner join: ratings for unknown movies are dropped.
        match title_by_id.get(&movie_id) {
            Some(&title) => observations.push(RatingObservation::new(user_id, title, rating)),
            None => unmatched += 1,
        }
    }

    if unmatched > 0 {
        warn!("{} ratings referenced movies absent from the catalog", unmatched);
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_for(dir: &std::path::Path) -> Arc<Config> {
        let mut config = Config::default();
        config.data.movies_path = dir.join("movies.csv").to_string_lossy().into_owned();
        config.data.ratings_path = dir.join("ratings.csv").to_string_lossy().into_owned();
        Arc::new(config)
    }

    fn write_files(dir: &std::path::Path, movies: &[u8], ratings: &str) {
        std::fs::File::create(dir.join("movies.csv"))
            .unwrap()
            .write_all(movies)
            .unwrap();
        std::fs::write(dir.join("ratings.csv"), ratings).unwrap();
    }

    #[test]
    fn loads_and_joins_on_movie_id() {
        let dir = tempfile::tempdir().unwrap();
        write_files(
            dir.path(),
            b"movie_id|movie_title\n1|Alien\n2|Brazil\n",
            "userId,movieId,rating\n10,1,4.0\n10,2,5.0\n11,1,3.0\n",
        );

        let dataset = DatasetLoader::new(config_for(dir.path())).load().unwrap();
        assert_eq!(dataset.catalog.len(), 2);
        assert_eq!(dataset.observations.len(), 3);
        assert_eq!(dataset.observations[0].title, "Alien");
        assert_eq!(dataset.observations[1].title, "Brazil");
        assert_eq!(dataset.titles(), ["Alien", "Brazil"]);
    }

    #[test]
    fn decodes_latin1_titles() {
        let dir = tempfile::tempdir().unwrap();
        // 0xE9 is 'é' in Latin-1 and invalid on its own in UTF-8.
        write_files(
            dir.path(),
            b"movie_id|movie_title\n1|Am\xE9lie\n",
            "userId,movieId,rating\n10,1,5.0\n",
        );

        let dataset = DatasetLoader::new(config_for(dir.path())).load().unwrap();
        assert_eq!(dataset.catalog[0].title, "Am\u{e9}lie");
    }

    #[test]
    fn unmatched_ratings_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        write_files(
            dir.path(),
            b"movie_id|movie_title\n1|Alien\n",
            "userId,movieId,rating\n10,1,4.0\n10,99,5.0\n",
        );

        let dataset = DatasetLoader::new(config_for(dir.path())).load().unwrap();
        assert_eq!(dataset.observations.len(), 1);
    }

    #[test]
    fn missing_file_is_a_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = DatasetLoader::new(config_for(dir.path())).load().unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn missing_column_is_a_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_files(
            dir.path(),
            b"movie_id|name\n1|Alien\n",
            "userId,movieId,rating\n10,1,4.0\n",
        );

        let err = DatasetLoader::new(config_for(dir.path())).load().unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn { ref column, .. } if column == "movie_title"
        ));
    }

    #[test]
    fn malformed_rating_is_a_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_files(
            dir.path(),
            b"movie_id|movie_title\n1|Alien\n",
            "userId,movieId,rating\n10,1,not-a-number\n",
        );

        let err = DatasetLoader::new(config_for(dir.path())).load().unwrap_err();
        assert!(matches!(err, DatasetError::Malformed { .. }));
    }

    #[test]
    fn fingerprint_tracks_content_identity() {
        let dir = tempfile::tempdir().unwrap();
        write_files(
            dir.path(),
            b"movie_id|movie_title\n1|Alien\n",
            "userId,movieId,rating\n10,1,4.0\n",
        );
        let loader = DatasetLoader::new(config_for(dir.path()));
        let first = loader.load().unwrap();
        let second = loader.load().unwrap();
        assert_eq!(first.fingerprint, second.fingerprint);

        write_files(
            dir.path(),
            b"movie_id|movie_title\n1|Alien\n",
            "userId,movieId,rating\n10,1,5.0\n",
        );
        let changed = loader.load().unwrap();
        assert_ne!(first.fingerprint, changed.fingerprint);
    }
}
