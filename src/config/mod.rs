use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port).parse().unwrap()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub movies_path: String,
    pub ratings_path: String,
    /// The catalog file ships pipe-delimited and Latin-1 encoded.
    pub movies_delimiter: char,
    pub ratings_delimiter: char,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Minimum co-raters for a defined pairwise correlation.
    pub min_support: usize,
    /// Minimum ratings for a title to enter the popularity ranking.
    pub min_rating_count: usize,
    pub top_n: usize,
    /// Fewer (but more than zero) seed titles is a user-input error.
    pub min_seed_titles: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            data: DataConfig {
                movies_path: "movies_100k.csv".to_string(),
                ratings_path: "ratings_100k.csv".to_string(),
                movies_delimiter: '|',
                ratings_delimiter: ',',
            },
            recommendation: RecommendationConfig {
                min_support: 30,
                min_rating_count: 50,
                top_n: 5,
                min_seed_titles: 3,
            },
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("CINEREC"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
