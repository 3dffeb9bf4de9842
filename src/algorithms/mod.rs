pub mod aggregator;
pub mod matrix;
pub mod popularity;
pub mod similarity;

pub use aggregator::{aggregate, AggregateOutcome};
pub use matrix::UserItemMatrix;
pub use popularity::{rank_by_popularity, DEFAULT_TOP_N, MIN_RATING_COUNT};
pub use similarity::{CorrelationMatrix, MIN_SUPPORT};
