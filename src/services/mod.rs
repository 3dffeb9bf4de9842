pub mod dataset;
pub mod model_cache;
pub mod recommendation;
