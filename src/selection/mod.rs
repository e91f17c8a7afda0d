mod filter;
mod selector;

pub use filter::{candidate_pool, recommended_id_set};
pub use selector::{QualityProbe, Selector};
