//! Query execution: exact top-k scoring over explicit candidate sets, and
//! the adaptive router that decides per query between the approximate oracle
//! path and the exact path.

pub mod router;
pub mod scorer;

pub use router::{QueryRouter, RoutedSearch, SearchStrategy};
pub use scorer::ExactScorer;
