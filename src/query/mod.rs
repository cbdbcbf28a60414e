//! Search criteria and index page URL construction.

mod builder;
mod criteria;

pub use builder::{DEFAULT_ORIGIN, QueryBuilder, SearchEndpoint, SimilarityKind};
pub use criteria::{DEFAULT_PAGES, MAX_PAGES, MediaType, Orientation, PeopleCount, SearchCriteria};
