//! Search module.
//!
//! Product listing filters, sorting and pagination.

mod filter;
mod query;
mod results;

pub use filter::ProductFilter;
pub use query::{ProductQuery, ProductSearch, SortOption};
pub use results::{Pagination, SearchResults, DEFAULT_PER_PAGE, MAX_PER_PAGE};
