pub mod builder;
pub mod error;
pub mod order;
pub mod types;

pub use builder::{escape_like, quote_literal, SelectBuilder};
pub use error::QueryError;
pub use order::{OrderInfo, SortDirection};
pub use types::{PageRequest, Paginated};
