pub mod types;
pub mod filter_where;
pub mod filter_order;
pub mod sanitize;
pub mod validate;
pub mod error;

pub use types::*;
pub use error::ValidationError;
pub use filter_order::{validate_order, validate_sort_field, FilterOrder};
pub use filter_where::FilterWhere;
pub use sanitize::sanitize;
