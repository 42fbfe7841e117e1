// handlers/mod.rs - one handler per endpoint
//
// Each endpoint is mounted with `any(...)` and resolves the (method,
// query) pair into a route enum itself, so OPTIONS and 405 answers use the
// same envelope as everything else.

pub mod public;
pub mod resources;
pub mod students;
pub mod utils;
pub mod weekly;

pub use utils::AppState;
