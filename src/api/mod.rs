pub mod format;
pub mod response;

pub use format::WeekView;
pub use response::ApiResponse;
