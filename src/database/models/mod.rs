pub mod comment;
pub mod resource;
pub mod student;
pub mod week;

pub use comment::{CommentThread, NewComment, ResourceComment, ResourceThread, WeekComment, WeekThread};
pub use resource::{NewResource, Resource, ResourceChanges};
pub use student::{NewStudent, PasswordChange, Student, StudentChanges};
pub use week::{NewWeek, WeekChanges, WeekRow};
