pub mod comment;
pub mod page;
pub mod task;
pub mod user;

pub use comment::{Comment, CommentInput};
pub use page::{Page, PageQuery};
pub use task::{Task, TaskInput, TaskPriority, TaskStatus};
pub use user::User;
