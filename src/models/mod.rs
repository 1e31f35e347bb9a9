pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskDetail, TaskInput, TaskSummary};
pub use user::{NewUser, User};
