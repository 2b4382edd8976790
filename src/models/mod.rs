pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskStatus, TaskUpdate};
pub use user::{Role, UpdateProfileRequest, UpdateRoleRequest, User, UserRecord};
