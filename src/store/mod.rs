//! Entity store.
//!
//! `Store` is the persistence contract used by every handler. Two implementations
//! exist: [`PgStore`] over a sqlx Postgres pool and [`MemoryStore`] kept in process
//! (tests, and local runs without `DATABASE_URL`).
//!
//! Lookups return `Ok(None)` for a missing row; updates and deletes return
//! `Ok(None)` / `Ok(false)` when the target row does not exist. Deleting a task
//! removes its comments and logs, and deleting a client removes its requests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{
    Client, ClientPatch, ClientRequest, ClientRequestInput, ClientRequestPatch, Department,
    NewTask, NewTaskLog, NewUser, Task, TaskChanges, TaskComment, TaskLog, User, UserSummary,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap reachability check used by `/health`.
    async fn ping(&self) -> StoreResult<()>;

    // --- Users ---
    async fn find_user_by_id(&self, id: i32) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    /// Email is not unique, so every match is returned.
    async fn find_users_by_email(&self, email: &str) -> StoreResult<Vec<User>>;
    async fn list_users(&self) -> StoreResult<Vec<UserSummary>>;
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    // --- Departments ---
    async fn list_departments(&self) -> StoreResult<Vec<Department>>;
    async fn find_department(&self, id: i32) -> StoreResult<Option<Department>>;
    async fn create_department(&self, name: &str) -> StoreResult<Department>;

    // --- Clients ---
    async fn list_clients(&self) -> StoreResult<Vec<Client>>;
    async fn find_client(&self, id: i32) -> StoreResult<Option<Client>>;
    async fn create_client(&self, name: &str, department: &str) -> StoreResult<Client>;
    async fn update_client(&self, id: i32, changes: ClientPatch) -> StoreResult<Option<Client>>;
    async fn delete_client(&self, id: i32) -> StoreResult<bool>;

    // --- Client requests ---
    async fn list_client_requests(&self) -> StoreResult<Vec<ClientRequest>>;
    async fn find_client_request(&self, id: i32) -> StoreResult<Option<ClientRequest>>;
    async fn create_client_request(&self, request: ClientRequestInput) -> StoreResult<ClientRequest>;
    async fn update_client_request(
        &self,
        id: i32,
        changes: ClientRequestPatch,
    ) -> StoreResult<Option<ClientRequest>>;
    async fn delete_client_request(&self, id: i32) -> StoreResult<bool>;

    // --- Tasks ---
    async fn list_tasks(&self) -> StoreResult<Vec<Task>>;
    async fn find_task(&self, id: i32) -> StoreResult<Option<Task>>;
    async fn create_task(&self, task: NewTask) -> StoreResult<Task>;
    async fn update_task(&self, id: i32, changes: TaskChanges) -> StoreResult<Option<Task>>;
    async fn delete_task(&self, id: i32) -> StoreResult<bool>;

    // --- Comments and logs, scoped to a task ---
    async fn list_comments(&self, task_id: i32) -> StoreResult<Vec<TaskComment>>;
    async fn create_comment(&self, task_id: i32, user_id: i32, comment: &str)
        -> StoreResult<TaskComment>;
    async fn list_logs(&self, task_id: i32) -> StoreResult<Vec<TaskLog>>;
    async fn create_log(&self, entry: NewTaskLog) -> StoreResult<TaskLog>;
}
