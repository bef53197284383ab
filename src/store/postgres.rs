//! Postgres-backed store. Schema lives in `migrations/`; cascades are declared
//! there with `ON DELETE CASCADE` / `ON DELETE SET NULL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use super::{Store, StoreResult};
use crate::error::AppError;
use crate::models::{
    Client, ClientPatch, ClientRequest, ClientRequestInput, ClientRequestPatch, Department,
    LogAction, NewTask, NewTaskLog, NewUser, Role, Task, TaskChanges, TaskComment, TaskLog, User,
    UserSummary,
};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_staff, is_superuser, is_active, date_joined";

const CLIENT_REQUEST_COLUMNS: &str =
    "id, client_id AS client, category, description, submitted_at";

/// Projects a `tasks` row (aliased `t`) into the `Task` shape, with the
/// creator's username joined in as `created_by`.
const TASK_PROJECTION: &str = "t.id, t.title, t.description, t.department_id AS department, \
     u.username AS created_by, t.assigned_to_id AS assigned_to, t.status, t.created_at";

/// SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

/// A racing insert of the same username reports the same field error as the
/// in-memory store instead of a 500.
fn username_conflict(error: sqlx::Error) -> AppError {
    if is_unique_violation(&error) {
        AppError::invalid_field(
            "username",
            "unique",
            "A user with that username already exists",
        )
    } else {
        error.into()
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    password_hash: String,
    is_staff: bool,
    is_superuser: bool,
    is_active: bool,
    date_joined: DateTime<Utc>,
}

#[derive(FromRow)]
struct CommentRow {
    id: i32,
    task_id: i32,
    comment: String,
    created_at: DateTime<Utc>,
    user_id: i32,
    username: String,
    email: String,
}

impl From<CommentRow> for TaskComment {
    fn from(row: CommentRow) -> Self {
        TaskComment {
            id: row.id,
            task: row.task_id,
            user: UserSummary {
                id: row.user_id,
                username: row.username,
                email: row.email,
            },
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct LogRow {
    id: i32,
    task_id: i32,
    action_type: LogAction,
    old_value: String,
    new_value: String,
    created_at: DateTime<Utc>,
    user_id: Option<i32>,
    username: Option<String>,
    email: Option<String>,
}

impl From<LogRow> for TaskLog {
    fn from(row: LogRow) -> Self {
        let user = match (row.user_id, row.username, row.email) {
            (Some(id), Some(username), Some(email)) => Some(UserSummary {
                id,
                username,
                email,
            }),
            _ => None,
        };
        TaskLog {
            id: row.id,
            task: row.task_id,
            user,
            action_type: row.action_type,
            old_value: row.old_value,
            new_value: row.new_value,
            created_at: row.created_at,
        }
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn with_roles(&self, row: UserRow) -> StoreResult<User> {
        let roles = sqlx::query_scalar::<_, Role>(
            "SELECT role FROM user_groups WHERE user_id = $1 ORDER BY role",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            is_active: row.is_active,
            date_joined: row.date_joined,
            roles,
        })
    }

    async fn find_comment(&self, id: i32) -> StoreResult<TaskComment> {
        let row = sqlx::query_as::<_, CommentRow>(
            "SELECT c.id, c.task_id, c.comment, c.created_at, u.id AS user_id, u.username, u.email \
             FROM task_comments c JOIN users u ON u.id = c.user_id WHERE c.id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_log(&self, id: i32) -> StoreResult<TaskLog> {
        let row = sqlx::query_as::<_, LogRow>(
            "SELECT l.id, l.task_id, l.action_type, l.old_value, l.new_value, l.created_at, \
             u.id AS user_id, u.username, u.email \
             FROM task_logs l LEFT JOIN users u ON u.id = l.user_id WHERE l.id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.with_roles(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.with_roles(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_users_by_email(&self, email: &str) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1 ORDER BY id",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(self.with_roles(row).await?);
        }
        Ok(users)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserSummary>> {
        let users =
            sqlx::query_as::<_, UserSummary>("SELECT id, username, email FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, email, password_hash, is_staff, is_superuser) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(&mut *tx)
        .await
        .map_err(username_conflict)?;

        for role in &user.roles {
            sqlx::query("INSERT INTO user_groups (user_id, role) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(row.id)
                .bind(role)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        self.with_roles(row).await
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        let departments =
            sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(departments)
    }

    async fn find_department(&self, id: i32) -> StoreResult<Option<Department>> {
        let department =
            sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(department)
    }

    async fn create_department(&self, name: &str) -> StoreResult<Department> {
        let department = sqlx::query_as::<_, Department>(
            "INSERT INTO departments (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(department)
    }

    async fn list_clients(&self) -> StoreResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, department, created_at FROM clients ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    async fn find_client(&self, id: i32) -> StoreResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, name, department, created_at FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    async fn create_client(&self, name: &str, department: &str) -> StoreResult<Client> {
        let client = sqlx::query_as::<_, Client>(
            "INSERT INTO clients (name, department) VALUES ($1, $2) \
             RETURNING id, name, department, created_at",
        )
        .bind(name)
        .bind(department)
        .fetch_one(&self.pool)
        .await?;
        Ok(client)
    }

    async fn update_client(&self, id: i32, changes: ClientPatch) -> StoreResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "UPDATE clients SET name = COALESCE($2, name), department = COALESCE($3, department) \
             WHERE id = $1 RETURNING id, name, department, created_at",
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.department)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    async fn delete_client(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_client_requests(&self) -> StoreResult<Vec<ClientRequest>> {
        let requests = sqlx::query_as::<_, ClientRequest>(&format!(
            "SELECT {} FROM client_requests ORDER BY id",
            CLIENT_REQUEST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn find_client_request(&self, id: i32) -> StoreResult<Option<ClientRequest>> {
        let request = sqlx::query_as::<_, ClientRequest>(&format!(
            "SELECT {} FROM client_requests WHERE id = $1",
            CLIENT_REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn create_client_request(&self, input: ClientRequestInput) -> StoreResult<ClientRequest> {
        let request = sqlx::query_as::<_, ClientRequest>(&format!(
            "INSERT INTO client_requests (client_id, category, description) VALUES ($1, $2, $3) \
             RETURNING {}",
            CLIENT_REQUEST_COLUMNS
        ))
        .bind(input.client)
        .bind(input.category)
        .bind(input.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    async fn update_client_request(
        &self,
        id: i32,
        changes: ClientRequestPatch,
    ) -> StoreResult<Option<ClientRequest>> {
        let request = sqlx::query_as::<_, ClientRequest>(&format!(
            "UPDATE client_requests SET client_id = COALESCE($2, client_id), \
             category = COALESCE($3, category), description = COALESCE($4, description) \
             WHERE id = $1 RETURNING {}",
            CLIENT_REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(changes.client)
        .bind(changes.category)
        .bind(changes.description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn delete_client_request(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM client_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks t JOIN users u ON u.id = t.created_by_id ORDER BY t.id",
            TASK_PROJECTION
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: i32) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks t JOIN users u ON u.id = t.created_by_id WHERE t.id = $1",
            TASK_PROJECTION
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let created = sqlx::query_as::<_, Task>(&format!(
            "WITH t AS ( \
                 INSERT INTO tasks (title, description, department_id, created_by_id, assigned_to_id, status) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING * \
             ) SELECT {} FROM t JOIN users u ON u.id = t.created_by_id",
            TASK_PROJECTION
        ))
        .bind(task.title)
        .bind(task.description)
        .bind(task.department)
        .bind(task.created_by)
        .bind(task.assigned_to)
        .bind(task.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_task(&self, id: i32, changes: TaskChanges) -> StoreResult<Option<Task>> {
        let (set_assignee, assignee) = match changes.assigned_to {
            Some(assignee) => (true, assignee),
            None => (false, None),
        };

        let updated = sqlx::query_as::<_, Task>(&format!(
            "WITH t AS ( \
                 UPDATE tasks SET \
                     title = COALESCE($2, title), \
                     description = COALESCE($3, description), \
                     department_id = COALESCE($4, department_id), \
                     assigned_to_id = CASE WHEN $5 THEN $6 ELSE assigned_to_id END, \
                     status = COALESCE($7, status) \
                 WHERE id = $1 RETURNING * \
             ) SELECT {} FROM t JOIN users u ON u.id = t.created_by_id",
            TASK_PROJECTION
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.department)
        .bind(set_assignee)
        .bind(assignee)
        .bind(changes.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_task(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, task_id: i32) -> StoreResult<Vec<TaskComment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT c.id, c.task_id, c.comment, c.created_at, u.id AS user_id, u.username, u.email \
             FROM task_comments c JOIN users u ON u.id = c.user_id \
             WHERE c.task_id = $1 ORDER BY c.id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TaskComment::from).collect())
    }

    async fn create_comment(
        &self,
        task_id: i32,
        user_id: i32,
        comment: &str,
    ) -> StoreResult<TaskComment> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO task_comments (task_id, user_id, comment) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(task_id)
        .bind(user_id)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;
        self.find_comment(id).await
    }

    async fn list_logs(&self, task_id: i32) -> StoreResult<Vec<TaskLog>> {
        let rows = sqlx::query_as::<_, LogRow>(
            "SELECT l.id, l.task_id, l.action_type, l.old_value, l.new_value, l.created_at, \
             u.id AS user_id, u.username, u.email \
             FROM task_logs l LEFT JOIN users u ON u.id = l.user_id \
             WHERE l.task_id = $1 ORDER BY l.id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(TaskLog::from).collect())
    }

    async fn create_log(&self, entry: NewTaskLog) -> StoreResult<TaskLog> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO task_logs (task_id, user_id, action_type, old_value, new_value) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(entry.task)
        .bind(entry.user)
        .bind(entry.action_type)
        .bind(entry.old_value)
        .bind(entry.new_value)
        .fetch_one(&self.pool)
        .await?;
        self.find_log(id).await
    }
}
