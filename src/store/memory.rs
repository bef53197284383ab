//! In-process store used by the test suite and by local runs without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Store, StoreResult};
use crate::error::AppError;
use crate::models::{
    Client, ClientPatch, ClientRequest, ClientRequestInput, ClientRequestPatch, Department,
    NewTask, NewTaskLog, NewUser, Task, TaskChanges, TaskComment, TaskLog, User, UserSummary,
};

/// Thread-safe in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    sequences: HashMap<&'static str, i32>,
    users: BTreeMap<i32, User>,
    departments: BTreeMap<i32, Department>,
    clients: BTreeMap<i32, Client>,
    client_requests: BTreeMap<i32, ClientRequest>,
    tasks: BTreeMap<i32, StoredTask>,
    comments: BTreeMap<i32, TaskComment>,
    logs: BTreeMap<i32, TaskLog>,
}

/// Tasks keep the creator's id; the username is resolved when the row is read.
#[derive(Debug, Clone)]
struct StoredTask {
    id: i32,
    title: String,
    description: String,
    department: i32,
    created_by: i32,
    assigned_to: Option<i32>,
    status: crate::models::TaskStatus,
    created_at: chrono::DateTime<Utc>,
}

impl MemoryState {
    /// Ids are never reused, matching a `SERIAL` column.
    fn next_id(&mut self, table: &'static str) -> i32 {
        let id = self.sequences.entry(table).or_insert(0);
        *id += 1;
        *id
    }

    fn render_task(&self, stored: &StoredTask) -> Task {
        let created_by = self
            .users
            .get(&stored.created_by)
            .map(|user| user.username.clone())
            .unwrap_or_default();
        Task {
            id: stored.id,
            title: stored.title.clone(),
            description: stored.description.clone(),
            department: stored.department,
            created_by,
            assigned_to: stored.assigned_to,
            status: stored.status,
            created_at: stored.created_at,
        }
    }

    fn summary(&self, user_id: i32) -> StoreResult<UserSummary> {
        self.users
            .get(&user_id)
            .map(User::summary)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| AppError::InternalServerError("store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| AppError::InternalServerError("store lock poisoned".into()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }

    async fn find_user_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_users_by_email(&self, email: &str) -> StoreResult<Vec<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .filter(|user| user.email == email)
            .cloned()
            .collect())
    }

    async fn list_users(&self) -> StoreResult<Vec<UserSummary>> {
        Ok(self.read()?.users.values().map(User::summary).collect())
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut state = self.write()?;
        if state
            .users
            .values()
            .any(|user| user.username == new_user.username)
        {
            return Err(AppError::invalid_field(
                "username",
                "unique",
                "A user with that username already exists",
            ));
        }

        let mut roles = new_user.roles;
        roles.sort();
        roles.dedup();

        let user = User {
            id: state.next_id("users"),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            is_staff: new_user.is_staff,
            is_superuser: new_user.is_superuser,
            is_active: true,
            date_joined: Utc::now(),
            roles,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        Ok(self.read()?.departments.values().cloned().collect())
    }

    async fn find_department(&self, id: i32) -> StoreResult<Option<Department>> {
        Ok(self.read()?.departments.get(&id).cloned())
    }

    async fn create_department(&self, name: &str) -> StoreResult<Department> {
        let mut state = self.write()?;
        let department = Department {
            id: state.next_id("departments"),
            name: name.to_string(),
        };
        state.departments.insert(department.id, department.clone());
        Ok(department)
    }

    async fn list_clients(&self) -> StoreResult<Vec<Client>> {
        Ok(self.read()?.clients.values().cloned().collect())
    }

    async fn find_client(&self, id: i32) -> StoreResult<Option<Client>> {
        Ok(self.read()?.clients.get(&id).cloned())
    }

    async fn create_client(&self, name: &str, department: &str) -> StoreResult<Client> {
        let mut state = self.write()?;
        let client = Client {
            id: state.next_id("clients"),
            name: name.to_string(),
            department: department.to_string(),
            created_at: Utc::now(),
        };
        state.clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn update_client(&self, id: i32, changes: ClientPatch) -> StoreResult<Option<Client>> {
        let mut state = self.write()?;
        let Some(client) = state.clients.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            client.name = name;
        }
        if let Some(department) = changes.department {
            client.department = department;
        }
        Ok(Some(client.clone()))
    }

    async fn delete_client(&self, id: i32) -> StoreResult<bool> {
        let mut state = self.write()?;
        if state.clients.remove(&id).is_none() {
            return Ok(false);
        }
        state.client_requests.retain(|_, request| request.client != id);
        Ok(true)
    }

    async fn list_client_requests(&self) -> StoreResult<Vec<ClientRequest>> {
        Ok(self.read()?.client_requests.values().cloned().collect())
    }

    async fn find_client_request(&self, id: i32) -> StoreResult<Option<ClientRequest>> {
        Ok(self.read()?.client_requests.get(&id).cloned())
    }

    async fn create_client_request(&self, input: ClientRequestInput) -> StoreResult<ClientRequest> {
        let mut state = self.write()?;
        if !state.clients.contains_key(&input.client) {
            return Err(AppError::invalid_field(
                "client",
                "does_not_exist",
                "Client does not exist",
            ));
        }
        let request = ClientRequest {
            id: state.next_id("client_requests"),
            client: input.client,
            category: input.category,
            description: input.description,
            submitted_at: Utc::now(),
        };
        state.client_requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn update_client_request(
        &self,
        id: i32,
        changes: ClientRequestPatch,
    ) -> StoreResult<Option<ClientRequest>> {
        let mut state = self.write()?;
        if let Some(client) = changes.client {
            if !state.clients.contains_key(&client) {
                return Err(AppError::invalid_field(
                    "client",
                    "does_not_exist",
                    "Client does not exist",
                ));
            }
        }
        let Some(request) = state.client_requests.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(client) = changes.client {
            request.client = client;
        }
        if let Some(category) = changes.category {
            request.category = category;
        }
        if let Some(description) = changes.description {
            request.description = description;
        }
        Ok(Some(request.clone()))
    }

    async fn delete_client_request(&self, id: i32) -> StoreResult<bool> {
        Ok(self.write()?.client_requests.remove(&id).is_some())
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .map(|stored| state.render_task(stored))
            .collect())
    }

    async fn find_task(&self, id: i32) -> StoreResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).map(|stored| state.render_task(stored)))
    }

    async fn create_task(&self, task: NewTask) -> StoreResult<Task> {
        let mut state = self.write()?;
        let stored = StoredTask {
            id: state.next_id("tasks"),
            title: task.title,
            description: task.description,
            department: task.department,
            created_by: task.created_by,
            assigned_to: task.assigned_to,
            status: task.status,
            created_at: Utc::now(),
        };
        state.tasks.insert(stored.id, stored.clone());
        Ok(state.render_task(&stored))
    }

    async fn update_task(&self, id: i32, changes: TaskChanges) -> StoreResult<Option<Task>> {
        let mut state = self.write()?;
        let Some(stored) = state.tasks.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            stored.title = title;
        }
        if let Some(description) = changes.description {
            stored.description = description;
        }
        if let Some(department) = changes.department {
            stored.department = department;
        }
        if let Some(assigned_to) = changes.assigned_to {
            stored.assigned_to = assigned_to;
        }
        if let Some(status) = changes.status {
            stored.status = status;
        }
        let stored = stored.clone();
        Ok(Some(state.render_task(&stored)))
    }

    async fn delete_task(&self, id: i32) -> StoreResult<bool> {
        let mut state = self.write()?;
        if state.tasks.remove(&id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, comment| comment.task != id);
        state.logs.retain(|_, entry| entry.task != id);
        Ok(true)
    }

    async fn list_comments(&self, task_id: i32) -> StoreResult<Vec<TaskComment>> {
        Ok(self
            .read()?
            .comments
            .values()
            .filter(|comment| comment.task == task_id)
            .cloned()
            .collect())
    }

    async fn create_comment(
        &self,
        task_id: i32,
        user_id: i32,
        comment: &str,
    ) -> StoreResult<TaskComment> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&task_id) {
            return Err(AppError::NotFound("Task not found".into()));
        }
        let comment = TaskComment {
            id: state.next_id("task_comments"),
            task: task_id,
            user: state.summary(user_id)?,
            comment: comment.to_string(),
            created_at: Utc::now(),
        };
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_logs(&self, task_id: i32) -> StoreResult<Vec<TaskLog>> {
        Ok(self
            .read()?
            .logs
            .values()
            .filter(|entry| entry.task == task_id)
            .cloned()
            .collect())
    }

    async fn create_log(&self, entry: NewTaskLog) -> StoreResult<TaskLog> {
        let mut state = self.write()?;
        if !state.tasks.contains_key(&entry.task) {
            return Err(AppError::NotFound("Task not found".into()));
        }
        let user = entry.user.map(|id| state.summary(id)).transpose()?;
        let log = TaskLog {
            id: state.next_id("task_logs"),
            task: entry.task,
            user,
            action_type: entry.action_type,
            old_value: entry.old_value,
            new_value: entry.new_value,
            created_at: Utc::now(),
        };
        state.logs.insert(log.id, log.clone());
        Ok(log)
    }
}
