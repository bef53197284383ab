//! Exercises `PgStore` against a live database. Run with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`; the schema is migrated
//! on connect and every row created here is removed again.

use dotenv::dotenv;
use pretty_assertions::assert_eq;

use taskdesk::auth::hash_password_with_cost;
use taskdesk::error::AppError;
use taskdesk::models::{
    ClientPatch, LogAction, NewTask, NewTaskLog, NewUser, Role, TaskChanges, TaskStatus,
};
use taskdesk::store::{PgStore, Store};

async fn connect() -> PgStore {
    dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let store = PgStore::connect(&url, 2)
        .await
        .expect("Failed to connect to test DB");
    store.migrate().await.expect("Failed to migrate test DB");
    store
}

#[actix_rt::test]
#[ignore = "needs DATABASE_URL"]
async fn test_pg_task_lifecycle() {
    let store = connect().await;
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let username = format!("pg_{}", &suffix[..12]);

    let user = store
        .create_user(NewUser {
            username: username.clone(),
            email: format!("{}@example.com", username),
            password_hash: hash_password_with_cost("secret", 4).unwrap(),
            is_staff: false,
            is_superuser: false,
            roles: vec![Role::Manager],
        })
        .await
        .unwrap();
    assert_eq!(user.roles, vec![Role::Manager]);

    let duplicate = store
        .create_user(NewUser {
            username: username.clone(),
            email: "other@example.com".into(),
            password_hash: user.password_hash.clone(),
            is_staff: false,
            is_superuser: false,
            roles: vec![],
        })
        .await;
    match duplicate {
        Err(AppError::ValidationError(errors)) => {
            assert!(errors.field_errors().contains_key("username"));
        }
        other => panic!("expected a username validation error, got {:?}", other.map(|u| u.id)),
    }

    let found = store.find_users_by_email(&user.email).await.unwrap();
    assert_eq!(found.len(), 1);

    let dept = store.create_department(&format!("dept-{}", suffix)).await.unwrap();
    let task = store
        .create_task(NewTask {
            title: "pg task".into(),
            description: String::new(),
            department: dept.id,
            created_by: user.id,
            assigned_to: Some(user.id),
            status: TaskStatus::Open,
        })
        .await
        .unwrap();
    assert_eq!(task.created_by, username);

    let updated = store
        .update_task(
            task.id,
            TaskChanges {
                status: Some(TaskStatus::Done),
                assigned_to: Some(None),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.assigned_to, None);
    assert_eq!(updated.title, "pg task");

    store.create_comment(task.id, user.id, "noted").await.unwrap();
    store
        .create_log(NewTaskLog {
            task: task.id,
            user: Some(user.id),
            action_type: LogAction::StatusChange,
            old_value: "OPEN".into(),
            new_value: "DONE".into(),
        })
        .await
        .unwrap();
    assert_eq!(store.list_comments(task.id).await.unwrap().len(), 1);
    assert_eq!(store.list_logs(task.id).await.unwrap().len(), 1);

    assert!(store.delete_task(task.id).await.unwrap());
    assert!(store.list_comments(task.id).await.unwrap().is_empty());
    assert!(!store.delete_task(task.id).await.unwrap());

    let client = store.create_client("pg client", "Finance").await.unwrap();
    let renamed = store
        .update_client(
            client.id,
            ClientPatch {
                name: Some("pg client 2".into()),
                department: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.department, "Finance");
    assert!(store.delete_client(client.id).await.unwrap());

    sqlx::query("DELETE FROM tasks WHERE department_id = $1")
        .bind(dept.id)
        .execute(store.pool())
        .await
        .unwrap();
    sqlx::query("DELETE FROM departments WHERE id = $1")
        .bind(dept.id)
        .execute(store.pool())
        .await
        .unwrap();
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(store.pool())
        .await
        .unwrap();
}
