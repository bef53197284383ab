//! Resolves a login identifier that may be either a username or an email.

use crate::auth::password::verify_password;
use crate::error::AppError;
use crate::models::User;
use crate::store::Store;

/// Returns the user whose credentials match, or `None`.
///
/// The identifier is first treated as a username. If that fails, it is looked up
/// as an email; when exactly one account carries that email, the check is retried
/// with that account's username. Callers must not reveal which step failed.
/// A blank identifier or password never matches.
pub async fn authenticate(
    store: &dyn Store,
    identifier: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    if identifier.is_empty() || password.is_empty() {
        return Ok(None);
    }

    if let Some(user) = check_credentials(store, identifier, password).await? {
        return Ok(Some(user));
    }

    let mut by_email = store.find_users_by_email(identifier).await?;
    if by_email.len() != 1 {
        return Ok(None);
    }
    let username = by_email.remove(0).username;
    check_credentials(store, &username, password).await
}

async fn check_credentials(
    store: &dyn Store,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let Some(user) = store.find_user_by_username(username).await? else {
        return Ok(None);
    };
    if !user.is_active {
        return Ok(None);
    }
    if verify_password(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password_with_cost;
    use crate::models::NewUser;
    use crate::store::MemoryStore;

    async fn add_user(store: &MemoryStore, username: &str, email: &str, password: &str) -> User {
        store
            .create_user(NewUser {
                username: username.into(),
                email: email.into(),
                password_hash: hash_password_with_cost(password, 4).unwrap(),
                is_staff: false,
                is_superuser: false,
                roles: vec![],
            })
            .await
            .unwrap()
    }

    #[actix_rt::test]
    async fn test_username_login() {
        let store = MemoryStore::new();
        let alice = add_user(&store, "alice", "alice@example.com", "secret").await;

        let found = authenticate(&store, "alice", "secret").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(alice.id));
    }

    #[actix_rt::test]
    async fn test_email_login_resolves_username() {
        let store = MemoryStore::new();
        add_user(&store, "alice", "alice@example.com", "secret").await;

        let found = authenticate(&store, "alice@example.com", "secret")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.username, "alice");
    }

    #[actix_rt::test]
    async fn test_wrong_password_fails_for_both_identifiers() {
        let store = MemoryStore::new();
        add_user(&store, "alice", "alice@example.com", "secret").await;

        assert!(authenticate(&store, "alice", "nope").await.unwrap().is_none());
        assert!(authenticate(&store, "alice@example.com", "nope")
            .await
            .unwrap()
            .is_none());
        assert!(authenticate(&store, "nobody", "secret").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_blank_credentials_never_match() {
        let store = MemoryStore::new();
        add_user(&store, "alice", "", "secret").await;

        assert!(authenticate(&store, "", "secret").await.unwrap().is_none());
        assert!(authenticate(&store, "alice", "").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_shared_email_is_ambiguous() {
        let store = MemoryStore::new();
        add_user(&store, "alice", "team@example.com", "secret").await;
        add_user(&store, "bob", "team@example.com", "secret").await;

        assert!(authenticate(&store, "team@example.com", "secret")
            .await
            .unwrap()
            .is_none());
    }
}
