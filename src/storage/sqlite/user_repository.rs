use chrono::Utc;
use rusqlite::{OptionalExtension, Row};

use crate::domain::User;
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::{is_unique_violation, SqliteStorage};
use crate::storage::traits::UserRepository;

const SESSION_USER_KEY: &str = "current_user_name";

pub struct SqliteUserRepository {
    storage: SqliteStorage,
}

impl SqliteUserRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

impl UserRepository for SqliteUserRepository {
    fn create(&self, name: &str) -> GatorResult<User> {
        let conn = self.storage.connection()?;
        let now = Utc::now();

        let user = conn
            .query_row(
                "INSERT INTO users (name, created_at, updated_at) VALUES (?1, ?2, ?2)
                 RETURNING id, name, created_at, updated_at",
                (name, now),
                user_from_row,
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    GatorError::UserAlreadyExists(name.to_string())
                } else {
                    GatorError::from(e)
                }
            })?;

        Ok(user)
    }

    fn get_by_name(&self, name: &str) -> GatorResult<Option<User>> {
        let conn = self.storage.connection()?;
        let user = conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM users WHERE name = ?1",
                [name],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_by_id(&self, id: i64) -> GatorResult<Option<User>> {
        let conn = self.storage.connection()?;
        let user = conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM users WHERE id = ?1",
                [id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_all(&self) -> GatorResult<Vec<User>> {
        let conn = self.storage.connection()?;
        let mut stmt =
            conn.prepare("SELECT id, name, created_at, updated_at FROM users ORDER BY name")?;
        let users = stmt.query_map([], user_from_row)?;
        users.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }

    fn delete_all(&self) -> GatorResult<usize> {
        let conn = self.storage.connection()?;
        let deleted = conn.execute("DELETE FROM users", [])?;
        conn.execute("DELETE FROM session WHERE key = ?1", [SESSION_USER_KEY])?;
        Ok(deleted)
    }

    fn session_user(&self) -> GatorResult<Option<String>> {
        let conn = self.storage.connection()?;
        let name = conn
            .query_row(
                "SELECT value FROM session WHERE key = ?1",
                [SESSION_USER_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(name)
    }

    fn set_session_user(&self, name: &str) -> GatorResult<()> {
        let conn = self.storage.connection()?;
        conn.execute(
            "INSERT INTO session (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (SESSION_USER_KEY, name),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> SqliteUserRepository {
        let storage = SqliteStorage::in_memory().unwrap();
        SqliteUserRepository::new(storage)
    }

    #[test]
    fn test_create_and_get_user() {
        let repo = setup_repo();
        let user = repo.create("kahya").unwrap();
        assert!(user.id > 0);

        let by_name = repo.get_by_name("kahya").unwrap().unwrap();
        assert_eq!(by_name, user);

        let by_id = repo.get_by_id(user.id).unwrap().unwrap();
        assert_eq!(by_id.name, "kahya");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let repo = setup_repo();
        repo.create("holgith").unwrap();

        let result = repo.create("holgith");
        assert!(matches!(result, Err(GatorError::UserAlreadyExists(_))));
    }

    #[test]
    fn test_get_missing_user() {
        let repo = setup_repo();
        assert!(repo.get_by_name("nobody").unwrap().is_none());
    }

    #[test]
    fn test_get_all_sorted_by_name() {
        let repo = setup_repo();
        repo.create("zed").unwrap();
        repo.create("ada").unwrap();

        let names: Vec<String> = repo.get_all().unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["ada", "zed"]);
    }

    #[test]
    fn test_session_user_roundtrip() {
        let repo = setup_repo();
        assert!(repo.session_user().unwrap().is_none());

        repo.set_session_user("ada").unwrap();
        repo.set_session_user("zed").unwrap();
        assert_eq!(repo.session_user().unwrap().as_deref(), Some("zed"));
    }

    #[test]
    fn test_delete_all_clears_session() {
        let repo = setup_repo();
        repo.create("ada").unwrap();
        repo.set_session_user("ada").unwrap();

        assert_eq!(repo.delete_all().unwrap(), 1);
        assert!(repo.get_all().unwrap().is_empty());
        assert!(repo.session_user().unwrap().is_none());
    }
}
