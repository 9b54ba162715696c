use crate::domain::User;
use crate::errors::{GatorError, GatorResult};
use crate::storage::traits::UserRepository;

pub struct UserService<U: UserRepository> {
    repository: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(repository: U) -> Self {
        Self { repository }
    }

    /// Create a user and make it the session user.
    pub fn register(&self, name: &str) -> GatorResult<User> {
        let name = validate_name(name)?;
        let user = self.repository.create(name)?;
        self.repository.set_session_user(&user.name)?;
        tracing::info!(user_id = user.id, name = %user.name, "Registered user");
        Ok(user)
    }

    /// Switch the session to an existing user.
    pub fn login(&self, name: &str) -> GatorResult<User> {
        let user = self
            .repository
            .get_by_name(name)?
            .ok_or_else(|| GatorError::UserNotFound(name.to_string()))?;
        self.repository.set_session_user(&user.name)?;
        Ok(user)
    }

    /// All users, each flagged with whether it is the session user.
    pub fn list(&self) -> GatorResult<Vec<(User, bool)>> {
        let current = self.repository.session_user()?;
        let users = self.repository.get_all()?;

        Ok(users
            .into_iter()
            .map(|user| {
                let is_current = current.as_deref() == Some(user.name.as_str());
                (user, is_current)
            })
            .collect())
    }

    /// Delete every user. Their feeds, follows and posts go with them.
    pub fn reset(&self) -> GatorResult<usize> {
        let deleted = self.repository.delete_all()?;
        tracing::warn!(deleted, "Deleted all users");
        Ok(deleted)
    }

    /// Resolve the user a command runs as: an explicit name wins over the
    /// session recorded by `register`/`login`.
    pub fn resolve_current(&self, explicit: Option<&str>) -> GatorResult<User> {
        let name = match explicit {
            Some(name) => name.to_string(),
            None => self
                .repository
                .session_user()?
                .ok_or(GatorError::NotLoggedIn)?,
        };

        self.repository
            .get_by_name(&name)?
            .ok_or(GatorError::UserNotFound(name))
    }
}

fn validate_name(name: &str) -> GatorResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GatorError::InvalidInput("user name cannot be empty".to_string()));
    }
    Ok(trimmed)
}
