use super::{Role, User};
use crate::config::auth::AdminConfig;
use async_trait::async_trait;

/// A source of user records and their passwords
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns the user when `username` exists and `password` matches exactly
    async fn verify_password(&self, username: &str, password: &str) -> Option<User>;
}

/// In-memory store holding the configured administrator
#[derive(Debug, Clone)]
pub struct StaticUserStore {
    user: User,
    password: String,
}

impl StaticUserStore {
    pub fn from_config(admin: &AdminConfig) -> Self {
        Self {
            user: User {
                username: admin.username.clone(),
                email: admin.email.clone(),
                role: Role::Admin,
            },
            password: admin.password.clone(),
        }
    }
}

#[async_trait]
impl UserStore for StaticUserStore {
    async fn verify_password(&self, username: &str, password: &str) -> Option<User> {
        (self.user.username == username && self.password == password).then(|| self.user.clone())
    }
}
