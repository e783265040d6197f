//! Credential checks and bearer tokens.
//!
//! [`AuthService`] ties a [`UserStore`] to a [`TokenService`]: a login checks
//! the store and issues a token, and every protected request verifies its
//! token back into the [`User`] it was issued for.

mod token;
mod users;

pub use token::TokenService;
pub use users::{StaticUserStore, UserStore};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Invalid authentication credentials")]
    InvalidToken,

    #[error("Failed to encode token: {0}")]
    TokenEncoding(String),
}

/// Roles outside this set read back as `Viewer`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(other)]
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Viewer => f.write_str("viewer"),
        }
    }
}

/// An authenticated user as exposed to API clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct User {
    /// Login name, also the token subject
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Returns the user only when the username exists and the password matches.
    /// Unknown users and wrong passwords fail the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.users
            .verify_password(username, password)
            .await
            .ok_or(AuthError::InvalidCredentials)
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        self.tokens.issue(user, None)
    }

    /// Verifies a bearer token and rebuilds the user it was issued for
    pub fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(token)?;
        Ok(User {
            username: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}
