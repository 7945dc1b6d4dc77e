//! Error handling for authentication and authorization checks

use crate::api::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// No token is stored; the user has to log in first.
    #[error("You are not logged in. Run `event-admin login` first.")]
    NotLoggedIn,

    /// The account exists but holds neither admin flag.
    #[error("You are not allowed to log in.")]
    AccessDenied,

    /// The action is reserved for super-admins.
    #[error("Only Super Admins can change roles!")]
    NotSuperAdmin,

    /// Credentials or token were refused by the backend.
    #[error("Invalid credentials or token.")]
    Api(#[from] ApiError),
}
