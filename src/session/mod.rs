//! Authenticated session state and the guard in front of protected views.

pub mod error;
pub mod guard;
pub mod headless_mode;
pub mod messages;
pub mod tui_mode;

pub use error::AuthError;
pub use guard::{AuthGuard, GuardState};
pub use headless_mode::run_headless_mode;
pub use tui_mode::run_tui_mode;

use crate::models::User;
use serde::{Deserialize, Serialize};

/// Bearer token and profile of the signed-in administrator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn is_super_admin(&self) -> bool {
        self.user.is_super_admin
    }

    /// Role changes are offered only to super-admins. The backend must still enforce this.
    pub fn require_super_admin(&self) -> Result<(), AuthError> {
        if self.is_super_admin() {
            Ok(())
        } else {
            Err(AuthError::NotSuperAdmin)
        }
    }
}
