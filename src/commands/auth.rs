//! Logging in and out.

use super::{CmdResult, api_failure, invalid_input};
use crate::api::AdminApi;
use crate::config::Config;
use crate::environment::Environment;
use crate::session::{AuthError, Session};
use crate::validation::{self, LoginForm};
use crate::{print_cmd_error, print_cmd_info, print_cmd_success};
use std::path::Path;

/// Authenticates an administrator and stores the session in the config file.
///
/// Accounts without either admin flag are turned away and nothing is written.
/// The token is checked against a protected route before it is stored.
pub async fn login(form: LoginForm, config_path: &Path, api: &dyn AdminApi) -> CmdResult<Session> {
    validation::check(&form).map_err(invalid_input)?;

    let grant = api
        .login(form.email.trim(), &form.password)
        .await
        .map_err(|e| api_failure("Invalid credentials.", e))?;

    if !grant.user.has_admin_access() {
        let err = AuthError::AccessDenied;
        print_cmd_error!(&err.to_string());
        return Err(err.into());
    }

    api.verify_token(&grant.token)
        .await
        .map_err(|e| api_failure("Invalid token.", e))?;

    let session = Session {
        token: grant.token,
        user: grant.user,
    };

    let mut config = Config::load_or_default(config_path)?;
    config.api_url = match api.environment() {
        Environment::Local => None,
        custom => Some(custom.api_url()),
    };
    config
        .establish_session(session.clone(), config_path)
        .map_err(|e| {
            print_cmd_error!("Failed to save session.", &e.to_string());
            e
        })?;

    print_cmd_success!(
        "Login successful!",
        "Signed in as {} ({})",
        session.user.name,
        session.user.role()
    );
    Ok(session)
}

/// Removes the config file and with it the stored session.
pub fn logout(config_path: &Path) -> CmdResult {
    print_cmd_info!("Logging out", "Clearing {}", config_path.display());
    Config::clear(config_path)?;
    Ok(())
}
