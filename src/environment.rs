use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Backend used when no override is configured.
pub const LOCAL_API_URL: &str = "http://localhost:5000/api";

/// Represents the backend deployments the admin client can talk to.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Environment {
    /// A backend running on this machine.
    #[default]
    Local,
    /// Any other deployment, addressed by its base URL.
    Custom { api_url: String },
}

impl Environment {
    /// Returns the REST API base URL associated with the environment.
    pub fn api_url(&self) -> String {
        match self {
            Environment::Local => LOCAL_API_URL.to_string(),
            Environment::Custom { api_url } => api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves the environment from an explicit override, falling back to a local backend.
    pub fn resolve(api_url: Option<&str>) -> Self {
        api_url
            .filter(|url| !url.trim().is_empty())
            .and_then(|url| url.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(Environment::Local);
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            if trimmed.trim_end_matches('/') == LOCAL_API_URL {
                return Ok(Environment::Local);
            }
            return Ok(Environment::Custom {
                api_url: trimmed.trim_end_matches('/').to_string(),
            });
        }
        Err(())
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "Local"),
            Environment::Custom { .. } => write!(f, "Custom"),
        }
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Environment::{}, URL: {}", self, self.api_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_custom_url_and_trims_slash() {
        let env = Environment::resolve(Some("http://localhost:4000/api/"));
        assert_eq!(
            env,
            Environment::Custom {
                api_url: "http://localhost:4000/api".to_string()
            }
        );
        assert_eq!(env.api_url(), "http://localhost:4000/api");
    }

    #[test]
    fn falls_back_to_local() {
        assert_eq!(Environment::resolve(None), Environment::Local);
        assert_eq!(Environment::resolve(Some("  ")), Environment::Local);
        assert_eq!(Environment::resolve(Some("ftp://x")), Environment::Local);
        assert_eq!(
            Environment::resolve(Some("local")),
            Environment::Local
        );
    }
}
