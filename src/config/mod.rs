use std::time::Duration;

use crate::errors::{GatorError, GatorResult};

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> GatorResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        // Default db_path is relative to executable directory
        let db_path = std::env::var("GATOR_DB_PATH").unwrap_or_else(|_| {
            exe_dir
                .map(|d| d.join("gator.db").to_string_lossy().into_owned())
                .unwrap_or_else(|| "./gator.db".to_string())
        });

        let fetch_timeout = match std::env::var("GATOR_FETCH_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout_secs(&raw)?,
            Err(_) => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        let user_agent =
            std::env::var("GATOR_USER_AGENT").unwrap_or_else(|_| default_user_agent());

        Ok(Self {
            db_path,
            fetch_timeout,
            user_agent,
        })
    }
}

pub fn default_user_agent() -> String {
    format!("gator/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_timeout_secs(raw: &str) -> GatorResult<Duration> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        GatorError::Config(format!("GATOR_FETCH_TIMEOUT_SECS must be a number, got {:?}", raw))
    })?;

    if secs == 0 {
        return Err(GatorError::Config(
            "GATOR_FETCH_TIMEOUT_SECS must be greater than zero".to_string(),
        ));
    }

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout_secs() {
        assert_eq!(parse_timeout_secs("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_timeout_secs(" 5 ").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_timeout_secs_rejects_garbage_and_zero() {
        assert!(matches!(parse_timeout_secs("ten"), Err(GatorError::Config(_))));
        assert!(matches!(parse_timeout_secs("0"), Err(GatorError::Config(_))));
    }

    #[test]
    fn test_default_user_agent_names_the_crate() {
        assert!(default_user_agent().starts_with("gator/"));
    }
}
