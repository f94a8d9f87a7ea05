use std::env;
use std::path::PathBuf;

/// Database configuration.
///
/// Reads from the `NEURALADAPT_DATABASE_URL` environment variable, falling
/// back to a SQLite file under the platform data directory when unset.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full SQLite connection URL (`sqlite://path/to/file.db` or `sqlite::memory:`).
    pub database_url: String,
}

impl DbConfig {
    /// Environment variable consulted by [`DbConfig::from_env`].
    pub const ENV_VAR: &str = "NEURALADAPT_DATABASE_URL";

    /// File name of the on-disk store.
    pub const DB_FILE_NAME: &str = "neuraladapt.db";

    /// The default connection URL used when no environment variable is set.
    ///
    /// `$XDG_DATA_HOME/neuraladapt/neuraladapt.db` (or the platform
    /// equivalent), falling back to the working directory.
    pub fn default_url() -> String {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neuraladapt");
        format!("sqlite://{}", dir.join(Self::DB_FILE_NAME).display())
    }

    /// Build a config from the environment.
    ///
    /// Priority: `NEURALADAPT_DATABASE_URL` env var, then [`DbConfig::default_url`].
    pub fn from_env() -> Self {
        let database_url = env::var(Self::ENV_VAR).unwrap_or_else(|_| Self::default_url());
        Self { database_url }
    }

    /// Build a config from an explicit URL (useful for tests and CLI flags).
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Whether this config points at a transient in-memory database.
    pub fn is_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Filesystem path of the database file, if the URL names one.
    ///
    /// Returns `None` for in-memory databases.
    pub fn database_path(&self) -> Option<PathBuf> {
        if self.is_memory() {
            return None;
        }
        let rest = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().filter(|s| !s.is_empty())?;
        Some(PathBuf::from(path))
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url_points_at_db_file() {
        let url = DbConfig::default_url();
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with("neuraladapt/neuraladapt.db"), "got {url}");
    }

    #[test]
    fn database_path_extraction() {
        let cfg = DbConfig::new("sqlite:///var/lib/neuraladapt/app.db");
        assert_eq!(
            cfg.database_path(),
            Some(PathBuf::from("/var/lib/neuraladapt/app.db"))
        );
    }

    #[test]
    fn database_path_strips_query() {
        let cfg = DbConfig::new("sqlite://data/app.db?mode=rwc");
        assert_eq!(cfg.database_path(), Some(PathBuf::from("data/app.db")));
    }

    #[test]
    fn memory_url_has_no_path() {
        let cfg = DbConfig::new("sqlite::memory:");
        assert!(cfg.is_memory());
        assert_eq!(cfg.database_path(), None);
    }
}
