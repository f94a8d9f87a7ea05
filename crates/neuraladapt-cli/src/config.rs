//! Configuration file management for neuraladapt.
//!
//! Provides a TOML-based config file at `~/.config/neuraladapt/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use neuraladapt_core::budget::DEFAULT_DAILY_LIMIT_CENTS;
use neuraladapt_core::llm::OpenAiConfig;
use neuraladapt_core::llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use neuraladapt_db::config::DbConfig;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_MODEL: &str = "NEURALADAPT_LLM_MODEL";
pub const ENV_BASE_URL: &str = "NEURALADAPT_LLM_BASE_URL";
pub const ENV_DAILY_BUDGET: &str = "OPENAI_MAX_DAILY_CENTS";
pub const ENV_ARTIFACT_DIR: &str = "NEURALADAPT_ARTIFACT_DIR";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LlmSection {
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Prefer the `OPENAI_API_KEY` env var; this is a fallback.
    pub api_key: Option<String>,
    pub daily_budget_cents: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExportSection {
    pub artifact_dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the neuraladapt config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/neuraladapt` or
/// `~/.config/neuraladapt`, including on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("neuraladapt");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("neuraladapt")
}

/// Return the path to the neuraladapt config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Where exported workbooks go when nothing else is configured.
pub fn default_artifact_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("neuraladapt")
        .join("artifacts")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since it may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(path)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct NeuralAdaptConfig {
    pub db_config: DbConfig,
    pub llm: OpenAiConfig,
    pub daily_budget_cents: u32,
    pub artifact_dir: PathBuf,
}

impl NeuralAdaptConfig {
    /// Resolve configuration from the process environment and the config
    /// file, if there is one.
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = if config_path().exists() {
            Some(load_config()?)
        } else {
            None
        };
        Self::resolve_with(cli_db_url, file_config.as_ref(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Resolve using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `NEURALADAPT_DATABASE_URL` > `database.url` > [`DbConfig::default_url`]
    /// - model, base URL, API key: env > `[llm]` > built-in default (no key)
    /// - daily budget: `OPENAI_MAX_DAILY_CENTS` > `llm.daily_budget_cents` > 800
    /// - artifact dir: `NEURALADAPT_ARTIFACT_DIR` > `export.artifact_dir` > cache dir
    pub fn resolve_with(
        cli_db_url: Option<&str>,
        file: Option<&ConfigFile>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let llm_file = file.map(|f| &f.llm);

        let db_url = cli_db_url
            .map(str::to_owned)
            .or_else(|| env(DbConfig::ENV_VAR))
            .or_else(|| file.map(|f| f.database.url.clone()))
            .unwrap_or_else(DbConfig::default_url);

        let model = env(ENV_MODEL)
            .or_else(|| llm_file.and_then(|l| l.model.clone()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        let base_url = env(ENV_BASE_URL)
            .or_else(|| llm_file.and_then(|l| l.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let api_key = env(ENV_API_KEY).or_else(|| llm_file.and_then(|l| l.api_key.clone()));

        let daily_budget_cents = match env(ENV_DAILY_BUDGET) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_DAILY_BUDGET} must be a whole number of cents, got {raw:?}"))?,
            None => llm_file
                .and_then(|l| l.daily_budget_cents)
                .unwrap_or(DEFAULT_DAILY_LIMIT_CENTS),
        };

        let artifact_dir = env(ENV_ARTIFACT_DIR)
            .map(PathBuf::from)
            .or_else(|| file.and_then(|f| f.export.artifact_dir.clone()))
            .unwrap_or_else(default_artifact_dir);

        Ok(Self {
            db_config: DbConfig::new(db_url),
            llm: OpenAiConfig {
                base_url,
                model,
                api_key,
            },
            daily_budget_cents,
            artifact_dir,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn sample_file() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "sqlite://file.db".to_string(),
            },
            llm: LlmSection {
                model: Some("file-model".to_string()),
                base_url: Some("http://file.local/v1".to_string()),
                api_key: Some("sk-file".to_string()),
                daily_budget_cents: Some(50),
            },
            export: ExportSection {
                artifact_dir: Some(PathBuf::from("/srv/artifacts")),
            },
        }
    }

    #[test]
    fn config_roundtrip_through_toml() {
        let original = sample_file();
        let contents = toml::to_string_pretty(&original).unwrap();
        let loaded: ConfigFile = toml::from_str(&contents).unwrap();

        assert_eq!(loaded.database.url, original.database.url);
        assert_eq!(loaded.llm.model.as_deref(), Some("file-model"));
        assert_eq!(loaded.llm.daily_budget_cents, Some(50));
        assert_eq!(
            loaded.export.artifact_dir,
            Some(PathBuf::from("/srv/artifacts"))
        );
    }

    #[test]
    fn database_only_file_parses() {
        let loaded: ConfigFile = toml::from_str("[database]\nurl = \"sqlite://x.db\"\n").unwrap();
        assert_eq!(loaded.database.url, "sqlite://x.db");
        assert!(loaded.llm.model.is_none());
        assert!(loaded.export.artifact_dir.is_none());
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = NeuralAdaptConfig::resolve_with(None, None, env_of(&[])).unwrap();
        assert_eq!(config.db_config.database_url, DbConfig::default_url());
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.llm.base_url, DEFAULT_BASE_URL);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.daily_budget_cents, DEFAULT_DAILY_LIMIT_CENTS);
        assert_eq!(config.artifact_dir, default_artifact_dir());
    }

    #[test]
    fn file_overrides_defaults() {
        let file = sample_file();
        let config = NeuralAdaptConfig::resolve_with(None, Some(&file), env_of(&[])).unwrap();
        assert_eq!(config.db_config.database_url, "sqlite://file.db");
        assert_eq!(config.llm.model, "file-model");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-file"));
        assert_eq!(config.daily_budget_cents, 50);
        assert_eq!(config.artifact_dir, PathBuf::from("/srv/artifacts"));
    }

    #[test]
    fn env_overrides_file() {
        let file = sample_file();
        let env = env_of(&[
            ("NEURALADAPT_DATABASE_URL", "sqlite://env.db"),
            (ENV_MODEL, "env-model"),
            (ENV_API_KEY, "sk-env"),
            (ENV_DAILY_BUDGET, "120"),
            (ENV_ARTIFACT_DIR, "/tmp/env-artifacts"),
        ]);
        let config = NeuralAdaptConfig::resolve_with(None, Some(&file), env).unwrap();
        assert_eq!(config.db_config.database_url, "sqlite://env.db");
        assert_eq!(config.llm.model, "env-model");
        assert_eq!(config.llm.base_url, "http://file.local/v1");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.daily_budget_cents, 120);
        assert_eq!(config.artifact_dir, PathBuf::from("/tmp/env-artifacts"));
    }

    #[test]
    fn cli_flag_overrides_all() {
        let file = sample_file();
        let env = env_of(&[("NEURALADAPT_DATABASE_URL", "sqlite://env.db")]);
        let config =
            NeuralAdaptConfig::resolve_with(Some("sqlite://cli.db"), Some(&file), env).unwrap();
        assert_eq!(config.db_config.database_url, "sqlite://cli.db");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let file = sample_file();
        let env = env_of(&[(ENV_API_KEY, "  "), (ENV_MODEL, "")]);
        let config = NeuralAdaptConfig::resolve_with(None, Some(&file), env).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-file"));
        assert_eq!(config.llm.model, "file-model");
    }

    #[test]
    fn invalid_budget_is_an_error() {
        let env = env_of(&[(ENV_DAILY_BUDGET, "lots")]);
        let err = NeuralAdaptConfig::resolve_with(None, None, env).unwrap_err();
        assert!(
            err.to_string().contains(ENV_DAILY_BUDGET),
            "unexpected error: {err}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn save_config_writes_private_file_under_xdg() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };

        let saved = save_config(&sample_file());
        let loaded = load_config();

        // Restore env before asserting, to avoid poisoning the mutex on failure.
        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        let path = saved.unwrap();
        assert_eq!(path, tmp.path().join("neuraladapt").join("config.toml"));
        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
        assert_eq!(loaded.unwrap().llm.model.as_deref(), Some("file-model"));
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let _lock = lock_env();
        let path = config_path();
        assert!(
            path.ends_with("neuraladapt/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
