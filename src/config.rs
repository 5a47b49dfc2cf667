//! Configuration loaded from `vulntrack.toml`.
//!
//! [`VulntrackConfig`] holds every configurable parameter; fields missing
//! from the file fall back to defaults. The `VULNTRACK_TOKEN` environment
//! variable takes precedence over the file for the API token.

use anyhow::Result;
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::lifecycle::Role;

/// Top-level configuration loaded from `vulntrack.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct VulntrackConfig {
    /// Root URL of the backend API, e.g. `http://localhost:8080/api/v1`.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token for the backend.
    #[serde(default)]
    pub token: String,

    /// Acting user id; may also be given per invocation via `--actor-id`.
    #[serde(default)]
    pub actor_id: Option<u64>,

    /// Acting user role, by name (`security_engineer`) or by the backend's
    /// legacy numeric id (2). May also be given per invocation via `--role`.
    #[serde(default, deserialize_with = "role_name_or_code")]
    pub role: Option<Role>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8080/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn role_name_or_code<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NameOrCode {
        Code(u8),
        Name(Role),
    }

    match Option::<NameOrCode>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NameOrCode::Name(role)) => Ok(Some(role)),
        Some(NameOrCode::Code(code)) => Role::from_code(code)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown role code {code}"))),
    }
}

impl Default for VulntrackConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: String::new(),
            actor_id: None,
            role: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl VulntrackConfig {
    /// Load configuration from `vulntrack.toml` in the current directory,
    /// falling back to defaults if the file does not exist.
    pub fn load() -> Result<Self> {
        Self::from_path(Path::new("vulntrack.toml"))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<VulntrackConfig>(&contents)?
        } else {
            Self::default()
        };

        // Environment variable takes precedence over the file for the token.
        if let Ok(token) = std::env::var("VULNTRACK_TOKEN")
            && !token.is_empty()
        {
            config.token = token;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = VulntrackConfig::default();
        assert_eq!(config.api_url, "http://localhost:8080/api/v1");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.token.is_empty());
        assert!(config.actor_id.is_none());
        assert!(config.role.is_none());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_url = "https://vulns.internal/api/v1"
            token = "tok-123"
            actor_id = 5
            role = "security_engineer"
        "#;
        let config: VulntrackConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_url, "https://vulns.internal/api/v1");
        assert_eq!(config.token, "tok-123");
        assert_eq!(config.actor_id, Some(5));
        assert_eq!(config.role, Some(Role::SecurityEngineer));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn role_accepts_legacy_numeric_code() {
        let config: VulntrackConfig = toml::from_str("role = 3\n").unwrap();
        assert_eq!(config.role, Some(Role::DevEngineer));

        let err = toml::from_str::<VulntrackConfig>("role = 7\n");
        assert!(err.is_err());
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vulntrack.toml");
        std::fs::write(&path, "token = \"from-file\"\ntimeout_secs = 5\n").unwrap();

        let config = VulntrackConfig::from_path(&path).unwrap();
        assert_eq!(config.timeout_secs, 5);
        // Token may be overridden by the environment in CI; only check the
        // file value when the variable is unset.
        if std::env::var("VULNTRACK_TOKEN").is_err() {
            assert_eq!(config.token, "from-file");
        }
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = VulntrackConfig::from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.timeout_secs, 30);
    }
}
