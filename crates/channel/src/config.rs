//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.intercom-channel/config.json`) and environment.

use crate::validation::{Field, MessageKind, ValidationPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub intercom: IntercomConfig,
}

/// Intercom API access and message validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntercomConfig {
    /// Access token. Overridden by INTERCOM_ACCESS_TOKEN env when set.
    pub access_token: Option<String>,

    /// API base URL (default "https://api.intercom.io").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as the Intercom-Version header (default "2.11").
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds (default 30). 0 disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Per-kind overrides of the required message fields. Kinds left out keep the defaults.
    #[serde(default)]
    pub required_fields: RequiredFieldsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredFieldsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inapp: Option<Vec<Field>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Vec<Field>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<Vec<Field>>,
}

fn default_base_url() -> String {
    "https://api.intercom.io".to_string()
}

fn default_api_version() -> String {
    "2.11".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for IntercomConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: default_base_url(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            required_fields: RequiredFieldsConfig::default(),
        }
    }
}

impl IntercomConfig {
    /// Per-request timeout; `None` when `timeoutSecs` is 0.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Default policy with the configured per-kind overrides applied.
    pub fn validation_policy(&self) -> ValidationPolicy {
        let overrides = [
            (MessageKind::InApp, &self.required_fields.inapp),
            (MessageKind::Email, &self.required_fields.email),
            (MessageKind::Reply, &self.required_fields.reply),
        ];
        overrides
            .into_iter()
            .fold(ValidationPolicy::default(), |policy, (kind, fields)| match fields {
                Some(fields) => policy.require(kind, fields.clone()),
                None => policy,
            })
    }
}

/// Resolve the access token: env INTERCOM_ACCESS_TOKEN overrides config.
pub fn resolve_access_token(config: &Config) -> Option<String> {
    std::env::var("INTERCOM_ACCESS_TOKEN")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .intercom
                .access_token
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("INTERCOM_CHANNEL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".intercom-channel").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (or INTERCOM_CHANNEL_CONFIG). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("intercom-config-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn defaults() {
        let c = IntercomConfig::default();
        assert_eq!(c.base_url, "https://api.intercom.io");
        assert_eq!(c.api_version, "2.11");
        assert_eq!(c.timeout_secs, 30);
        assert_eq!(c.validation_policy(), ValidationPolicy::default());
    }

    #[test]
    fn zero_timeout_means_none() {
        let mut c = IntercomConfig::default();
        assert_eq!(c.request_timeout(), Some(Duration::from_secs(30)));
        c.timeout_secs = 0;
        assert_eq!(c.request_timeout(), None);
    }

    /// Restores an env var to its previous value on drop.
    struct EnvGuard {
        key: &'static str,
        old: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let old = std::env::var(key).ok();
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
            Self { key, old }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }

    // Only test in this crate that touches INTERCOM_ACCESS_TOKEN / INTERCOM_CHANNEL_CONFIG;
    // all env cases live here so they run sequentially.
    #[test]
    fn env_overrides_token_and_config_path() {
        let mut config = Config::default();
        config.intercom.access_token = Some("  cfg-token ".to_string());

        {
            let _token = EnvGuard::set("INTERCOM_ACCESS_TOKEN", None);
            assert_eq!(resolve_access_token(&config).as_deref(), Some("cfg-token"));
        }
        {
            let _token = EnvGuard::set("INTERCOM_ACCESS_TOKEN", Some(" env-token\n"));
            assert_eq!(resolve_access_token(&config).as_deref(), Some("env-token"));
        }
        {
            let _token = EnvGuard::set("INTERCOM_ACCESS_TOKEN", Some(""));
            assert_eq!(resolve_access_token(&config).as_deref(), Some("cfg-token"));
        }
        {
            let _token = EnvGuard::set("INTERCOM_ACCESS_TOKEN", Some("   "));
            assert_eq!(resolve_access_token(&config).as_deref(), Some("cfg-token"));

            config.intercom.access_token = Some("   ".to_string());
            assert_eq!(resolve_access_token(&config), None);
            config.intercom.access_token = None;
            assert_eq!(resolve_access_token(&config), None);
        }

        let path = temp_dir().join("custom.json");
        {
            let _path = EnvGuard::set("INTERCOM_CHANNEL_CONFIG", path.to_str());
            assert_eq!(default_config_path(), path);
            let (_, used) = load_config(None).unwrap();
            assert_eq!(used, path);
        }
        {
            let _path = EnvGuard::set("INTERCOM_CHANNEL_CONFIG", None);
            let default = default_config_path();
            assert!(default.ends_with("config.json"));
            if dirs::home_dir().is_some() {
                assert!(default.ends_with(".intercom-channel/config.json"));
            }
        }
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = temp_dir().join("config.json");
        let (config, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert!(config.intercom.access_token.is_none());
    }

    #[test]
    fn load_camel_case_file() {
        let path = temp_dir().join("config.json");
        std::fs::File::create(&path)
            .and_then(|mut f| {
                f.write_all(
                    br#"{
                        "intercom": {
                            "accessToken": "tok",
                            "baseUrl": "http://127.0.0.1:4010",
                            "timeoutSecs": 5,
                            "requiredFields": { "inapp": ["body", "to"] }
                        }
                    }"#,
                )
            })
            .expect("write config.json");
        let (config, _) = load_config(Some(path)).unwrap();
        assert_eq!(config.intercom.access_token.as_deref(), Some("tok"));
        assert_eq!(config.intercom.base_url, "http://127.0.0.1:4010");
        assert_eq!(config.intercom.api_version, "2.11");
        assert_eq!(config.intercom.timeout_secs, 5);
        let policy = config.intercom.validation_policy();
        assert_eq!(policy.required(MessageKind::InApp), &[Field::Body, Field::To]);
        assert_eq!(policy.required(MessageKind::Reply), &[Field::Body]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_dir().join("config.json");
        std::fs::write(&path, "{ not json").expect("write config.json");
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().starts_with("parsing config from"));
    }
}
