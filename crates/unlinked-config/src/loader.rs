//! Loading daemon settings files and resolving command-line overrides.
//!
//! The daemon's `settings.json` only contributes `rpc-port`, `rpc-username` and
//! `rpc-url`; the password stored there is hashed and is always supplied by the
//! caller. Settings read from a file always target `http://127.0.0.1`.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    ConnectionConfig, ConnectionOverrides, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RPC_PATH, Protocol,
};
use crate::validate::{parse_optional_string, parse_port, validate};

/// Read a daemon `settings.json` and combine it with `password`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read, [`ConfigError::Json`]
/// when it is not JSON, and [`ConfigError::InvalidField`] for malformed keys.
pub fn load_settings_file(path: &Path, password: String) -> ConfigResult<ConnectionConfig> {
    let document = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&document).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded daemon settings");
    parse_settings(&value, password)
}

/// Build a connection from an already-parsed settings document.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the document is not an object or a
/// recognised key has the wrong type.
pub fn parse_settings(document: &Value, password: String) -> ConfigResult<ConnectionConfig> {
    let map = document.as_object().ok_or_else(|| {
        ConfigError::invalid("settings", "must be a JSON object", None)
    })?;

    let port = map
        .get("rpc-port")
        .map(|value| parse_port(value, "rpc-port"))
        .transpose()?
        .unwrap_or(DEFAULT_PORT);
    let username = parse_optional_string(map.get("rpc-username"), "rpc-username")?;
    let path = parse_optional_string(map.get("rpc-url"), "rpc-url")?
        .map_or_else(|| DEFAULT_RPC_PATH.to_string(), |url| normalize_rpc_url(&url));

    Ok(ConnectionConfig {
        protocol: Protocol::Http,
        host: DEFAULT_HOST.to_string(),
        port,
        username,
        password: Some(password),
        path,
    })
}

/// Map the daemon's `rpc-url` (the web root, e.g. `/transmission/`) to its RPC endpoint.
#[must_use]
pub fn normalize_rpc_url(value: &str) -> String {
    let trimmed = value.trim();
    let rooted = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    if rooted.ends_with("/rpc") {
        rooted
    } else if rooted.ends_with('/') {
        format!("{rooted}rpc")
    } else {
        format!("{rooted}/rpc")
    }
}

/// Resolve the effective connection settings.
///
/// A settings file is honoured only when a password is also supplied; otherwise the
/// explicit values (or defaults) are used and the settings file is ignored.
///
/// # Errors
///
/// Propagates settings-file failures and rejects settings failing [`validate`].
pub fn resolve(overrides: ConnectionOverrides) -> ConfigResult<ConnectionConfig> {
    let config = match (overrides.settings_file, overrides.password) {
        (Some(settings_file), Some(password)) => {
            info!(path = %settings_file.display(), "using daemon settings file");
            load_settings_file(&settings_file, password)?
        }
        (settings_file, password) => {
            if let Some(ignored) = settings_file {
                info!(
                    path = %ignored.display(),
                    "settings file ignored without a password"
                );
            }
            let defaults = ConnectionConfig::default();
            ConnectionConfig {
                protocol: overrides.protocol.unwrap_or(defaults.protocol),
                host: overrides.host.unwrap_or(defaults.host),
                port: overrides.port.unwrap_or(defaults.port),
                username: overrides.username.filter(|user| !user.is_empty()),
                password,
                path: overrides.path.unwrap_or(defaults.path),
            }
        }
    };
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use std::path::PathBuf;

    fn settings_file(contents: &str) -> Result<tempfile::NamedTempFile> {
        let file = tempfile::Builder::new()
            .prefix("settings-")
            .suffix(".json")
            .tempfile()?;
        fs::write(file.path(), contents)?;
        Ok(file)
    }

    #[test]
    fn settings_file_supplies_port_user_and_path() -> Result<()> {
        let file = settings_file(
            r#"{"rpc-port": 9091, "rpc-username": "user", "rpc-url": "/transmission/rpc"}"#,
        )?;

        let config = load_settings_file(file.path(), "pass".into())?;

        assert_eq!(config.port, 9091);
        assert_eq!(config.username.as_deref(), Some("user"));
        assert_eq!(config.password.as_deref(), Some("pass"));
        assert_eq!(config.path, "/transmission/rpc");
        Ok(())
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() -> Result<()> {
        let config = parse_settings(&json!({}), "pass".into())?;
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.path, DEFAULT_RPC_PATH);
        assert!(config.username.is_none());
        Ok(())
    }

    #[test]
    fn settings_file_always_targets_local_http() -> Result<()> {
        let config = parse_settings(&json!({"rpc-port": 8080}), "pass".into())?;
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.protocol, Protocol::Http);
        assert_eq!(config.port, 8080);
        Ok(())
    }

    #[test]
    fn web_root_rpc_url_is_normalised() {
        assert_eq!(normalize_rpc_url("/transmission/"), "/transmission/rpc");
        assert_eq!(normalize_rpc_url("/transmission"), "/transmission/rpc");
        assert_eq!(normalize_rpc_url("/custom/rpc"), "/custom/rpc");
        assert_eq!(normalize_rpc_url("seedbox/"), "/seedbox/rpc");
    }

    #[test]
    fn malformed_settings_are_rejected() -> Result<()> {
        assert!(matches!(
            parse_settings(&json!([]), "pass".into()),
            Err(ConfigError::InvalidField { field: "settings", .. })
        ));
        assert!(matches!(
            parse_settings(&json!({"rpc-port": "nope"}), "pass".into()),
            Err(ConfigError::InvalidField { field: "rpc-port", .. })
        ));

        let file = settings_file("{not json")?;
        assert!(matches!(
            load_settings_file(file.path(), "pass".into()),
            Err(ConfigError::Json { .. })
        ));
        Ok(())
    }

    #[test]
    fn unreadable_settings_file_is_an_io_error() {
        let missing = PathBuf::from("/nonexistent/unlinked/settings.json");
        assert!(matches!(
            load_settings_file(&missing, "pass".into()),
            Err(ConfigError::Io { operation: "read", .. })
        ));
    }

    #[test]
    fn explicit_values_are_used_without_settings_file() -> Result<()> {
        let config = resolve(ConnectionOverrides {
            protocol: Some(Protocol::Https),
            host: Some("192.168.1.1".into()),
            port: Some(8080),
            username: Some("user".into()),
            password: Some("pass".into()),
            path: Some("/rpc".into()),
            ..ConnectionOverrides::default()
        })?;

        assert_eq!(config.rpc_endpoint(), "https://192.168.1.1:8080/rpc");
        assert_eq!(config.username.as_deref(), Some("user"));
        assert_eq!(config.password.as_deref(), Some("pass"));
        Ok(())
    }

    #[test]
    fn settings_file_wins_over_explicit_values() -> Result<()> {
        let file = settings_file(r#"{"rpc-port": 9095}"#)?;
        let config = resolve(ConnectionOverrides {
            settings_file: Some(file.path().to_path_buf()),
            host: Some("10.0.0.5".into()),
            port: Some(1234),
            password: Some("pass".into()),
            ..ConnectionOverrides::default()
        })?;

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9095);
        Ok(())
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() -> Result<()> {
        let config = resolve(ConnectionOverrides {
            password: Some("pass".into()),
            ..ConnectionOverrides::default()
        })?;
        assert_eq!(config, ConnectionConfig {
            password: Some("pass".into()),
            ..ConnectionConfig::default()
        });
        Ok(())
    }

    #[test]
    fn settings_file_is_ignored_without_password() -> Result<()> {
        let config = resolve(ConnectionOverrides {
            settings_file: Some(PathBuf::from("/nonexistent/settings.json")),
            ..ConnectionOverrides::default()
        })?;
        assert_eq!(config.protocol, Protocol::Http);
        assert!(config.password.is_none());
        Ok(())
    }

    #[test]
    fn invalid_explicit_values_are_rejected() {
        let result = resolve(ConnectionOverrides {
            path: Some("rpc".into()),
            ..ConnectionOverrides::default()
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidField { field: "path", .. })
        ));
    }
}
