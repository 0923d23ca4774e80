//! Validation helpers for connection settings.

use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::model::ConnectionConfig;

/// Check that `config` names a reachable endpoint.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for an empty host, a zero port, or a
/// path not starting with `/`.
pub fn validate(config: &ConnectionConfig) -> ConfigResult<()> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::invalid("host", "must not be empty", None));
    }
    if config.port == 0 {
        return Err(ConfigError::invalid(
            "port",
            "must be between 1 and 65535",
            Some("0".into()),
        ));
    }
    if !config.path.starts_with('/') {
        return Err(ConfigError::invalid(
            "path",
            "must start with '/'",
            Some(config.path.clone()),
        ));
    }
    Ok(())
}

pub(crate) fn parse_port(value: &Value, field: &'static str) -> ConfigResult<u16> {
    let port = value
        .as_i64()
        .ok_or_else(|| ConfigError::invalid(field, "must be an integer", Some(value.to_string())))?;

    u16::try_from(port)
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| {
            ConfigError::invalid(
                field,
                "must be between 1 and 65535",
                Some(port.to_string()),
            )
        })
}

pub(crate) fn parse_optional_string(
    value: Option<&Value>,
    field: &'static str,
) -> ConfigResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(ConfigError::invalid(
            field,
            "must be a string",
            Some(other.to_string()),
        )),
    }
}
