//! Console plugin endpoints: health, feature flags and plugin settings.
//!
//! # Responsibilities
//! - Answer liveness probes
//! - Expose the enabled feature flags to the frontend
//! - Read the plugin YAML settings once at startup and serve them as JSON
//!
//! # Design Decisions
//! - An unreadable settings file is not fatal; the frontend gets `{}`
//! - A settings file that does not parse is reported on every `/config` call
//! - `timeout` accepts Go-style durations (`30s`, `1m30s`) or integer seconds

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::server::AppState;

/// Settings the frontend reads from `/config`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PluginConfig {
    #[serde(
        default,
        deserialize_with = "deserialize_timeout",
        serialize_with = "serialize_timeout",
        skip_serializing_if = "is_unset"
    )]
    pub timeout: Option<Duration>,
}

impl PluginConfig {
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

/// Outcome of reading the plugin settings file.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginSettings {
    Ready(PluginConfig),
    Invalid,
}

impl PluginSettings {
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::Ready(PluginConfig::default());
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Cannot read plugin config, serving default configuration"
                );
                return Self::Ready(PluginConfig::default());
            }
        };

        match PluginConfig::parse(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), timeout = ?config.timeout, "Loaded plugin config");
                Self::Ready(config)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Unable to parse plugin config");
                Self::Invalid
            }
        }
    }

    /// Request timeout requested by the plugin settings, if any.
    ///
    /// A loaded file without `timeout` (or with `0`) does not disable the
    /// server timeout; `timeouts.request_secs` stays in effect.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Self::Ready(config) => config.timeout.filter(|t| !t.is_zero()),
            Self::Invalid => None,
        }
    }
}

/// Static frontend state shared by the plugin handlers.
#[derive(Debug, Clone)]
pub struct Frontend {
    pub features: BTreeMap<String, bool>,
    pub settings: PluginSettings,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn features(State(state): State<AppState>) -> Json<BTreeMap<String, bool>> {
    Json(state.frontend.features.clone())
}

pub async fn config(State(state): State<AppState>) -> Response {
    match &state.frontend.settings {
        PluginSettings::Ready(config) => Json(config.clone()).into_response(),
        PluginSettings::Invalid => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "unable to unmarshall config data",
        )
            .into_response(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
}

/// Parse a duration such as `300ms`, `1.5h` or `2h45m`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let s = input.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(DurationError::Invalid(input.to_string()));
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut nanos = 0f64;
    let mut rest = s;

    while !rest.is_empty() {
        let number_end = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        if number_end == 0 {
            return Err(DurationError::Invalid(input.to_string()));
        }
        let value: f64 = rest[..number_end]
            .parse()
            .map_err(|_| DurationError::Invalid(input.to_string()))?;
        rest = &rest[number_end..];

        let unit_end = rest.find(is_number).unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "" => return Err(DurationError::MissingUnit(input.to_string())),
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            unit => {
                return Err(DurationError::UnknownUnit {
                    unit: unit.to_string(),
                    input: input.to_string(),
                })
            }
        };
        nanos += value * scale;
        rest = &rest[unit_end..];
    }

    Ok(Duration::from_nanos(nanos.round() as u64))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimeout {
    Seconds(u64),
    Text(String),
}

fn deserialize_timeout<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawTimeout>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawTimeout::Seconds(secs)) => Ok(Some(Duration::from_secs(secs))),
        Some(RawTimeout::Text(text)) => parse_duration(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn serialize_timeout<S>(timeout: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match timeout {
        Some(t) => serializer.serialize_f64(t.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}

fn is_unset(timeout: &Option<Duration>) -> bool {
    timeout.map_or(true, |t| t.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1500ms").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(matches!(parse_duration("30"), Err(DurationError::MissingUnit(_))));
        assert!(matches!(parse_duration("5d"), Err(DurationError::UnknownUnit { .. })));
        assert!(matches!(parse_duration(""), Err(DurationError::Invalid(_))));
        assert!(matches!(parse_duration("-5s"), Err(DurationError::Invalid(_))));
    }

    #[test]
    fn test_config_yaml_forms() {
        let config = PluginConfig::parse("timeout: 45s\n").unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(45)));

        let config = PluginConfig::parse("timeout: 60\n").unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(60)));

        let config = PluginConfig::parse("unrelated: true\n").unwrap();
        assert_eq!(config, PluginConfig::default());

        assert_eq!(PluginConfig::parse("").unwrap(), PluginConfig::default());
        assert!(PluginConfig::parse("timeout: forever\n").is_err());
    }

    #[test]
    fn test_config_json_reports_seconds() {
        let config = PluginConfig {
            timeout: Some(Duration::from_millis(2500)),
        };
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({"timeout": 2.5}));
        assert_eq!(serde_json::to_value(PluginConfig::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_load_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout: 2m").unwrap();

        let settings = PluginSettings::load(Some(file.path()));
        assert_eq!(settings.timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_file_without_timeout_keeps_server_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "unrelated: true").unwrap();
        let settings = PluginSettings::load(Some(file.path()));
        assert_eq!(settings.timeout(), None);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout: 0").unwrap();
        assert_eq!(PluginSettings::load(Some(file.path())).timeout(), None);
    }

    #[test]
    fn test_unreadable_file_serves_defaults() {
        let settings = PluginSettings::load(Some(Path::new("/nonexistent/plugin.yaml")));
        assert_eq!(settings, PluginSettings::Ready(PluginConfig::default()));
        assert_eq!(settings.timeout(), None);
        assert_eq!(PluginSettings::load(None), settings);
    }

    #[test]
    fn test_unparsable_file_is_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout: [1, 2").unwrap();

        assert_eq!(PluginSettings::load(Some(file.path())), PluginSettings::Invalid);
    }
}
