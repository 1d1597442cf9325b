use std::{env, net::SocketAddr, str::FromStr};

use crate::error::ConfigError;

pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Runtime settings, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub body_limit_mb: usize,
    pub model_path: String,
    pub model_url: Option<String>,
    pub input_op: String,
    pub output_op: String,
    pub upload_folder: String,
    pub threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            body_limit_mb: 5,
            model_path: "./model/hippo.pb".into(),
            model_url: None,
            input_op: "x".into(),
            output_op: "Identity".into(),
            upload_folder: "uploads".into(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let threshold = parse_or(&lookup, "THRESHOLD", defaults.threshold)?;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid {
                var: "THRESHOLD",
                value: threshold.to_string(),
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            body_limit_mb: parse_or(&lookup, "BODY_LIMIT_MB", defaults.body_limit_mb)?,
            model_path: lookup("MODEL_PATH").unwrap_or(defaults.model_path),
            model_url: lookup("MODEL_URL").filter(|url| !url.is_empty()),
            input_op: lookup("MODEL_INPUT_OP").unwrap_or(defaults.input_op),
            output_op: lookup("MODEL_OUTPUT_OP").unwrap_or(defaults.output_op),
            upload_folder: lookup("UPLOAD_FOLDER").unwrap_or(defaults.upload_folder),
            threshold,
        })
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb * 1024 * 1024
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Invalid {
            var: "HOST",
            value: self.host.clone(),
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.body_limit_bytes(), 5 * 1024 * 1024);
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("BODY_LIMIT_MB", "12"),
            ("THRESHOLD", "0.5"),
            ("MODEL_INPUT_OP", "input_1"),
            ("MODEL_URL", "https://example.com/hippo.pb"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.body_limit_bytes(), 12 * 1024 * 1024);
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.input_op, "input_1");
        assert_eq!(config.output_op, "Identity");
        assert_eq!(config.model_url.as_deref(), Some("https://example.com/hippo.pb"));
    }

    #[test]
    fn empty_model_url_is_ignored() {
        let config = Config::from_lookup(lookup_from(&[("MODEL_URL", "")])).unwrap();
        assert_eq!(config.model_url, None);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "seventy")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));

        let err = Config::from_lookup(lookup_from(&[("THRESHOLD", "1.5")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "THRESHOLD", .. }));

        let err = Config::from_lookup(lookup_from(&[("THRESHOLD", "NaN")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "THRESHOLD", .. }));
    }

    #[test]
    fn bad_host_is_reported() {
        let config = Config::from_lookup(lookup_from(&[("HOST", "not a host")])).unwrap();
        assert!(matches!(
            config.bind_addr(),
            Err(ConfigError::Invalid { var: "HOST", .. })
        ));
    }
}
