use std::time::Duration;

/// Errors while reading the client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be set to a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Where and how the panel talks to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the backend API, without a trailing slash.
    pub base_url: String,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `API_BASE_URL`         | `http://localhost:8080` |
    /// | `REQUEST_TIMEOUT_SECS` | `10`                    |
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("API_BASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.into());

        let has_host = reqwest::Url::parse(&base_url).is_ok_and(|url| {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        });
        if !has_host {
            return Err(ConfigError::Invalid {
                name: "API_BASE_URL",
                expected: "http(s) URL with a host",
                value: base_url,
            });
        }

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "REQUEST_TIMEOUT_SECS",
                        expected: "positive number of seconds",
                        value,
                    })
                }
            },
            None => Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            request_timeout,
            ..Self::new(base_url)
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn reads_overrides_and_strips_trailing_slash() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("API_BASE_URL", "https://sensors.example.com/api/"),
            ("REQUEST_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://sensors.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn rejects_bad_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[("REQUEST_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT_SECS"));

        assert!(ClientConfig::from_lookup(lookup(&[("REQUEST_TIMEOUT_SECS", "0")])).is_err());
    }

    #[test]
    fn rejects_url_without_host() {
        for url in ["http://", "http:", "http://:8080"] {
            let err = ClientConfig::from_lookup(lookup(&[("API_BASE_URL", url)])).unwrap_err();
            assert!(err.to_string().contains("API_BASE_URL"), "{url} accepted");
        }
    }

    #[test]
    fn accepts_host_with_port() {
        let config =
            ClientConfig::from_lookup(lookup(&[("API_BASE_URL", "http://127.0.0.1:3000")])).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn rejects_non_http_url() {
        let err = ClientConfig::from_lookup(lookup(&[("API_BASE_URL", "localhost:8080")])).unwrap_err();
        assert!(err.to_string().contains("API_BASE_URL"));
    }
}
