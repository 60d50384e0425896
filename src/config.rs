use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub http: HttpConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub token_path: PathBuf,  // persisted session token, removed on logout
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config/default")
    }

    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .set_default("api.base_url", "http://localhost:8080")?
            .set_default("http.timeout_secs", 10)?
            .set_default("http.user_agent", concat!("taskboard/", env!("CARGO_PKG_VERSION")))?
            .set_default("session.token_path", ".taskboard/session")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        if config.http.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "http.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = Config::load_from("does/not/exist").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.http.timeout(), Duration::from_secs(10));
        assert_eq!(config.session.token_path, PathBuf::from(".taskboard/session"));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://board.internal:9000\"\n\n[http]\ntimeout_secs = 3"
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let config = Config::load_from(path).unwrap();
        assert_eq!(config.api.base_url, "http://board.internal:9000");
        assert_eq!(config.http.timeout_secs, 3);
        assert!(config.http.user_agent.starts_with("taskboard/"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[http]\ntimeout_secs = 0").unwrap();

        let err = Config::load_from(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
