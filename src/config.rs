use std::path::PathBuf;

use anyhow::Context;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SESSION_FILE: &str = ".tutoring-session.json";

#[derive(Debug, Clone)]
pub struct Config {
    database_url: Option<String>,
    pub max_connections: u32,
    pub session_file: PathBuf,
    /// One JSON object per log line instead of the human format.
    pub log_json: bool,
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let max_connections = match lookup("TUTORING_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("TUTORING_MAX_CONNECTIONS is not a number: {raw:?}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let session_file = lookup("TUTORING_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));

        Ok(Self {
            database_url,
            max_connections,
            session_file,
            log_json: lookup("TUTORING_LOG_JSON").is_some_and(|value| truthy(&value)),
        })
    }

    /// Only commands that open the store need a database.
    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to the platform's Postgres instance")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/t")])).unwrap();
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
        assert!(!config.log_json);
    }

    #[test]
    fn truthy_values() {
        assert!(truthy(" TRUE "));
        assert!(truthy("1"));
        assert!(!truthy("off"));
    }

    #[test]
    fn database_url_is_required_only_when_asked_for() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.database_url().is_err());

        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/t")])).unwrap();
        assert_eq!(config.database_url().unwrap(), "postgres://localhost/t");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/t"),
            ("TUTORING_MAX_CONNECTIONS", "12"),
            ("TUTORING_SESSION_FILE", "/tmp/s.json"),
        ]))
        .unwrap();
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.session_file, PathBuf::from("/tmp/s.json"));

        assert!(Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/t"),
            ("TUTORING_MAX_CONNECTIONS", "many"),
        ]))
        .is_err());
    }
}
