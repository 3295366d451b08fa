//! Runtime settings shared by the binary and tests.
//!
//! Centralizes where the cache file lives, which API host is used, and how
//! logging is set up. Each setting follows the same order: explicit flag,
//! then environment variable, then a conventional default.

use crate::remote::DEFAULT_API_BASE;
use anyhow::{Context, Result, anyhow, bail};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const STORE_ENV: &str = "BOOKCACHE_STORE";
pub const API_BASE_ENV: &str = "BOOKCACHE_API_BASE";
pub const TIMEOUT_ENV: &str = "BOOKCACHE_TIMEOUT_SECS";
pub const LOG_ENV: &str = "BOOKCACHE_LOG";

const STORE_DIR: &str = "bookcache";
const STORE_FILE: &str = "storage.json";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Values given on the command line; `None` defers to the environment.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub store: Option<PathBuf>,
    pub api_base: Option<String>,
    pub timeout_secs: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub store_path: PathBuf,
    pub api_base: String,
    pub timeout: Option<Duration>,
}

impl Settings {
    /// Resolve against the process environment.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        Self::resolve_with(overrides, |name| env::var(name).ok())
    }

    /// Resolve against an arbitrary variable lookup.
    pub fn resolve_with(
        overrides: Overrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let store_path = match overrides.store {
            Some(path) => path,
            None => match var(STORE_ENV) {
                Some(path) => PathBuf::from(path),
                None => default_store_path(var("XDG_DATA_HOME"), var("HOME"))?,
            },
        };

        let api_base = overrides
            .api_base
            .or_else(|| var(API_BASE_ENV))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        if api_base.is_empty() {
            bail!("API base URL must not be empty");
        }

        let timeout = match overrides.timeout_secs.or_else(|| var(TIMEOUT_ENV)) {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        Ok(Self {
            store_path,
            api_base,
            timeout,
        })
    }
}

fn default_store_path(data_home: Option<String>, home: Option<String>) -> Result<PathBuf> {
    let base = match (data_home, home) {
        (Some(data_home), _) => PathBuf::from(data_home),
        (None, Some(home)) => PathBuf::from(home).join(".local").join("share"),
        (None, None) => {
            return Err(anyhow!(
                "Unable to locate a data directory. Set {STORE_ENV} or pass --store."
            ));
        }
    };
    Ok(base.join(STORE_DIR).join(STORE_FILE))
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Failed to parse timeout '{raw}' as whole seconds"))?;
    Ok(Duration::from_secs(secs))
}

/// Install the stderr log subscriber.
///
/// `log` records from the library are bridged in by tracing-subscriber. The
/// filter comes from `BOOKCACHE_LOG`, defaulting to warnings only.
pub fn init_logging() -> Result<()> {
    let directives = env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let filter = EnvFilter::try_new(&directives)
        .map_err(|err| anyhow!("Invalid log filter '{directives}': {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("Failed to install logger: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn flags_win_over_environment() {
        let settings = Settings::resolve_with(
            Overrides {
                store: Some(PathBuf::from("/tmp/flag.json")),
                api_base: Some("http://localhost:8080/".to_string()),
                timeout_secs: Some("5".to_string()),
            },
            env_of(&[
                (STORE_ENV, "/tmp/env.json"),
                (API_BASE_ENV, "http://env"),
                (TIMEOUT_ENV, "9"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.store_path, PathBuf::from("/tmp/flag.json"));
        assert_eq!(settings.api_base, "http://localhost:8080");
        assert_eq!(settings.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn environment_then_xdg_then_home() {
        let from_env = Settings::resolve_with(
            Overrides::default(),
            env_of(&[(STORE_ENV, "/srv/books.json"), ("HOME", "/home/u")]),
        )
        .unwrap();
        assert_eq!(from_env.store_path, PathBuf::from("/srv/books.json"));

        let from_xdg = Settings::resolve_with(
            Overrides::default(),
            env_of(&[("XDG_DATA_HOME", "/data"), ("HOME", "/home/u")]),
        )
        .unwrap();
        assert_eq!(
            from_xdg.store_path,
            PathBuf::from("/data/bookcache/storage.json")
        );

        let from_home =
            Settings::resolve_with(Overrides::default(), env_of(&[("HOME", "/home/u")])).unwrap();
        assert_eq!(
            from_home.store_path,
            PathBuf::from("/home/u/.local/share/bookcache/storage.json")
        );
        assert_eq!(from_home.api_base, DEFAULT_API_BASE);
        assert_eq!(from_home.timeout, None);
    }

    #[test]
    fn missing_data_dir_is_an_error() {
        assert!(Settings::resolve_with(Overrides::default(), env_of(&[])).is_err());
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let result = Settings::resolve_with(
            Overrides::default(),
            env_of(&[("HOME", "/home/u"), (TIMEOUT_ENV, "soon")]),
        );
        assert!(result.is_err());
    }
}
