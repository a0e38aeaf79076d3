/*!
 * Runtime Settings
 * Process-level settings read from the environment
 */

use super::defaults::classic_state;
use super::loader::load_file;
use crate::core::errors::ConfigError;
use crate::core::limits::{DEFAULT_LISTEN_ADDR, ENV_CONFIG_PATH, ENV_LISTEN_ADDR};
use crate::state::MatrixState;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Settings for the `banker` binary
///
/// Environment variables:
/// - BANKER_LISTEN_ADDR: TCP address to serve on (default: 127.0.0.1:7878)
/// - BANKER_CONFIG: initial configuration file (default: built-in state)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub listen_addr: SocketAddr,
    pub config_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup(ENV_LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = addr.parse::<SocketAddr>().map_err(|_| ConfigError::InvalidSetting {
            name: ENV_LISTEN_ADDR.to_string(),
            value: addr.clone(),
        })?;

        let config_path = lookup(ENV_CONFIG_PATH)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            listen_addr,
            config_path,
        })
    }

    /// Load the configured file, or fall back to the built-in state
    pub fn initial_state(&self) -> Result<MatrixState, ConfigError> {
        match &self.config_path {
            Some(path) => load_file(path),
            None => Ok(classic_state()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.listen_addr, DEFAULT_LISTEN_ADDR.parse().unwrap());
        assert_eq!(settings.config_path, None);
        assert_eq!(settings.initial_state().unwrap(), classic_state());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (ENV_LISTEN_ADDR, "0.0.0.0:9000"),
            (ENV_CONFIG_PATH, "/etc/banker/state.txt"),
        ]))
        .unwrap();
        assert_eq!(settings.listen_addr.port(), 9000);
        assert_eq!(settings.config_path, Some(PathBuf::from("/etc/banker/state.txt")));
    }

    #[test]
    fn test_invalid_address() {
        let err = Settings::from_lookup(lookup(&[(ENV_LISTEN_ADDR, "not-an-address")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { .. }));
    }
}
