//! Engine configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the engine can start with zero
//! configuration.

use std::path::PathBuf;
use std::time::Duration;

use mediadeck_shared::constants::{
    DEFAULT_BATCH_QUEUE_SIZE, DEFAULT_HISTORY_SIZE, DEFAULT_THUMBNAIL_CACHE_SIZE,
    DEFAULT_THUMBNAIL_MAX_AGE_SECS,
};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of thumbnails held in memory.
    /// Env: `MEDIADECK_THUMBNAIL_CACHE_SIZE`
    /// Default: `100`
    pub thumbnail_cache_size: usize,

    /// How long a cached thumbnail stays valid.
    /// Env: `MEDIADECK_THUMBNAIL_MAX_AGE_SECS`
    /// Default: 30 minutes.
    pub thumbnail_max_age: Duration,

    /// Number of prompts kept in the generation history.
    /// Env: `MEDIADECK_HISTORY_SIZE`
    /// Default: `50`
    pub history_size: usize,

    /// Capacity of the staging queue for incoming pages.
    /// Env: `MEDIADECK_BATCH_QUEUE_SIZE`
    /// Default: `50`
    pub batch_queue_size: usize,

    /// File the prompt history snapshot is written to.
    /// Env: `MEDIADECK_HISTORY_PATH`
    /// Default: none (the platform data directory is used when a file store
    /// is requested).
    pub history_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thumbnail_cache_size: DEFAULT_THUMBNAIL_CACHE_SIZE,
            thumbnail_max_age: Duration::from_secs(DEFAULT_THUMBNAIL_MAX_AGE_SECS),
            history_size: DEFAULT_HISTORY_SIZE,
            batch_queue_size: DEFAULT_BATCH_QUEUE_SIZE,
            history_path: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(n) = parse_size(&lookup, "MEDIADECK_THUMBNAIL_CACHE_SIZE") {
            config.thumbnail_cache_size = n;
        }

        if let Some(val) = lookup("MEDIADECK_THUMBNAIL_MAX_AGE_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) => config.thumbnail_max_age = Duration::from_secs(secs),
                Err(e) => {
                    tracing::warn!(
                        value = %val,
                        error = %e,
                        "Invalid MEDIADECK_THUMBNAIL_MAX_AGE_SECS, using default"
                    );
                }
            }
        }

        if let Some(n) = parse_size(&lookup, "MEDIADECK_HISTORY_SIZE") {
            config.history_size = n;
        }

        if let Some(n) = parse_size(&lookup, "MEDIADECK_BATCH_QUEUE_SIZE") {
            config.batch_queue_size = n;
        }

        if let Some(path) = lookup("MEDIADECK_HISTORY_PATH") {
            if !path.trim().is_empty() {
                config.history_path = Some(PathBuf::from(path));
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

/// Parse a capacity setting. Zero is raised to one; garbage is ignored.
fn parse_size<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(key)?;
    match val.trim().parse::<usize>() {
        Ok(0) => {
            tracing::warn!(key, "Capacity of 0 is not allowed, using 1");
            Some(1)
        }
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(key, value = %val, error = %e, "Invalid capacity, using default");
            None
        }
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.thumbnail_cache_size, 100);
        assert_eq!(config.thumbnail_max_age, Duration::from_secs(1800));
        assert_eq!(config.history_size, 50);
        assert_eq!(config.batch_queue_size, 50);
        assert!(config.history_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("MEDIADECK_THUMBNAIL_CACHE_SIZE", "8"),
            ("MEDIADECK_THUMBNAIL_MAX_AGE_SECS", "60"),
            ("MEDIADECK_HISTORY_SIZE", " 20 "),
            ("MEDIADECK_BATCH_QUEUE_SIZE", "25"),
            ("MEDIADECK_HISTORY_PATH", "/tmp/history.json"),
        ]));

        assert_eq!(config.thumbnail_cache_size, 8);
        assert_eq!(config.thumbnail_max_age, Duration::from_secs(60));
        assert_eq!(config.history_size, 20);
        assert_eq!(config.batch_queue_size, 25);
        assert_eq!(config.history_path, Some(PathBuf::from("/tmp/history.json")));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("MEDIADECK_THUMBNAIL_CACHE_SIZE", "lots"),
            ("MEDIADECK_THUMBNAIL_MAX_AGE_SECS", "-5"),
            ("MEDIADECK_HISTORY_SIZE", "0"),
            ("MEDIADECK_HISTORY_PATH", "  "),
        ]));

        assert_eq!(config.thumbnail_cache_size, 100);
        assert_eq!(config.thumbnail_max_age, Duration::from_secs(1800));
        assert_eq!(config.history_size, 1);
        assert!(config.history_path.is_none());
    }
}
