//! Request cache configuration.

use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// When false, the API client bypasses the cache entirely.
    pub enabled: bool,
    /// Lifetime of entries stored without an explicit TTL.
    pub default_ttl: Duration,
    /// Period of the background sweep that evicts expired entries.
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            default_ttl: settings.default_ttl,
            sweep_interval: settings.sweep_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.default_ttl, Duration::from_secs(30));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn from_settings() {
        let settings = crate::config::CacheSettings {
            enabled: false,
            default_ttl: Duration::from_secs(5),
            sweep_interval: Duration::from_secs(7),
        };
        let config = CacheConfig::from(&settings);
        assert!(!config.enabled);
        assert_eq!(config.default_ttl, Duration::from_secs(5));
        assert_eq!(config.sweep_interval, Duration::from_secs(7));
    }
}
