use serde::Deserialize;

/// Configuration for the wearable-side daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Fixed delay between periodic weather requests, in seconds.
    #[serde(default = "default_request_interval")]
    pub request_interval_secs: u64,

    /// Bounded wait for node discovery, in seconds.
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout_secs: u64,

    /// Whether the display has limited ambient color depth. When set,
    /// ambient mode drops all style modifiers.
    #[serde(default)]
    pub low_color: bool,
}

fn default_request_interval() -> u64 {
    1800
}

fn default_discovery_timeout() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_interval_secs: default_request_interval(),
            discovery_timeout_secs: default_discovery_timeout(),
            low_color: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_cadence() {
        let config = Config::default();
        assert_eq!(config.request_interval_secs, 1800);
        assert_eq!(config.discovery_timeout_secs, 5);
        assert!(!config.low_color);
    }

    #[test]
    fn yaml_overrides_defaults() {
        let yaml = "request_interval_secs: 60\nlow_color: true\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.request_interval_secs, 60);
        assert!(config.low_color);
        assert_eq!(config.discovery_timeout_secs, 5);
    }
}
