use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the phone-side responder daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Preferred location for weather lookups.
    #[serde(default = "default_location")]
    pub location: String,

    /// Path to the weather database (default: ~/.wristcast/weather.db).
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Base URL for remote icon art. Empty means bundled assets only.
    #[serde(default)]
    pub art_base_url: String,

    /// Bounded wait for the remote art fetch, in seconds.
    #[serde(default = "default_art_fetch_timeout")]
    pub art_fetch_timeout_secs: u64,

    /// Node identity on the bus (default: hostname).
    #[serde(default)]
    pub node_id: Option<String>,

    /// Whether this node advertises direct (low-latency) reachability.
    #[serde(default = "default_true")]
    pub nearby: bool,
}

fn default_location() -> String {
    "94043".to_string()
}

fn default_art_fetch_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: default_location(),
            db_path: None,
            art_base_url: String::new(),
            art_fetch_timeout_secs: default_art_fetch_timeout(),
            node_id: None,
            nearby: true,
        }
    }
}

impl Config {
    /// The weather database path, explicit or defaulted.
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".wristcast")
                .join("weather.db")
        })
    }

    /// The node identity, explicit or derived from the hostname.
    pub fn resolved_node_id(&self) -> String {
        self.node_id
            .clone()
            .unwrap_or_else(|| {
                hostname::get()
                    .map(|h| h.to_string_lossy().to_string())
                    .unwrap_or_else(|_| "phone".to_string())
            })
            .replace('-', "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.location, "94043");
        assert!(config.art_base_url.is_empty());
        assert_eq!(config.art_fetch_timeout_secs, 10);
        assert!(config.nearby);
    }

    #[test]
    fn yaml_overrides_defaults() {
        let yaml = "location: \"10001\"\nart_base_url: \"http://icons.example/art\"\nnearby: false\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.location, "10001");
        assert_eq!(config.art_base_url, "http://icons.example/art");
        assert!(!config.nearby);
        assert_eq!(config.art_fetch_timeout_secs, 10);
    }

    #[test]
    fn node_id_strips_dashes() {
        let config = Config {
            node_id: Some("my-phone-7".to_string()),
            ..Config::default()
        };
        assert_eq!(config.resolved_node_id(), "my_phone_7");
    }
}
