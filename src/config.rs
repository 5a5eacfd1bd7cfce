use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

/// Server-wide configuration, shared read-only by every request.
///
/// Every key is optional in the TOML form; absent keys keep their default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub buffer_size: usize,

    pub max_path_size: usize,
    pub max_header_size: usize,
    pub max_body_size: usize,

    #[serde(deserialize_with = "deserialize_duration")]
    pub read_timeout: Duration,

    #[serde(deserialize_with = "deserialize_duration")]
    pub write_timeout: Duration,

    /// Directory searched by `render` and `render_list`.
    pub view_path: PathBuf,
    /// Root directory served by the static mount.
    pub static_path: PathBuf,
    /// Route pattern of the static mount; its first group is the file sub-path.
    pub static_url: String,
    pub chunk_size: usize,

    /// Expose error details in 500 bodies. Never enable on a public server.
    pub debug: bool,
    pub quiet: bool,
    pub compression: bool,

    pub server_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            buffer_size: 4096,

            max_path_size: 1024,
            max_header_size: 8192,
            max_body_size: 1024 * 1024, // 1 MB

            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),

            view_path: PathBuf::from("./views"),
            static_path: PathBuf::from("./static"),
            static_url: r"/static/(.+)".to_string(),
            chunk_size: 8192,

            debug: false,
            quiet: false,
            compression: false,

            server_name: concat!("sluice/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read config, using defaults");
                return ServerConfig::default();
            }
        };

        Self::from_toml(&content).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "failed to parse config, using defaults");
            ServerConfig::default()
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<ServerConfig>(content)
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.view_path, PathBuf::from("./views"));
        assert_eq!(cfg.static_path, PathBuf::from("./static"));
        assert_eq!(cfg.static_url, "/static/(.+)");
        assert!(!cfg.debug);
        assert!(cfg.address.is_unspecified());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let cfg = ServerConfig::from_toml(
            r#"
            port = 9000
            view_path = "/srv/views"
            read_timeout = 1.5
            debug = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.view_path, PathBuf::from("/srv/views"));
        assert_eq!(cfg.read_timeout, Duration::from_millis(1500));
        assert!(cfg.debug);
        assert_eq!(cfg.static_url, "/static/(.+)");
    }

    #[test]
    fn negative_timeout_is_rejected() {
        assert!(ServerConfig::from_toml("write_timeout = -1.0").is_err());
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let cfg = ServerConfig::from_file("/definitely/not/here.toml");
        assert_eq!(cfg.port, 8080);
    }
}
