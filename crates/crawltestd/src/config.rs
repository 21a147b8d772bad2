//! Server configuration.
//!
//! Layering: built-in defaults, then an optional JSON file (`--config`), then
//! `CRAWLTEST_*` environment variables, then `--bind` on the command line.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ServerError;

pub const ENV_BIND: &str = "CRAWLTEST_BIND";
pub const ENV_DIST_DIR: &str = "CRAWLTEST_DIST_DIR";
pub const ENV_WEB_BUNDLE: &str = "CRAWLTEST_WEB_BUNDLE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory served under `/pkg` (wasm-bindgen output).
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
    /// Module script every page loads to mount its islands.
    #[serde(default = "default_web_bundle")]
    pub web_bundle: String,
    /// Length of one delay unit on the streaming page.
    #[serde(default = "default_stream_unit_ms")]
    pub stream_unit_ms: u64,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_web_bundle() -> String {
    "/pkg/crawltest_web.js".to_string()
}

fn default_stream_unit_ms() -> u64 {
    1000
}

fn default_max_requests() -> u32 {
    3
}

fn default_window_secs() -> u64 {
    10
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            dist_dir: default_dist_dir(),
            web_bundle: default_web_bundle(),
            stream_unit_ms: default_stream_unit_ms(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ServerError> {
        let text = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ServerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ENV_BIND) {
            self.bind = v;
        }
        if let Some(v) = lookup(ENV_DIST_DIR) {
            self.dist_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_WEB_BUNDLE) {
            self.web_bundle = v;
        }
    }

    /// Resolve the full layering for one process start.
    pub fn load(
        args: &Args,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ServerError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup);
        if let Some(bind) = &args.bind {
            config.bind = bind.clone();
        }
        config.bind_addr()?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ServerError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ServerError::InvalidBind(self.bind.clone()))
    }

    pub fn stream_unit(&self) -> Duration {
        Duration::from_millis(self.stream_unit_ms)
    }
}

/// Command line of `crawltestd`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub bind: Option<String>,
    pub help: bool,
}

impl Args {
    /// Parse everything after the program name.
    pub fn parse<I>(args: I) -> Result<Self, ServerError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut out = Args::default();
        let mut it = args.into_iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "-h" | "--help" | "help" => out.help = true,
                "--config" => {
                    let v = it
                        .next()
                        .ok_or_else(|| ServerError::Usage("--config needs a path".to_string()))?;
                    out.config = Some(PathBuf::from(v));
                }
                "--bind" => {
                    let v = it
                        .next()
                        .ok_or_else(|| ServerError::Usage("--bind needs an address".to_string()))?;
                    out.bind = Some(v);
                }
                other => {
                    return Err(ServerError::Usage(format!("unknown argument: {other}")));
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    fn temp_config(name: &str, body: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crawltestd-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ServerConfig =
            serde_json::from_str(r#"{"stream_unit_ms": 5, "rate_limit": {"max_requests": 7}}"#)
                .unwrap();
        assert_eq!(cfg.stream_unit_ms, 5);
        assert_eq!(cfg.rate_limit.max_requests, 7);
        assert_eq!(cfg.rate_limit.window_secs, 10);
        assert_eq!(cfg.bind, "127.0.0.1:8080");
        assert_eq!(cfg.web_bundle, "/pkg/crawltest_web.js");
    }

    #[test]
    fn layers_apply_in_order() {
        let path = temp_config("layers", r#"{"bind": "127.0.0.1:1111", "dist_dir": "from-file"}"#);
        let args = Args {
            config: Some(path),
            bind: Some("127.0.0.1:3333".to_string()),
            help: false,
        };
        let cfg = ServerConfig::load(
            &args,
            env(&[(ENV_BIND, "127.0.0.1:2222"), (ENV_WEB_BUNDLE, "/pkg/app.js")]),
        )
        .unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:3333");
        assert_eq!(cfg.dist_dir, PathBuf::from("from-file"));
        assert_eq!(cfg.web_bundle, "/pkg/app.js");
    }

    #[test]
    fn env_beats_file_without_cli_flag() {
        let path = temp_config("env", r#"{"bind": "127.0.0.1:1111"}"#);
        let args = Args {
            config: Some(path),
            ..Args::default()
        };
        let cfg = ServerConfig::load(&args, env(&[(ENV_BIND, "0.0.0.0:2222")])).unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:2222");
    }

    #[test]
    fn bad_inputs_map_to_errors() {
        let args = Args {
            bind: Some("not an addr".to_string()),
            ..Args::default()
        };
        assert!(matches!(
            ServerConfig::load(&args, env(&[])),
            Err(ServerError::InvalidBind(_))
        ));

        let args = Args {
            config: Some(PathBuf::from("/definitely/missing/crawltestd.json")),
            ..Args::default()
        };
        assert!(matches!(
            ServerConfig::load(&args, env(&[])),
            Err(ServerError::ConfigRead { .. })
        ));

        let args = Args {
            config: Some(temp_config("garbage", "{ not json")),
            ..Args::default()
        };
        assert!(matches!(
            ServerConfig::load(&args, env(&[])),
            Err(ServerError::ConfigParse { .. })
        ));
    }

    #[test]
    fn args_parse_flags() {
        let args = Args::parse(
            ["--config", "c.json", "--bind", "0.0.0.0:9"]
                .into_iter()
                .map(String::from),
        )
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("c.json")));
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:9"));

        assert!(Args::parse(["--bind".to_string()]).is_err());
        assert!(Args::parse(["--nope".to_string()]).is_err());
        assert!(Args::parse(["--help".to_string()]).unwrap().help);
    }
}
