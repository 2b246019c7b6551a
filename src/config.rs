//! Monitor configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The configuration file path defaults to `config.yaml` but can
//! be specified via `-f` flag or the `FAILOVERD_CONFIG` environment variable.
//!
//! ## Loading Priority
//!
//! Sources are merged in order (later sources override earlier ones):
//!
//! 1. **Built-in defaults** - the reference deployment values below
//! 2. **YAML config file** - base configuration (default: `config.yaml`)
//! 3. **Environment variables** - variables prefixed with `FAILOVERD_`
//!
//! Nested values use double underscores in environment variables, e.g.
//! `FAILOVERD_TIMING__FAILOVER_DELAY=2m` sets `timing.failover_delay`.
//!
//! ## Configuration Structure
//!
//! ```yaml
//! host: 0.0.0.0
//! port: 3001
//! primary:
//!   name: producer-east
//!   host: 203.0.113.10
//!   port: 3000
//! secondary:
//!   name: producer-west
//!   host: 203.0.113.20
//!   port: 3000
//! dns:
//!   api_base_url: https://api.name.com
//!   username: acme
//!   password: token
//!   domain: example.com
//!   record_id: "12345"
//!   record_host: relay
//!   record_fqdn: relay.example.com
//!   record_type: A
//!   record_ttl: 300
//! timing:
//!   check_interval: 60s
//!   failover_delay: 5m
//!   failback_delay: 10m
//!   connection_timeout: 5s
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "FAILOVERD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Root structure loaded from YAML and environment variables. All fields
/// have defaults so a partial file is enough to get going.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Preferred endpoint; traffic returns here after failback
    pub primary: ServerConfig,
    /// Failover target while the primary is out
    pub secondary: ServerConfig,
    /// DNS provider API access and the managed record
    pub dns: DnsConfig,
    /// Poll cadence, hysteresis windows and probe timeout
    pub timing: TimingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            primary: ServerConfig {
                name: "primary".to_string(),
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            secondary: ServerConfig {
                name: "secondary".to_string(),
                host: "127.0.0.2".to_string(),
                port: 3000,
            },
            dns: DnsConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

/// One monitored endpoint: a label for logs plus the probe target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
}

/// Access to the DNS provider's records API and the single record the
/// monitor rewrites. The record's `answer` is the steering mechanism: it
/// holds the host of whichever endpoint is currently active.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DnsConfig {
    /// Provider API root, e.g. "https://api.name.com"
    pub api_base_url: Url,
    pub username: String,
    pub password: String,
    /// Domain the record lives under
    pub domain: String,
    /// Provider-assigned ID of the managed record
    pub record_id: String,
    /// Host label of the record ("relay" for relay.example.com)
    pub record_host: String,
    pub record_fqdn: String,
    /// Record type, normally "A"
    pub record_type: String,
    /// TTL written back on every record update, in seconds
    pub record_ttl: u32,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse("https://api.name.com").unwrap(),
            username: String::new(),
            password: String::new(),
            domain: String::new(),
            record_id: String::new(),
            record_host: String::new(),
            record_fqdn: String::new(),
            record_type: "A".to_string(),
            record_ttl: 300,
        }
    }
}

/// Timing knobs. The hysteresis windows are what keep a flapping primary
/// from bouncing the DNS record on every blip.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// How often the background scheduler polls
    #[serde(with = "humantime_serde")]
    pub check_interval: Duration,
    /// How long the primary must stay down before failover
    #[serde(with = "humantime_serde")]
    pub failover_delay: Duration,
    /// How long the primary must stay up before failback
    #[serde(with = "humantime_serde")]
    pub failback_delay: Duration,
    /// Per-connection bound for TCP probes and DNS API calls
    #[serde(with = "humantime_serde")]
    pub connection_timeout: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            failover_delay: Duration::from_secs(300),
            failback_delay: Duration::from_secs(600),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        Self::figment(args).extract()
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("FAILOVERD_").split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_config_file() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "")?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args)?;

            assert_eq!(config.port, 3001);
            assert_eq!(config.timing.check_interval, Duration::from_secs(60));
            assert_eq!(config.timing.failover_delay, Duration::from_secs(300));
            assert_eq!(config.timing.failback_delay, Duration::from_secs(600));
            assert_eq!(config.dns.record_type, "A");

            Ok(())
        });
    }

    #[test]
    fn test_yaml_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
primary:
  name: producer-east
  host: 203.0.113.10
  port: 3000
secondary:
  name: producer-west
  host: 203.0.113.20
  port: 3000
dns:
  domain: example.com
  record_id: "12345"
  record_fqdn: relay.example.com
timing:
  failover_delay: 30s
  failback_delay: 2m
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args)?;

            assert_eq!(config.primary.name, "producer-east");
            assert_eq!(config.secondary.host, "203.0.113.20");
            assert_eq!(config.dns.domain, "example.com");
            assert_eq!(config.timing.failover_delay, Duration::from_secs(30));
            assert_eq!(config.timing.failback_delay, Duration::from_secs(120));
            // untouched sections keep their defaults
            assert_eq!(config.timing.connection_timeout, Duration::from_secs(5));

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
host: 10.0.0.1
timing:
  failover_delay: 5m
"#,
            )?;

            jail.set_env("FAILOVERD_PORT", "8080");
            jail.set_env("FAILOVERD_TIMING__FAILOVER_DELAY", "45s");

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args)?;

            // Env vars should override
            assert_eq!(config.port, 8080);
            assert_eq!(config.timing.failover_delay, Duration::from_secs(45));

            // YAML values should be preserved
            assert_eq!(config.host, "10.0.0.1");

            Ok(())
        });
    }

    #[test]
    fn test_config_file_from_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("monitor.yaml");
        std::fs::write(&path, "port: 9099\n").expect("write config");

        let args = Args {
            config: path.to_string_lossy().into_owned(),
            validate: false,
        };
        let config = Config::load(&args).expect("load config");

        assert_eq!(config.port, 9099);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "not_a_real_field: true\n")?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };
            assert!(Config::load(&args).is_err());

            Ok(())
        });
    }
}
