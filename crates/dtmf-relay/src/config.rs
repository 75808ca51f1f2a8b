//! Configuration for the relay.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Relay configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Twilio credentials
    pub twilio: TwilioConfig,

    /// SIP gateway configuration
    #[serde(default)]
    pub voip: VoipConfig,

    /// Tone asset configuration
    #[serde(default)]
    pub tones: TonesConfig,

    /// Pending verification storage configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwilioConfig {
    /// Account SID
    pub account_sid: String,

    /// Auth token
    pub auth_token: SecretString,

    /// REST API base URL
    #[serde(default = "default_twilio_url")]
    pub base_url: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoipConfig {
    /// Control API URL of the SIP/RTP gateway
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Poll interval for incoming calls
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// SIP server address
    #[serde(default)]
    pub server_ip: String,

    /// SIP server port
    #[serde(default = "default_sip_port")]
    pub server_port: u16,

    /// SIP username
    #[serde(default)]
    pub username: String,

    /// SIP password
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Local address the user agent binds to
    #[serde(default)]
    pub local_ip: Option<String>,

    /// Lowest RTP port
    #[serde(default = "default_rtp_port_low")]
    pub rtp_port_low: u16,

    /// Highest RTP port
    #[serde(default = "default_rtp_port_high")]
    pub rtp_port_high: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TonesConfig {
    /// Directory holding one WAV file per DTMF digit
    #[serde(default = "default_tones_dir")]
    pub dir: PathBuf,

    /// Load every tone at startup
    #[serde(default = "default_true")]
    pub preload: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// How long an unmatched verification stays pending
    #[serde(default = "default_registry_ttl", with = "humantime_serde")]
    pub ttl: Duration,

    /// How often expired verifications are purged
    #[serde(default = "default_sweep_interval", with = "humantime_serde")]
    pub sweep_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for VoipConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            poll_interval: default_poll_interval(),
            server_ip: String::new(),
            server_port: default_sip_port(),
            username: String::new(),
            password: None,
            local_ip: None,
            rtp_port_low: default_rtp_port_low(),
            rtp_port_high: default_rtp_port_high(),
        }
    }
}

impl Default for TonesConfig {
    fn default() -> Self {
        Self {
            dir: default_tones_dir(),
            preload: true,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ttl: default_registry_ttl(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_twilio_url() -> String {
    twilio_client::DEFAULT_BASE_URL.into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_gateway_url() -> String {
    "http://sip-gateway:8088".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(200)
}

fn default_sip_port() -> u16 {
    5060
}

fn default_rtp_port_low() -> u16 {
    10000
}

fn default_rtp_port_high() -> u16 {
    20000
}

fn default_tones_dir() -> PathBuf {
    PathBuf::from("./tones")
}

fn default_registry_ttl() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_true() -> bool {
    true
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5000
}

fn default_global_rpm() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(
                environment
                    .separator("__")
                    // try_parsing(true) would turn +15551234567 into a number
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.voip.rtp_port_low > self.voip.rtp_port_high {
            anyhow::bail!(
                "Invalid RTP port range: {} > {}",
                self.voip.rtp_port_low,
                self.voip.rtp_port_high
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_environment(config::Environment::default().source(Some(map)))
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = from_vars(&[
            ("TWILIO__ACCOUNT_SID", "ACtest"),
            ("TWILIO__AUTH_TOKEN", "secret"),
        ])
        .unwrap();

        assert_eq!(config.twilio.account_sid, "ACtest");
        assert_eq!(config.twilio.auth_token.expose_secret(), "secret");
        assert_eq!(config.twilio.base_url, "https://api.twilio.com");
        assert_eq!(config.voip.server_port, 5060);
        assert_eq!(config.voip.rtp_port_low, 10000);
        assert_eq!(config.voip.rtp_port_high, 20000);
        assert!(config.voip.password.is_none());
        assert_eq!(config.tones.dir, PathBuf::from("./tones"));
        assert_eq!(config.registry.ttl, Duration::from_secs(600));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_voip_settings_from_env() {
        let config = from_vars(&[
            ("TWILIO__ACCOUNT_SID", "ACtest"),
            ("TWILIO__AUTH_TOKEN", "secret"),
            ("VOIP__SERVER_IP", "sip.example.com"),
            ("VOIP__SERVER_PORT", "5080"),
            ("VOIP__USERNAME", "relay"),
            ("VOIP__PASSWORD", "hunter2"),
            ("VOIP__LOCAL_IP", "10.0.0.5"),
            ("VOIP__RTP_PORT_LOW", "30000"),
            ("VOIP__RTP_PORT_HIGH", "30100"),
            ("VOIP__POLL_INTERVAL", "500ms"),
            ("REGISTRY__TTL", "5m"),
        ])
        .unwrap();

        assert_eq!(config.voip.server_ip, "sip.example.com");
        assert_eq!(config.voip.server_port, 5080);
        assert_eq!(config.voip.username, "relay");
        assert_eq!(
            config.voip.password.as_ref().map(|p| p.expose_secret().as_str()),
            Some("hunter2")
        );
        assert_eq!(config.voip.local_ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(config.voip.rtp_port_low, 30000);
        assert_eq!(config.voip.poll_interval, Duration::from_millis(500));
        assert_eq!(config.registry.ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_missing_twilio_credentials() {
        assert!(from_vars(&[]).is_err());
    }

    #[test]
    fn test_inverted_rtp_range_rejected() {
        let result = from_vars(&[
            ("TWILIO__ACCOUNT_SID", "ACtest"),
            ("TWILIO__AUTH_TOKEN", "secret"),
            ("VOIP__RTP_PORT_LOW", "20000"),
            ("VOIP__RTP_PORT_HIGH", "10000"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_auth_token_not_in_debug_output() {
        let config = from_vars(&[
            ("TWILIO__ACCOUNT_SID", "ACtest"),
            ("TWILIO__AUTH_TOKEN", "super-secret-token"),
        ])
        .unwrap();

        assert!(!format!("{:?}", config).contains("super-secret-token"));
    }
}
