//! Relay configuration
//!
//! Parsed from command line flags with environment variable fallbacks.
//! Everything except the listen address has a sensible default and is
//! mostly interesting for tests and hardening.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::participant::DEFAULT_QUEUE_CAPACITY;

/// Default listen address
pub const DEFAULT_LISTEN: &str = "0.0.0.0:9999";

/// Default maximum inbound line length in bytes
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Default time a writer gets to flush its queue after leaving, in seconds
pub const DEFAULT_DRAIN_TIMEOUT: u64 = 5;

/// CLI arguments for the relay server.
#[derive(Parser, Debug, Clone)]
#[command(name = "chat_relay")]
#[command(about = "Multi-client TCP chat relay")]
#[command(version)]
pub struct Config {
    /// Socket address to listen on.
    #[arg(long, default_value = DEFAULT_LISTEN, env = "CHAT_RELAY_LISTEN")]
    pub listen: SocketAddr,
    /// Pending outbound messages kept per participant before dropping.
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY, env = "CHAT_RELAY_QUEUE_CAPACITY")]
    pub queue_capacity: usize,
    /// Maximum inbound line length in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH, env = "CHAT_RELAY_MAX_LINE_LENGTH")]
    pub max_line_length: usize,
    /// Disconnect peers that send no complete line for this many seconds.
    #[arg(long, env = "CHAT_RELAY_IDLE_TIMEOUT")]
    pub idle_timeout: Option<u64>,
    /// Seconds a departing participant's writer may spend flushing its queue.
    #[arg(long, default_value_t = DEFAULT_DRAIN_TIMEOUT, env = "CHAT_RELAY_DRAIN_TIMEOUT")]
    pub drain_timeout: u64,
}

impl Config {
    /// Defaults with a different listen address
    pub fn with_listen(listen: SocketAddr) -> Self {
        Self {
            listen,
            ..Self::default()
        }
    }

    /// Idle timeout as a `Duration`, if enabled
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Writer drain timeout as a `Duration`
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 9999)),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            idle_timeout: None,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cli() {
        let parsed = Config::try_parse_from(["chat_relay"]).unwrap();
        let default = Config::default();

        assert_eq!(parsed.listen, default.listen);
        assert_eq!(parsed.queue_capacity, 100);
        assert_eq!(parsed.max_line_length, default.max_line_length);
        assert_eq!(parsed.idle_timeout(), None);
        assert_eq!(parsed.drain_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_flags_override_defaults() {
        let parsed = Config::try_parse_from([
            "chat_relay",
            "--listen",
            "127.0.0.1:7000",
            "--queue-capacity",
            "8",
            "--idle-timeout",
            "30",
        ])
        .unwrap();

        assert_eq!(parsed.listen, "127.0.0.1:7000".parse::<SocketAddr>().unwrap());
        assert_eq!(parsed.queue_capacity, 8);
        assert_eq!(parsed.idle_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_idle_timeout_disables_it() {
        let config = Config {
            idle_timeout: Some(0),
            ..Config::default()
        };
        assert_eq!(config.idle_timeout(), None);
    }

    #[test]
    fn test_invalid_listen_address_rejected() {
        assert!(Config::try_parse_from(["chat_relay", "--listen", "nowhere"]).is_err());
    }
}
