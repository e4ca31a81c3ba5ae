//! KeyBridge remote keyboard client: entry point.
//!
//! Connects to a keyboard-injection service over WebSocket and types on the
//! remote machine: either each line read from stdin (followed by Enter), or
//! a one-shot `--text` string.
//!
//! # Usage
//!
//! ```text
//! keybridge [OPTIONS]
//!
//! Options:
//!   --url <URL>                  Service WebSocket URL [default: ws://127.0.0.1:8000/keystrokes]
//!   --text <TEXT>                Type TEXT once, wait for acknowledgments, exit
//!   --no-history                 Do not log a history line per pasted character
//!   --meta-chord <POLICY>        forward-all | track-without-meta | suppress [default: forward-all]
//!   --layout <FILE>              TOML keyboard layout overriding the US tables
//!   --reconnect-secs <SECS>      Delay between reconnect attempts [default: 3]
//!   --ack-timeout-secs <SECS>    One-shot wait for acknowledgments [default: 10]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                     | Default                          |
//! |------------------------------|----------------------------------|
//! | `KEYBRIDGE_URL`              | `ws://127.0.0.1:8000/keystrokes` |
//! | `KEYBRIDGE_LAYOUT`           | (built-in US QWERTY)             |
//! | `KEYBRIDGE_META_CHORD`       | `forward-all`                    |
//! | `KEYBRIDGE_RECONNECT_SECS`   | `3`                              |
//! | `KEYBRIDGE_ACK_TIMEOUT_SECS` | `10`                             |
//!
//! Log verbosity follows `RUST_LOG` (default `info`; `debug` shows every
//! keystroke).

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use keybridge_client::application::SessionEvent;
use keybridge_client::domain::{ClientConfig, MetaChordPolicy};
use keybridge_client::infrastructure::{read_lines, run_client, LineParser};
use keybridge_core::KeyboardLayout;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// KeyBridge remote keyboard client.
#[derive(Debug, Parser)]
#[command(
    name = "keybridge",
    about = "Type on a remote machine through a keyboard-injection service",
    version
)]
struct Cli {
    /// WebSocket URL of the keyboard service.
    #[arg(long, default_value = "ws://127.0.0.1:8000/keystrokes", env = "KEYBRIDGE_URL")]
    url: String,

    /// Type this text once, wait for every acknowledgment, then exit.
    ///
    /// Without it, lines are read from stdin until EOF.
    #[arg(long)]
    text: Option<String>,

    /// Do not record a history entry per pasted character.
    #[arg(long)]
    no_history: bool,

    /// Handling of key-downs while the OS/meta key is held.
    #[arg(long, default_value = "forward-all", env = "KEYBRIDGE_META_CHORD")]
    meta_chord: String,

    /// TOML file overriding the shift-symbol set and keyCode table.
    #[arg(long, env = "KEYBRIDGE_LAYOUT")]
    layout: Option<PathBuf>,

    /// Seconds between reconnect attempts.
    #[arg(long, default_value_t = 3, env = "KEYBRIDGE_RECONNECT_SECS")]
    reconnect_secs: u64,

    /// Seconds to wait for outstanding acknowledgments once input ends.
    #[arg(long, default_value_t = 10, env = "KEYBRIDGE_ACK_TIMEOUT_SECS")]
    ack_timeout_secs: u64,
}

impl Cli {
    /// Converts the parsed arguments into a validated [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown meta-chord policy, an unreadable or
    /// invalid layout file, or a non-WebSocket URL.
    fn into_client_config(self) -> anyhow::Result<ClientConfig> {
        let meta_chord_policy: MetaChordPolicy = self
            .meta_chord
            .parse()
            .context("invalid --meta-chord")?;

        let layout = match &self.layout {
            Some(path) => KeyboardLayout::load(path)
                .with_context(|| format!("failed to load layout {}", path.display()))?,
            None => KeyboardLayout::us_qwerty(),
        };

        let config = ClientConfig {
            server_url: self.url,
            layout,
            paste_history: !self.no_history,
            meta_chord_policy,
            reconnect_interval: Duration::from_secs(self.reconnect_secs),
            ack_timeout: Duration::from_secs(self.ack_timeout_secs),
        };
        config.validate().context("invalid --url")?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let text = cli.text.clone();
    let config = cli.into_client_config()?;

    info!(
        url = %config.server_url,
        layout = config.layout.name(),
        policy = ?config.meta_chord_policy,
        "KeyBridge client starting"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    match text {
        Some(text) => {
            tx.send(SessionEvent::Paste {
                text,
                show_history: config.paste_history,
            })
            .context("input channel closed before start")?;
            // Closing the channel marks input as finished.
            drop(tx);
        }
        None => {
            let parser = LineParser::new(config.layout.clone(), config.paste_history);
            std::thread::Builder::new()
                .name("stdin".into())
                .spawn(move || {
                    let stdin = std::io::stdin();
                    if let Err(e) = read_lines(stdin.lock(), &parser, tx) {
                        warn!("stdin read failed: {e}");
                    }
                })
                .context("failed to spawn stdin reader")?;
        }
    }

    // Ctrl+C requests a shutdown; the resulting disconnect is not an error.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    let summary = run_client(config, rx, running).await?;
    if summary.failed > 0 || summary.unacknowledged > 0 {
        warn!(
            failed = summary.failed,
            unacknowledged = summary.unacknowledged,
            "not every keystroke was confirmed"
        );
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["keybridge"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_cli_defaults() {
        // Arrange: no arguments (all defaults apply)
        let cli = cli(&[]);

        // Assert
        assert_eq!(cli.url, "ws://127.0.0.1:8000/keystrokes");
        assert_eq!(cli.meta_chord, "forward-all");
        assert_eq!(cli.reconnect_secs, 3);
        assert_eq!(cli.ack_timeout_secs, 10);
        assert!(!cli.no_history);
        assert!(cli.text.is_none());
    }

    #[test]
    fn test_into_client_config_defaults() {
        let config = cli(&[]).into_client_config().unwrap();
        assert_eq!(config.meta_chord_policy, MetaChordPolicy::ForwardAll);
        assert!(config.paste_history);
        assert_eq!(config.reconnect_interval, Duration::from_secs(3));
        assert_eq!(config.layout.name(), "us");
    }

    #[test]
    fn test_no_history_flag() {
        let config = cli(&["--no-history"]).into_client_config().unwrap();
        assert!(!config.paste_history);
    }

    #[test]
    fn test_meta_chord_override() {
        let config = cli(&["--meta-chord", "suppress"]).into_client_config().unwrap();
        assert_eq!(config.meta_chord_policy, MetaChordPolicy::Suppress);
    }

    #[test]
    fn test_unknown_meta_chord_returns_error() {
        assert!(cli(&["--meta-chord", "maybe"]).into_client_config().is_err());
    }

    #[test]
    fn test_http_url_returns_error() {
        assert!(cli(&["--url", "http://pi.local"]).into_client_config().is_err());
    }

    #[test]
    fn test_missing_layout_file_returns_error() {
        let result = cli(&["--layout", "/nonexistent/keybridge-layout.toml"]).into_client_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_timeouts_override() {
        let config = cli(&["--reconnect-secs", "1", "--ack-timeout-secs", "30"])
            .into_client_config()
            .unwrap();
        assert_eq!(config.reconnect_interval, Duration::from_secs(1));
        assert_eq!(config.ack_timeout, Duration::from_secs(30));
    }
}
