//! Domain layer for keybridge-client.
//!
//! Plain configuration types with no dependencies on I/O, networking, or the
//! CLI parser.  The binary populates them from arguments and environment
//! variables; tests build them directly.

pub mod config;

pub use config::{ClientConfig, ConfigError, MetaChordPolicy};
