//! Core types, configuration, and utilities for the Shopfront client.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_LOG_LEVEL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER_URL};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
