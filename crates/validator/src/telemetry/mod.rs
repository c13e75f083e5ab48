//! Structured logging setup.
//!
//! # Telemetry invariants
//!
//! - **No key material or decrypted plaintext** appears in any log field.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), the format via
//!   `LOG_FORMAT`, and the sink via `LOG_FILE` (default: stderr).

pub mod init;

pub use init::{init, LogSink};
