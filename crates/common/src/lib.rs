//! Common types and errors shared across `encryption-validator` crates.

pub mod envelope;
pub mod error;
pub mod keystore;

pub use envelope::{Envelope, KeyId};
pub use error::ValidationError;
pub use keystore::KeystoreEntry;
