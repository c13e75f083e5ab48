//! Command-line arguments.

use clap::Parser;
use common::ValidationError;

use crate::select::WILDCARD_SUFFIX;

/// Only salt objects can be validated.
pub const SUPPORTED_KEY_PREFIX: &str = "salt";

/// Check that encrypted salt objects decrypt to their unencrypted counterparts.
///
/// Prints `True` or `False` for every compared object.
#[derive(Debug, Clone, Parser)]
#[command(name = "encryption-validator", version)]
pub struct Cli {
    /// Encrypted object key, or a directory pattern ending in `/*` to check
    /// the most recent objects in it. Must start with `salt`.
    pub key: String,

    /// Bucket holding the encrypted and unencrypted objects.
    pub bucket: String,

    /// AWS region of the bucket.
    pub region: String,

    /// Key prefix shared by all objects, ending with `/`.
    #[arg(default_value = "")]
    pub prefix: String,
}

/// What to validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// One encrypted object.
    Single(String),
    /// The most recent objects matching a `/*` pattern.
    Batch(String),
}

impl Cli {
    /// Validate the arguments and classify the key.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] if the prefix does not end
    /// with `/` or the key does not start with `salt`.
    pub fn target(&self) -> Result<Target, ValidationError> {
        if !self.prefix.is_empty() && !self.prefix.ends_with('/') {
            return Err(ValidationError::InvalidArgument(format!(
                "prefix {} should terminate with /",
                self.prefix
            )));
        }
        if !self.key.starts_with(SUPPORTED_KEY_PREFIX) {
            return Err(ValidationError::InvalidArgument(format!(
                "only salts supported; {} does not start with {SUPPORTED_KEY_PREFIX}",
                self.key
            )));
        }

        Ok(if self.key.ends_with(WILDCARD_SUFFIX) {
            Target::Batch(self.key.clone())
        } else {
            Target::Single(self.key.clone())
        })
    }
}
