//! AWS SDK client initialisation.
//!
//! Only S3 is used: the keystore, envelopes, and unencrypted originals all
//! live in one bucket.

pub mod clients;

pub use clients::s3_client;
