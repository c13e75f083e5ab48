//! Object-store access behind the [`ObjectStore`] trait.
//!
//! Production code talks to S3 through [`S3ObjectStore`]; tests substitute an
//! in-memory store or a `mockall` mock.

pub mod s3;
#[cfg(test)]
pub mod memory;

pub use s3::S3ObjectStore;

use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use common::ValidationError;

#[cfg(test)]
use mockall::automock;

/// One entry of an object listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full object key, including any prefix.
    pub key: String,
    pub last_modified: SystemTime,
}

/// A single page of an object listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub objects: Vec<ObjectSummary>,
    /// Token for the next page; `None` when the listing is exhausted.
    pub next_token: Option<String>,
}

/// Read-only access to a bucketed object store.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full body of `key` in `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Storage`] on any access failure.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, ValidationError>;

    /// Fetch one page of the listing under `prefix`, continuing from `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Storage`] on any access failure.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<String>,
    ) -> Result<ListPage, ValidationError>;
}
