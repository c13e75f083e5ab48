//! In-memory [`ObjectStore`] for tests.
//!
//! Listings come back in lexicographic key order, split into pages of
//! `page_size` objects, the way S3 pages `ListObjectsV2`.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use bytes::Bytes;
use common::ValidationError;

use super::{ListPage, ObjectStore, ObjectSummary};

#[derive(Debug)]
pub struct InMemoryObjectStore {
    objects: Mutex<BTreeMap<(String, String), (Bytes, SystemTime)>>,
    page_size: usize,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::with_page_size(1000)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size,
        }
    }

    /// Store `body` under `key`, modified `age_secs` after the epoch.
    pub fn put_at(&self, bucket: &str, key: &str, body: impl Into<Bytes>, age_secs: u64) {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(age_secs);
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_owned(), key.to_owned()), (body.into(), modified));
    }

    pub fn put(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.put_at(bucket, key, body, 0);
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, ValidationError> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_owned(), key.to_owned()))
            .map(|(body, _)| body.clone())
            .ok_or_else(|| ValidationError::Storage(format!("NoSuchKey: s3://{bucket}/{key}")))
    }

    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<String>,
    ) -> Result<ListPage, ValidationError> {
        let start: usize = match token {
            Some(t) => t
                .parse()
                .map_err(|_| ValidationError::Storage(format!("bad continuation token: {t}")))?,
            None => 0,
        };

        let matching: Vec<ObjectSummary> = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .map(|((_, k), (_, modified))| ObjectSummary {
                key: k.clone(),
                last_modified: *modified,
            })
            .collect();

        let end = (start + self.page_size).min(matching.len());
        let next_token = (end < matching.len()).then(|| end.to_string());
        Ok(ListPage {
            objects: matching[start.min(end)..end].to_vec(),
            next_token,
        })
    }
}
