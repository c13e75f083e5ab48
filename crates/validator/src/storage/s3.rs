//! [`ObjectStore`] over the AWS S3 SDK.

use std::time::SystemTime;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use bytes::Bytes;
use common::ValidationError;
use tracing::debug;

use super::{ListPage, ObjectStore, ObjectSummary};

/// S3-backed object store. Cheap to clone; shares the SDK client.
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, ValidationError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                ValidationError::Storage(format!(
                    "failed to fetch s3://{bucket}/{key}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| {
                ValidationError::Storage(format!("failed to read body of s3://{bucket}/{key}: {e}"))
            })?
            .into_bytes();

        debug!(bucket, key, bytes = body.len(), "fetched object");
        Ok(body)
    }

    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<String>,
    ) -> Result<ListPage, ValidationError> {
        let mut request = self.client.list_objects_v2().bucket(bucket).prefix(prefix);
        if let Some(token) = token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(|e| {
            ValidationError::Storage(format!(
                "failed to list s3://{bucket}/{prefix}: {}",
                DisplayErrorContext(&e)
            ))
        })?;

        let objects = response
            .contents()
            .iter()
            .filter_map(|obj| {
                let key = obj.key()?.to_owned();
                // S3 always reports LastModified; an absent one sorts oldest.
                let last_modified = obj
                    .last_modified()
                    .and_then(|t| SystemTime::try_from(*t).ok())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                Some(ObjectSummary { key, last_modified })
            })
            .collect();

        Ok(ListPage {
            objects,
            next_token: response.next_continuation_token().map(str::to_owned),
        })
    }
}
