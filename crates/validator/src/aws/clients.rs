//! S3 client construction.

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{retry::RetryConfig, Region};
use tracing::info;

/// Build an S3 client for `region`.
///
/// Credentials are resolved via the standard AWS credential chain. SDK retries
/// are disabled: a failed call fails the run. When `endpoint_url` is set
/// (e.g. LocalStack), the client targets it with path-style addressing.
pub async fn s3_client(region: &str, endpoint_url: Option<&str>) -> aws_sdk_s3::Client {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_owned()))
        .load()
        .await;

    let mut builder =
        aws_sdk_s3::config::Builder::from(&config).retry_config(RetryConfig::disabled());
    if let Some(url) = endpoint_url {
        info!(endpoint = url, "using custom S3 endpoint");
        builder = builder.endpoint_url(url).force_path_style(true);
    }

    aws_sdk_s3::Client::from_conf(builder.build())
}
