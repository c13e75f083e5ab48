//! `encryption-validator` binary entry point.
//!
//! Startup sequence:
//! 1. Parse the command line and load [`Config`] from environment variables.
//! 2. Initialise structured logging.
//! 3. Validate the target key and build the S3 client.
//! 4. Compare one object, or select the most recent objects under a `/*`
//!    pattern and compare each in turn, printing `True`/`False` per object.

mod aws;
mod cli;
mod compare;
mod config;
mod crypto;
mod keystore;
mod select;
mod storage;
mod telemetry;
#[cfg(test)]
mod testing;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use common::ValidationError;
use tracing::{error, info};

use cli::{Cli, Target};
use compare::{CompareSettings, Comparator};
use config::Config;
use select::SelectorPolicy;
use storage::{ObjectStore, S3ObjectStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Arguments and configuration
    // -----------------------------------------------------------------------
    let cli = Cli::parse();
    let cfg = Config::from_env().map_err(|e| {
        // Logging is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Logging
    // -----------------------------------------------------------------------
    let sink = telemetry::LogSink::from_path(cfg.log_file.as_deref());
    telemetry::init(&cfg.log_level, cfg.log_format, &sink)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        bucket = %cli.bucket,
        region = %cli.region,
        prefix = %cli.prefix,
        "encryption-validator starting"
    );

    // -----------------------------------------------------------------------
    // 3. Target and S3 client
    // -----------------------------------------------------------------------
    let target = cli.target().map_err(log_failure)?;
    let client = aws::s3_client(&cli.region, cfg.s3_endpoint_url.as_deref()).await;
    let store = S3ObjectStore::new(client);

    // -----------------------------------------------------------------------
    // 4. Compare
    // -----------------------------------------------------------------------
    let request = Request {
        bucket: &cli.bucket,
        prefix: &cli.prefix,
        compare: cfg.compare_settings(),
        selector: cfg.selector_policy(),
    };
    let mut stdout = std::io::stdout().lock();
    run(&store, &request, &target, &mut stdout).await
}

/// Everything a run needs besides the store and the target.
struct Request<'a> {
    bucket: &'a str,
    prefix: &'a str,
    compare: CompareSettings,
    selector: SelectorPolicy,
}

/// Compare the target object(s), writing one `True`/`False` line per object to `out`.
///
/// Stops at the first failure.
async fn run(
    store: &dyn ObjectStore,
    request: &Request<'_>,
    target: &Target,
    out: &mut impl Write,
) -> Result<()> {
    let keys = match target {
        Target::Single(key) => vec![key.clone()],
        Target::Batch(pattern) => select::select_recent(
            store,
            request.bucket,
            request.prefix,
            pattern,
            &request.selector,
        )
        .await
        .map_err(log_failure)?,
    };

    let comparator = Comparator::new(store, request.bucket, request.prefix, &request.compare);
    for key in &keys {
        let result = comparator.compare(key).await.map_err(log_failure)?;
        info!(
            encrypted = %result.encrypted_key,
            unencrypted = %result.unencrypted_key,
            matches = result.matches,
            "compared"
        );
        writeln!(out, "{}", if result.matches { "True" } else { "False" })
            .context("failed to write result")?;
    }
    Ok(())
}

fn log_failure(e: ValidationError) -> anyhow::Error {
    error!(kind = e.kind(), error = %e, "validation failed");
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryObjectStore;
    use crate::testing::{envelope_json, keystore_json, random_key};
    use serde_json::json;

    const KEYSTORE: &str = "cloud_encryption_keys/cloud_encryption_keys.json";

    fn request<'a>() -> Request<'a> {
        Request {
            bucket: "bucket",
            prefix: "uid2/",
            compare: CompareSettings {
                keystore_object: KEYSTORE.into(),
                path_depth: 3,
            },
            selector: SelectorPolicy {
                max_pages: 5,
                max_results: 10,
                exclude_marker: "metadata".into(),
            },
        }
    }

    /// Three salt files under `uid2/`; the newest one's counterpart differs.
    fn seeded_store() -> InMemoryObjectStore {
        let key = random_key();
        let store = InMemoryObjectStore::new();
        store.put("bucket", &format!("uid2/{KEYSTORE}"), keystore_json(&[(json!(3), &key)]));
        for (i, original) in ["a\n", "b\n", "changed\n"].iter().enumerate() {
            let name = format!("salts.txt.{i}");
            let plaintext = ["a\n", "b\n", "c\n"][i];
            store.put_at(
                "bucket",
                &format!("uid2/salts/encrypted/3_private/{name}"),
                envelope_json(json!(3), plaintext, &key),
                10 + i as u64,
            );
            store.put("bucket", &format!("uid2/salts/{name}"), original.to_string());
        }
        store.put_at("bucket", "uid2/salts/encrypted/3_private/metadata.json", "{}", 99);
        store
    }

    #[tokio::test]
    async fn single_target_prints_one_result() {
        let store = seeded_store();
        let mut out = Vec::new();
        let target = Target::Single("salts/encrypted/3_private/salts.txt.0".into());
        run(&store, &request(), &target, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "True\n");
    }

    #[tokio::test]
    async fn batch_target_prints_newest_first() {
        let store = seeded_store();
        let mut out = Vec::new();
        let target = Target::Batch("salts/encrypted/3_private/*".into());
        run(&store, &request(), &target, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "False\nTrue\nTrue\n");
    }

    #[tokio::test]
    async fn failure_stops_the_run() {
        let store = seeded_store();
        let mut out = Vec::new();
        let target = Target::Single("salts/encrypted/3_private/missing".into());
        let err = run(&store, &request(), &target, &mut out).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::Storage(_))
        ));
        assert!(out.is_empty());
    }
}
