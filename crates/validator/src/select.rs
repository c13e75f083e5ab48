//! Batch-mode selection of the most recently modified encrypted objects.
//!
//! The listing is capped at [`SelectorPolicy::max_pages`] pages *before*
//! sorting by modification time. S3 pages in key order, so when more pages
//! exist the newest objects may never be seen. This is logged rather than
//! worked around.

use std::cmp::Reverse;

use common::ValidationError;
use tracing::{info, warn};

use crate::storage::{ObjectStore, ObjectSummary};

/// Wildcard suffix that marks a batch pattern.
pub const WILDCARD_SUFFIX: &str = "/*";

/// Limits applied to a batch listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPolicy {
    /// Listing pages read before selection.
    pub max_pages: usize,
    /// Keys returned.
    pub max_results: usize,
    /// Keys containing this substring are skipped.
    pub exclude_marker: String,
}

/// Listing prefix for a batch `pattern`: `<prefix><pattern without "/*">/`.
///
/// Returns `None` if `pattern` does not end in [`WILDCARD_SUFFIX`].
pub fn listing_prefix(prefix: &str, pattern: &str) -> Option<String> {
    pattern
        .strip_suffix(WILDCARD_SUFFIX)
        .map(|dir| format!("{prefix}{dir}/"))
}

/// Order newest first, drop excluded keys, and keep at most `max_results`.
///
/// The sort is stable, so objects with equal timestamps keep listing order.
pub fn most_recent(mut objects: Vec<ObjectSummary>, policy: &SelectorPolicy) -> Vec<String> {
    objects.sort_by_key(|o| Reverse(o.last_modified));
    objects
        .into_iter()
        .map(|o| o.key)
        .filter(|key| !key.contains(&policy.exclude_marker))
        .take(policy.max_results)
        .collect()
}

/// Objects gathered by [`list_capped`].
#[derive(Debug, Default)]
pub struct CappedListing {
    pub objects: Vec<ObjectSummary>,
    /// The page cap was reached while the store still reported more pages.
    pub truncated: bool,
}

/// Read at most `max_pages` listing pages under `list_prefix`.
///
/// # Errors
///
/// Returns [`ValidationError::Storage`] if a listing call fails.
pub async fn list_capped(
    store: &dyn ObjectStore,
    bucket: &str,
    list_prefix: &str,
    max_pages: usize,
) -> Result<CappedListing, ValidationError> {
    let mut listing = CappedListing::default();
    let mut token = None;
    for _ in 0..max_pages {
        let page = store.list_page(bucket, list_prefix, token).await?;
        listing.objects.extend(page.objects);
        token = page.next_token;
        if token.is_none() {
            return Ok(listing);
        }
    }
    listing.truncated = true;
    Ok(listing)
}

/// List the objects matching `pattern` and select the most recent ones.
///
/// Returned keys are relative to `prefix`, ready for
/// [`Comparator::compare`](crate::compare::Comparator::compare).
///
/// # Errors
///
/// Returns [`ValidationError::InvalidArgument`] if `pattern` is not a batch
/// pattern and [`ValidationError::Storage`] if a listing call fails.
pub async fn select_recent(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
    pattern: &str,
    policy: &SelectorPolicy,
) -> Result<Vec<String>, ValidationError> {
    let list_prefix = listing_prefix(prefix, pattern).ok_or_else(|| {
        ValidationError::InvalidArgument(format!("{pattern} does not end with {WILDCARD_SUFFIX}"))
    })?;

    let listing = list_capped(store, bucket, &list_prefix, policy.max_pages).await?;
    if listing.truncated {
        warn!(
            max_pages = policy.max_pages,
            listed = listing.objects.len(),
            prefix = %list_prefix,
            "listing truncated at page cap; newer objects on later pages were not considered"
        );
    }

    let selected: Vec<String> = most_recent(listing.objects, policy)
        .into_iter()
        .map(|key| key.strip_prefix(prefix).map(str::to_owned).unwrap_or(key))
        .collect();

    info!(prefix = %list_prefix, selected = selected.len(), "selected recent objects");
    Ok(selected)
}
