//! Error taxonomy for the diagnosis pipeline.

use thiserror::Error;

/// Errors surfaced by [`ShindanClient`](crate::client::ShindanClient)
/// operations.
///
/// There are no retries and no partial results: either a full rendered
/// output is produced, or the operation fails wholesale with one of these.
#[derive(Debug, Error)]
pub enum ShindanError {
    /// Every mirror failed the availability probe. The message is shown
    /// to the end user as-is.
    #[error("所有站点均无法访问，请稍后再试")]
    AllMirrorsDown,

    /// An element the extraction contract declares mandatory was absent
    /// from the fetched markup. This indicates the target site changed
    /// its markup (or we were served an unexpected page) and is never
    /// silently masked.
    #[error("expected element `{0}` missing from diagnosis markup")]
    MissingElement(&'static str),

    /// Navigation, network, or template failure, propagated immediately.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
