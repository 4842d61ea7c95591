//! Job-listing domain.
//!
//! Raw provider records flow through normalization, dedup/filtering, and
//! pagination control before the sheet write. Provider clients live in
//! sibling packages; this module owns the provider-agnostic semantics.

pub mod dedupe;
pub mod normalize;
pub mod paging;
pub mod provider;
pub mod query;
pub mod recency;
pub mod sources;

use serde_json::Value;

/// One raw provider record: an opaque keyed mapping whose schema varies by
/// provider and over time.
pub type RawRecord = serde_json::Map<String, Value>;
