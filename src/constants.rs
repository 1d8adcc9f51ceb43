//! Application constants

use std::time::Duration;

/// Collection name for clip documents
pub const CLIPS_COLLECTION: &str = "clip";

/// Default number of items returned by list endpoints
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Hard ceiling on list limits, regardless of what the client asks for
pub const MAX_LIST_LIMIT: i64 = 500;

/// Upper bound on any single document store operation
pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum number of collection names reported by the diagnostics endpoint
pub const DIAG_COLLECTIONS_LIMIT: i64 = 10;

/// Longest internal error prefix exposed in client-visible details
pub const ERROR_DETAIL_MAX: usize = 50;
