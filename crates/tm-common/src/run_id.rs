//! Identifiers for matching runs.
//!
//! Every pipeline run gets its own ULID so that log lines and emitted
//! reports from one run can be correlated. Nothing is cached per process:
//! two runs in the same process always get different ids.

use ulid::Ulid;

/// Fresh run id: 26 Crockford base32 characters, ordered by creation time.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}
