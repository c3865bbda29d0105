//! Primitive aliases shared by every crate in the workspace.

/// Catalog primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Stored timestamps are `TIMESTAMPTZ`, always handled as UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Track length in whole seconds.
pub type DurationSecs = i64;
