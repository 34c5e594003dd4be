//! # crm-work-time
//!
//! Rebuilds a member's worked time from their event log.
//!
//! The log is replayed in time order with a single open-segment marker.
//! `start`/`resume` (re)open the marker, `hold`/`end` close it, and an
//! `end` that closes a segment stops the replay. Only closed segments are
//! summed; a trailing open segment is reported separately.

pub mod reconstructor;
pub mod summary;

pub use reconstructor::{compute_member_work_seconds, compute_member_work_seconds_in};
pub use summary::{DayBucket, WorkTimeSummary};
