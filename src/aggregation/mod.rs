//! Cross-foundation aggregation.
//!
//! `fanout` runs one unit of work per foundation and merges the results;
//! `counts` sums per-foundation tallies into totals.

pub mod counts;
pub mod fanout;

pub use counts::{aggregate, Counts};
pub use fanout::{fan_out, merge_all, Merge, DEFAULT_CONCURRENCY};
