//! Core report engine for calrep.
//!
//! This crate turns calendar events that were already fetched from the
//! provider into reports:
//! - Normalization: canonical event shape with computed durations
//! - Exclusion: keyword rules under six matching modes
//! - Aggregation: daily, weekly (Sunday start) and monthly buckets
//! - Rendering: JSON, CSV and plain text
//!
//! It performs no I/O; see [`process()`] for the entry point.

pub mod bucket;
pub mod duration;
mod error;
pub mod event;
pub mod filter;
pub mod matcher;
pub mod normalize;
mod options;
mod process;
pub mod render;

pub use bucket::{Bucket, Granularity, Summary};
pub use duration::Duration;
pub use error::{Boundary, CoreError, UnknownOption};
pub use event::{EventMarker, NormalizedEvent, RawEvent};
pub use options::{ExcludeMode, OutputFormat, ReportOptions, ReportPeriod, SummaryMode};
pub use process::{Exclusion, Report, build_report, process, process_in};
pub use render::{NO_EVENTS, RenderedReport};
