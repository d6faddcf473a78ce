//! # image-compare
//!
//! Batch visual-regression diffing: one reference image against many
//! candidates, producing a diff overlay and a changed-pixel percentage per
//! candidate.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use image_compare::{BatchComparator, CompareConfig, decode, discover_candidates, report};
//!
//! let config = CompareConfig::builder()
//!     .sensitivity(120)
//!     .max_diff(25)
//!     .build()?;
//!
//! let reference = decode::load_path("before.png".as_ref())?;
//! let candidates = discover_candidates("after/".as_ref())?;
//!
//! let outcome = BatchComparator::new(config.execution)
//!     .compare_all(&reference.raster, candidates, config.threshold());
//!
//! let shown = outcome.results.visible(config.max_diff);
//! let csv = report::to_csv(&reference.name, &shown)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`raster`]: Immutable RGBA8 raster
//! - [`settings`]: Sensitivity, threshold, max-diff and run configuration
//! - [`decode`]: Image loading and candidate discovery
//! - [`diff`]: Pixel diff engine
//! - [`batch`]: Ordered, cancellable batch comparison
//! - [`report`]: Visibility filter and CSV/JSON/PNG exports

pub mod batch;
pub mod decode;
pub mod diff;
pub mod error;
pub mod raster;
pub mod report;
pub mod settings;

// Re-export commonly used types
pub use batch::{
    BatchComparator, BatchItem, BatchObserver, BatchOutcome, BatchState, BatchStatus,
    CancelToken, Candidate, DiffRecord, FailedItem, NoProgress, ResultSet, compare_all,
    discover_candidates,
};
pub use decode::{LoadedImage, Payload, PendingDecode, decode_in_background, load_image};
pub use diff::{DiffOutput, diff};
pub use error::{Error, Result};
pub use raster::Raster;
pub use report::{CsvExport, FilterSummary, Report, to_csv, visible};
pub use settings::{CompareConfig, Execution, MaxDiff, Sensitivity, Threshold};
