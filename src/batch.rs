//! Batch comparison of many candidates against one reference.
//!
//! [`BatchComparator`] runs the diff engine once per [`Candidate`] and
//! assembles a [`ResultSet`] in candidate input order, whatever order the
//! work actually finished in. A candidate that fails to decode becomes a
//! [`BatchItem::Failed`] entry and the batch carries on.
//!
//! ```text
//! Idle ──compare_all──▶ Running ──▶ Completed
//!                          │
//!                          └─cancel─▶ Cancelled (completed prefix kept)
//! ```
//!
//! Cancellation is cooperative and checked before each candidate starts;
//! a diff that has started always runs to completion.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::decode::{
    LoadedImage, Payload, discover_images, display_name, load_image, load_path, relative_name,
};
use crate::diff::diff;
use crate::error::{Error, Result};
use crate::raster::Raster;
use crate::settings::{Execution, Threshold};

/// Where a candidate's pixels come from.
#[derive(Debug)]
enum Source {
    Raster(Raster),
    Encoded(Vec<u8>),
    File(PathBuf),
    Failed(Error),
}

/// One image to compare against the reference.
#[derive(Debug)]
pub struct Candidate {
    name: String,
    source: Source,
}

impl Candidate {
    /// An already decoded raster.
    pub fn raster(name: impl Into<String>, raster: Raster) -> Self {
        Self {
            name: name.into(),
            source: Source::Raster(raster),
        }
    }

    /// Encoded bytes, decoded when the batch reaches this candidate.
    pub fn encoded(payload: Payload) -> Self {
        Self {
            name: payload.name,
            source: Source::Encoded(payload.data),
        }
    }

    /// A file, read and decoded when the batch reaches this candidate.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: display_name(&path),
            source: Source::File(path),
        }
    }

    /// A file under a discovery root, named by its path relative to `root`.
    pub fn file_under(root: &Path, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: relative_name(root, &path),
            source: Source::File(path),
        }
    }

    /// A candidate whose loading already failed.
    pub fn failed(name: impl Into<String>, error: Error) -> Self {
        Self {
            name: name.into(),
            source: Source::Failed(error),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn into_raster(self) -> (String, Result<Raster>) {
        let raster = match self.source {
            Source::Raster(raster) => Ok(raster),
            Source::Encoded(data) => {
                load_image(&Payload::new(self.name.clone(), data)).map(|l| l.raster)
            }
            Source::File(path) => load_path(&path).map(|l| l.raster),
            Source::Failed(error) => Err(error),
        };
        (self.name, raster)
    }
}

/// Discover image files under `dir` as lazily loaded candidates.
///
/// Candidates keep the filesystem listing order of
/// [`discover_images`] and are named by their path relative to `dir`, so
/// `a/x.png` and `b/x.png` stay distinct.
pub fn discover_candidates(dir: &Path) -> Result<Vec<Candidate>> {
    Ok(discover_images(dir)?
        .into_iter()
        .map(|path| Candidate::file_under(dir, path))
        .collect())
}

impl From<LoadedImage> for Candidate {
    fn from(image: LoadedImage) -> Self {
        Self::raster(image.name, image.raster)
    }
}

impl From<Payload> for Candidate {
    fn from(payload: Payload) -> Self {
        Self::encoded(payload)
    }
}

impl<S: Into<String>> From<(S, Raster)> for Candidate {
    fn from((name, raster): (S, Raster)) -> Self {
        Self::raster(name, raster)
    }
}

/// Diff of one candidate against the reference.
#[derive(Debug, Clone)]
pub struct DiffRecord {
    /// Position of the candidate in the input list.
    pub index: usize,
    /// Candidate display name.
    pub candidate: String,
    /// Diff overlay at the padded canvas size.
    pub diff: Raster,
    /// Changed pixels as a percentage, two decimals.
    pub percentage: f64,
}

impl DiffRecord {
    /// Percentage as shown to users: two decimals, no unit.
    #[must_use]
    pub fn percentage_label(&self) -> String {
        format!("{:.2}", self.percentage)
    }
}

/// A candidate that could not be compared.
#[derive(Debug)]
pub struct FailedItem {
    /// Position of the candidate in the input list.
    pub index: usize,
    /// Candidate display name.
    pub candidate: String,
    /// Why it failed.
    pub error: Error,
}

/// One slot of a [`ResultSet`].
#[derive(Debug)]
pub enum BatchItem {
    /// The candidate was diffed.
    Compared(DiffRecord),
    /// The candidate could not be loaded.
    Failed(FailedItem),
}

impl BatchItem {
    /// Position of the candidate in the input list.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Compared(r) => r.index,
            Self::Failed(f) => f.index,
        }
    }

    /// Candidate display name.
    #[must_use]
    pub fn candidate(&self) -> &str {
        match self {
            Self::Compared(r) => &r.candidate,
            Self::Failed(f) => &f.candidate,
        }
    }

    /// The diff record, if the candidate was compared.
    #[must_use]
    pub fn record(&self) -> Option<&DiffRecord> {
        match self {
            Self::Compared(r) => Some(r),
            Self::Failed(_) => None,
        }
    }

    /// The failure, if the candidate could not be compared.
    #[must_use]
    pub fn failure(&self) -> Option<&FailedItem> {
        match self {
            Self::Compared(_) => None,
            Self::Failed(f) => Some(f),
        }
    }
}

/// Ordered outcome of one batch: one item per processed candidate, in
/// candidate input order.
#[derive(Debug, Default)]
pub struct ResultSet {
    items: Vec<BatchItem>,
}

impl ResultSet {
    /// All items in input order.
    #[must_use]
    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    /// Number of processed candidates, failed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no candidate was processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Successfully compared candidates, in input order.
    pub fn records(&self) -> impl Iterator<Item = &DiffRecord> {
        self.items.iter().filter_map(BatchItem::record)
    }

    /// Failed candidates, in input order.
    pub fn failures(&self) -> impl Iterator<Item = &FailedItem> {
        self.items.iter().filter_map(BatchItem::failure)
    }
}

impl FromIterator<BatchItem> for ResultSet {
    fn from_iter<I: IntoIterator<Item = BatchItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Lifecycle of a [`BatchComparator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchState {
    /// No batch has run yet.
    Idle,
    /// A batch is in progress.
    Running,
    /// The last batch processed every candidate.
    Completed,
    /// The last batch stopped early on request.
    Cancelled,
}

impl BatchState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Cancelled,
            _ => Self::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Completed => 2,
            Self::Cancelled => 3,
        }
    }
}

/// Terminal status of a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// Every candidate was processed.
    Completed,
    /// Stopped early; the result set holds the completed prefix.
    Cancelled,
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// What a batch run returns.
#[derive(Debug)]
pub struct BatchOutcome {
    /// How the batch ended.
    pub status: BatchStatus,
    /// Processed candidates in input order.
    pub results: ResultSet,
    /// Wall time of the run.
    pub elapsed: Duration,
}

/// Cooperative cancellation flag, cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a previous cancellation request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Progress hook, called once per processed candidate.
///
/// In parallel mode calls arrive in completion order and from pool threads.
/// If the batch is cancelled, `done` counts every candidate that finished,
/// including ones past the first skipped candidate that are then dropped
/// from the returned [`ResultSet`]; the final `done` can therefore exceed
/// the result length. Sequential runs never drop finished items.
pub trait BatchObserver: Sync {
    /// `item` just finished; `done` of `total` candidates are processed.
    fn item_finished(&self, item: &BatchItem, done: usize, total: usize);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl BatchObserver for NoProgress {
    fn item_finished(&self, _item: &BatchItem, _done: usize, _total: usize) {}
}

impl<F> BatchObserver for F
where
    F: Fn(&BatchItem, usize, usize) + Sync,
{
    fn item_finished(&self, item: &BatchItem, done: usize, total: usize) {
        self(item, done, total);
    }
}

/// Runs the diff engine over a candidate list against one reference.
///
/// # Example
///
/// ```rust,ignore
/// use image_compare::{BatchComparator, Candidate, Execution, Sensitivity};
///
/// let comparator = BatchComparator::new(Execution::Parallel);
/// let cancel = comparator.cancel_token(); // hand to a UI thread
///
/// let outcome = comparator.compare_all(
///     &reference.raster,
///     paths.into_iter().map(Candidate::file).collect(),
///     Sensitivity::new(120)?.threshold(),
/// );
/// ```
#[derive(Debug)]
pub struct BatchComparator {
    execution: Execution,
    cancel: CancelToken,
    state: AtomicU8,
}

impl Default for BatchComparator {
    fn default() -> Self {
        Self::new(Execution::default())
    }
}

impl BatchComparator {
    /// Create an idle comparator.
    #[must_use]
    pub fn new(execution: Execution) -> Self {
        Self {
            execution,
            cancel: CancelToken::new(),
            state: AtomicU8::new(BatchState::Idle.as_u8()),
        }
    }

    /// Token that cancels this comparator's runs.
    ///
    /// Cancellation is sticky: once requested, later runs stop before their
    /// first candidate until [`reset`](Self::reset) is called.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> BatchState {
        BatchState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Clear cancellation and return to [`BatchState::Idle`] so the
    /// comparator can start a new run. Tokens handed out earlier stay
    /// connected and can cancel the next run.
    ///
    /// Does nothing while a batch is running.
    pub fn reset(&self) {
        if self.state() == BatchState::Running {
            return;
        }
        self.cancel.reset();
        self.set_state(BatchState::Idle);
    }

    fn set_state(&self, state: BatchState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    /// Compare every candidate against `reference`.
    pub fn compare_all(
        &self,
        reference: &Raster,
        candidates: Vec<Candidate>,
        threshold: Threshold,
    ) -> BatchOutcome {
        self.compare_all_observed(reference, candidates, threshold, &NoProgress)
    }

    /// [`compare_all`](Self::compare_all) with a progress observer.
    pub fn compare_all_observed(
        &self,
        reference: &Raster,
        candidates: Vec<Candidate>,
        threshold: Threshold,
        observer: &dyn BatchObserver,
    ) -> BatchOutcome {
        let total = candidates.len();
        let start = Instant::now();
        self.set_state(BatchState::Running);

        tracing::info!(
            candidates = total,
            threshold = threshold.value(),
            execution = ?self.execution,
            "batch started"
        );

        let done = AtomicUsize::new(0);
        let step = |index: usize, candidate: Candidate| -> Option<BatchItem> {
            if self.cancel.is_cancelled() {
                return None;
            }
            let item = compare_one(reference, index, candidate, threshold);
            let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
            observer.item_finished(&item, finished, total);
            Some(item)
        };

        let items: Vec<BatchItem> = match self.execution {
            Execution::Sequential => candidates
                .into_iter()
                .enumerate()
                .map_while(|(i, c)| step(i, c))
                .collect(),
            Execution::Parallel => {
                let slots: Vec<Option<BatchItem>> = candidates
                    .into_par_iter()
                    .enumerate()
                    .map(|(i, c)| step(i, c))
                    .collect();
                let finished = slots.iter().filter(|s| s.is_some()).count();
                let prefix: Vec<BatchItem> = slots.into_iter().map_while(|s| s).collect();
                if prefix.len() < finished {
                    tracing::debug!(
                        discarded = finished - prefix.len(),
                        "dropping results finished past the cancellation point"
                    );
                }
                prefix
            }
        };

        let status = if items.len() < total {
            BatchStatus::Cancelled
        } else {
            BatchStatus::Completed
        };
        self.set_state(match status {
            BatchStatus::Completed => BatchState::Completed,
            BatchStatus::Cancelled => BatchState::Cancelled,
        });

        let elapsed = start.elapsed();
        let failed = items.iter().filter(|i| i.failure().is_some()).count();
        if status == BatchStatus::Cancelled {
            tracing::warn!(processed = items.len(), total, "batch cancelled");
        }
        tracing::info!(
            processed = items.len(),
            failed,
            %status,
            elapsed_ms = elapsed.as_millis() as u64,
            "batch finished"
        );

        BatchOutcome {
            status,
            results: items.into_iter().collect(),
            elapsed,
        }
    }
}

/// Compare with a fresh parallel comparator.
pub fn compare_all(
    reference: &Raster,
    candidates: Vec<Candidate>,
    threshold: Threshold,
) -> BatchOutcome {
    BatchComparator::default().compare_all(reference, candidates, threshold)
}

fn compare_one(reference: &Raster, index: usize, candidate: Candidate, threshold: Threshold) -> BatchItem {
    let (name, raster) = candidate.into_raster();
    match raster {
        Ok(raster) => {
            let out = diff(reference, &raster, threshold);
            tracing::debug!(
                candidate = %name,
                width = out.raster.width(),
                height = out.raster.height(),
                percentage = out.percentage,
                "compared"
            );
            BatchItem::Compared(DiffRecord {
                index,
                candidate: name,
                diff: out.raster,
                percentage: out.percentage,
            })
        }
        Err(error) => {
            tracing::warn!(candidate = %name, %error, "candidate failed");
            BatchItem::Failed(FailedItem {
                index,
                candidate: name,
                error,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgb::RGBA8;
    use std::sync::Mutex;

    const WHITE: RGBA8 = RGBA8 { r: 255, g: 255, b: 255, a: 255 };
    const BLACK: RGBA8 = RGBA8 { r: 0, g: 0, b: 0, a: 255 };

    fn solid(width: usize, height: usize, pixel: RGBA8) -> Raster {
        Raster::filled(width, height, pixel).unwrap()
    }

    /// Candidates whose i-th entry has `i` black pixels out of 10.
    fn stepped_candidates(count: usize) -> Vec<Candidate> {
        (0..count)
            .map(|i| {
                let pixels = (0..10).map(|x| if x < i { BLACK } else { WHITE }).collect();
                Candidate::raster(format!("c{i}.png"), Raster::new(10, 1, pixels).unwrap())
            })
            .collect()
    }

    #[test]
    fn test_output_order_matches_input() {
        for execution in [Execution::Sequential, Execution::Parallel] {
            let comparator = BatchComparator::new(execution);
            let reference = solid(10, 1, WHITE);
            let outcome = comparator.compare_all(&reference, stepped_candidates(10), Threshold(10));

            assert_eq!(outcome.status, BatchStatus::Completed);
            assert_eq!(comparator.state(), BatchState::Completed);
            let names: Vec<&str> = outcome.results.items().iter().map(BatchItem::candidate).collect();
            let expected: Vec<String> = (0..10).map(|i| format!("c{i}.png")).collect();
            assert_eq!(names, expected);
            for (i, record) in outcome.results.records().enumerate() {
                assert_eq!(record.index, i);
                assert_eq!(record.percentage, i as f64 * 10.0);
            }
        }
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let reference = solid(2, 2, WHITE);
        let candidates = vec![
            Candidate::raster("ok1", solid(2, 2, WHITE)),
            Candidate::encoded(Payload::new("broken.png", vec![1, 2, 3])),
            Candidate::failed("unreadable.png", Error::decode("unreadable.png", "permission denied")),
            Candidate::raster("ok2", solid(2, 2, BLACK)),
        ];

        let outcome = compare_all(&reference, candidates, Threshold(10));
        assert_eq!(outcome.status, BatchStatus::Completed);
        assert_eq!(outcome.results.len(), 4);
        assert_eq!(outcome.results.records().count(), 2);

        let failures: Vec<&FailedItem> = outcome.results.failures().collect();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 1);
        assert!(failures[0].error.is_decode());
        assert_eq!(failures[1].candidate, "unreadable.png");

        let last = outcome.results.items()[3].record().unwrap();
        assert_eq!(last.candidate, "ok2");
        assert_eq!(last.percentage, 100.0);
    }

    #[test]
    fn test_missing_file_candidate_fails() {
        let candidate = Candidate::file("/nonexistent/dir/gone.png");
        assert_eq!(candidate.name(), "gone.png");
        let outcome = compare_all(&solid(1, 1, WHITE), vec![candidate], Threshold(10));
        let failure = outcome.results.failures().next().unwrap();
        assert_eq!(failure.candidate, "gone.png");
        assert!(failure.error.is_decode());
    }

    #[test]
    fn test_encoded_candidate_decoded_in_batch() {
        let reference = solid(3, 3, WHITE);
        let png = solid(3, 3, WHITE).to_png().unwrap();
        let outcome = compare_all(&reference, vec![Payload::new("same.png", png).into()], Threshold(1));
        assert_eq!(outcome.results.records().next().unwrap().percentage, 0.0);
    }

    #[test]
    fn test_cancel_after_two_of_five() {
        let comparator = BatchComparator::new(Execution::Sequential);
        let token = comparator.cancel_token();
        let invocations = AtomicUsize::new(0);

        let observer = |_item: &BatchItem, done: usize, _total: usize| {
            invocations.fetch_add(1, Ordering::SeqCst);
            if done == 2 {
                token.cancel();
            }
        };

        let reference = solid(10, 1, WHITE);
        let outcome =
            comparator.compare_all_observed(&reference, stepped_candidates(5), Threshold(10), &observer);

        assert_eq!(outcome.status, BatchStatus::Cancelled);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
        assert_eq!(comparator.state(), BatchState::Cancelled);
        assert_eq!(outcome.results.items()[1].candidate(), "c1.png");
    }

    #[test]
    fn test_reset_allows_new_run() {
        let comparator = BatchComparator::new(Execution::Sequential);
        let token = comparator.cancel_token();
        token.cancel();

        let reference = solid(10, 1, WHITE);
        let outcome = comparator.compare_all(&reference, stepped_candidates(3), Threshold(10));
        assert_eq!(outcome.status, BatchStatus::Cancelled);
        assert!(outcome.results.is_empty());

        comparator.reset();
        assert_eq!(comparator.state(), BatchState::Idle);
        assert!(!token.is_cancelled());

        let outcome = comparator.compare_all(&reference, stepped_candidates(3), Threshold(10));
        assert_eq!(outcome.status, BatchStatus::Completed);
        assert_eq!(outcome.results.len(), 3);
    }

    #[test]
    fn test_parallel_cancel_before_start() {
        let comparator = BatchComparator::new(Execution::Parallel);
        comparator.cancel_token().cancel();
        let outcome = comparator.compare_all(&solid(1, 1, WHITE), stepped_candidates(4), Threshold(10));
        assert_eq!(outcome.status, BatchStatus::Cancelled);
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn test_parallel_cancel_keeps_prefix() {
        let comparator = BatchComparator::new(Execution::Parallel);
        let token = comparator.cancel_token();
        let observer = move |_item: &BatchItem, done: usize, _total: usize| {
            if done == 3 {
                token.cancel();
            }
        };
        let outcome = comparator.compare_all_observed(
            &solid(10, 1, WHITE),
            stepped_candidates(40),
            Threshold(10),
            &observer,
        );

        assert_eq!(outcome.status, BatchStatus::Cancelled);
        assert!(outcome.results.len() < 40);
        for (i, item) in outcome.results.items().iter().enumerate() {
            assert_eq!(item.index(), i);
        }
    }

    #[test]
    fn test_parallel_cancel_progress_covers_prefix() {
        let comparator = BatchComparator::new(Execution::Parallel);
        let token = comparator.cancel_token();
        let last_done = AtomicUsize::new(0);
        let observer = |_item: &BatchItem, done: usize, _total: usize| {
            last_done.fetch_max(done, Ordering::SeqCst);
            if done == 5 {
                token.cancel();
            }
        };
        let outcome = comparator.compare_all_observed(
            &solid(10, 1, WHITE),
            stepped_candidates(60),
            Threshold(10),
            &observer,
        );

        // Progress reports every finished candidate; the result set keeps
        // only the contiguous prefix of them.
        assert!(last_done.load(Ordering::SeqCst) >= 5);
        assert!(outcome.results.len() <= last_done.load(Ordering::SeqCst));
    }

    #[test]
    fn test_observer_sees_every_item() {
        let seen = Mutex::new(Vec::new());
        let observer = |item: &BatchItem, _done: usize, total: usize| {
            assert_eq!(total, 6);
            seen.lock().unwrap().push(item.index());
        };
        let comparator = BatchComparator::default();
        comparator.compare_all_observed(&solid(10, 1, WHITE), stepped_candidates(6), Threshold(10), &observer);

        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_discover_candidates_names_by_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["a", "b"] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
        }
        let white = solid(2, 2, WHITE).to_png().unwrap();
        let black = solid(2, 2, BLACK).to_png().unwrap();
        std::fs::write(dir.path().join("a").join("x.png"), &white).unwrap();
        std::fs::write(dir.path().join("b").join("x.png"), &black).unwrap();

        let candidates = discover_candidates(dir.path()).unwrap();
        let mut names: Vec<String> = candidates.iter().map(|c| c.name().to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["a/x.png", "b/x.png"]);

        let outcome = BatchComparator::new(Execution::Sequential).compare_all(
            &solid(2, 2, WHITE),
            candidates,
            Threshold(10),
        );
        let by_name = |name: &str| {
            outcome.results.records().find(|r| r.candidate == name).unwrap().percentage
        };
        assert_eq!(by_name("a/x.png"), 0.0);
        assert_eq!(by_name("b/x.png"), 100.0);
    }

    #[test]
    fn test_state_starts_idle() {
        assert_eq!(BatchComparator::default().state(), BatchState::Idle);
    }

    #[test]
    fn test_empty_batch_completes() {
        let outcome = compare_all(&solid(1, 1, WHITE), Vec::new(), Threshold(10));
        assert_eq!(outcome.status, BatchStatus::Completed);
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn test_percentage_label() {
        let record = DiffRecord {
            index: 0,
            candidate: "x".to_string(),
            diff: solid(1, 1, WHITE),
            percentage: 5.0,
        };
        assert_eq!(record.percentage_label(), "5.00");
    }
}
