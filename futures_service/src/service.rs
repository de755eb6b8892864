//! Quote service: fetch, decode, sort and publish the futures snapshot.
//!
//! The service owns the authoritative `Snapshot` and is the only writer of it.
//! One call to [`QuoteService::fetch`] runs a full cycle:
//!
//! 1. deduplicate the requested codes (an empty list short-circuits, no request);
//! 2. request the whole batch from the `QuoteSource`;
//! 3. if the body carries the batch failure marker, a single code becomes an error
//!    row, a larger batch is retried one code at a time (up to `max_fanout` codes);
//! 4. align the decoded records 1:1 with the requested codes and sort them;
//! 5. diff against the previous snapshot for alerts, publish, then broadcast a
//!    `ListUpdate` to every subscriber.
//!
//! Failures never leave the service. A transport failure (or a malformed body) keeps
//! the previous snapshot, logs, and notifies the user only the first time.
//!
//! Subscribers register with [`QuoteService::subscribe`] and receive updates over a
//! `crossbeam_channel`; a subscriber whose receiver was dropped is removed on the next
//! publish.
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use crossbeam_channel::{Receiver, Sender, unbounded};
use futures_common::codes::dedup_codes;
use futures_common::protocol::{Decoded, DecodedBatch, decode_response};
use futures_common::settings::DEFAULT_MAX_FANOUT;
use futures_common::sort::sort_records;
use futures_common::{FeedError, QuoteRecord, Result, SortMode};
use log::{debug, error, info, warn};

use crate::notify::{Notifier, diff_snapshots};
use crate::transport::QuoteSource;

/// Published list plus its per-category counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Arc<Vec<QuoteRecord>>,
    supported_count: usize,
    unsupported_count: usize,
}

impl Snapshot {
    pub(crate) fn from_batch(batch: DecodedBatch) -> Self {
        Snapshot {
            records: Arc::new(batch.records),
            supported_count: batch.supported_count,
            unsupported_count: batch.unsupported_count,
        }
    }

    /// Records in published order.
    pub fn records(&self) -> &[QuoteRecord] {
        &self.records
    }

    /// Number of records with full contract data.
    pub fn supported_count(&self) -> usize {
        self.supported_count
    }

    /// Number of placeholder records for unsupported codes.
    pub fn unsupported_count(&self) -> usize {
        self.unsupported_count
    }

    /// Whether nothing has been published yet (or the last list was empty).
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look a record up by code.
    pub fn find(&self, code: &str) -> Option<&QuoteRecord> {
        self.records.iter().find(|r| r.code == code)
    }
}

/// Event broadcast after every publish.
#[derive(Debug, Clone)]
pub struct ListUpdate {
    /// Snapshot that was just published.
    pub new: Snapshot,
    /// Snapshot it replaced.
    pub old: Snapshot,
}

/// Result of one fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No codes configured; nothing was requested.
    NoCodes,
    /// A new snapshot was published.
    Published(Snapshot),
    /// The cycle failed; the previous snapshot is still current.
    Failed,
}

impl FetchOutcome {
    /// Records of the published snapshot, empty for `NoCodes` and `Failed`.
    pub fn records(&self) -> &[QuoteRecord] {
        match self {
            FetchOutcome::Published(snapshot) => snapshot.records(),
            FetchOutcome::NoCodes | FetchOutcome::Failed => &[],
        }
    }
}

/// Owner of the futures snapshot.
pub struct QuoteService {
    source: Box<dyn QuoteSource>,
    notifier: Box<dyn Notifier>,
    snapshot: Snapshot,
    subscribers: Vec<Sender<ListUpdate>>,
    /// Cleared after the first transport failure has been shown to the user.
    show_error_info: bool,
    /// Codes already reported as invalid.
    reported_invalid: HashSet<String>,
    max_fanout: usize,
}

impl QuoteService {
    /// Create a service with an empty snapshot.
    pub fn new(source: Box<dyn QuoteSource>, notifier: Box<dyn Notifier>) -> Self {
        QuoteService {
            source,
            notifier,
            snapshot: Snapshot::default(),
            subscribers: Vec::new(),
            show_error_info: true,
            reported_invalid: HashSet::new(),
            max_fanout: DEFAULT_MAX_FANOUT,
        }
    }

    /// Cap the number of single-code retries after a batch failure.
    pub fn with_max_fanout(mut self, max_fanout: usize) -> Self {
        self.max_fanout = max_fanout;
        self
    }

    /// Register an observer for `ListUpdate` events.
    pub fn subscribe(&mut self) -> Receiver<ListUpdate> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Currently published snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Run one fetch cycle for `codes`, ordered by `order`.
    pub fn fetch(&mut self, codes: &[String], order: SortMode) -> FetchOutcome {
        let codes = dedup_codes(codes);
        if codes.is_empty() {
            debug!("No futures configured, skipping fetch");
            return FetchOutcome::NoCodes;
        }

        match self.fetch_batch(&codes) {
            Ok(batch) => {
                let mut batch = align_to_request(batch, &codes);
                batch.records = sort_records(batch.records, order);
                let snapshot = Snapshot::from_batch(batch);
                self.publish(snapshot.clone());
                FetchOutcome::Published(snapshot)
            }
            Err(err) => {
                self.report_transport_failure(&codes, &err);
                FetchOutcome::Failed
            }
        }
    }

    fn fetch_batch(&mut self, codes: &[String]) -> Result<DecodedBatch> {
        let body = self.source.fetch_raw(codes)?;
        match decode_response(&body)? {
            Decoded::Batch(batch) => Ok(batch),
            Decoded::BatchFailed if codes.len() == 1 => {
                let mut batch = DecodedBatch::default();
                batch.push(self.invalid_code(&codes[0]));
                Ok(batch)
            }
            Decoded::BatchFailed => self.fan_out(codes),
        }
    }

    /// Retry a failed batch one code at a time to isolate the rejected codes.
    fn fan_out(&mut self, codes: &[String]) -> Result<DecodedBatch> {
        warn!(
            "Batch of {} codes was rejected, retrying them one by one",
            codes.len()
        );
        let mut merged = DecodedBatch::default();
        for (idx, code) in codes.iter().enumerate() {
            if idx >= self.max_fanout {
                debug!("Fan-out cap reached, skipping {}", code);
                merged.push(QuoteRecord::skipped(code));
                continue;
            }
            let single = std::slice::from_ref(code);
            let body = self.source.fetch_raw(single)?;
            match decode_response(&body)? {
                Decoded::Batch(batch) => merged.extend(batch),
                Decoded::BatchFailed => merged.push(self.invalid_code(code)),
            }
        }
        Ok(merged)
    }

    fn invalid_code(&mut self, code: &str) -> QuoteRecord {
        warn!("Quote source rejected code {}", code);
        if self.reported_invalid.insert(code.to_string()) {
            self.notifier.show_error(&format!(
                "fail: error Future code in {}, please delete error Future code",
                code
            ));
        }
        QuoteRecord::invalid(code)
    }

    fn publish(&mut self, snapshot: Snapshot) {
        let changes = diff_snapshots(self.snapshot.records(), snapshot.records());
        if !changes.is_empty() {
            self.notifier.remind(&changes);
        }

        let old = std::mem::replace(&mut self.snapshot, snapshot);
        info!(
            "Published {} futures ({} supported, {} without data)",
            self.snapshot.records().len(),
            self.snapshot.supported_count(),
            self.snapshot.unsupported_count()
        );

        let update = ListUpdate {
            new: self.snapshot.clone(),
            old,
        };
        self.subscribers
            .retain(|tx| tx.send(update.clone()).is_ok());
    }

    fn report_transport_failure(&mut self, codes: &[String], err: &FeedError) {
        let url = self.source.locator(codes);
        error!("Future fetch failed for {}: {}", url, err);
        if self.show_error_info {
            self.show_error_info = false;
            self.notifier
                .show_error(&format!("fail: Future error {}", url));
            self.notifier.telemetry(
                "error: futureService",
                &[
                    ("url", url),
                    ("error", err.to_string()),
                    ("at", Utc::now().to_rfc3339()),
                ],
            );
        }
    }
}

/// Reorder `batch` to the requested codes, one record per code.
///
/// Codes the response did not mention become unsupported placeholders; statements
/// for codes that were not requested are dropped.
fn align_to_request(batch: DecodedBatch, codes: &[String]) -> DecodedBatch {
    let mut by_code: HashMap<String, QuoteRecord> = HashMap::new();
    for record in batch.records {
        by_code.entry(record.code.clone()).or_insert(record);
    }

    let mut aligned = DecodedBatch::default();
    for code in codes {
        let record = by_code.remove(code).unwrap_or_else(|| {
            debug!("No statement for {}, marking as unsupported", code);
            QuoteRecord::unsupported(code)
        });
        aligned.push(record);
    }
    if !by_code.is_empty() {
        debug!("Dropped {} statements for codes that were not requested", by_code.len());
    }
    aligned
}
