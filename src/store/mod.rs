//! In-memory invoice repository.
//!
//! Each invoice sits behind its own mutex inside a map guarded by a
//! read-write lock. Consequences:
//!
//! - an update of totals, flags and status on one invoice is applied while
//!   holding that invoice's mutex, so readers see the whole old record or the
//!   whole new one;
//! - evaluations of the same invoice run one at a time, while different
//!   invoices are evaluated in parallel;
//! - deleting an invoice drops its line items and flags with it, since the
//!   invoice owns them.
//!
//! Lock order: the map lock is always released before a record mutex is
//! taken.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{
    AnomalyKind, EngineConfig, Invoice, InvoiceError, InvoiceStatus, LineItem, OwnerId, Totals,
};
use crate::gst::{self, ComplianceEvaluator, VerificationSignals, detect_anomalies};
use crate::query::{DashboardMetrics, StatusFilter, dashboard_metrics, listing_order};

/// Store-assigned key of an invoice record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owned result of [`InvoiceStore::list`].
#[derive(Debug, Clone)]
pub struct InvoiceListing {
    pub filter: StatusFilter,
    pub invoices: Vec<(RecordId, Invoice)>,
    pub count: usize,
}

struct Entry {
    // Identity fields are copied out so duplicate checks never lock a record.
    owner: OwnerId,
    number: String,
    vendor_gstin: String,
    invoice: Mutex<Invoice>,
}

type Evaluation =
    fn(&mut Invoice, &VerificationSignals, &ComplianceEvaluator) -> Result<InvoiceStatus, InvoiceError>;

/// Concurrency-safe invoice repository.
pub struct InvoiceStore {
    config: EngineConfig,
    evaluator: ComplianceEvaluator,
    next_id: AtomicU64,
    records: RwLock<HashMap<RecordId, Arc<Entry>>>,
}

impl Default for InvoiceStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl InvoiceStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            evaluator: ComplianceEvaluator::from_config(&config),
            config,
            next_id: AtomicU64::new(1),
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Store an invoice as given and return its key.
    pub fn insert(&self, invoice: Invoice) -> RecordId {
        let id = RecordId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::info!(
            record = %id,
            invoice = %invoice.number,
            owner = %invoice.uploaded_by,
            status = %invoice.status,
            "invoice stored"
        );

        let entry = Entry {
            owner: invoice.uploaded_by.clone(),
            number: invoice.number.clone(),
            vendor_gstin: invoice.vendor_gstin.clone(),
            invoice: Mutex::new(invoice),
        };
        self.records.write().insert(id, Arc::new(entry));
        id
    }

    fn entry(&self, id: RecordId) -> Result<Arc<Entry>, InvoiceError> {
        self.records
            .read()
            .get(&id)
            .cloned()
            .ok_or(InvoiceError::NotFound(id.0))
    }

    fn owned_entry(&self, id: RecordId, owner: &OwnerId) -> Result<Arc<Entry>, InvoiceError> {
        let entry = self.entry(id)?;
        if entry.owner != *owner {
            return Err(InvoiceError::NotOwner { id: id.0 });
        }
        Ok(entry)
    }

    /// Snapshot of one invoice.
    pub fn get(&self, id: RecordId) -> Option<Invoice> {
        self.entry(id).ok().map(|e| e.invoice.lock().clone())
    }

    /// Replace line items and discount; totals are recomputed and the
    /// invoice returns to `PENDING_ANALYSIS` with its flags cleared.
    pub fn update_lines(
        &self,
        id: RecordId,
        owner: &OwnerId,
        lines: Vec<LineItem>,
        discount: Decimal,
    ) -> Result<Totals, InvoiceError> {
        let entry = self.owned_entry(id, owner)?;
        let mut invoice = entry.invoice.lock();
        let totals = *invoice.replace_lines(lines, discount)?;
        tracing::info!(
            record = %id,
            grand_total = %totals.grand_total,
            "invoice lines replaced"
        );
        Ok(totals)
    }

    /// Evaluate a `PENDING_ANALYSIS` invoice.
    ///
    /// External signals are merged with the engine's own anomaly checks and
    /// with duplicate detection across the owner's invoices.
    pub fn analyze(
        &self,
        id: RecordId,
        signals: &VerificationSignals,
    ) -> Result<InvoiceStatus, InvoiceError> {
        self.run_evaluation(id, signals, gst::apply_evaluation)
    }

    /// Re-analysis request: reset to `PENDING_ANALYSIS` and evaluate again,
    /// as one update.
    pub fn reanalyze(
        &self,
        id: RecordId,
        signals: &VerificationSignals,
    ) -> Result<InvoiceStatus, InvoiceError> {
        self.run_evaluation(id, signals, gst::reanalyze)
    }

    fn run_evaluation(
        &self,
        id: RecordId,
        signals: &VerificationSignals,
        evaluation: Evaluation,
    ) -> Result<InvoiceStatus, InvoiceError> {
        let entry = self.entry(id)?;
        let duplicate = self.has_duplicate(id, &entry);

        let mut invoice = entry.invoice.lock();
        let mut merged = signals.clone();
        merged
            .anomalies
            .extend(detect_anomalies(&invoice, &self.config));
        if duplicate {
            merged.anomalies.insert(AnomalyKind::DuplicateInvoice);
        }

        let status = evaluation(&mut invoice, &merged, &self.evaluator)?;
        tracing::info!(
            record = %id,
            status = %status,
            flags = invoice.flags.len(),
            "invoice analyzed"
        );
        Ok(status)
    }

    fn has_duplicate(&self, id: RecordId, entry: &Entry) -> bool {
        self.records.read().iter().any(|(other_id, other)| {
            *other_id != id
                && other.owner == entry.owner
                && other.number == entry.number
                && other.vendor_gstin == entry.vendor_gstin
        })
    }

    /// Delete an invoice together with its line items and flags.
    ///
    /// Waits for an in-flight evaluation of the same invoice to finish and
    /// returns the final record.
    pub fn delete(&self, id: RecordId, owner: &OwnerId) -> Result<Invoice, InvoiceError> {
        let entry = {
            let mut records = self.records.write();
            match records.get(&id) {
                None => return Err(InvoiceError::NotFound(id.0)),
                Some(e) if e.owner != *owner => return Err(InvoiceError::NotOwner { id: id.0 }),
                Some(_) => {}
            }
            records.remove(&id).ok_or(InvoiceError::NotFound(id.0))?
        };

        let removed = entry.invoice.lock().clone();
        tracing::info!(
            record = %id,
            lines = removed.lines.len(),
            flags = removed.flags.len(),
            "invoice deleted"
        );
        Ok(removed)
    }

    fn snapshot(&self, owner: &OwnerId) -> Vec<(RecordId, Invoice)> {
        let entries: Vec<(RecordId, Arc<Entry>)> = self
            .records
            .read()
            .iter()
            .filter(|(_, e)| e.owner == *owner)
            .map(|(id, e)| (*id, Arc::clone(e)))
            .collect();

        entries
            .into_iter()
            .map(|(id, e)| (id, e.invoice.lock().clone()))
            .collect()
    }

    /// The owner's invoices matching a filter label, newest first.
    ///
    /// Unknown labels follow the configured `UnknownFilterPolicy`.
    pub fn list(&self, owner: &OwnerId, label: &str) -> Result<InvoiceListing, InvoiceError> {
        let filter = StatusFilter::parse_with(label, self.config.unknown_filter)?;

        let mut invoices = self.snapshot(owner);
        invoices.retain(|(_, inv)| filter.matches(inv.status));
        invoices.sort_by(|(_, a), (_, b)| listing_order(a, b));

        Ok(InvoiceListing {
            filter,
            count: invoices.len(),
            invoices,
        })
    }

    /// Dashboard figures for the owner as of `today`.
    pub fn metrics(&self, owner: &OwnerId, today: NaiveDate) -> Result<DashboardMetrics, InvoiceError> {
        let snapshot = self.snapshot(owner);
        dashboard_metrics(
            owner,
            snapshot.iter().map(|(_, inv)| inv),
            today,
            self.config.chart_months,
        )
    }
}
