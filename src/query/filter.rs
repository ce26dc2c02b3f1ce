//! Status filter labels used by listing views.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Invoice, InvoiceError, InvoiceStatus, OwnerId, UnknownFilterPolicy};

/// External filter label, mapped onto invoice statuses.
///
/// | label     | statuses                                  |
/// |-----------|-------------------------------------------|
/// | `all`     | PENDING_ANALYSIS, CLEARED, HAS_ANOMALIES |
/// | `paid`    | CLEARED                                   |
/// | `pending` | PENDING_ANALYSIS                          |
/// | `overdue` | HAS_ANOMALIES                             |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Paid,
    Pending,
    Overdue,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Paid,
        StatusFilter::Pending,
        StatusFilter::Overdue,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Paid => "paid",
            Self::Pending => "pending",
            Self::Overdue => "overdue",
        }
    }

    /// Statuses selected by this filter.
    pub fn statuses(&self) -> &'static [InvoiceStatus] {
        match self {
            Self::All => &InvoiceStatus::ALL,
            Self::Paid => &[InvoiceStatus::Cleared],
            Self::Pending => &[InvoiceStatus::PendingAnalysis],
            Self::Overdue => &[InvoiceStatus::HasAnomalies],
        }
    }

    pub fn matches(&self, status: InvoiceStatus) -> bool {
        self.statuses().contains(&status)
    }

    /// Look up a label. Trimmed and case-insensitive; empty means `all`.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Some(Self::All);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(label))
    }

    /// Look up a label, handling unknown labels according to `policy`.
    pub fn parse_with(label: &str, policy: UnknownFilterPolicy) -> Result<Self, InvoiceError> {
        match (Self::from_label(label), policy) {
            (Some(filter), _) => Ok(filter),
            (None, UnknownFilterPolicy::FallbackToAll) => {
                tracing::warn!(label, "unknown status filter, falling back to all");
                Ok(Self::All)
            }
            (None, UnknownFilterPolicy::Reject) => Err(InvoiceError::UnknownFilter(label.into())),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusFilter {
    type Err = InvoiceError;

    /// Strict parse: unknown labels are an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with(s, UnknownFilterPolicy::Reject)
    }
}

/// Invoices selected by a filter, newest first.
#[derive(Debug, Clone)]
pub struct FilteredInvoices<'a> {
    /// The filter that was applied (after any fallback).
    pub filter: StatusFilter,
    pub invoices: Vec<&'a Invoice>,
    pub count: usize,
}

/// Listing order: issue date descending, ties by invoice number ascending.
pub fn listing_order(a: &Invoice, b: &Invoice) -> Ordering {
    b.issue_date
        .cmp(&a.issue_date)
        .then_with(|| a.number.cmp(&b.number))
}

/// Select the owner's invoices matching `filter`, in [`listing_order`].
pub fn select_invoices<'a, I>(owner: &OwnerId, filter: StatusFilter, invoices: I) -> FilteredInvoices<'a>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    let mut selected: Vec<&Invoice> = invoices
        .into_iter()
        .filter(|inv| inv.uploaded_by == *owner && filter.matches(inv.status))
        .collect();
    selected.sort_by(|a, b| listing_order(a, b));

    FilteredInvoices {
        filter,
        count: selected.len(),
        invoices: selected,
    }
}

/// Parse `label` and select the owner's matching invoices.
///
/// Unknown labels always fall back to `all`, so this never returns `Err`.
/// Use [`filter_invoices_with`] to honour
/// [`EngineConfig::unknown_filter`](crate::core::EngineConfig).
pub fn filter_invoices<'a, I>(
    owner: &OwnerId,
    label: &str,
    invoices: I,
) -> Result<FilteredInvoices<'a>, InvoiceError>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    filter_invoices_with(owner, label, UnknownFilterPolicy::FallbackToAll, invoices)
}

/// Like [`filter_invoices`], handling unknown labels according to `policy`.
pub fn filter_invoices_with<'a, I>(
    owner: &OwnerId,
    label: &str,
    policy: UnknownFilterPolicy,
    invoices: I,
) -> Result<FilteredInvoices<'a>, InvoiceError>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    let filter = StatusFilter::parse_with(label, policy)?;
    Ok(select_invoices(owner, filter, invoices))
}
