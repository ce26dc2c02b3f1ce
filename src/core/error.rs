use thiserror::Error;

use super::status::InvoiceStatus;

/// Errors that can occur while computing, building, or querying invoices.
///
/// None of these are transient: retrying with identical input fails the
/// same way.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoiceError {
    /// A line item has a non-positive quantity, a negative price, or a tax
    /// rate outside the accepted range.
    #[error("invalid line item at index {index}: {reason}")]
    InvalidLineItem { index: usize, reason: String },

    /// The requested discount has more than 2 fractional digits.
    #[error("invalid discount {0}: more than 2 fractional digits")]
    InvalidDiscount(rust_decimal::Decimal),

    /// An aggregate over many invoices left the representable range.
    #[error("arithmetic overflow in {0}")]
    Arithmetic(&'static str),

    /// An invoice must carry at least one line item.
    #[error("invoice must have at least one line item")]
    EmptyInvoice,

    /// Status filter label is not one of `all`, `paid`, `pending`, `overdue`.
    #[error("unknown status filter '{0}'")]
    UnknownFilter(String),

    /// The state machine does not allow this edge.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// No invoice is stored under this record id.
    #[error("invoice record {0} not found")]
    NotFound(u64),

    /// The caller does not own the invoice record.
    #[error("invoice record {id} does not belong to the requesting owner")]
    NotOwner { id: u64 },
}

impl InvoiceError {
    pub(crate) fn invalid_line(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidLineItem {
            index,
            reason: reason.into(),
        }
    }
}

/// A single validation finding with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the offending field (e.g. "totals.grand_total").
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// Rule identifier if applicable (e.g. "TOT-03").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error tagged with a rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
