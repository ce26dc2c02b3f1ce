use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::InvoiceStatus;

/// Reference to the user who uploaded an invoice.
///
/// Invoices only point back at their owner; the owner record lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Purchase or sales invoice with GST identifiers and cached totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice number as printed on the document.
    pub number: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Vendor (supplier) name.
    pub vendor_name: String,
    /// Vendor GSTIN.
    pub vendor_gstin: String,
    /// GSTIN of the billed company.
    pub billed_gstin: String,
    /// Line items. Order does not affect totals.
    pub lines: Vec<LineItem>,
    /// Discount as entered, before capping.
    pub discount: Decimal,
    /// Totals derived from `lines` and `discount`.
    pub totals: Totals,
    /// Lifecycle status.
    pub status: InvoiceStatus,
    /// Latest GST verification outcome.
    pub gst_verification: GstVerificationStatus,
    /// Flags from the most recent compliance evaluation.
    pub flags: Vec<ComplianceFlag>,
    /// Uploading user.
    pub uploaded_by: OwnerId,
    /// Location of the source document, if any.
    pub file_path: Option<String>,
}

/// A single invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Invoiced quantity. Must be positive.
    pub quantity: i64,
    /// Price per unit, at most 2 fractional digits.
    pub unit_price: Decimal,
    /// GST rate in percent (e.g. 18 for 18%), at most 2 fractional digits.
    pub tax_rate: Decimal,
    /// Free-text description.
    pub description: Option<String>,
    /// HSN (goods) or SAC (services) classification code.
    pub hsn_sac: Option<String>,
}

/// Per-line result of the line calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    /// quantity × unit price.
    pub subtotal: Decimal,
    /// subtotal × rate / 100.
    pub tax: Decimal,
}

/// Invoice-level totals. All amounts carry exactly 2 fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line subtotals.
    pub subtotal: Decimal,
    /// Sum of line taxes.
    pub tax_total: Decimal,
    /// Requested discount, clamped at zero.
    pub discount: Decimal,
    /// Discount actually applied: `min(discount, subtotal)`.
    pub effective_discount: Decimal,
    /// `subtotal + tax_total - effective_discount`. Never negative.
    pub grand_total: Decimal,
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subtotal {} + tax {} - discount {} = {}",
            self.subtotal, self.tax_total, self.effective_discount, self.grand_total
        )
    }
}

/// Result of checking a GSTIN against the tax registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GstVerificationStatus {
    /// Registry confirmed the identifier.
    Verified,
    /// No answer yet.
    #[default]
    Pending,
    /// Registry rejected the identifier.
    Failed,
}

impl GstVerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::Pending => "PENDING",
            Self::Failed => "FAILED",
        }
    }
}

/// Irregularity detected outside the evaluator (or by the engine's own checks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    /// Same invoice number from the same vendor seen before.
    DuplicateInvoice,
    /// Grand total is implausibly large.
    SuspiciousTotal,
    /// Cached totals do not match a recomputation.
    ArithmeticMismatch,
    /// Tax rate does not match the HSN/SAC classification.
    TaxRateMismatch,
    /// Vendor name does not match the registry entry for the GSTIN.
    VendorMismatch,
}

impl AnomalyKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateInvoice => "DUPLICATE_INVOICE",
            Self::SuspiciousTotal => "SUSPICIOUS_TOTAL",
            Self::ArithmeticMismatch => "ARITHMETIC_MISMATCH",
            Self::TaxRateMismatch => "TAX_RATE_MISMATCH",
            Self::VendorMismatch => "VENDOR_MISMATCH",
        }
    }

    /// Default severity assigned to a flag raised for this anomaly.
    pub fn severity(&self) -> Severity {
        match self {
            Self::DuplicateInvoice | Self::ArithmeticMismatch => Severity::High,
            Self::SuspiciousTotal | Self::VendorMismatch => Severity::Medium,
            Self::TaxRateMismatch => Severity::Low,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::DuplicateInvoice => "invoice number already recorded for this vendor",
            Self::SuspiciousTotal => "grand total exceeds the plausibility threshold",
            Self::ArithmeticMismatch => "stored totals disagree with line items",
            Self::TaxRateMismatch => "tax rate does not match the HSN/SAC classification",
            Self::VendorMismatch => "vendor name does not match the GST registry",
        }
    }
}

/// Kind of a recorded compliance flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagKind {
    /// A GSTIN failed the structural check.
    FormatError,
    /// The registry rejected a GSTIN.
    VerificationFailed,
    /// An anomaly signal.
    Anomaly(AnomalyKind),
}

impl FlagKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::FormatError => "FORMAT_ERROR",
            Self::VerificationFailed => "GST_VERIFICATION_FAILED",
            Self::Anomaly(kind) => kind.code(),
        }
    }
}

/// Flag severity, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// One detected anomaly or verification outcome attached to an invoice.
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceFlag {
    pub kind: FlagKind,
    pub severity: Severity,
    pub description: String,
}

impl ComplianceFlag {
    pub fn new(kind: FlagKind, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            description: description.into(),
        }
    }

    /// Flag raised for an anomaly signal, using its default severity and text.
    pub fn for_anomaly(kind: AnomalyKind) -> Self {
        Self::new(FlagKind::Anomaly(kind), kind.severity(), kind.description())
    }
}

impl fmt::Display for ComplianceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            self.kind.code(),
            self.severity.as_str(),
            self.description
        )
    }
}

/// Outcome class of a compliance evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Verified and no anomalies.
    Clean,
    /// At least one flag was raised.
    HasAnomalies,
    /// Verification has not completed.
    Pending,
}
