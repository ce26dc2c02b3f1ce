//! GSTIN validation and compliance evaluation.
//!
//! Checks GSTINs by structure (and optionally by check character), folds
//! externally supplied verification results and anomaly signals into
//! compliance flags, and drives the invoice status state machine.
//!
//! # Example
//!
//! ```
//! use gstinvoice::gst::*;
//! use gstinvoice::Classification;
//!
//! assert!(validate_gstin_format("27AAPFU0939F1ZV").is_ok());
//!
//! let outcome = evaluate_compliance(
//!     "27AAPFU0939F1ZV",
//!     "29AABCT1332L1ZA",
//!     &VerificationSignals::verified(),
//! );
//! assert_eq!(outcome.classification, Classification::Clean);
//! ```

mod evaluate;
mod format;

pub use evaluate::{
    ComplianceEvaluator, ComplianceOutcome, VerificationSignals, apply_evaluation,
    detect_anomalies, evaluate_compliance, reanalyze,
};
pub use format::{
    GSTIN_LEN, GstinFormatError, GstinParts, gstin_check_char, validate_gstin_checksum,
    validate_gstin_format,
};
