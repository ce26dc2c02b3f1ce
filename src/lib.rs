//! # gstinvoice
//!
//! GST invoice compliance and total calculation engine: line and invoice
//! totals, GSTIN validation, compliance classification, the invoice status
//! state machine, and status-filtered listings.
//!
//! All monetary values use [`rust_decimal::Decimal`] rounded half-up to two
//! fractional digits. Floating point is never involved.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use gstinvoice::*;
//! use gstinvoice::gst::{VerificationSignals, apply_evaluation, ComplianceEvaluator};
//! use rust_decimal_macros::dec;
//!
//! let mut invoice = InvoiceBuilder::new("INV-2024-001", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .vendor("Shree Traders", "27AAPFU0939F1ZV")
//!     .billed_gstin("29AABCT1332L1ZA")
//!     .uploaded_by(OwnerId::new("alice"))
//!     .add_line(LineItemBuilder::new(3, dec!(10.00)).tax_rate(dec!(18)).build())
//!     .add_line(LineItemBuilder::new(1, dec!(50.00)).build())
//!     .discount(dec!(5.00))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(invoice.totals.to_string(), "subtotal 80.00 + tax 5.40 - discount 5.00 = 80.40");
//!
//! let status = apply_evaluation(
//!     &mut invoice,
//!     &VerificationSignals::verified(),
//!     &ComplianceEvaluator::new(),
//! )
//! .unwrap();
//! assert_eq!(status, InvoiceStatus::Cleared);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice types, totals, status state machine, config |
//! | `gst` (default) | GSTIN validation, compliance evaluation |
//! | `query` (default) | Status filters, dashboard metrics |
//! | `store` (default) | Concurrency-safe in-memory invoice store |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "gst")]
pub mod gst;

#[cfg(feature = "query")]
pub mod query;

#[cfg(feature = "store")]
pub mod store;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
