#![cfg(feature = "gst")]

use chrono::NaiveDate;
use gstinvoice::core::*;
use gstinvoice::gst::*;
use rust_decimal_macros::dec;

const VENDOR: &str = "27AAPFU0939F1ZV";
const BILLED: &str = "29AABCT1332L1ZA";

fn invoice(vendor_gstin: &str) -> Invoice {
    InvoiceBuilder::new("INV-1", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        .vendor("Shree Traders", vendor_gstin)
        .billed_gstin(BILLED)
        .uploaded_by(OwnerId::new("alice"))
        .add_line(LineItemBuilder::new(3, dec!(10.00)).tax_rate(dec!(18)).build())
        .add_line(LineItemBuilder::new(1, dec!(50.00)).build())
        .discount(dec!(5.00))
        .build()
        .unwrap()
}

// --- GSTIN format ---

#[test]
fn known_good_gstins() {
    for gstin in [VENDOR, BILLED, "29AAGCB7383J1Z4", "07AAACI1681G1ZN"] {
        assert!(validate_gstin_format(gstin).is_ok(), "{gstin}");
    }
}

#[test]
fn gstin_error_message() {
    let err = validate_gstin_format("27AAPFU0939").unwrap_err();
    assert_eq!(err.value, "27AAPFU0939");
    assert_eq!(
        err.to_string(),
        "invalid GSTIN '27AAPFU0939': expected 15 characters, got 11"
    );
}

#[test]
fn checksum_matches_known_registrations() {
    assert!(validate_gstin_checksum(VENDOR).is_ok());
    assert!(validate_gstin_checksum(BILLED).is_ok());
    assert!(validate_gstin_checksum("29AAGCB7383J1Z4").is_ok());
    assert!(validate_gstin_checksum("29AAGCB7383J1Z5").is_err());
}

// --- Evaluation precedence ---

#[test]
fn invalid_length_vendor_always_format_error() {
    for status in [
        GstVerificationStatus::Verified,
        GstVerificationStatus::Pending,
        GstVerificationStatus::Failed,
    ] {
        let outcome = evaluate_compliance("27AAPFU09", BILLED, &VerificationSignals::new(status));
        assert_eq!(outcome.classification, Classification::HasAnomalies);
        assert!(outcome.flags.iter().all(|f| f.kind == FlagKind::FormatError));
        assert_eq!(outcome.flags.len(), 1);
    }
}

#[test]
fn malformed_billed_gstin_is_caught() {
    let outcome = evaluate_compliance(VENDOR, "29-AABCT1332L1ZA", &VerificationSignals::verified());
    assert_eq!(outcome.classification, Classification::HasAnomalies);
    assert!(outcome.flags[0].description.starts_with("billed GSTIN"));
}

#[test]
fn failure_flag_is_critical() {
    let outcome = evaluate_compliance(VENDOR, BILLED, &VerificationSignals::failed());
    assert_eq!(outcome.flags[0].severity, Severity::Critical);
    assert_eq!(outcome.flags[0].kind.code(), "GST_VERIFICATION_FAILED");
}

#[test]
fn anomaly_flags_carry_default_severity() {
    let signals = VerificationSignals::verified().with_anomalies([
        AnomalyKind::TaxRateMismatch,
        AnomalyKind::ArithmeticMismatch,
    ]);
    let outcome = evaluate_compliance(VENDOR, BILLED, &signals);
    assert_eq!(outcome.flags.len(), 2);
    for flag in &outcome.flags {
        let FlagKind::Anomaly(kind) = flag.kind else {
            panic!("unexpected flag {flag}");
        };
        assert_eq!(flag.severity, kind.severity());
    }
}

#[test]
fn flag_display() {
    let flag = ComplianceFlag::for_anomaly(AnomalyKind::DuplicateInvoice);
    assert_eq!(
        flag.to_string(),
        "DUPLICATE_INVOICE [HIGH]: invoice number already recorded for this vendor"
    );
}

#[test]
fn config_enables_checksum() {
    let config = EngineConfig::default().with_gstin_checksum(true);
    let evaluator = ComplianceEvaluator::from_config(&config);
    let outcome = evaluator.evaluate("29AAGCB7383J1Z5", BILLED, &VerificationSignals::verified());
    assert_eq!(outcome.classification, Classification::HasAnomalies);
    assert_eq!(outcome.flags[0].kind, FlagKind::FormatError);
}

// --- Applying evaluations to invoices ---

#[test]
fn clean_invoice_is_cleared() {
    let mut inv = invoice(VENDOR);
    let status = apply_evaluation(
        &mut inv,
        &VerificationSignals::verified(),
        &ComplianceEvaluator::new(),
    )
    .unwrap();
    assert_eq!(status, InvoiceStatus::Cleared);
    assert_eq!(inv.status, InvoiceStatus::Cleared);
    assert_eq!(inv.gst_verification, GstVerificationStatus::Verified);
    assert!(inv.flags.is_empty());
}

#[test]
fn pending_verification_keeps_pending_status() {
    let mut inv = invoice(VENDOR);
    let status = apply_evaluation(
        &mut inv,
        &VerificationSignals::pending(),
        &ComplianceEvaluator::new(),
    )
    .unwrap();
    assert_eq!(status, InvoiceStatus::PendingAnalysis);

    // evaluation can be retried once verification completes
    let status = apply_evaluation(
        &mut inv,
        &VerificationSignals::verified(),
        &ComplianceEvaluator::new(),
    )
    .unwrap();
    assert_eq!(status, InvoiceStatus::Cleared);
}

#[test]
fn malformed_vendor_gstin_lands_in_has_anomalies() {
    let mut inv = invoice("27AAPFU0939F1Z");
    let status = apply_evaluation(
        &mut inv,
        &VerificationSignals::verified(),
        &ComplianceEvaluator::new(),
    )
    .unwrap();
    assert_eq!(status, InvoiceStatus::HasAnomalies);
    assert_eq!(inv.flags.len(), 1);
    assert_eq!(inv.flags[0].kind.code(), "FORMAT_ERROR");
}

#[test]
fn terminal_invoice_is_left_alone() {
    let mut inv = invoice(VENDOR);
    let evaluator = ComplianceEvaluator::new();
    apply_evaluation(&mut inv, &VerificationSignals::verified(), &evaluator).unwrap();

    let err = apply_evaluation(&mut inv, &VerificationSignals::failed(), &evaluator).unwrap_err();
    assert!(matches!(
        err,
        InvoiceError::InvalidTransition {
            from: InvoiceStatus::Cleared,
            to: InvoiceStatus::HasAnomalies,
        }
    ));
    assert_eq!(inv.status, InvoiceStatus::Cleared);
    assert!(inv.flags.is_empty());
    assert_eq!(inv.gst_verification, GstVerificationStatus::Verified);
}

#[test]
fn reanalysis_replaces_flags() {
    let mut inv = invoice(VENDOR);
    let evaluator = ComplianceEvaluator::new();
    let signals = VerificationSignals::failed().with_anomaly(AnomalyKind::VendorMismatch);
    apply_evaluation(&mut inv, &signals, &evaluator).unwrap();
    assert_eq!(inv.flags.len(), 2);

    // same signals again: regenerated, not appended
    reanalyze(&mut inv, &signals, &evaluator).unwrap();
    assert_eq!(inv.flags.len(), 2);

    let status = reanalyze(&mut inv, &VerificationSignals::verified(), &evaluator).unwrap();
    assert_eq!(status, InvoiceStatus::Cleared);
    assert!(inv.flags.is_empty());
}

#[test]
fn cleared_implies_verified_and_no_flags() {
    let evaluator = ComplianceEvaluator::new();
    let signal_sets = [
        VerificationSignals::verified(),
        VerificationSignals::pending(),
        VerificationSignals::failed(),
        VerificationSignals::verified().with_anomaly(AnomalyKind::SuspiciousTotal),
    ];
    for signals in &signal_sets {
        for gstin in [VENDOR, "bogus"] {
            let mut inv = invoice(gstin);
            let status = apply_evaluation(&mut inv, signals, &evaluator).unwrap();
            match status {
                InvoiceStatus::Cleared => {
                    assert!(inv.flags.is_empty());
                    assert_eq!(inv.gst_verification, GstVerificationStatus::Verified);
                }
                InvoiceStatus::HasAnomalies => {
                    assert!(
                        !inv.flags.is_empty()
                            || inv.gst_verification == GstVerificationStatus::Failed
                    );
                }
                InvoiceStatus::PendingAnalysis => assert!(inv.flags.is_empty()),
            }
        }
    }
}

// --- Engine-side anomaly detection ---

#[test]
fn tampered_totals_raise_arithmetic_mismatch() {
    let mut inv = invoice(VENDOR);
    assert!(detect_anomalies(&inv, &EngineConfig::default()).is_empty());

    inv.totals.grand_total = dec!(1.00);
    let found = detect_anomalies(&inv, &EngineConfig::default());
    assert!(found.contains(&AnomalyKind::ArithmeticMismatch));
}

#[test]
fn threshold_raises_suspicious_total() {
    let inv = invoice(VENDOR);
    let config = EngineConfig::default().with_suspicious_total_threshold(dec!(80.00));
    let found = detect_anomalies(&inv, &config);
    assert_eq!(found.into_iter().collect::<Vec<_>>(), [AnomalyKind::SuspiciousTotal]);

    let config = EngineConfig::default().with_suspicious_total_threshold(dec!(80.40));
    assert!(detect_anomalies(&inv, &config).is_empty());
}
