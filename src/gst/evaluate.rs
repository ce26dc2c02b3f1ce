//! Compliance classification of an invoice.
//!
//! Rules are tried in a fixed order and the first one that matches decides
//! the outcome:
//!
//! 1. malformed GSTIN → `FORMAT_ERROR` flag(s), `HAS_ANOMALIES`
//! 2. verification failed or anomaly signals present → one flag per signal,
//!    `HAS_ANOMALIES`
//! 3. verification pending → `PENDING`, no flags
//! 4. otherwise → `CLEAN`, no flags

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::format::{validate_gstin_checksum, validate_gstin_format};
use crate::core::{
    AnomalyKind, Classification, ComplianceFlag, EngineConfig, FlagKind, GstVerificationStatus,
    Invoice, InvoiceError, InvoiceStatus, Severity, request_reanalysis, transition_status,
    validate_totals,
};

/// Externally supplied verification result plus anomaly signals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerificationSignals {
    pub status: GstVerificationStatus,
    pub anomalies: BTreeSet<AnomalyKind>,
}

impl VerificationSignals {
    pub fn new(status: GstVerificationStatus) -> Self {
        Self {
            status,
            anomalies: BTreeSet::new(),
        }
    }

    pub fn verified() -> Self {
        Self::new(GstVerificationStatus::Verified)
    }

    pub fn pending() -> Self {
        Self::new(GstVerificationStatus::Pending)
    }

    pub fn failed() -> Self {
        Self::new(GstVerificationStatus::Failed)
    }

    pub fn with_anomaly(mut self, kind: AnomalyKind) -> Self {
        self.anomalies.insert(kind);
        self
    }

    pub fn with_anomalies(mut self, kinds: impl IntoIterator<Item = AnomalyKind>) -> Self {
        self.anomalies.extend(kinds);
        self
    }
}

/// Flags and classification produced by one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceOutcome {
    pub flags: Vec<ComplianceFlag>,
    pub classification: Classification,
}

impl ComplianceOutcome {
    fn clean() -> Self {
        Self {
            flags: Vec::new(),
            classification: Classification::Clean,
        }
    }
}

struct EvaluationInput<'a> {
    vendor_gstin: &'a str,
    billed_gstin: &'a str,
    signals: &'a VerificationSignals,
    verify_checksum: bool,
}

type Rule = fn(&EvaluationInput<'_>) -> Option<ComplianceOutcome>;

const RULES: &[(&str, Rule)] = &[
    ("gstin_format", format_rule),
    ("verification_failure", failure_rule),
    ("verification_pending", pending_rule),
    ("clean", clean_rule),
];

fn format_rule(input: &EvaluationInput<'_>) -> Option<ComplianceOutcome> {
    let flags: Vec<ComplianceFlag> = [
        ("vendor GSTIN", input.vendor_gstin),
        ("billed GSTIN", input.billed_gstin),
    ]
    .into_iter()
    .filter_map(|(label, gstin)| {
        let checked = if input.verify_checksum {
            validate_gstin_checksum(gstin)
        } else {
            validate_gstin_format(gstin)
        };
        checked.err().map(|e| {
            ComplianceFlag::new(FlagKind::FormatError, Severity::High, format!("{label}: {e}"))
        })
    })
    .collect();

    if flags.is_empty() {
        None
    } else {
        Some(ComplianceOutcome {
            flags,
            classification: Classification::HasAnomalies,
        })
    }
}

fn failure_rule(input: &EvaluationInput<'_>) -> Option<ComplianceOutcome> {
    let failed = input.signals.status == GstVerificationStatus::Failed;
    if !failed && input.signals.anomalies.is_empty() {
        return None;
    }

    let mut flags = Vec::with_capacity(input.signals.anomalies.len() + 1);
    if failed {
        flags.push(ComplianceFlag::new(
            FlagKind::VerificationFailed,
            Severity::Critical,
            format!("GST registry rejected vendor GSTIN {}", input.vendor_gstin.trim()),
        ));
    }
    flags.extend(
        input
            .signals
            .anomalies
            .iter()
            .map(|kind| ComplianceFlag::for_anomaly(*kind)),
    );

    Some(ComplianceOutcome {
        flags,
        classification: Classification::HasAnomalies,
    })
}

fn pending_rule(input: &EvaluationInput<'_>) -> Option<ComplianceOutcome> {
    (input.signals.status == GstVerificationStatus::Pending).then(|| ComplianceOutcome {
        flags: Vec::new(),
        classification: Classification::Pending,
    })
}

fn clean_rule(_: &EvaluationInput<'_>) -> Option<ComplianceOutcome> {
    Some(ComplianceOutcome::clean())
}

/// Classifies invoices from their GSTINs and verification signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplianceEvaluator {
    verify_checksum: bool,
}

impl ComplianceEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            verify_checksum: config.verify_gstin_checksum,
        }
    }

    /// Also require the GSTIN check character to match.
    pub fn with_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    /// Evaluate. Flags are always built from scratch.
    pub fn evaluate(
        &self,
        vendor_gstin: &str,
        billed_gstin: &str,
        signals: &VerificationSignals,
    ) -> ComplianceOutcome {
        let input = EvaluationInput {
            vendor_gstin,
            billed_gstin,
            signals,
            verify_checksum: self.verify_checksum,
        };

        let (rule, outcome) = RULES
            .iter()
            .find_map(|(name, rule)| rule(&input).map(|outcome| (*name, outcome)))
            .unwrap_or_else(|| ("clean", ComplianceOutcome::clean()));

        tracing::debug!(
            rule,
            classification = ?outcome.classification,
            flags = outcome.flags.len(),
            "compliance evaluated"
        );
        outcome
    }
}

/// Evaluate with default settings (structure only, no checksum).
pub fn evaluate_compliance(
    vendor_gstin: &str,
    billed_gstin: &str,
    signals: &VerificationSignals,
) -> ComplianceOutcome {
    ComplianceEvaluator::new().evaluate(vendor_gstin, billed_gstin, signals)
}

/// Anomalies the engine can see on its own.
///
/// `ARITHMETIC_MISMATCH` when the cached totals disagree with the line items,
/// `SUSPICIOUS_TOTAL` when the grand total is above the configured threshold.
pub fn detect_anomalies(invoice: &Invoice, config: &EngineConfig) -> BTreeSet<AnomalyKind> {
    let mut found = BTreeSet::new();

    if !validate_totals(invoice).is_empty() {
        found.insert(AnomalyKind::ArithmeticMismatch);
    }

    if config
        .suspicious_total_threshold
        .is_some_and(|threshold| invoice.totals.grand_total > threshold)
    {
        found.insert(AnomalyKind::SuspiciousTotal);
    }

    found
}

/// Evaluate an invoice and record the result on it.
///
/// Flags are replaced, not appended. Nothing is changed if the current
/// status does not accept an evaluation.
pub fn apply_evaluation(
    invoice: &mut Invoice,
    signals: &VerificationSignals,
    evaluator: &ComplianceEvaluator,
) -> Result<InvoiceStatus, InvoiceError> {
    let outcome = evaluator.evaluate(&invoice.vendor_gstin, &invoice.billed_gstin, signals);
    let next = transition_status(invoice.status, outcome.classification)?;

    invoice.flags = outcome.flags;
    invoice.gst_verification = signals.status;
    invoice.status = next;
    Ok(next)
}

/// Send an invoice back to `PENDING_ANALYSIS` and evaluate it again in one
/// step. The intermediate status is never visible outside the `&mut`.
pub fn reanalyze(
    invoice: &mut Invoice,
    signals: &VerificationSignals,
    evaluator: &ComplianceEvaluator,
) -> Result<InvoiceStatus, InvoiceError> {
    let previous = invoice.status;
    invoice.status = request_reanalysis(previous);
    match apply_evaluation(invoice, signals, evaluator) {
        Ok(next) => Ok(next),
        Err(e) => {
            invoice.status = previous;
            Err(e)
        }
    }
}
