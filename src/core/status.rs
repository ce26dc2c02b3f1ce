//! Invoice lifecycle state machine.
//!
//! ```text
//! PENDING_ANALYSIS --CLEAN--------> CLEARED
//! PENDING_ANALYSIS --HAS_ANOMALIES> HAS_ANOMALIES
//! PENDING_ANALYSIS --PENDING------> PENDING_ANALYSIS
//! CLEARED | HAS_ANOMALIES --re-analysis--> PENDING_ANALYSIS
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::InvoiceError;
use super::types::Classification;

/// Lifecycle status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Initial state; awaiting a completed evaluation.
    #[default]
    PendingAnalysis,
    /// Evaluated clean.
    Cleared,
    /// Evaluated with at least one compliance flag.
    HasAnomalies,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 3] = [
        InvoiceStatus::PendingAnalysis,
        InvoiceStatus::Cleared,
        InvoiceStatus::HasAnomalies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingAnalysis => "PENDING_ANALYSIS",
            Self::Cleared => "CLEARED",
            Self::HasAnomalies => "HAS_ANOMALIES",
        }
    }

    /// Terminal states are only left through an explicit re-analysis request.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::PendingAnalysis)
    }

    /// Whether the state machine has an edge from `self` to `next` for
    /// `trigger`.
    pub fn can_transition_to(&self, next: InvoiceStatus, trigger: StatusTrigger) -> bool {
        match trigger {
            StatusTrigger::Evaluation => !self.is_terminal(),
            StatusTrigger::Reanalysis => next == Self::PendingAnalysis,
        }
    }
}

/// What moves an invoice along an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusTrigger {
    /// A completed compliance evaluation.
    Evaluation,
    /// An explicit request to evaluate again.
    Reanalysis,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_ANALYSIS" => Ok(Self::PendingAnalysis),
            "CLEARED" => Ok(Self::Cleared),
            "HAS_ANOMALIES" => Ok(Self::HasAnomalies),
            other => Err(format!("unknown invoice status '{other}'")),
        }
    }
}

/// Advance the state machine after an evaluation.
///
/// Only `PENDING_ANALYSIS` reacts to a classification. A terminal status has
/// to go through [`request_reanalysis`] first.
pub fn transition_status(
    current: InvoiceStatus,
    classification: Classification,
) -> Result<InvoiceStatus, InvoiceError> {
    let next = match classification {
        Classification::Clean => InvoiceStatus::Cleared,
        Classification::HasAnomalies => InvoiceStatus::HasAnomalies,
        Classification::Pending => InvoiceStatus::PendingAnalysis,
    };

    if !current.can_transition_to(next, StatusTrigger::Evaluation) {
        return Err(InvoiceError::InvalidTransition {
            from: current,
            to: next,
        });
    }

    Ok(next)
}

/// The externally triggered edge: any status back to `PENDING_ANALYSIS`.
pub fn request_reanalysis(current: InvoiceStatus) -> InvoiceStatus {
    let next = InvoiceStatus::PendingAnalysis;
    if current != next && current.can_transition_to(next, StatusTrigger::Reanalysis) {
        tracing::debug!(from = %current, "re-analysis requested");
    }
    next
}
