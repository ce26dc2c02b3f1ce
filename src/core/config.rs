use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What to do with a status filter label that is not recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFilterPolicy {
    /// Treat the label as `all` so listing views keep working.
    #[default]
    FallbackToAll,
    /// Fail with `InvoiceError::UnknownFilter`.
    Reject,
}

/// Engine-wide settings.
///
/// Every field has a default, so a partial document deserializes:
///
/// ```
/// # use gstinvoice::EngineConfig;
/// let config: EngineConfig = serde_json::from_str(r#"{"verify_gstin_checksum": true}"#).unwrap();
/// assert!(config.verify_gstin_checksum);
/// assert_eq!(config.chart_months, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Handling of unrecognised filter labels.
    pub unknown_filter: UnknownFilterPolicy,
    /// Also require the GSTIN check character to match.
    pub verify_gstin_checksum: bool,
    /// Grand totals above this raise a `SUSPICIOUS_TOTAL` anomaly.
    pub suspicious_total_threshold: Option<Decimal>,
    /// Months covered by the dashboard revenue series.
    pub chart_months: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unknown_filter: UnknownFilterPolicy::FallbackToAll,
            verify_gstin_checksum: false,
            suspicious_total_threshold: None,
            chart_months: 6,
        }
    }
}

impl EngineConfig {
    pub fn with_unknown_filter(mut self, policy: UnknownFilterPolicy) -> Self {
        self.unknown_filter = policy;
        self
    }

    pub fn with_gstin_checksum(mut self, verify: bool) -> Self {
        self.verify_gstin_checksum = verify;
        self
    }

    pub fn with_suspicious_total_threshold(mut self, threshold: Decimal) -> Self {
        self.suspicious_total_threshold = Some(threshold);
        self
    }

    pub fn with_chart_months(mut self, months: u32) -> Self {
        self.chart_months = months;
        self
    }
}
