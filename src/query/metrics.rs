//! Dashboard aggregates over an owner's invoices.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{Invoice, InvoiceError, InvoiceStatus, OwnerId, to_currency};

/// Cleared revenue for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`.
    pub month: String,
    pub amount: Decimal,
}

/// Headline figures for one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Sum of grand totals of CLEARED invoices.
    pub total_revenue: Decimal,
    /// Number of invoices, any status.
    pub invoices_count: usize,
    /// Sum of grand totals of invoices not yet CLEARED.
    pub pending_amount: Decimal,
    /// Distinct vendor names.
    pub clients_count: usize,
    /// Cleared revenue per month, oldest first, ending with the month of
    /// `today`.
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

fn add(sum: &mut Decimal, amount: Decimal, what: &'static str) -> Result<(), InvoiceError> {
    *sum = sum.checked_add(amount).ok_or(InvoiceError::Arithmetic(what))?;
    Ok(())
}

fn currency(value: Decimal, what: &'static str) -> Result<Decimal, InvoiceError> {
    to_currency(value).ok_or(InvoiceError::Arithmetic(what))
}

/// Compute dashboard metrics for `owner`.
///
/// Fails with [`InvoiceError::Arithmetic`] when a sum leaves the range that
/// can carry 2 fractional digits.
pub fn dashboard_metrics<'a, I>(
    owner: &OwnerId,
    invoices: I,
    today: NaiveDate,
    months: u32,
) -> Result<DashboardMetrics, InvoiceError>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    let current = month_index(today);
    let first = current - months.min(1200) as i32 + 1;

    let mut total_revenue = Decimal::ZERO;
    let mut pending_amount = Decimal::ZERO;
    let mut invoices_count = 0;
    let mut vendors = HashSet::new();
    let mut by_month: BTreeMap<i32, Decimal> =
        (first..=current).map(|m| (m, Decimal::ZERO)).collect();

    for invoice in invoices.into_iter().filter(|inv| inv.uploaded_by == *owner) {
        invoices_count += 1;
        vendors.insert(invoice.vendor_name.as_str());

        if invoice.status == InvoiceStatus::Cleared {
            add(&mut total_revenue, invoice.totals.grand_total, "total revenue")?;
            if let Some(bucket) = by_month.get_mut(&month_index(invoice.issue_date)) {
                add(bucket, invoice.totals.grand_total, "monthly revenue")?;
            }
        } else {
            add(&mut pending_amount, invoice.totals.grand_total, "pending amount")?;
        }
    }

    let monthly_revenue = by_month
        .into_iter()
        .map(|(idx, amount)| {
            Ok(MonthlyRevenue {
                month: format!("{:04}-{:02}", idx.div_euclid(12), idx.rem_euclid(12) + 1),
                amount: currency(amount, "monthly revenue")?,
            })
        })
        .collect::<Result<Vec<_>, InvoiceError>>()?;

    Ok(DashboardMetrics {
        total_revenue: currency(total_revenue, "total revenue")?,
        invoices_count,
        pending_amount: currency(pending_amount, "pending amount")?,
        clients_count: vendors.len(),
        monthly_revenue,
    })
}
