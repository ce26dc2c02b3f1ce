//! Read side: status-filtered listings and dashboard metrics.
//!
//! # Example
//!
//! ```ignore
//! use gstinvoice::query::*;
//!
//! let page = filter_invoices(&owner, "paid", &invoices)?;
//! println!("{} paid invoices", page.count);
//!
//! let metrics = dashboard_metrics(&owner, &invoices, today, 6)?;
//! ```

mod filter;
mod metrics;

pub use filter::{
    FilteredInvoices, StatusFilter, filter_invoices, filter_invoices_with, listing_order,
    select_invoices,
};
pub use metrics::{DashboardMetrics, MonthlyRevenue, dashboard_metrics};
